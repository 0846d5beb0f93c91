use roikit_core::GeometryError;

use super::{ensure_finite, path_length, ring_area, round_one_decimal, Coord, RegionShape, ShapeKind};
use crate::transform::Matrix;

/// Default box used when no text dimensions are known.
const DEFAULT_DIMENSIONS: (f64, f64) = (10.0, 10.0);

/// Text box sized to the measured text
///
/// Labels never carry a transform. Rotation is applied to the ring directly,
/// while the unrotated ring is kept as the original coordinates so the box
/// can be re-measured after font or zoom changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    coords: Vec<Coord>,
    original: Vec<Coord>,
}

impl Label {
    /// `dimensions` are `(width, height)`; `None` gives a 10x10 box.
    pub fn new(x: f64, y: f64, dimensions: Option<(f64, f64)>) -> Result<Self, GeometryError> {
        let (width, height) = dimensions.unwrap_or(DEFAULT_DIMENSIONS);
        ensure_finite(
            ShapeKind::Label,
            &[("x", x), ("y", y), ("width", width), ("height", height)],
        )?;
        let coords = box_ring([x, y], positive_or_one(width), positive_or_one(height));
        Ok(Self {
            original: coords.clone(),
            coords,
        })
    }

    pub fn upper_left_corner(&self) -> Coord {
        self.coords[0]
    }

    pub fn width(&self) -> f64 {
        self.coords[1][0] - self.coords[0][0]
    }

    pub fn height(&self) -> f64 {
        (self.coords[2][1] - self.coords[1][1]).abs()
    }

    pub fn original_coordinates(&self) -> &[Coord] {
        &self.original
    }

    /// Rebuilds the box and makes it the new original.
    pub fn change_rectangle(
        &mut self,
        x: Option<f64>,
        y: Option<f64>,
        width: Option<f64>,
        height: Option<f64>,
    ) {
        let pick = |new: Option<f64>, old: f64| new.filter(|v| v.is_finite()).unwrap_or(old);
        let [ox, oy] = self.upper_left_corner();
        let x = pick(x, ox);
        let y = pick(y, oy);
        let width = positive_or_one(pick(width, self.width()));
        let height = positive_or_one(pick(height, self.height()));
        self.coords = box_ring([x, y], width, height);
        self.original = self.coords.clone();
    }

    /// Rotates the box by `rotation` radians about its first point.
    pub fn rotate(&mut self, rotation: f64) {
        let (sin, cos) = rotation.sin_cos();
        let [cx, cy] = self.coords[0];
        for c in self.coords.iter_mut().skip(1) {
            let (x, y) = (c[0] - cx, c[1] - cy);
            *c = [cos * x + sin * y + cx, cos * y - sin * x + cy];
        }
    }

    /// Resizes the box from its first point. Negative sizes become 1.
    pub fn resize(&mut self, width: f64, height: f64) {
        if !width.is_finite() || !height.is_finite() {
            return;
        }
        let width = if width < 0.0 { 1.0 } else { width };
        let height = if height < 0.0 { 1.0 } else { height };
        let [x, y] = self.coords[0];
        self.coords[1][0] = x + width;
        self.coords[2][0] = x + width;
        self.coords[2][1] = y - height;
        self.coords[3][1] = y - height;
    }

    /// Restores the original box, resizes it to `dimensions` and re-applies
    /// the rotation.
    ///
    /// Without dimensions the original size is kept.
    pub fn adjust_coordinates(&mut self, rotation: f64, dimensions: Option<(f64, f64)>) {
        self.coords = self.original.clone();
        let (width, height) = match dimensions {
            Some((w, h)) => (positive_or_one(w), positive_or_one(h)),
            None => (
                self.original[1][0] - self.original[0][0],
                (self.original[2][1] - self.original[1][1]).abs(),
            ),
        };
        self.resize(width, height);
        if rotation != 0.0 {
            self.rotate(rotation);
        }
    }

    /// Stores the current box as the original.
    ///
    /// A rotated box is first straightened from its first point with the
    /// current width and height; the rotated ring stays in place for display.
    pub fn modify_original_coordinates(&mut self, rotation: f64, _scaling: f64) {
        if rotation != 0.0 {
            self.original = box_ring(self.coords[0], self.width(), self.height());
        } else {
            self.original = self.coords.clone();
        }
    }
}

fn box_ring(corner: Coord, width: f64, height: f64) -> Vec<Coord> {
    let [x, y] = corner;
    vec![
        [x, y],
        [x + width, y],
        [x + width, y - height],
        [x, y - height],
        [x, y],
    ]
}

fn positive_or_one(v: f64) -> f64 {
    if v > 0.0 {
        v
    } else {
        1.0
    }
}

impl RegionShape for Label {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Label
    }

    fn transform(&self) -> Option<&Matrix> {
        None
    }

    fn coordinates(&self) -> &[Coord] {
        &self.coords
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        for c in self.coords.iter_mut().chain(self.original.iter_mut()) {
            c[0] += dx;
            c[1] += dy;
        }
    }

    fn area(&self) -> f64 {
        ring_area(&self.coords)
    }

    fn length(&self) -> f64 {
        path_length(&self.coords)
    }

    fn display_coords(&self) -> Vec<(&'static str, f64)> {
        let [x, y] = self.upper_left_corner();
        vec![
            ("X", round_one_decimal(x)),
            ("Y", round_one_decimal(-y)),
            ("Width", round_one_decimal(self.width())),
            ("Height", round_one_decimal(self.height())),
        ]
    }
}
