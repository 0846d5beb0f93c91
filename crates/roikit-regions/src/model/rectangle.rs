use roikit_core::GeometryError;

use super::{ensure_finite, round_one_decimal, Coord, RegionShape, ShapeKind};
use crate::transform::{apply_inverse_transform, transform_pairs, Matrix};

/// Axis-aligned rectangle (before transform) kept as a closed 5-point ring
///
/// `(x, y)` is the upper-left corner in model space, so the ring runs
/// `[x, y] -> [x+w, y] -> [x+w, y-h] -> [x, y-h] -> [x, y]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    transform: Option<Matrix>,
    initial: Vec<Coord>,
    rendered: Vec<Coord>,
}

impl Rectangle {
    /// Non-positive width or height default to 1.
    pub fn new(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        transform: Option<Matrix>,
    ) -> Result<Self, GeometryError> {
        ensure_finite(
            ShapeKind::Rectangle,
            &[("x", x), ("y", y), ("width", width), ("height", height)],
        )?;
        let mut rect = Self {
            x,
            y,
            width: positive_or_one(width),
            height: positive_or_one(height),
            transform,
            initial: Vec::new(),
            rendered: Vec::new(),
        };
        rect.refresh();
        Ok(rect)
    }

    pub fn upper_left_corner(&self) -> Coord {
        [self.x, self.y]
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Untransformed ring.
    pub fn rectangle_coordinates(&self) -> &[Coord] {
        &self.initial
    }

    pub fn set_upper_left_corner(&mut self, corner: Coord) {
        self.change_rectangle(Some(corner[0]), Some(corner[1]), None, None);
    }

    pub fn set_width(&mut self, width: f64) {
        self.change_rectangle(None, None, Some(width), None);
    }

    pub fn set_height(&mut self, height: f64) {
        self.change_rectangle(None, None, None, Some(height));
    }

    /// Rebuilds the ring, keeping every parameter that is `None` or not finite.
    pub fn change_rectangle(
        &mut self,
        x: Option<f64>,
        y: Option<f64>,
        width: Option<f64>,
        height: Option<f64>,
    ) {
        let pick = |new: Option<f64>, old: f64| new.filter(|v| v.is_finite()).unwrap_or(old);
        self.x = pick(x, self.x);
        self.y = pick(y, self.y);
        self.width = positive_or_one(pick(width, self.width));
        self.height = positive_or_one(pick(height, self.height));
        self.refresh();
    }

    /// Applies an interactive drag of one corner.
    ///
    /// `vertex_index` is the ring index (0..=3) of the dragged corner and
    /// `position` its new rendered position. The opposite corner stays fixed
    /// and width/height never drop below 1.
    pub fn modify_by_vertex_drag(&mut self, vertex_index: usize, position: Coord) {
        let mut dragged = vertex_index.min(3);
        if dragged > 2 {
            dragged += 1;
        }
        let opposite = self.initial[(dragged + 2) % 5];

        let moved = apply_inverse_transform(self.transform.as_ref(), &position);
        let (vx, vy) = (moved[0], moved[1]);
        if !vx.is_finite() || !vy.is_finite() {
            return;
        }

        let left = vx.min(opposite[0]);
        let right = vx.max(opposite[0]);
        let top = vy.max(opposite[1]);
        let bottom = vy.min(opposite[1]);

        self.x = left;
        self.y = top;
        self.width = (right - left).max(1.0);
        self.height = (top - bottom).max(1.0);
        self.refresh();
    }

    fn refresh(&mut self) {
        let (x, y, w, h) = (self.x, self.y, self.width, self.height);
        self.initial = vec![[x, y], [x + w, y], [x + w, y - h], [x, y - h], [x, y]];
        self.rendered = transform_pairs(self.transform.as_ref(), &self.initial);
    }
}

fn positive_or_one(v: f64) -> f64 {
    if v > 0.0 {
        v
    } else {
        1.0
    }
}

impl RegionShape for Rectangle {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Rectangle
    }

    fn transform(&self) -> Option<&Matrix> {
        self.transform.as_ref()
    }

    fn coordinates(&self) -> &[Coord] {
        &self.rendered
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        match self.transform.as_mut() {
            Some(t) => {
                t[4] += dx;
                t[5] -= dy;
            }
            None => {
                self.x += dx;
                self.y += dy;
            }
        }
        self.refresh();
    }

    fn area(&self) -> f64 {
        super::ring_area(&self.rendered)
    }

    fn length(&self) -> f64 {
        super::path_length(&self.rendered)
    }

    fn display_coords(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("X", round_one_decimal(self.x)),
            ("Y", round_one_decimal(-self.y)),
            ("Width", round_one_decimal(self.width)),
            ("Height", round_one_decimal(self.height)),
        ]
    }
}
