use roikit_core::GeometryError;

use super::{ensure_finite, path_length, round_one_decimal, Coord, RegionShape, ShapeKind};
use crate::transform::{apply_inverse_transform, transform_pairs, Matrix};

/// Angular step in radians used to trace the outline.
pub const ELLIPSE_STEP: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct Ellipse {
    cx: f64,
    cy: f64,
    rx: f64,
    ry: f64,
    transform: Option<Matrix>,
    rendered: Vec<Coord>,
}

impl Ellipse {
    pub fn new(
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        transform: Option<Matrix>,
    ) -> Result<Self, GeometryError> {
        ensure_finite(
            ShapeKind::Ellipse,
            &[("cx", cx), ("cy", cy), ("rx", rx), ("ry", ry)],
        )?;
        let mut ellipse = Self {
            cx,
            cy,
            rx,
            ry,
            transform,
            rendered: Vec::new(),
        };
        ellipse.refresh();
        Ok(ellipse)
    }

    pub fn center(&self) -> Coord {
        [self.cx, self.cy]
    }

    pub fn radius(&self) -> [f64; 2] {
        [self.rx, self.ry]
    }

    pub fn set_center(&mut self, center: Coord) {
        if center.iter().all(|v| v.is_finite()) {
            [self.cx, self.cy] = center;
            self.refresh();
        }
    }

    pub fn set_radius(&mut self, radius: [f64; 2]) {
        if radius.iter().all(|v| v.is_finite()) {
            [self.rx, self.ry] = radius;
            self.refresh();
        }
    }

    /// Scales the transform if there is one, the radii otherwise.
    pub fn scale(&mut self, factor: f64) {
        match self.transform.as_mut() {
            Some(t) => t[..4].iter_mut().for_each(|v| *v *= factor),
            None => {
                self.rx *= factor;
                self.ry *= factor;
            }
        }
        self.refresh();
    }

    /// Interactive drag of the outline: radii follow the dragged position.
    pub fn modify_by_vertex_drag(&mut self, position: Coord) {
        let v = apply_inverse_transform(self.transform.as_ref(), &position);
        self.set_radius([(self.cx - v[0]).abs(), (self.cy - v[1]).abs()]);
    }

    fn refresh(&mut self) {
        let mut outline = Vec::new();
        let mut angle: f64 = 0.0;
        while angle < 2.0 * std::f64::consts::PI {
            outline.push([
                self.cx + self.rx * angle.cos(),
                self.cy + self.ry * angle.sin(),
            ]);
            angle += ELLIPSE_STEP;
        }
        if let Some(&first) = outline.first() {
            outline.push(first);
        }
        self.rendered = transform_pairs(self.transform.as_ref(), &outline);
    }
}

impl RegionShape for Ellipse {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Ellipse
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
                self.cx += dx;
                self.cy += dy;
            }
        }
        self.refresh();
    }

    /// Analytic area, the traced outline is only used for drawing.
    fn area(&self) -> f64 {
        std::f64::consts::PI * self.rx * self.ry
    }

    fn length(&self) -> f64 {
        path_length(&self.rendered)
    }

    fn display_coords(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("X", round_one_decimal(self.cx)),
            ("Y", round_one_decimal(-self.cy)),
            ("RadiusX", round_one_decimal(self.rx)),
            ("RadiusY", round_one_decimal(self.ry)),
        ]
    }
}
