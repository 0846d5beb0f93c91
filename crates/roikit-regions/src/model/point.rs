use roikit_core::GeometryError;

use super::{ensure_finite, round_one_decimal, Coord, Extent, RegionShape, ShapeKind};
use crate::transform::{transform_pairs, Matrix};

/// Fixed radius of the circle a point is drawn and hit-tested as.
pub const POINT_RADIUS: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    initial: Coord,
    transform: Option<Matrix>,
    rendered: [Coord; 1],
}

impl Point {
    pub fn new(x: f64, y: f64, transform: Option<Matrix>) -> Result<Self, GeometryError> {
        ensure_finite(ShapeKind::Point, &[("x", x), ("y", y)])?;
        let mut point = Self {
            initial: [x, y],
            transform,
            rendered: [[x, y]],
        };
        point.refresh();
        Ok(point)
    }

    /// Untransformed center.
    pub fn point_coordinates(&self) -> Coord {
        self.initial
    }

    pub fn radius(&self) -> f64 {
        POINT_RADIUS
    }

    fn refresh(&mut self) {
        if let Some(&c) = transform_pairs(self.transform.as_ref(), &[self.initial]).first() {
            self.rendered = [c];
        }
    }
}

impl RegionShape for Point {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Point
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
                self.initial[0] += dx;
                self.initial[1] += dy;
            }
        }
        self.refresh();
    }

    fn area(&self) -> f64 {
        std::f64::consts::PI * POINT_RADIUS * POINT_RADIUS
    }

    fn length(&self) -> f64 {
        2.0 * std::f64::consts::PI * POINT_RADIUS
    }

    fn display_coords(&self) -> Vec<(&'static str, f64)> {
        let [x, y] = self.initial;
        vec![("X", round_one_decimal(x)), ("Y", round_one_decimal(-y))]
    }

    fn extent(&self) -> Extent {
        let [x, y] = self.rendered[0];
        [x - POINT_RADIUS, y - POINT_RADIUS, x + POINT_RADIUS, y + POINT_RADIUS]
    }
}
