use roikit_core::GeometryError;

use super::{
    bounding_extent, ensure_finite_coords, path_length, ring_area, round_one_decimal, Coord,
    RegionShape, ShapeKind,
};
use crate::transform::{transform_pairs, Matrix};

/// Closed ring of points, optionally transformed
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    initial: Vec<Coord>,
    transform: Option<Matrix>,
    rendered: Vec<Coord>,
    /// The closing point was appended on construction
    auto_closed: bool,
}

impl Polygon {
    /// Builds a polygon from its ring. The ring is closed if it is not already.
    pub fn new(mut ring: Vec<Coord>, transform: Option<Matrix>) -> Result<Self, GeometryError> {
        ensure_finite_coords(ShapeKind::Polygon, &ring)?;
        if ring.len() < 3 {
            return Err(GeometryError::TooFewPoints {
                kind: ShapeKind::Polygon.to_string(),
                required: 3,
                actual: ring.len(),
            });
        }
        let auto_closed = ring.first() != ring.last();
        if auto_closed {
            ring.push(ring[0]);
        }
        let rendered = transform_pairs(transform.as_ref(), &ring);
        Ok(Self {
            initial: ring,
            transform,
            rendered,
            auto_closed,
        })
    }

    /// Untransformed ring, closed.
    pub fn polygon_coordinates(&self) -> &[Coord] {
        &self.initial
    }

    /// Untransformed points as they were given, without an appended closing point.
    pub fn source_coordinates(&self) -> &[Coord] {
        if self.auto_closed {
            &self.initial[..self.initial.len() - 1]
        } else {
            &self.initial
        }
    }

    fn refresh(&mut self) {
        self.rendered = transform_pairs(self.transform.as_ref(), &self.initial);
    }
}

impl RegionShape for Polygon {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Polygon
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
                for c in &mut self.initial {
                    c[0] += dx;
                    c[1] += dy;
                }
            }
        }
        self.refresh();
    }

    fn area(&self) -> f64 {
        ring_area(&self.rendered)
    }

    fn length(&self) -> f64 {
        path_length(&self.rendered)
    }

    fn display_coords(&self) -> Vec<(&'static str, f64)> {
        let [min_x, min_y, max_x, max_y] = bounding_extent(&self.rendered);
        vec![
            ("X", round_one_decimal(min_x)),
            ("Y", round_one_decimal(-max_y)),
            ("Width", round_one_decimal(max_x - min_x)),
            ("Height", round_one_decimal(max_y - min_y)),
        ]
    }
}
