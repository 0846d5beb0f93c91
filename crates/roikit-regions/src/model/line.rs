use roikit_core::GeometryError;

use super::{
    bounding_extent, ensure_finite_coords, path_length, round_one_decimal, Coord, Polygon,
    RegionShape, ShapeKind,
};
use crate::transform::{transform_pairs, Matrix};

/// Line with two points, or polyline with more, with optional arrow markers
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    initial: Vec<Coord>,
    transform: Option<Matrix>,
    rendered: Vec<Coord>,
    pub has_start_arrow: bool,
    pub has_end_arrow: bool,
}

impl Line {
    pub fn new(
        points: Vec<Coord>,
        has_start_arrow: bool,
        has_end_arrow: bool,
        transform: Option<Matrix>,
    ) -> Result<Self, GeometryError> {
        if points.len() < 2 {
            return Err(GeometryError::TooFewPoints {
                kind: ShapeKind::Line.to_string(),
                required: 2,
                actual: points.len(),
            });
        }
        ensure_finite_coords(ShapeKind::Line, &points)?;
        let rendered = transform_pairs(transform.as_ref(), &points);
        Ok(Self {
            initial: points,
            transform,
            rendered,
            has_start_arrow,
            has_end_arrow,
        })
    }

    pub fn is_polyline(&self) -> bool {
        self.initial.len() > 2
    }

    /// Untransformed points.
    pub fn line_coordinates(&self) -> &[Coord] {
        &self.initial
    }

    /// Triangular arrowhead at the end (`head`) or the start of the line.
    ///
    /// Non-positive `width`/`height` fall back to 10 and twice the width.
    /// Returns `None` for a zero-length end segment.
    pub fn arrow_geometry(&self, head: bool, width: f64, height: f64) -> Option<Polygon> {
        let width = if width > 0.0 { width } else { 10.0 };
        let height = if height > 0.0 { height } else { 2.0 * width };
        let half_width = width / 2.0;

        let coords = &self.rendered;
        let index = if head { coords.len() - 1 } else { 1 };
        let segment = [
            coords[index][0] - coords[index - 1][0],
            coords[index][1] - coords[index - 1][1],
        ];
        let tip = if head { coords[index] } else { coords[0] };

        let magnitude = (segment[0] * segment[0] + segment[1] * segment[1]).sqrt();
        if magnitude == 0.0 {
            return None;
        }
        let unit = [segment[0] / magnitude, segment[1] / magnitude];
        let perp = [-unit[1], unit[0]];

        let direction = if head { 1.0 } else { -1.0 };
        let base = [
            tip[0] - direction * height * unit[0],
            tip[1] - direction * height * unit[1],
        ];
        let p1 = [base[0] - half_width * perp[0], base[1] - half_width * perp[1]];
        let p2 = [base[0] + half_width * perp[0], base[1] + half_width * perp[1]];

        Polygon::new(vec![tip, p1, p2], None).ok()
    }

    fn refresh(&mut self) {
        self.rendered = transform_pairs(self.transform.as_ref(), &self.initial);
    }
}

impl RegionShape for Line {
    fn kind(&self) -> ShapeKind {
        if self.is_polyline() {
            ShapeKind::Polyline
        } else {
            ShapeKind::Line
        }
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
        0.0
    }

    fn length(&self) -> f64 {
        path_length(&self.rendered)
    }

    fn display_coords(&self) -> Vec<(&'static str, f64)> {
        if self.is_polyline() {
            let [min_x, min_y, max_x, max_y] = bounding_extent(&self.rendered);
            return vec![
                ("X", round_one_decimal(min_x)),
                ("Y", round_one_decimal(-max_y)),
                ("Width", round_one_decimal(max_x - min_x)),
                ("Height", round_one_decimal(max_y - min_y)),
            ];
        }
        let [x1, y1] = self.initial[0];
        let [x2, y2] = self.initial[1];
        vec![
            ("X1", round_one_decimal(x1)),
            ("Y1", round_one_decimal(-y1)),
            ("X2", round_one_decimal(x2)),
            ("Y2", round_one_decimal(-y2)),
        ]
    }
}
