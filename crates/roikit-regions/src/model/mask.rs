use roikit_core::GeometryError;

use super::{ensure_finite, round_one_decimal, Coord, Extent, Rectangle, RegionShape, ShapeKind};
use crate::transform::{transform_pairs, Matrix};

/// Bitmap mask placeholder: an anchor point plus an explicit size
///
/// Extent, outline and display values work on the untransformed anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    initial: Coord,
    size: [f64; 2],
    transform: Option<Matrix>,
    rendered: [Coord; 1],
}

impl Mask {
    pub fn new(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        transform: Option<Matrix>,
    ) -> Result<Self, GeometryError> {
        ensure_finite(
            ShapeKind::Mask,
            &[("x", x), ("y", y), ("width", width), ("height", height)],
        )?;
        let mut mask = Self {
            initial: [x, y],
            size: [width, height],
            transform,
            rendered: [[x, y]],
        };
        mask.refresh();
        Ok(mask)
    }

    pub fn point_coordinates(&self) -> Coord {
        self.initial
    }

    pub fn size(&self) -> [f64; 2] {
        self.size
    }

    /// Rectangle covering the mask, used for hit-testing.
    pub fn outline(&self) -> Option<Rectangle> {
        let [x, y] = self.initial;
        Rectangle::new(x, y, self.size[0], self.size[1], None).ok()
    }

    fn refresh(&mut self) {
        if let Some(&c) = transform_pairs(self.transform.as_ref(), &[self.initial]).first() {
            self.rendered = [c];
        }
    }
}

impl RegionShape for Mask {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Mask
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
        self.size[0] * self.size[1]
    }

    fn length(&self) -> f64 {
        2.0 * (self.size[0] + self.size[1])
    }

    fn display_coords(&self) -> Vec<(&'static str, f64)> {
        let [x, y] = self.initial;
        vec![
            ("X", round_one_decimal(x)),
            ("Y", round_one_decimal(-y)),
            ("Width", round_one_decimal(self.size[0])),
            ("Height", round_one_decimal(self.size[1])),
        ]
    }

    fn extent(&self) -> Extent {
        let [x, y] = self.initial;
        [x, y - self.size[1], x + self.size[0], y]
    }

    fn intersects_extent(&self, extent: &Extent) -> bool {
        match self.outline() {
            Some(outline) => outline.intersects_extent(extent),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_and_length() {
        let m = Mask::new(0.0, 0.0, 4.0, 5.0, None).expect("valid");
        assert_eq!(m.area(), 20.0);
        assert_eq!(m.length(), 18.0);
    }

    #[test]
    fn test_extent_and_outline() {
        let m = Mask::new(10.0, -10.0, 4.0, 5.0, None).expect("valid");
        assert_eq!(m.extent(), [10.0, -15.0, 14.0, -10.0]);
        let outline = m.outline().expect("outline");
        assert_eq!(outline.upper_left_corner(), [10.0, -10.0]);
        assert!(m.intersects_extent(&[12.0, -12.0, 20.0, 0.0]));
        assert!(!m.intersects_extent(&[20.0, -12.0, 30.0, 0.0]));
    }

    #[test]
    fn test_display_flips_y() {
        let m = Mask::new(1.0, -2.0, 3.0, 4.0, None).expect("valid");
        assert_eq!(
            m.display_coords(),
            vec![("X", 1.0), ("Y", 2.0), ("Width", 3.0), ("Height", 4.0)]
        );
    }
}
