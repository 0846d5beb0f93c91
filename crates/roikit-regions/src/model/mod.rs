use roikit_core::GeometryError;
use std::fmt;

use crate::transform::Matrix;

mod ellipse;
mod label;
mod line;
mod mask;
mod point;
mod polygon;
mod rectangle;

pub use ellipse::{Ellipse, ELLIPSE_STEP};
pub use label::Label;
pub use line::Line;
pub use mask::Mask;
pub use point::{Point, POINT_RADIUS};
pub use polygon::Polygon;
pub use rectangle::Rectangle;

/// Model-space coordinate pair (y grows upward).
pub type Coord = [f64; 2];

/// Extent as `[min_x, min_y, max_x, max_y]`.
pub type Extent = [f64; 4];

/// Behaviour shared by all region geometries.
///
/// Implementors keep their untransformed coordinates as the source of truth
/// and cache the transformed (rendered) coordinates, refreshing the cache on
/// every mutation.
pub trait RegionShape {
    fn kind(&self) -> ShapeKind;
    fn transform(&self) -> Option<&Matrix>;
    /// Rendered coordinates, transform applied.
    fn coordinates(&self) -> &[Coord];
    fn translate(&mut self, dx: f64, dy: f64);
    /// Raw geometric area in pixels, defined for every shape (a point
    /// reports its marker circle). Which shapes carry an area measurement
    /// is decided in `regions::measure`, where the others get `-1`.
    fn area(&self) -> f64;
    /// Raw geometric length: path length for lines, perimeter for closed
    /// shapes. Only lines and polylines report it as a measurement.
    fn length(&self) -> f64;
    /// Labelled values for display, rounded to one decimal, y in image convention.
    fn display_coords(&self) -> Vec<(&'static str, f64)>;

    fn extent(&self) -> Extent {
        bounding_extent(self.coordinates())
    }

    fn intersects_extent(&self, extent: &Extent) -> bool {
        extents_intersect(&self.extent(), extent)
    }
}

/// Wire-level shape kind; `Line` and `Polyline` share one geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Point,
    Line,
    Polyline,
    Rectangle,
    Ellipse,
    Polygon,
    Label,
    Mask,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 8] = [
        Self::Point,
        Self::Line,
        Self::Polyline,
        Self::Rectangle,
        Self::Ellipse,
        Self::Polygon,
        Self::Label,
        Self::Mask,
    ];

    /// Lowercase name as found after `#` in a shape's `@type`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Line => "line",
            Self::Polyline => "polyline",
            Self::Rectangle => "rectangle",
            Self::Ellipse => "ellipse",
            Self::Polygon => "polygon",
            Self::Label => "label",
            Self::Mask => "mask",
        }
    }

    /// Schema type name used in the `@type` uri.
    pub fn schema_name(&self) -> &'static str {
        match self {
            Self::Point => "Point",
            Self::Line => "Line",
            Self::Polyline => "Polyline",
            Self::Rectangle => "Rectangle",
            Self::Ellipse => "Ellipse",
            Self::Polygon => "Polygon",
            Self::Label => "Label",
            Self::Mask => "Mask",
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        Self::ALL.into_iter().find(|k| k.type_name() == lower)
    }

    pub fn is_line_like(&self) -> bool {
        matches!(self, Self::Line | Self::Polyline)
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point),
    Line(Line),
    Polygon(Polygon),
    Rectangle(Rectangle),
    Ellipse(Ellipse),
    Label(Label),
    Mask(Mask),
}

impl Geometry {
    pub fn as_rectangle(&self) -> Option<&Rectangle> {
        match self {
            Geometry::Rectangle(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_label(&self) -> Option<&Label> {
        match self {
            Geometry::Label(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_label_mut(&mut self) -> Option<&mut Label> {
        match self {
            Geometry::Label(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_line(&self) -> Option<&Line> {
        match self {
            Geometry::Line(l) => Some(l),
            _ => None,
        }
    }

    /// Moves the top left of the extent onto the given point.
    pub fn move_top_left_to(&mut self, x: f64, y: f64) {
        let [min_x, _, _, max_y] = self.extent();
        self.translate(x - min_x, y - max_y);
    }
}

impl RegionShape for Geometry {
    fn kind(&self) -> ShapeKind {
        match self {
            Geometry::Point(g) => g.kind(),
            Geometry::Line(g) => g.kind(),
            Geometry::Polygon(g) => g.kind(),
            Geometry::Rectangle(g) => g.kind(),
            Geometry::Ellipse(g) => g.kind(),
            Geometry::Label(g) => g.kind(),
            Geometry::Mask(g) => g.kind(),
        }
    }

    fn transform(&self) -> Option<&Matrix> {
        match self {
            Geometry::Point(g) => g.transform(),
            Geometry::Line(g) => g.transform(),
            Geometry::Polygon(g) => g.transform(),
            Geometry::Rectangle(g) => g.transform(),
            Geometry::Ellipse(g) => g.transform(),
            Geometry::Label(g) => g.transform(),
            Geometry::Mask(g) => g.transform(),
        }
    }

    fn coordinates(&self) -> &[Coord] {
        match self {
            Geometry::Point(g) => g.coordinates(),
            Geometry::Line(g) => g.coordinates(),
            Geometry::Polygon(g) => g.coordinates(),
            Geometry::Rectangle(g) => g.coordinates(),
            Geometry::Ellipse(g) => g.coordinates(),
            Geometry::Label(g) => g.coordinates(),
            Geometry::Mask(g) => g.coordinates(),
        }
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        match self {
            Geometry::Point(g) => g.translate(dx, dy),
            Geometry::Line(g) => g.translate(dx, dy),
            Geometry::Polygon(g) => g.translate(dx, dy),
            Geometry::Rectangle(g) => g.translate(dx, dy),
            Geometry::Ellipse(g) => g.translate(dx, dy),
            Geometry::Label(g) => g.translate(dx, dy),
            Geometry::Mask(g) => g.translate(dx, dy),
        }
    }

    fn area(&self) -> f64 {
        match self {
            Geometry::Point(g) => g.area(),
            Geometry::Line(g) => g.area(),
            Geometry::Polygon(g) => g.area(),
            Geometry::Rectangle(g) => g.area(),
            Geometry::Ellipse(g) => g.area(),
            Geometry::Label(g) => g.area(),
            Geometry::Mask(g) => g.area(),
        }
    }

    fn length(&self) -> f64 {
        match self {
            Geometry::Point(g) => g.length(),
            Geometry::Line(g) => g.length(),
            Geometry::Polygon(g) => g.length(),
            Geometry::Rectangle(g) => g.length(),
            Geometry::Ellipse(g) => g.length(),
            Geometry::Label(g) => g.length(),
            Geometry::Mask(g) => g.length(),
        }
    }

    fn display_coords(&self) -> Vec<(&'static str, f64)> {
        match self {
            Geometry::Point(g) => g.display_coords(),
            Geometry::Line(g) => g.display_coords(),
            Geometry::Polygon(g) => g.display_coords(),
            Geometry::Rectangle(g) => g.display_coords(),
            Geometry::Ellipse(g) => g.display_coords(),
            Geometry::Label(g) => g.display_coords(),
            Geometry::Mask(g) => g.display_coords(),
        }
    }

    fn extent(&self) -> Extent {
        match self {
            Geometry::Point(g) => g.extent(),
            Geometry::Mask(g) => g.extent(),
            other => bounding_extent(other.coordinates()),
        }
    }
}

pub(crate) fn bounding_extent(coords: &[Coord]) -> Extent {
    coords.iter().fold(
        [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY],
        |e, c| [e[0].min(c[0]), e[1].min(c[1]), e[2].max(c[0]), e[3].max(c[1])],
    )
}

pub(crate) fn extents_intersect(a: &Extent, b: &Extent) -> bool {
    a[0] <= b[2] && a[2] >= b[0] && a[1] <= b[3] && a[3] >= b[1]
}

pub(crate) fn path_length(coords: &[Coord]) -> f64 {
    coords
        .windows(2)
        .map(|w| ((w[1][0] - w[0][0]).powi(2) + (w[1][1] - w[0][1]).powi(2)).sqrt())
        .sum()
}

/// Unsigned shoelace area of a ring.
pub(crate) fn ring_area(ring: &[Coord]) -> f64 {
    let twice: f64 = ring
        .iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(a, b)| a[0] * b[1] - b[0] * a[1])
        .sum();
    (twice / 2.0).abs()
}

pub(crate) fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub(crate) fn ensure_finite(kind: ShapeKind, params: &[(&str, f64)]) -> Result<(), GeometryError> {
    match params.iter().find(|(_, v)| !v.is_finite()) {
        Some((name, _)) => Err(GeometryError::NonFiniteParameter {
            kind: kind.to_string(),
            param: name.to_string(),
        }),
        None => Ok(()),
    }
}

pub(crate) fn ensure_finite_coords(kind: ShapeKind, coords: &[Coord]) -> Result<(), GeometryError> {
    if coords.iter().flatten().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(GeometryError::NonFiniteParameter {
            kind: kind.to_string(),
            param: "coordinates".to_string(),
        })
    }
}
