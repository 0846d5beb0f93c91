//! Affine transform math.
//!
//! A matrix is stored as `[a, b, c, d, e, f]` and maps a model point `(x, y)`
//! to `(a*x + c*(-y) + e, -(b*x + d*(-y) + f))`. Model y grows upward while
//! the image y grows downward, hence the flips around the affine map.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type tag carried by affine transforms on the wire.
pub const AFFINE_TRANSFORM_TYPE: &str = "http://www.openmicroscopy.org/Schemas/OME/2016-06#AffineTransform";

/// Six coefficients `[a, b, c, d, e, f]`.
pub type Matrix = [f64; 6];

pub const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Wire representation of an affine transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    #[serde(rename = "A00")]
    pub a00: f64,
    #[serde(rename = "A10")]
    pub a10: f64,
    #[serde(rename = "A01")]
    pub a01: f64,
    #[serde(rename = "A11")]
    pub a11: f64,
    #[serde(rename = "A02")]
    pub a02: f64,
    #[serde(rename = "A12")]
    pub a12: f64,
}

impl AffineTransform {
    pub fn to_matrix(&self) -> Matrix {
        [self.a00, self.a10, self.a01, self.a11, self.a02, self.a12]
    }

    pub fn from_matrix(m: &Matrix) -> Self {
        Self {
            a00: m[0],
            a10: m[1],
            a01: m[2],
            a11: m[3],
            a02: m[4],
            a12: m[5],
        }
    }
}

/// Scale and rotation recovered from a matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decomposition {
    pub scale_x: f64,
    pub scale_y: f64,
    pub rotation_radians: f64,
    pub rotation_degrees: f64,
}

/// Reads a matrix out of a wire transform object.
///
/// Anything that is not tagged as an affine transform, or lacks one of the
/// six numeric coefficients, yields `None` (identity).
pub fn matrix_from_transform_object(transform: &Value) -> Option<Matrix> {
    let obj = transform.as_object()?;
    let type_tag = obj.get("@type")?.as_str()?;
    if !type_tag.ends_with("#AffineTransform") {
        return None;
    }
    let coefficient = |key: &str| obj.get(key).and_then(Value::as_f64);
    Some([
        coefficient("A00")?,
        coefficient("A10")?,
        coefficient("A01")?,
        coefficient("A11")?,
        coefficient("A02")?,
        coefficient("A12")?,
    ])
}

/// Builds the wire transform object for a matrix.
///
/// Returns `None` unless the slice holds exactly six finite numbers.
pub fn transform_object_from_matrix(matrix: &[f64]) -> Option<Value> {
    let m: Matrix = matrix.try_into().ok()?;
    if m.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let mut json = serde_json::to_value(AffineTransform::from_matrix(&m)).ok()?;
    json.as_object_mut()?
        .insert("@type".to_string(), Value::from(AFFINE_TRANSFORM_TYPE));
    Some(json)
}

/// Applies a matrix to flat `[x0, y0, x1, y1, ...]` coordinates.
///
/// No matrix, empty input or an odd coordinate count returns the input as is.
pub fn apply_transform(matrix: Option<&Matrix>, coords: &[f64]) -> Vec<f64> {
    let m = match matrix {
        Some(m) if !coords.is_empty() && coords.len() % 2 == 0 => m,
        _ => return coords.to_vec(),
    };
    coords
        .chunks_exact(2)
        .flat_map(|p| {
            let (x, y) = (p[0], -p[1]);
            [m[0] * x + m[2] * y + m[4], -(m[1] * x + m[3] * y + m[5])]
        })
        .collect()
}

/// Inverse of a matrix, or `None` when the determinant is zero.
pub fn invert(m: &Matrix) -> Option<Matrix> {
    let det = m[0] * m[3] - m[1] * m[2];
    if det == 0.0 {
        return None;
    }
    Some([
        m[3] / det,
        -m[1] / det,
        -m[2] / det,
        m[0] / det,
        (m[2] * m[5] - m[3] * m[4]) / det,
        -(m[0] * m[5] - m[1] * m[4]) / det,
    ])
}

/// Applies the inverse of `matrix`.
///
/// A singular matrix leaves the coordinates untouched.
pub fn apply_inverse_transform(matrix: Option<&Matrix>, coords: &[f64]) -> Vec<f64> {
    match matrix.and_then(invert) {
        Some(inverse) => apply_transform(Some(&inverse), coords),
        None => coords.to_vec(),
    }
}

/// Splits a matrix into scale and rotation.
///
/// Scale signs are corrected by the quadrant of the rotation angle.
pub fn decompose_transform(matrix: Option<&Matrix>) -> Option<Decomposition> {
    let &[a, b, c, d, _, _] = matrix?;
    let mut scale_x = (a * a + b * b).sqrt();
    let mut scale_y = (c * c + d * d).sqrt();
    let rotation = c.atan2(d);

    let pi = std::f64::consts::PI;
    let upper = (0.0..=pi).contains(&rotation);
    let lower = rotation > pi && rotation < 2.0 * pi;
    if (upper && a < 0.0) || (lower && a > 0.0) {
        scale_x = -scale_x;
    }
    if (upper && d < 0.0) || (lower && d > 0.0) {
        scale_y = -scale_y;
    }

    Some(Decomposition {
        scale_x,
        scale_y,
        rotation_radians: rotation,
        rotation_degrees: rotation * 180.0 / pi,
    })
}

/// Flat coordinates into pairs. A trailing odd value is dropped.
pub fn to_pairs(flat: &[f64]) -> Vec<[f64; 2]> {
    flat.chunks_exact(2).map(|p| [p[0], p[1]]).collect()
}

pub fn to_flat(pairs: &[[f64; 2]]) -> Vec<f64> {
    pairs.iter().flat_map(|p| [p[0], p[1]]).collect()
}

/// Applies a matrix to coordinate pairs.
pub fn transform_pairs(matrix: Option<&Matrix>, pairs: &[[f64; 2]]) -> Vec<[f64; 2]> {
    match matrix {
        Some(_) => to_pairs(&apply_transform(matrix, &to_flat(pairs))),
        None => pairs.to_vec(),
    }
}

/// Applies the inverse of a matrix to coordinate pairs.
pub fn inverse_transform_pairs(matrix: Option<&Matrix>, pairs: &[[f64; 2]]) -> Vec<[f64; 2]> {
    match matrix {
        Some(_) => to_pairs(&apply_inverse_transform(matrix, &to_flat(pairs))),
        None => pairs.to_vec(),
    }
}
