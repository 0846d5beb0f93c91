use proptest::prelude::*;
use roikit_regions::transform::{apply_inverse_transform, apply_transform, invert, Matrix};

fn close(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| (x - y).abs() <= 1e-6 * (1.0 + x.abs().max(y.abs())))
}

fn matrix_strategy() -> impl Strategy<Value = Matrix> {
    prop::array::uniform6(-10.0f64..10.0).prop_filter("invertible", |m| {
        (m[0] * m[3] - m[1] * m[2]).abs() > 0.1
    })
}

fn coords_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((-1000.0f64..1000.0, -1000.0f64..1000.0), 1..20)
        .prop_map(|pairs| pairs.into_iter().flat_map(|(x, y)| [x, y]).collect())
}

proptest! {
    #[test]
    fn inverse_undoes_transform(m in matrix_strategy(), coords in coords_strategy()) {
        let there = apply_transform(Some(&m), &coords);
        let back = apply_inverse_transform(Some(&m), &there);
        prop_assert!(close(&back, &coords));
    }

    #[test]
    fn missing_matrix_is_identity(coords in coords_strategy()) {
        prop_assert_eq!(apply_transform(None, &coords), coords.clone());
        prop_assert_eq!(apply_inverse_transform(None, &coords), coords);
    }
}

#[test]
fn test_degenerate_matrix_leaves_coordinates_alone() {
    let singular: Matrix = [1.0, 2.0, 2.0, 4.0, 5.0, 6.0];
    assert!(invert(&singular).is_none());
    let coords = [3.0, -4.0, 10.0, 2.5];
    assert_eq!(apply_inverse_transform(Some(&singular), &coords), coords.to_vec());
}

#[test]
fn test_translation_matrix() {
    let shift: Matrix = [1.0, 0.0, 0.0, 1.0, 10.0, 20.0];
    // model y is flipped around the image-space translation
    assert_eq!(apply_transform(Some(&shift), &[1.0, -1.0]), vec![11.0, -21.0]);
}
