use proptest::prelude::*;
use roikit_regions::model::{Ellipse, Geometry, Label, Line, Mask, Polygon, Rectangle, RegionShape};

proptest! {
    #[test]
    fn rectangle_keeps_its_parameters(
        x in -1e4f64..1e4,
        y in -1e4f64..1e4,
        w in 1.0f64..1e3,
        h in 1.0f64..1e3,
        dx in -100.0f64..100.0,
        dy in -100.0f64..100.0,
    ) {
        let mut rect = Rectangle::new(x, y, w, h, None).expect("valid");
        prop_assert_eq!(rect.width(), w);
        prop_assert_eq!(rect.height(), h);
        prop_assert_eq!(rect.upper_left_corner(), [x, y]);

        rect.translate(dx, dy);
        prop_assert_eq!(rect.upper_left_corner(), [x + dx, y + dy]);
        prop_assert_eq!(rect.width(), w);
    }

    #[test]
    fn ellipse_area_is_exact(rx in 0.1f64..500.0, ry in 0.1f64..500.0) {
        let ellipse = Ellipse::new(0.0, 0.0, rx, ry, None).expect("valid");
        prop_assert_eq!(ellipse.area(), std::f64::consts::PI * rx * ry);
    }
}

#[test]
fn test_non_finite_parameters_are_rejected() {
    assert!(Rectangle::new(f64::NAN, 0.0, 1.0, 1.0, None).is_err());
    assert!(Ellipse::new(0.0, 0.0, f64::INFINITY, 1.0, None).is_err());
    assert!(Line::new(vec![[0.0, 0.0]], false, false, None).is_err());
    assert!(Polygon::new(vec![[0.0, 0.0], [1.0, 1.0]], None).is_err());
}

#[test]
fn test_polygon_closes_its_ring() {
    let polygon = Polygon::new(vec![[0.0, 0.0], [4.0, 0.0], [4.0, -3.0]], None).expect("valid");
    assert_eq!(polygon.polygon_coordinates().len(), 4);
    assert_eq!(polygon.source_coordinates().len(), 3);
    assert_eq!(polygon.area(), 6.0);
}

#[test]
fn test_transformed_rectangle_translates_its_base() {
    let shift = [1.0, 0.0, 0.0, 1.0, 100.0, 0.0];
    let mut rect = Rectangle::new(0.0, 0.0, 10.0, 10.0, Some(shift)).expect("valid");
    assert_eq!(rect.extent(), [100.0, -10.0, 110.0, 0.0]);
    rect.translate(5.0, 0.0);
    assert_eq!(rect.upper_left_corner(), [0.0, 0.0]);
    assert_eq!(rect.extent(), [105.0, -10.0, 115.0, 0.0]);
}

#[test]
fn test_line_measures_and_arrows() {
    let line = Line::new(vec![[0.0, 0.0], [3.0, -4.0]], false, true, None).expect("valid");
    assert_eq!(line.length(), 5.0);
    assert!(!line.is_polyline());
    assert!(line.arrow_geometry(true, 4.0, 8.0).is_some());
}

#[test]
fn test_label_and_mask_boxes() {
    let mut label = Label::new(2.0, -2.0, Some((30.0, 12.0))).expect("valid");
    assert_eq!((label.width(), label.height()), (30.0, 12.0));
    label.resize(-3.0, 20.0);
    assert_eq!((label.width(), label.height()), (1.0, 20.0));

    let mask = Mask::new(5.0, -5.0, 8.0, 4.0, None).expect("valid");
    assert_eq!(mask.area(), 32.0);
    let outline = mask.outline().expect("outline");
    assert_eq!((outline.width(), outline.height()), (8.0, 4.0));
    let geometry = Geometry::Mask(mask);
    assert!(geometry.intersects_extent(&[6.0, -6.0, 7.0, -5.5]));
}
