use roikit_core::{ConversionError, Error, GeometryError, PersistResponse, Result, ShapeId};

fn parse_id(raw: &str) -> Result<ShapeId> {
    raw.parse::<ShapeId>().map_err(|_| {
        ConversionError::InvalidShapeId {
            value: raw.to_string(),
        }
        .into()
    })
}

fn build_shape(points: usize) -> Result<()> {
    if points < 2 {
        let err = GeometryError::TooFewPoints {
            kind: "line".to_string(),
            required: 2,
            actual: points,
        };
        return Err(ConversionError::from(err).into());
    }
    Ok(())
}

#[test]
fn test_errors_keep_their_layer() {
    let err = parse_id("12").expect_err("no separator");
    assert!(err.is_conversion_error());
    assert!(!err.is_geometry_error());
    assert_eq!(err.to_string(), "Invalid shape id '12'");

    let err = build_shape(1).expect_err("too few points");
    assert!(err.is_geometry_error());
    assert_eq!(err.to_string(), "line needs at least 2 points, got 1");

    let err: Error = PersistResponse::from_json("[").expect_err("malformed").into();
    assert!(err.is_persistence_error());
}

#[test]
fn test_ids_parse_through_result() {
    assert_eq!(parse_id("-1:-42").ok(), Some(ShapeId::new(-1, -42)));
    assert!(build_shape(3).is_ok());
}
