//! Wire JSON conversion: colors, shapes in both directions and store batches.

pub mod batch;
pub mod color;
pub mod factory;
pub mod shape;

pub use batch::{to_json_object, RoisBatch};
pub use color::{
    check_color_object_correctness, convert_color_array_to_object, convert_color_to_signed_integer,
    convert_hex_color_format_to_object, convert_rgba_color_format_to_object, Color,
};
pub use factory::{
    feature_factory, geometry_from_json, lookup_feature_kind, shape_kind_of, try_feature_factory,
    TextMetrics, UNASSIGNED_ID,
};
pub use shape::{
    convert_point_string_into_coords, feature_to_json_object, geometry_to_json,
    integrate_misc_info_into_json_object, integrate_style_into_json_object, points_to_string,
    schema_type, JsonObject, SCHEMA_URI,
};
