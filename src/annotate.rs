//! Stamps each loaded feature with the display name of its layer.
//!
//! The stamped key is the only link between a feature and its style rule,
//! field labels and popup title; no geometry or schema inspection happens
//! downstream.

use geojson::{FeatureCollection, JsonObject};

/// Property key holding the owning layer's display name.
pub const LAYER_TYPE_KEY: &str = "layer_type";

/// Stamp `layer_type = name` on every feature, creating the property map
/// where a feature has none. Returns the number of features stamped.
pub fn annotate(collection: &mut FeatureCollection, name: &str) -> usize {
    for feature in &mut collection.features {
        feature
            .properties
            .get_or_insert_with(JsonObject::new)
            .insert(LAYER_TYPE_KEY.to_string(), name.into());
    }
    collection.features.len()
}

/// The layer a feature was stamped with, if any.
pub fn layer_type(properties: Option<&JsonObject>) -> Option<&str> {
    properties?.get(LAYER_TYPE_KEY)?.as_str()
}
