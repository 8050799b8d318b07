//! Oblast and raion types shared by the loader, resolver and pipeline.

use geo_types::MultiPolygon;
use geojson::{JsonObject, JsonValue};

/// A named first-level region (oblast) with its boundary.
#[derive(Debug, Clone)]
pub struct LabeledRegion<G = MultiPolygon<f64>> {
    pub name: String,
    pub geometry: G,
}

impl<G> LabeledRegion<G> {
    pub fn new(name: impl Into<String>, geometry: G) -> Self {
        Self {
            name: name.into(),
            geometry,
        }
    }
}

/// A second-level region (raion) awaiting its parent.
///
/// The feature is kept as raw JSON so every member survives the round trip;
/// only the parent attribute is ever written.
#[derive(Debug, Clone)]
pub struct RaionRecord {
    pub geometry: MultiPolygon<f64>,
    pub feature: JsonObject,
}

impl RaionRecord {
    /// Add or overwrite the parent attribute, creating `properties` if it is
    /// absent or null.
    pub fn set_parent(&mut self, key: &str, parent: &str) {
        let properties = self
            .feature
            .entry("properties")
            .or_insert(JsonValue::Null);
        if !properties.is_object() {
            *properties = JsonValue::Object(JsonObject::new());
        }
        if let JsonValue::Object(properties) = properties {
            properties.insert(key.to_string(), JsonValue::String(parent.to_string()));
        }
    }

    pub fn into_feature(self) -> JsonValue {
        JsonValue::Object(self.feature)
    }
}
