//! FeatureCollection documents kept as raw JSON.
//!
//! Features stay untyped until the loader asks for their geometry, so every
//! member the pipeline does not touch (coordinates included) is written back
//! exactly as it was read.

use geojson::{JsonObject, JsonValue};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::Result;

const FEATURES: &str = "features";

/// A `{"type": "FeatureCollection", "features": [...]}` document.
#[derive(Debug, Clone)]
pub struct BoundaryCollection {
    /// Top-level members in source order; `features` holds a placeholder
    members: JsonObject,
    pub features: Vec<JsonValue>,
}

impl BoundaryCollection {
    /// Check the top-level shape and split off the features.
    ///
    /// Individual features are not inspected here; the loader reports
    /// problems with them against their index.
    pub fn from_json(value: JsonValue) -> Result<Self, String> {
        let JsonValue::Object(mut members) = value else {
            return Err("top level is not a JSON object".to_string());
        };

        match members.get("type").and_then(JsonValue::as_str) {
            Some("FeatureCollection") => {}
            Some(other) => return Err(format!("expected type FeatureCollection, found {other}")),
            None => return Err("missing `type` member".to_string()),
        }

        // insert keeps the key's position, remove would not
        let features = match members.insert(FEATURES.to_string(), JsonValue::Array(Vec::new())) {
            Some(JsonValue::Array(features)) => features,
            _ => return Err("`features` is not an array".to_string()),
        };

        Ok(Self { members, features })
    }

    /// Same members, different features.
    pub fn with_features(self, features: Vec<JsonValue>) -> Self {
        Self {
            members: self.members,
            features,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl Serialize for BoundaryCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.members.len()))?;
        for (key, value) in &self.members {
            if key == FEATURES {
                map.serialize_entry(key, &self.features)?;
            } else {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}
