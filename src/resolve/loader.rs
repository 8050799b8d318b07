//! Converts GeoJSON features into oblast regions and raion records.

use std::fs;
use std::path::Path;

use geo_types::{MultiPolygon, Polygon};
use geojson::{Geometry, JsonObject, JsonValue, PolygonType, Value};
use tracing::{debug, info};

use crate::error::{EnrichError, Result};
use crate::models::{BoundaryCollection, LabeledRegion, RaionRecord};
use crate::resolve::geometry::has_closed_rings;

/// Read a FeatureCollection from disk.
///
/// Only the top-level shape is checked here; a bad feature is reported by
/// the loader with its index.
pub fn read_collection(path: &Path) -> Result<BoundaryCollection> {
    info!("Reading features from {}", path.display());

    let parse_error = |source: Box<dyn std::error::Error + Send + Sync>| EnrichError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let content = fs::read_to_string(path).map_err(|e| EnrichError::io(path, e))?;
    let value: JsonValue = serde_json::from_str(&content).map_err(|e| parse_error(e.into()))?;
    let collection = BoundaryCollection::from_json(value).map_err(|e| parse_error(e.into()))?;

    debug!("Parsed {} features from {}", collection.len(), path.display());
    Ok(collection)
}

/// Properties member of a raw feature, if present and an object.
fn properties(feature: &JsonObject) -> Option<&JsonObject> {
    feature.get("properties")?.as_object()
}

/// Read a label property. Numbers and booleans are stringified; null and
/// nested values count as absent.
fn label_from_property(feature: &JsonObject, key: &str) -> Option<String> {
    match properties(feature)?.get(key)? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Raion name for seed output, if the feature carries one.
pub fn raion_name(feature: &JsonObject, key: &str) -> Option<String> {
    label_from_property(feature, key)
}

/// String value of a property, e.g. the written parent label.
pub fn string_property<'a>(feature: &'a JsonObject, key: &str) -> Option<&'a str> {
    properties(feature)?.get(key)?.as_str()
}

const NOT_AN_OBJECT: &str = "feature is not a JSON object";

fn check_feature_type(index: usize, feature: &JsonObject) -> Result<()> {
    match feature.get("type").and_then(JsonValue::as_str) {
        Some("Feature") => Ok(()),
        _ => Err(EnrichError::malformed(index, "member `type` is not \"Feature\"")),
    }
}

fn as_feature(index: usize, value: &JsonValue) -> Result<&JsonObject> {
    let feature = value
        .as_object()
        .ok_or_else(|| EnrichError::malformed(index, NOT_AN_OBJECT))?;
    check_feature_type(index, feature)?;
    Ok(feature)
}

fn geometry_type(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

/// Extract the (multi)polygon boundary of a raw feature.
///
/// `index` is the feature's position in its collection and only used for
/// error reporting.
pub fn geometry_from_feature(index: usize, feature: &JsonObject) -> Result<MultiPolygon<f64>> {
    let raw = match feature.get("geometry") {
        None | Some(JsonValue::Null) => {
            return Err(EnrichError::malformed(index, "geometry is missing"))
        }
        Some(raw) => raw,
    };

    let geometry = Geometry::from_json_value(raw.clone())
        .map_err(|e| EnrichError::malformed(index, format!("unparsable geometry: {e}")))?;

    let parts: Vec<&PolygonType> = match &geometry.value {
        Value::Polygon(rings) => vec![rings],
        Value::MultiPolygon(parts) => parts.iter().collect(),
        other => {
            return Err(EnrichError::malformed(
                index,
                format!("unsupported geometry type {}", geometry_type(other)),
            ))
        }
    };

    // The geo-types conversion indexes x and y directly
    let short_position = parts
        .iter()
        .any(|rings| rings.iter().any(|ring| ring.iter().any(|p| p.len() < 2)));
    if short_position {
        return Err(EnrichError::malformed(
            index,
            "position with fewer than two ordinates",
        ));
    }

    let converted = if matches!(geometry.value, Value::Polygon(_)) {
        Polygon::<f64>::try_from(geometry.value).map(|p| MultiPolygon::new(vec![p]))
    } else {
        MultiPolygon::<f64>::try_from(geometry.value)
    };
    let multi_polygon = converted.map_err(|e| EnrichError::malformed(index, e.to_string()))?;

    if !has_closed_rings(&multi_polygon) {
        return Err(EnrichError::malformed(
            index,
            "ring with fewer than four positions",
        ));
    }

    Ok(multi_polygon)
}

/// Build the oblast list, labelled by `name_key`, in source order.
pub fn load_oblasts(collection: &BoundaryCollection, name_key: &str) -> Result<Vec<LabeledRegion>> {
    info!("Loading oblast boundaries...");

    let mut regions = Vec::with_capacity(collection.len());

    for (index, value) in collection.features.iter().enumerate() {
        let feature = as_feature(index, value)?;
        let geometry = geometry_from_feature(index, feature)?;
        let name =
            label_from_property(feature, name_key).ok_or_else(|| EnrichError::MissingAttribute {
                index,
                key: name_key.to_string(),
            })?;

        regions.push(LabeledRegion::new(name, geometry));
    }

    info!("Loaded {} oblast boundaries", regions.len());
    Ok(regions)
}

/// Pair each raion feature with its parsed geometry, keeping the feature
/// itself untouched.
pub fn load_raions(features: Vec<JsonValue>) -> Result<Vec<RaionRecord>> {
    info!("Loading raion boundaries...");

    let records = features
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let JsonValue::Object(feature) = value else {
                return Err(EnrichError::malformed(index, NOT_AN_OBJECT));
            };
            check_feature_type(index, &feature)?;
            let geometry = geometry_from_feature(index, &feature)?;
            Ok(RaionRecord { geometry, feature })
        })
        .collect::<Result<Vec<_>>>()?;

    info!("Loaded {} raion boundaries", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;
    use geo_types::Coord;
    use serde_json::json;
    use std::io::Write;

    fn collection(value: JsonValue) -> BoundaryCollection {
        BoundaryCollection::from_json(value).unwrap()
    }

    fn square_coords(min: f64, max: f64) -> JsonValue {
        json!([[[min, min], [max, min], [max, max], [min, max], [min, min]]])
    }

    fn feature_with_geometry(geometry: JsonValue) -> JsonObject {
        json!({"type": "Feature", "properties": {}, "geometry": geometry})
            .as_object()
            .cloned()
            .unwrap()
    }

    fn malformed_reason(result: Result<MultiPolygon<f64>>) -> String {
        match result {
            Err(EnrichError::MalformedRecord { reason, .. }) => reason,
            other => panic!("expected MalformedRecord, got {:?}", other.map(|g| g.0.len())),
        }
    }

    #[test]
    fn test_load_oblasts_polygon_and_multipolygon() {
        let fc = collection(json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"NAME_1": "Kyivs'ka"},
                    "geometry": {"type": "Polygon", "coordinates": square_coords(0.0, 10.0)}
                },
                {
                    "type": "Feature",
                    "properties": {"NAME_1": "Odes'ka"},
                    "geometry": {
                        "type": "MultiPolygon",
                        "coordinates": [square_coords(20.0, 21.0), square_coords(30.0, 32.0)]
                    }
                }
            ]
        }));

        let regions = load_oblasts(&fc, "NAME_1").unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].name, "Kyivs'ka");
        assert_eq!(regions[1].name, "Odes'ka");
        assert_eq!(regions[1].geometry.0.len(), 2);
        assert!((regions[1].geometry.unsigned_area() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_numeric_label_is_stringified() {
        let fc = collection(json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"ID_1": 7},
                "geometry": {"type": "Polygon", "coordinates": square_coords(0.0, 1.0)}
            }]
        }));
        let regions = load_oblasts(&fc, "ID_1").unwrap();
        assert_eq!(regions[0].name, "7");
    }

    #[test]
    fn test_missing_name_key() {
        let fc = collection(json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"NAME_2": "Bucha"},
                "geometry": {"type": "Polygon", "coordinates": square_coords(0.0, 1.0)}
            }]
        }));
        let err = load_oblasts(&fc, "NAME_1").unwrap_err();
        assert!(matches!(
            err,
            EnrichError::MissingAttribute { index: 0, ref key } if key == "NAME_1"
        ));
    }

    #[test]
    fn test_null_name_is_missing() {
        let fc = collection(json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"NAME_1": null},
                "geometry": {"type": "Polygon", "coordinates": square_coords(0.0, 1.0)}
            }]
        }));
        assert!(matches!(
            load_oblasts(&fc, "NAME_1"),
            Err(EnrichError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn test_missing_geometry() {
        let fc = collection(json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"rayon": "A"},
                    "geometry": {"type": "Polygon", "coordinates": square_coords(0.0, 1.0)}
                },
                {"type": "Feature", "properties": {"rayon": "B"}, "geometry": null},
                {"type": "Feature", "properties": {"rayon": "C"}}
            ]
        }));
        let err = load_raions(fc.features.clone()).unwrap_err();
        assert!(matches!(err, EnrichError::MalformedRecord { index: 1, .. }));

        let err = load_raions(fc.features[2..].to_vec()).unwrap_err();
        assert!(matches!(err, EnrichError::MalformedRecord { index: 0, .. }));
    }

    #[test]
    fn test_garbage_coordinates_are_malformed_not_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "{}",
            json!({
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "properties": {"NAME_1": "A"},
                        "geometry": {"type": "Polygon", "coordinates": square_coords(0.0, 1.0)}
                    },
                    {
                        "type": "Feature",
                        "properties": {"NAME_1": "B"},
                        "geometry": {"type": "Polygon", "coordinates": "garbage"}
                    }
                ]
            })
        )
        .unwrap();

        let fc = read_collection(file.path()).unwrap();
        assert!(matches!(
            load_oblasts(&fc, "NAME_1"),
            Err(EnrichError::MalformedRecord { index: 1, .. })
        ));
    }

    #[test]
    fn test_non_feature_entries_are_malformed() {
        let fc = collection(json!({
            "type": "FeatureCollection",
            "features": [42, {"type": "Point", "coordinates": [0.0, 0.0]}]
        }));
        assert!(matches!(
            load_raions(fc.features.clone()),
            Err(EnrichError::MalformedRecord { index: 0, .. })
        ));
        assert!(matches!(
            load_raions(fc.features[1..].to_vec()),
            Err(EnrichError::MalformedRecord { index: 0, .. })
        ));
    }

    #[test]
    fn test_unsupported_geometry_type() {
        let feature = feature_with_geometry(json!({"type": "Point", "coordinates": [1.0, 2.0]}));
        assert!(malformed_reason(geometry_from_feature(0, &feature)).contains("Point"));
    }

    #[test]
    fn test_ring_is_closed_and_elevation_dropped() {
        let feature = feature_with_geometry(json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0, 120.0], [1.0, 0.0, 121.0], [1.0, 1.0, 119.5], [0.0, 1.0, 120.0]]]
        }));
        let geometry = geometry_from_feature(0, &feature).unwrap();
        let exterior = geometry.0[0].exterior();
        assert_eq!(exterior.0.len(), 5);
        assert_eq!(exterior.0.first(), exterior.0.last());
        assert_eq!(exterior.0[1], Coord { x: 1.0, y: 0.0 });
    }

    #[test]
    fn test_polygon_with_hole() {
        let feature = feature_with_geometry(json!({
            "type": "Polygon",
            "coordinates": [
                [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]],
                [[4.0, 4.0], [6.0, 4.0], [6.0, 6.0], [4.0, 6.0], [4.0, 4.0]]
            ]
        }));
        let geometry = geometry_from_feature(0, &feature).unwrap();
        assert_eq!(geometry.0[0].interiors().len(), 1);
        assert!((geometry.unsigned_area() - 96.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_ring_is_malformed() {
        let too_short = feature_with_geometry(json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 1.0]]]
        }));
        assert!(malformed_reason(geometry_from_feature(0, &too_short)).contains("four"));

        let closed_triangle_missing_vertex = feature_with_geometry(json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]]]
        }));
        assert!(geometry_from_feature(0, &closed_triangle_missing_vertex).is_err());
    }

    #[test]
    fn test_short_position_is_malformed() {
        let feature = feature_with_geometry(json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0], [1.0, 1.0], [0.0, 0.0]]]
        }));
        assert!(!malformed_reason(geometry_from_feature(0, &feature)).is_empty());
    }

    #[test]
    fn test_load_raions_keeps_feature_verbatim() {
        let raw = json!({
            "type": "Feature",
            "id": "UKR.1.2_1",
            "properties": {"rayon": "Bilhorod-Dnistrovskyi", "ID_2": 12},
            "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}
        });
        let records = load_raions(vec![raw.clone()]).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            raion_name(&records[0].feature, "rayon").as_deref(),
            Some("Bilhorod-Dnistrovskyi")
        );
        assert_eq!(records[0].clone().into_feature(), raw);
    }

    #[test]
    fn test_string_property() {
        let feature = json!({"type": "Feature", "properties": {"parent_oblast": "Rivne", "n": 1}});
        let feature = feature.as_object().unwrap();
        assert_eq!(string_property(feature, "parent_oblast"), Some("Rivne"));
        assert_eq!(string_property(feature, "n"), None);
        assert_eq!(string_property(feature, "absent"), None);
    }

    #[test]
    fn test_read_collection_rejects_non_collection() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"type": "Feature", "properties": {{}}, "geometry": null}}"#).unwrap();
        let err = read_collection(file.path()).unwrap_err();
        assert!(matches!(err, EnrichError::Parse { .. }));
        assert!(err.to_string().starts_with("failed to parse "));
    }

    #[test]
    fn test_read_collection_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"type\": \"FeatureCollection\", ").unwrap();
        assert!(matches!(
            read_collection(file.path()),
            Err(EnrichError::Parse { .. })
        ));
    }

    #[test]
    fn test_read_collection_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_collection(&dir.path().join("absent.json")),
            Err(EnrichError::Io { .. })
        ));
    }
}
