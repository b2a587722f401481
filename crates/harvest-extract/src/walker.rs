//! Bounded-depth recursive extraction over untyped payloads.
//!
//! Listing payloads nest place objects at unpredictable depths inside
//! arbitrary maps and arrays. The walker visits every node down to a fixed
//! depth bound, testing each map node for the minimal shape of a place
//! (a name plus a coordinate pair) and pulling the remaining fields
//! through short fallback-key lists. Children of a matching node are still
//! visited; duplicates are removed by the post-pass, not prevented here.

use harvest_core::{PlaceRecord, SourceTag};
use serde_json::{Map, Value};

/// Maximum traversal depth. Nodes deeper than this are not visited.
const MAX_DEPTH: usize = 15;

/// Keys tried, in order, for each extracted field.
const NAME_KEYS: [&str; 2] = ["title", "name"];
const LAT_KEYS: [&str; 2] = ["lat", "latitude"];
const LNG_KEYS: [&str; 2] = ["lng", "longitude"];

/// Walk an untyped payload and collect every node that looks like a place.
///
/// `center` supplies the sector midpoint used when a node's coordinates
/// cannot be read as numbers.
#[must_use]
pub fn walk_places(payload: &Value, center: (f64, f64)) -> Vec<PlaceRecord> {
    let mut places = Vec::new();
    visit(payload, 0, center, &mut places);
    places
}

fn visit(value: &Value, depth: usize, center: (f64, f64), places: &mut Vec<PlaceRecord>) {
    if depth > MAX_DEPTH {
        return;
    }

    match value {
        Value::Object(map) => {
            if let Some(record) = match_place(map, center) {
                places.push(record);
            }
            for child in map.values() {
                visit(child, depth + 1, center, places);
            }
        }
        Value::Array(items) => {
            for item in items {
                visit(item, depth + 1, center, places);
            }
        }
        _ => {}
    }
}

/// Test whether a map node is a place and build the record if so.
///
/// A node matches when it carries a non-empty name and a present, non-null,
/// non-zero value under both coordinate key lists.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn match_place(map: &Map<String, Value>, center: (f64, f64)) -> Option<PlaceRecord> {
    let name = first_string(map, &NAME_KEYS)?;

    let lat_raw = first_present(map, &LAT_KEYS)?;
    let lng_raw = first_present(map, &LNG_KEYS)?;

    let latitude = coerce_f64(lat_raw).unwrap_or(center.0);
    let longitude = coerce_f64(lng_raw).unwrap_or(center.1);

    let place_id = match map.get("placeId").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => PlaceRecord::synthesize_place_id(latitude, longitude),
    };

    Some(PlaceRecord {
        name,
        address: string_or_empty(map, "address"),
        phone: string_or_empty(map, "phone"),
        website: string_or_empty(map, "website"),
        category: string_or_empty(map, "category"),
        rating: map.get("rating").and_then(coerce_f64).unwrap_or(0.0),
        review_count: map
            .get("reviews")
            .and_then(coerce_f64)
            .map_or(0, |n| if n < 0.0 { 0 } else { n as u32 }),
        latitude,
        longitude,
        place_id,
        source: SourceTag::MapSearch,
        hours: map.get("hours").cloned().unwrap_or_else(|| Value::Object(Map::new())),
    })
}

/// First non-empty string value under the given keys.
fn first_string(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| map.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// First value under the given keys that is present and truthy
/// (not null, false, zero or an empty string).
fn first_present<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|k| map.get(*k)).find(|v| match v {
        Value::Null | Value::Bool(false) => false,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        _ => true,
    })
}

/// Read a number from a JSON number or a numeric string.
fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn string_or_empty(map: &Map<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CENTER: (f64, f64) = (40.0, -3.0);

    #[test]
    fn test_extracts_place_from_flat_object() {
        let payload = json!({
            "title": "Cafe Sol",
            "lat": 40.42,
            "lng": -3.7,
            "address": "Calle Mayor 1",
            "phone": "+34 600 000 000",
            "rating": 4.5,
            "reviews": 120,
            "category": "cafe",
            "placeId": "abc123"
        });

        let places = walk_places(&payload, CENTER);
        assert_eq!(places.len(), 1);

        let place = &places[0];
        assert_eq!(place.name, "Cafe Sol");
        assert_eq!(place.place_id, "abc123");
        assert!((place.rating - 4.5).abs() < f64::EPSILON);
        assert_eq!(place.review_count, 120);
        assert_eq!(place.source, SourceTag::MapSearch);
    }

    #[test]
    fn test_extracts_deeply_nested_place() {
        let payload = json!({
            "a": {"b": [{"c": {"name": "Bar Luna", "latitude": 41.0, "longitude": 2.0}}]}
        });

        let places = walk_places(&payload, CENTER);
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "Bar Luna");
        // No placeId in the payload: synthesized from coordinates
        assert_eq!(places[0].place_id, "lat41lng2");
    }

    #[test]
    fn test_missing_coordinates_is_not_a_place() {
        let payload = json!({"title": "No Location"});
        assert!(walk_places(&payload, CENTER).is_empty());

        let payload = json!({"title": "Half Location", "lat": 40.0});
        assert!(walk_places(&payload, CENTER).is_empty());
    }

    #[test]
    fn test_empty_name_is_not_a_place() {
        let payload = json!({"title": "", "lat": 40.0, "lng": -3.0});
        assert!(walk_places(&payload, CENTER).is_empty());
    }

    #[test]
    fn test_unparseable_coordinates_fall_back_to_center() {
        let payload = json!({"name": "Fuzzy Spot", "lat": "not-a-number", "lng": "-3.5"});

        let places = walk_places(&payload, CENTER);
        assert_eq!(places.len(), 1);
        assert!((places[0].latitude - CENTER.0).abs() < f64::EPSILON);
        assert!((places[0].longitude + 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_numeric_string_coordinates() {
        let payload = json!({"title": "String Coords", "lat": "40.5", "lng": "-3.25"});

        let places = walk_places(&payload, CENTER);
        assert_eq!(places.len(), 1);
        assert!((places[0].latitude - 40.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_children_of_match_still_visited() {
        // A matching node whose child also matches must yield both records
        let payload = json!({
            "title": "Parent Place",
            "lat": 40.0,
            "lng": -3.0,
            "nested": {"title": "Child Place", "lat": 41.0, "lng": -4.0}
        });

        let places = walk_places(&payload, CENTER);
        let names: Vec<_> = places.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Parent Place", "Child Place"]);
    }

    #[test]
    fn test_depth_bound_terminates() {
        // Build a payload nested 20 levels deep with a place at the bottom
        let mut payload = json!({"title": "Too Deep", "lat": 40.0, "lng": -3.0});
        for _ in 0..20 {
            payload = json!({"wrap": payload});
        }

        // Must terminate without overflow, and not reach the deep node
        let places = walk_places(&payload, CENTER);
        assert!(places.is_empty());
    }

    #[test]
    fn test_place_within_depth_bound_found() {
        let mut payload = json!({"title": "Reachable", "lat": 40.0, "lng": -3.0});
        for _ in 0..10 {
            payload = json!({"wrap": payload});
        }

        let places = walk_places(&payload, CENTER);
        assert_eq!(places.len(), 1);
    }

    #[test]
    fn test_defaults_for_absent_fields() {
        let payload = json!({"title": "Bare Minimum", "lat": 40.0, "lng": -3.0});

        let places = walk_places(&payload, CENTER);
        let place = &places[0];
        assert_eq!(place.address, "");
        assert_eq!(place.phone, "");
        assert_eq!(place.website, "");
        assert_eq!(place.category, "");
        assert!(place.rating.abs() < f64::EPSILON);
        assert_eq!(place.review_count, 0);
        assert_eq!(place.hours, json!({}));
    }
}
