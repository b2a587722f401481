//! Structured parsing of Overpass API responses.
//!
//! Overpass returns a well-defined schema: a top-level `elements` array of
//! tagged nodes and ways, each carrying a `tags` attribute map. Unlike the
//! embedded-payload walker, this parser iterates the known structure
//! directly.

use crate::error::{ExtractError, Result};
use harvest_core::{PlaceRecord, SourceTag};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Parse an Overpass response into place records.
///
/// Elements with an empty name, or repeating a name already seen in the
/// same payload, are skipped (first seen wins). Way elements carry no
/// node coordinates; those fall back to the sector center.
///
/// # Errors
/// Returns [`ExtractError::UnexpectedShape`] when the document has no
/// `elements` array; an empty array is a legitimate zero-result response.
pub fn parse_elements(payload: &Value, center: (f64, f64)) -> Result<Vec<PlaceRecord>> {
    let elements = payload
        .get("elements")
        .and_then(Value::as_array)
        .ok_or_else(|| ExtractError::UnexpectedShape {
            reason: "missing top-level 'elements' array".to_string(),
        })?;

    let mut records = Vec::new();
    let mut seen_names: HashSet<String> = HashSet::new();

    for element in elements {
        let Some(tags) = element.get("tags").and_then(Value::as_object) else {
            continue;
        };

        let name = tags
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim();
        if name.is_empty() || !seen_names.insert(name.to_string()) {
            continue;
        }

        let latitude = element.get("lat").and_then(Value::as_f64).unwrap_or(center.0);
        let longitude = element.get("lon").and_then(Value::as_f64).unwrap_or(center.1);

        let place_id = match element.get("id") {
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => PlaceRecord::synthesize_place_id(latitude, longitude),
        };

        records.push(PlaceRecord {
            name: name.to_string(),
            address: build_address(tags),
            phone: tag_string(tags, "phone"),
            website: tag_string(tags, "website"),
            category: category(tags),
            rating: 0.0,
            review_count: 0,
            latitude,
            longitude,
            place_id,
            source: SourceTag::Overpass,
            hours: Value::Object(Map::new()),
        });
    }

    Ok(records)
}

/// Join street (with house number) and city into one address line.
fn build_address(tags: &Map<String, Value>) -> String {
    let mut parts = Vec::new();

    if let Some(street) = tags.get("addr:street").and_then(Value::as_str) {
        let mut line = street.to_string();
        if let Some(number) = tags.get("addr:housenumber").and_then(Value::as_str) {
            line.push(' ');
            line.push_str(number);
        }
        parts.push(line);
    }
    if let Some(city) = tags.get("addr:city").and_then(Value::as_str) {
        parts.push(city.to_string());
    }

    parts.join(", ")
}

/// Category from the first present of the known classification tags.
fn category(tags: &Map<String, Value>) -> String {
    tags.get("amenity")
        .or_else(|| tags.get("shop"))
        .and_then(Value::as_str)
        .unwrap_or("business")
        .to_string()
}

fn tag_string(tags: &Map<String, Value>, key: &str) -> String {
    tags.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
