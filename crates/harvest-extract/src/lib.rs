//! Harvest Extract - Typed records out of heterogeneous payloads.
//!
//! This crate turns raw source responses into [`PlaceRecord`]s using two
//! strategies, chosen by source shape:
//!
//! - **Embedded payloads** (map-search sources): recover JSON documents
//!   from script envelopes in the HTML body, then run a bounded-depth
//!   recursive walk that tests every node for the minimal shape of a place.
//! - **Structured payloads** (Overpass): iterate the documented schema
//!   directly.
//!
//! Both paths finish with a per-payload identity dedup: records repeating
//! a place id within one payload are dropped, first occurrence kept.
//!
//! Malformed input never panics; failures come back as [`ExtractError`]
//! values that distinguish "no envelope" from "invalid JSON" from
//! "unexpected shape", so callers can count shape breakage separately from
//! ordinary sparse coverage.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod envelope;
pub mod error;
pub mod overpass;
pub mod walker;

pub use error::{ExtractError, Result};

use harvest_core::PlaceRecord;
use std::collections::HashSet;

/// Extract place records from a map-search response body.
///
/// Recovers every embedded payload envelope, walks each recursively, and
/// drops within-payload identity duplicates.
pub fn extract_embedded(body: &str, center: (f64, f64)) -> Result<Vec<PlaceRecord>> {
    let payloads = envelope::recover_payloads(body)?;

    let mut records = Vec::new();
    for payload in &payloads {
        records.extend(walker::walk_places(payload, center));
    }

    tracing::debug!(
        envelopes = payloads.len(),
        records = records.len(),
        "extracted embedded payloads"
    );

    Ok(dedup_by_place_id(records))
}

/// Extract place records from an Overpass response body.
pub fn extract_overpass(body: &str, center: (f64, f64)) -> Result<Vec<PlaceRecord>> {
    let payload: serde_json::Value = serde_json::from_str(body)?;
    let records = overpass::parse_elements(&payload, center)?;
    Ok(dedup_by_place_id(records))
}

/// Drop records whose place id repeats, keeping the first occurrence.
#[must_use]
pub fn dedup_by_place_id(records: Vec<PlaceRecord>) -> Vec<PlaceRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.place_id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_core::SourceTag;
    use serde_json::json;

    const CENTER: (f64, f64) = (40.0, -3.0);

    fn record(name: &str, place_id: &str) -> PlaceRecord {
        PlaceRecord {
            name: name.to_string(),
            address: String::new(),
            phone: String::new(),
            website: String::new(),
            category: String::new(),
            rating: 0.0,
            review_count: 0,
            latitude: 40.0,
            longitude: -3.0,
            place_id: place_id.to_string(),
            source: SourceTag::MapSearch,
            hours: json!({}),
        }
    }

    #[test]
    fn test_dedup_by_place_id_keeps_first() {
        let records = vec![
            record("First", "p1"),
            record("Second", "p2"),
            record("First Again", "p1"),
        ];

        let deduped = dedup_by_place_id(records);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].name, "First");
        assert_eq!(deduped[1].name, "Second");
    }

    #[test]
    fn test_extract_embedded_end_to_end() {
        let body = r#"<script>window.__INITIAL_STATE__ = {
            "results": [
                {"title": "Cafe Sol", "lat": 40.42, "lng": -3.7, "placeId": "a"},
                {"title": "Cafe Sol Copy", "lat": 40.42, "lng": -3.7, "placeId": "a"},
                {"title": "Bar Luna", "lat": 40.43, "lng": -3.71, "placeId": "b"}
            ]
        };</script>"#;

        let records = extract_embedded(body, CENTER).expect("extract embedded");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Cafe Sol");
        assert_eq!(records[1].name, "Bar Luna");
    }

    #[test]
    fn test_extract_embedded_no_envelope() {
        let result = extract_embedded("<html>plain page</html>", CENTER);
        assert!(matches!(result, Err(ExtractError::NoEnvelope)));
    }

    #[test]
    fn test_extract_overpass_end_to_end() {
        let body = r#"{"elements": [
            {"id": 7, "lat": 40.1, "lon": -3.2, "tags": {"name": "Libreria Centro", "shop": "books"}}
        ]}"#;

        let records = extract_overpass(body, CENTER).expect("extract overpass");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source, SourceTag::Overpass);
    }

    #[test]
    fn test_extract_overpass_invalid_json() {
        let result = extract_overpass("not json at all", CENTER);
        assert!(matches!(result, Err(ExtractError::InvalidJson(_))));
    }
}
