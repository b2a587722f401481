//! Cross-source deduplication and merge.
//!
//! The aggregator owns the dedup map for the whole run; it is the single
//! writer and consumes record batches only between fetch batches. Merging
//! adopts one candidate wholesale per key: the stored record is replaced
//! only when the incoming one is strictly richer, never blended field by
//! field.

use harvest_core::{PlaceRecord, SourceTag};
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};

/// A merged record plus the sources that contributed to it.
///
/// At most one canonical record exists per dedup key per run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRecord {
    /// The winning record, all fields from one side
    pub place: PlaceRecord,
    /// Every source that produced a record under this key
    pub sources: BTreeSet<SourceTag>,
}

/// Incremental dedup/merge over the stream of extracted records.
#[derive(Debug, Default)]
pub struct Aggregator {
    records: HashMap<String, CanonicalRecord>,
    /// First-seen key order, for deterministic output on a fixed input order
    order: Vec<String>,
}

impl Aggregator {
    /// Create an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one record into the canonical set.
    ///
    /// An unseen key inserts the record as-is. A seen key replaces the
    /// stored record only when the incoming one has a strictly longer
    /// address, or a non-empty phone where the stored one has none.
    /// Ties keep the stored record, so arrival order decides them.
    pub fn push(&mut self, record: PlaceRecord) {
        let key = record.dedup_key();

        match self.records.entry(key.clone()) {
            Entry::Vacant(slot) => {
                self.order.push(key);
                slot.insert(CanonicalRecord {
                    sources: BTreeSet::from([record.source]),
                    place: record,
                });
            }
            Entry::Occupied(mut slot) => {
                let current = slot.get_mut();
                current.sources.insert(record.source);

                let richer = record.address.chars().count()
                    > current.place.address.chars().count()
                    || (!record.phone.is_empty() && current.place.phone.is_empty());

                if richer {
                    current.place = record;
                }
            }
        }
    }

    /// Merge a batch of records.
    pub fn extend(&mut self, records: impl IntoIterator<Item = PlaceRecord>) {
        for record in records {
            self.push(record);
        }
    }

    /// Number of canonical records so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been merged yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Finish the run, yielding canonical records in first-seen key order.
    #[must_use]
    pub fn into_records(mut self) -> Vec<CanonicalRecord> {
        self.order
            .iter()
            .filter_map(|key| self.records.remove(key))
            .collect()
    }
}

/// One-pass merge over an already collected record sequence.
#[must_use]
pub fn merge_records(records: impl IntoIterator<Item = PlaceRecord>) -> Vec<CanonicalRecord> {
    let mut aggregator = Aggregator::new();
    aggregator.extend(records);
    aggregator.into_records()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(name: &str, lat: f64, lng: f64, address: &str, phone: &str) -> PlaceRecord {
        PlaceRecord {
            name: name.to_string(),
            address: address.to_string(),
            phone: phone.to_string(),
            website: String::new(),
            category: String::new(),
            rating: 0.0,
            review_count: 0,
            latitude: lat,
            longitude: lng,
            place_id: PlaceRecord::synthesize_place_id(lat, lng),
            source: SourceTag::MapSearch,
            hours: json!({}),
        }
    }

    #[test]
    fn test_distinct_keys_all_kept() {
        let merged = merge_records(vec![
            record("Cafe Sol", 40.0, -3.0, "", ""),
            record("Bar Luna", 41.0, 2.0, "", ""),
        ]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_nearby_same_name_collapses_keeping_longer_address() {
        // Both round to the same key; the record with the address must win
        // regardless of arrival order
        let a = record("Cafe Sol", 40.0001, -3.0001, "Main St", "");
        let b = record("Cafe Sol", 40.0002, -3.0002, "", "");

        let merged = merge_records(vec![a.clone(), b.clone()]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].place.address, "Main St");

        let merged = merge_records(vec![b, a]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].place.address, "Main St");
    }

    #[test]
    fn test_phone_breaks_address_tie() {
        let without_phone = record("Cafe Sol", 40.0, -3.0, "Calle Mayor", "");
        let with_phone = record("Cafe Sol", 40.0, -3.0, "Calle Mayor", "+34 600 000 000");

        let merged = merge_records(vec![without_phone, with_phone]);
        assert_eq!(merged[0].place.phone, "+34 600 000 000");
    }

    #[test]
    fn test_wholesale_replacement_discards_losing_phone() {
        // Source-fidelity choice: replacement is wholesale, never a field
        // blend. The longer-address record wins even though the loser
        // carried a phone number, which is discarded with it.
        let short_with_phone = record("Cafe Sol", 40.0, -3.0, "Main", "+34 600 000 000");
        let long_without_phone = record("Cafe Sol", 40.0, -3.0, "Main Street 12", "");

        let merged = merge_records(vec![short_with_phone, long_without_phone]);
        assert_eq!(merged[0].place.address, "Main Street 12");
        assert_eq!(merged[0].place.phone, "");
    }

    #[test]
    fn test_tie_keeps_first_arrival() {
        let first = record("Cafe Sol", 40.0, -3.0, "Calle A", "600111222");
        let second = record("Cafe Sol", 40.0, -3.0, "Calle B", "600333444");

        // Equal address length, both have phones: neither replacement
        // condition holds, so arrival order decides
        let merged = merge_records(vec![first.clone(), second]);
        assert_eq!(merged[0].place.address, "Calle A");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let records = vec![
            record("Cafe Sol", 40.0001, -3.0001, "Main St", ""),
            record("Cafe Sol", 40.0002, -3.0002, "", "600"),
            record("Bar Luna", 41.0, 2.0, "Plaza 1", ""),
        ];

        let once = merge_records(records);
        let places: Vec<PlaceRecord> = once.iter().map(|c| c.place.clone()).collect();
        let twice = merge_records(places);

        let first: Vec<&PlaceRecord> = once.iter().map(|c| &c.place).collect();
        let second: Vec<&PlaceRecord> = twice.iter().map(|c| &c.place).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_provenance_unions_sources() {
        let mut from_overpass = record("Cafe Sol", 40.0, -3.0, "Calle Mayor 1", "");
        from_overpass.source = SourceTag::Overpass;
        let from_search = record("Cafe Sol", 40.0, -3.0, "", "");

        let merged = merge_records(vec![from_search, from_overpass]);
        assert_eq!(merged.len(), 1);
        assert!(merged[0].sources.contains(&SourceTag::MapSearch));
        assert!(merged[0].sources.contains(&SourceTag::Overpass));
        // Winning side's fields, untouched
        assert_eq!(merged[0].place.address, "Calle Mayor 1");
    }

    #[test]
    fn test_output_order_is_first_seen() {
        let merged = merge_records(vec![
            record("Zeta", 1.0, 1.0, "", ""),
            record("Alpha", 2.0, 2.0, "", ""),
            record("Zeta", 1.0, 1.0, "Longer addr", ""),
        ]);

        let names: Vec<&str> = merged.iter().map(|c| c.place.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn test_incremental_matches_one_pass() {
        let batch_a = vec![
            record("Cafe Sol", 40.0, -3.0, "Main St", ""),
            record("Bar Luna", 41.0, 2.0, "", ""),
        ];
        let batch_b = vec![record("Cafe Sol", 40.0, -3.0, "", "600")];

        let mut incremental = Aggregator::new();
        incremental.extend(batch_a.clone());
        incremental.extend(batch_b.clone());

        let one_pass = merge_records(batch_a.into_iter().chain(batch_b));
        assert_eq!(incremental.into_records(), one_pass);
    }
}
