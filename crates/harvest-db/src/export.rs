//! Delimited and JSON export of persisted records.
//!
//! Both exports contain every persisted field verbatim, in insertion
//! order.

use crate::businesses;
use crate::error::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Export all rows to a CSV file with a header row.
///
/// Returns the number of exported rows.
pub async fn export_csv(pool: &SqlitePool, path: impl AsRef<Path>) -> Result<usize> {
    let rows = businesses::fetch_all(pool).await?;

    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    tracing::info!(rows = rows.len(), path = %path.as_ref().display(), "exported CSV");
    Ok(rows.len())
}

/// Export all rows to a pretty-printed JSON array.
///
/// Returns the number of exported rows.
pub async fn export_json(pool: &SqlitePool, path: impl AsRef<Path>) -> Result<usize> {
    let rows = businesses::fetch_all(pool).await?;

    let file = std::fs::File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, &rows)?;

    tracing::info!(rows = rows.len(), path = %path.as_ref().display(), "exported JSON");
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{businesses::insert_many, Storage};
    use harvest_core::{PlaceRecord, SourceTag};
    use harvest_engine::CanonicalRecord;
    use std::collections::BTreeSet;

    fn canonical(name: &str, place_id: &str) -> CanonicalRecord {
        CanonicalRecord {
            place: PlaceRecord {
                name: name.to_string(),
                address: "Calle Mayor 1, Madrid".to_string(),
                phone: "+34 600 000 000".to_string(),
                website: String::new(),
                category: "cafe".to_string(),
                rating: 4.0,
                review_count: 3,
                latitude: 40.0,
                longitude: -3.0,
                place_id: place_id.to_string(),
                source: SourceTag::MapSearch,
                hours: serde_json::json!({}),
            },
            sources: BTreeSet::from([SourceTag::MapSearch]),
        }
    }

    #[tokio::test]
    async fn test_export_csv_round_trip() {
        let storage = Storage::in_memory().await.expect("create storage");
        insert_many(
            storage.pool(),
            &[canonical("Cafe Sol", "p1"), canonical("Bar Luna", "p2")],
        )
        .await
        .expect("insert");

        let temp_dir = tempfile::TempDir::new().expect("create temp dir");
        let path = temp_dir.path().join("businesses.csv");

        let exported = export_csv(storage.pool(), &path).await.expect("export CSV");
        assert_eq!(exported, 2);

        let mut reader = csv::Reader::from_path(&path).expect("open CSV");
        let headers = reader.headers().expect("headers").clone();
        assert!(headers.iter().any(|h| h == "place_id"));
        assert!(headers.iter().any(|h| h == "scraped_at"));

        let rows: Vec<csv::StringRecord> =
            reader.records().collect::<std::result::Result<_, _>>().expect("rows");
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_export_json_round_trip() {
        let storage = Storage::in_memory().await.expect("create storage");
        insert_many(storage.pool(), &[canonical("Cafe Sol", "p1")])
            .await
            .expect("insert");

        let temp_dir = tempfile::TempDir::new().expect("create temp dir");
        let path = temp_dir.path().join("businesses.json");

        export_json(storage.pool(), &path).await.expect("export JSON");

        let contents = std::fs::read_to_string(&path).expect("read JSON");
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&contents).expect("parse JSON");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0]["name"], "Cafe Sol");
        assert_eq!(parsed[0]["phone"], "+34 600 000 000");
    }

    #[tokio::test]
    async fn test_export_empty_database() {
        let storage = Storage::in_memory().await.expect("create storage");

        let temp_dir = tempfile::TempDir::new().expect("create temp dir");
        let path = temp_dir.path().join("empty.json");

        let exported = export_json(storage.pool(), &path).await.expect("export");
        assert_eq!(exported, 0);
    }
}
