//! Business record persistence with upsert semantics.

use chrono::Utc;
use harvest_engine::CanonicalRecord;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Rows are written in chunks of this size, each inside one transaction.
const INSERT_CHUNK_SIZE: usize = 100;

/// One persisted business row, shaped exactly like the table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BusinessRow {
    /// Auto-increment row id
    pub id: i64,
    /// Business name
    pub name: String,
    /// Phone number, possibly empty
    pub phone: String,
    /// Address line, possibly empty
    pub address: String,
    /// Website URL, possibly empty
    pub website: String,
    /// Aggregate rating
    pub rating: f64,
    /// Review count
    pub reviews_count: i64,
    /// Business category
    pub category: String,
    /// Opening hours as a JSON string
    pub hours: String,
    /// Latitude
    pub latitude: f64,
    /// Longitude
    pub longitude: f64,
    /// Source-scoped place identifier, unique per row
    pub place_id: String,
    /// Comma-separated provenance tags
    pub sources: String,
    /// ISO timestamp of when the record was harvested
    pub scraped_at: String,
}

/// Insert canonical records in chunks, replacing on place id conflicts.
///
/// Returns the number of rows written.
///
/// # Errors
/// Returns an error when a chunk's transaction fails; earlier chunks stay
/// committed.
pub async fn insert_many(pool: &SqlitePool, records: &[CanonicalRecord]) -> crate::Result<usize> {
    if records.is_empty() {
        return Ok(0);
    }

    let scraped_at = Utc::now().to_rfc3339();
    let mut inserted = 0;

    for chunk in records.chunks(INSERT_CHUNK_SIZE) {
        let mut tx = pool.begin().await?;

        for record in chunk {
            let place = &record.place;
            let sources = record
                .sources
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(",");

            sqlx::query(
                "INSERT INTO businesses
                 (name, phone, address, website, rating, reviews_count, category,
                  hours, latitude, longitude, place_id, sources, scraped_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(place_id) DO UPDATE SET
                    name = excluded.name,
                    phone = excluded.phone,
                    address = excluded.address,
                    website = excluded.website,
                    rating = excluded.rating,
                    reviews_count = excluded.reviews_count,
                    category = excluded.category,
                    hours = excluded.hours,
                    latitude = excluded.latitude,
                    longitude = excluded.longitude,
                    sources = excluded.sources,
                    scraped_at = excluded.scraped_at",
            )
            .bind(&place.name)
            .bind(&place.phone)
            .bind(&place.address)
            .bind(&place.website)
            .bind(place.rating)
            .bind(i64::from(place.review_count))
            .bind(&place.category)
            .bind(place.hours.to_string())
            .bind(place.latitude)
            .bind(place.longitude)
            .bind(&place.place_id)
            .bind(&sources)
            .bind(&scraped_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        inserted += chunk.len();
    }

    tracing::info!(rows = inserted, "persisted business records");
    Ok(inserted)
}

/// Total number of persisted businesses.
pub async fn count(pool: &SqlitePool) -> crate::Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM businesses")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// All rows, ordered by insertion id.
pub async fn fetch_all(pool: &SqlitePool) -> crate::Result<Vec<BusinessRow>> {
    let rows = sqlx::query_as::<_, BusinessRow>("SELECT * FROM businesses ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Top categories by record count, most frequent first.
pub async fn top_categories(pool: &SqlitePool, limit: i64) -> crate::Result<Vec<(String, i64)>> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        "SELECT category, COUNT(*) as count
         FROM businesses
         WHERE category != ''
         GROUP BY category
         ORDER BY count DESC
         LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
