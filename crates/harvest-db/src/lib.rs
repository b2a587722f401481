//! Harvest DB - SQLite storage sink for canonical records.
//!
//! This crate persists the canonical record set with upsert semantics
//! keyed on the place id, and exports the table as CSV or JSON with every
//! field verbatim. It is a write-only collector from the pipeline's point
//! of view; the core never reads records back during a run.
//!
//! # Example
//!
//! ```rust,ignore
//! use harvest_db::{businesses, export, Storage};
//!
//! let storage = Storage::open("data/spain_businesses.db").await?;
//! businesses::insert_many(storage.pool(), &outcome.records).await?;
//! export::export_csv(storage.pool(), "data/spain_businesses.csv").await?;
//! export::export_json(storage.pool(), "data/spain_businesses.json").await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod businesses;
pub mod connection;
pub mod error;
pub mod export;

// Re-export commonly used types
pub use businesses::BusinessRow;
pub use connection::Storage;
pub use error::{Result, StorageError};
pub use export::{export_csv, export_json};
