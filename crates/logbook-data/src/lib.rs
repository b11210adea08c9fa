//! Ingestion pipeline for logbook exports.
//!
//! Normalises exported CSV text into raw rows, validates each row into a
//! flight entry, orders and aggregates the entries, and bundles everything
//! into one import result.

pub mod aggregator;
pub mod import;
pub mod normalizer;
pub mod rules;

pub use import::{import_logbook, import_logbook_file, ImportOptions};
pub use logbook_core as core;
