//! Core types for the logbook importer.
//!
//! Holds the data model, the fatal error taxonomy, pipeline configuration,
//! the column schema, the aircraft type vocabulary and command-line settings.

pub mod aircraft_types;
pub mod config;
pub mod error;
pub mod formatting;
pub mod models;
pub mod schema;
pub mod settings;

pub use error::{ImportError, Result};
