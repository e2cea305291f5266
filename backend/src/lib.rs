//! Food wastage data pipeline.
//!
//! Loads four CSV tables (providers, receivers, food listings, claims) into a
//! local SQLite database:
//!
//! 1. `storage` opens the database and materialises the schema.
//! 2. `validation` turns each raw CSV row into a typed record or a
//!    field-level error.
//! 3. `import` drives one file per table through validation into storage,
//!    in dependency order, and reports what was accepted, skipped and
//!    rejected.
//!
//! `maintenance` and `reports` work on the loaded data; `services` exposes the
//! whole thing over HTTP.

pub mod config;
pub mod error;
pub mod import;
pub mod job_controller;
pub mod maintenance;
pub mod reports;
pub mod services;
pub mod storage;
pub mod validation;

pub use error::{ImportError, SchemaError, SourceError};
pub use import::{import_all, import_file, ImportMode, ImportReport, ImportSources};
pub use storage::Storage;
pub use validation::{validate, KnownIdentifiers, RawRow, Record, ValidationError};
