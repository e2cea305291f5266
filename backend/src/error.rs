//! Error taxonomy of the import pipeline.
//!
//! - `SchemaError`: storage unreachable or an existing schema that does not
//!   match. Fatal at startup.
//! - `SourceError`: one CSV source cannot be read or lacks required columns.
//!   Fatal for that file only.
//! - `ImportError`: why a whole file failed; a storage failure here means the
//!   file's transaction was rolled back.
//!
//! Row level problems are not errors at this level; they are collected in the
//! import report (see `import::report`).

use common::model::EntityKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("storage unreachable: {0}")]
    Unreachable(#[from] rusqlite::Error),

    #[error("table '{table}' is incompatible with the expected schema: {detail}")]
    Incompatible { table: &'static str, detail: String },
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot read source {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("source {} for {entity} is missing required columns: {}", path.display(), missing.join(", "))]
    MissingColumns {
        path: PathBuf,
        entity: EntityKind,
        missing: Vec<String>,
    },
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("storage failure, import of {entity} rolled back: {source}")]
    Storage {
        entity: EntityKind,
        #[source]
        source: rusqlite::Error,
    },
}

impl ImportError {
    pub(crate) fn storage(entity: EntityKind) -> impl FnOnce(rusqlite::Error) -> ImportError {
        move |source| ImportError::Storage { entity, source }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown import mode '{0}', expected insert-or-skip or replace")]
pub struct UnknownImportMode(pub String);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("unknown insight '{0}'")]
    UnknownInsight(String),

    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),
}
