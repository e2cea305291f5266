use crate::validation::ValidationError;
use common::model::EntityKind;
use serde::Serialize;
use thiserror::Error;

/// Outcome of importing one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub entity: EntityKind,
    /// Rows written by this run.
    pub accepted_count: usize,
    /// Valid rows whose identifier was already stored.
    pub skipped_count: usize,
    pub rejected_rows: Vec<RejectedRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    /// 1-based, counting data rows after the header.
    pub row_number: usize,
    pub reason: RowRejection,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum RowRejection {
    #[error("{0}")]
    Invalid(ValidationError),
    /// The CSV reader could not decode the record.
    #[error("malformed record: {0}")]
    Malformed(String),
    /// Storage refused the row (constraint violation).
    #[error("write rejected: {0}")]
    WriteRejected(String),
}

impl ImportReport {
    pub fn new(entity: EntityKind) -> Self {
        Self {
            entity,
            accepted_count: 0,
            skipped_count: 0,
            rejected_rows: Vec::new(),
        }
    }

    pub(crate) fn reject(&mut self, row_number: usize, reason: RowRejection) {
        log::warn!("{} row {row_number} rejected: {reason}", self.entity);
        self.rejected_rows.push(RejectedRow { row_number, reason });
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected_rows.len()
    }

    /// Row numbers of rejected rows, in file order.
    pub fn rejected_row_numbers(&self) -> Vec<usize> {
        self.rejected_rows.iter().map(|r| r.row_number).collect()
    }
}
