//! CSV import: reads one source per entity kind, validates every row and
//! writes the accepted ones with insert-or-skip semantics.
//!
//! One file is one transaction. Row level failures (validation, constraint
//! violations, undecodable records) are collected in the `ImportReport` and
//! the import carries on. Any other storage failure rolls the whole file back.

mod report;
mod source;

pub use report::{ImportReport, RejectedRow, RowRejection};

use crate::error::{ImportError, SourceError, UnknownImportMode};
use crate::storage::{insert_record, load_known_identifiers, Storage};
use crate::validation::validate;
use common::model::EntityKind;
use serde::{Deserialize, Serialize};
use source::CsvSource;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Rows between two progress notifications.
const PROGRESS_EVERY: usize = 500;

/// What happens to rows already in storage when a run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportMode {
    /// Existing identifiers are left untouched, new ones are added.
    #[default]
    InsertOrSkip,
    /// All four tables are emptied before importing.
    Replace,
}

impl FromStr for ImportMode {
    type Err = UnknownImportMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "insert-or-skip" | "skip" => Ok(ImportMode::InsertOrSkip),
            "replace" => Ok(ImportMode::Replace),
            _ => Err(UnknownImportMode(s.to_string())),
        }
    }
}

/// Imports one CSV file into the table of `kind`.
///
/// Referenced tables must already be loaded; rows pointing at identifiers that
/// do not exist yet are rejected, not deferred.
pub fn import_file(
    storage: &mut Storage,
    kind: EntityKind,
    path: impl AsRef<Path>,
) -> Result<ImportReport, ImportError> {
    import_file_with_progress(storage, kind, path, &mut |_| {})
}

/// Like `import_file`, calling `progress` with the number of rows handled so
/// far every few hundred rows.
pub fn import_file_with_progress(
    storage: &mut Storage,
    kind: EntityKind,
    path: impl AsRef<Path>,
    progress: &mut dyn FnMut(usize),
) -> Result<ImportReport, ImportError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| SourceError::Unreadable {
        path: path.to_path_buf(),
        source: csv::Error::from(e),
    })?;
    run_import(storage, kind, file, path, progress)
}

/// Imports CSV from any reader. `origin` only labels errors and logs.
pub fn import_reader<R: Read>(
    storage: &mut Storage,
    kind: EntityKind,
    input: R,
    origin: &Path,
) -> Result<ImportReport, ImportError> {
    run_import(storage, kind, input, origin, &mut |_| {})
}

fn run_import<R: Read>(
    storage: &mut Storage,
    kind: EntityKind,
    input: R,
    origin: &Path,
    progress: &mut dyn FnMut(usize),
) -> Result<ImportReport, ImportError> {
    log::info!("importing {kind} from {}", origin.display());
    let mut source = CsvSource::new(kind, input, origin)?;

    // Dropping `tx` on any early return rolls the file back.
    let tx = storage.transaction().map_err(ImportError::storage(kind))?;
    // Only this table and the ones it points at matter for its rows.
    let tables = std::iter::once(kind).chain(kind.references().iter().copied());
    let mut known = load_known_identifiers(&tx, tables).map_err(ImportError::storage(kind))?;
    for referenced in kind.references() {
        if known.is_empty(*referenced) {
            log::warn!("{kind}: {referenced} is empty, rows referencing it will be rejected");
        }
    }
    let mut report = ImportReport::new(kind);
    let mut row_number = 0;

    while let Some(next) = source.next_row()? {
        row_number += 1;
        if row_number % PROGRESS_EVERY == 0 {
            progress(row_number);
        }

        let raw = match next {
            Ok(raw) => raw,
            Err(reason) => {
                report.reject(row_number, RowRejection::Malformed(reason));
                continue;
            }
        };
        let record = match validate(kind, &raw, &known) {
            Ok(record) => record,
            Err(err) => {
                report.reject(row_number, RowRejection::Invalid(err));
                continue;
            }
        };
        if known.contains(kind, record.id()) {
            report.skipped_count += 1;
            continue;
        }

        match insert_record(&tx, &record) {
            Ok(written) => {
                known.insert(kind, record.id());
                if written {
                    report.accepted_count += 1;
                } else {
                    report.skipped_count += 1;
                }
            }
            Err(err) if is_constraint_violation(&err) => {
                report.reject(row_number, RowRejection::WriteRejected(err.to_string()));
            }
            Err(err) => {
                log::error!("{kind}: storage failure at row {row_number}, rolling back");
                return Err(ImportError::Storage {
                    entity: kind,
                    source: err,
                });
            }
        }
    }

    tx.commit().map_err(ImportError::storage(kind))?;
    progress(row_number);
    log::info!(
        "{kind}: {} accepted, {} skipped, {} rejected",
        report.accepted_count,
        report.skipped_count,
        report.rejected_count()
    );
    Ok(report)
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Where each entity kind is read from during a full run.
#[derive(Debug, Clone, Default)]
pub struct ImportSources {
    paths: BTreeMap<EntityKind, PathBuf>,
}

impl ImportSources {
    /// The four conventional `*_data.csv` files inside `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let paths = EntityKind::IMPORT_ORDER
            .iter()
            .map(|kind| (*kind, dir.join(kind.source_file_name())))
            .collect();
        Self { paths }
    }

    pub fn path(&self, kind: EntityKind) -> Option<&Path> {
        self.paths.get(&kind).map(PathBuf::as_path)
    }
}

/// Result of one file within a full run.
#[derive(Debug)]
pub struct FileOutcome {
    pub entity: EntityKind,
    pub source: PathBuf,
    pub result: Result<ImportReport, ImportError>,
}

/// Serializable view of a `FileOutcome`.
#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    pub entity: EntityKind,
    pub source: PathBuf,
    pub report: Option<ImportReport>,
    pub error: Option<String>,
}

impl From<&FileOutcome> for FileSummary {
    fn from(outcome: &FileOutcome) -> Self {
        let (report, error) = match &outcome.result {
            Ok(report) => (Some(report.clone()), None),
            Err(err) => (None, Some(err.to_string())),
        };
        Self {
            entity: outcome.entity,
            source: outcome.source.clone(),
            report,
            error,
        }
    }
}

/// Imports every configured source, always in `EntityKind::IMPORT_ORDER`.
///
/// A failed file is recorded in its outcome and the run moves on to the next
/// one. Only clearing the tables in `Replace` mode can fail the whole run.
pub fn import_all(
    storage: &mut Storage,
    sources: &ImportSources,
    mode: ImportMode,
) -> rusqlite::Result<Vec<FileOutcome>> {
    import_all_with_progress(storage, sources, mode, &mut |_, _| {})
}

pub fn import_all_with_progress(
    storage: &mut Storage,
    sources: &ImportSources,
    mode: ImportMode,
    progress: &mut dyn FnMut(EntityKind, usize),
) -> rusqlite::Result<Vec<FileOutcome>> {
    if mode == ImportMode::Replace {
        storage.clear_all()?;
    }

    let mut outcomes = Vec::with_capacity(EntityKind::IMPORT_ORDER.len());
    for kind in EntityKind::IMPORT_ORDER {
        let Some(path) = sources.path(kind) else {
            log::debug!("no source configured for {kind}");
            continue;
        };
        let result = import_file_with_progress(storage, kind, path, &mut |rows| progress(kind, rows));
        if let Err(err) = &result {
            log::error!("import of {kind} failed: {err}");
        }
        outcomes.push(FileOutcome {
            entity: kind,
            source: path.to_path_buf(),
            result,
        });
    }
    Ok(outcomes)
}
