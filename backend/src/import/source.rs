//! CSV source handling: header resolution and row extraction.

use crate::error::SourceError;
use crate::validation::RawRow;
use common::model::EntityKind;
use csv::{Reader, ReaderBuilder, StringRecord};
use std::io::Read;
use std::path::{Path, PathBuf};

/// A CSV reader whose header has been matched against the columns of one
/// entity kind.
pub(crate) struct CsvSource<R: Read> {
    reader: Reader<R>,
    /// Position of each expected column inside a record.
    columns: Vec<(usize, &'static str)>,
    record: StringRecord,
    path: PathBuf,
}

impl<R: Read> CsvSource<R> {
    pub(crate) fn new(kind: EntityKind, input: R, path: &Path) -> Result<Self, SourceError> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(input);

        let headers = reader
            .headers()
            .map_err(|source| SourceError::Unreadable {
                path: path.to_path_buf(),
                source,
            })?
            .clone();

        let mut columns = Vec::with_capacity(kind.columns().len());
        let mut missing = Vec::new();
        for &column in kind.columns() {
            match headers
                .iter()
                .position(|header| normalize_header(header).eq_ignore_ascii_case(column))
            {
                Some(idx) => columns.push((idx, column)),
                None => missing.push(column.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(SourceError::MissingColumns {
                path: path.to_path_buf(),
                entity: kind,
                missing,
            });
        }

        Ok(Self {
            reader,
            columns,
            record: StringRecord::new(),
            path: path.to_path_buf(),
        })
    }

    /// Reads the next data row.
    ///
    /// `Ok(None)` at end of input, `Ok(Some(Err(_)))` for a record that could
    /// not be decoded (the reader can carry on), `Err(_)` when the input
    /// itself failed.
    pub(crate) fn next_row(&mut self) -> Result<Option<Result<RawRow, String>>, SourceError> {
        match self.reader.read_record(&mut self.record) {
            Ok(false) => Ok(None),
            Ok(true) => {
                let row = self
                    .columns
                    .iter()
                    .map(|&(idx, column)| {
                        (column.to_string(), self.record.get(idx).unwrap_or("").to_string())
                    })
                    .collect();
                Ok(Some(Ok(row)))
            }
            Err(err) if matches!(err.kind(), csv::ErrorKind::Io(_)) => {
                Err(SourceError::Unreadable {
                    path: self.path.clone(),
                    source: err,
                })
            }
            Err(err) => Ok(Some(Err(err.to_string()))),
        }
    }
}

fn normalize_header(header: &str) -> &str {
    header.trim_start_matches('\u{feff}').trim().trim_matches('"').trim()
}
