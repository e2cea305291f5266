use super::{RawRow, ValidationError, ValidationReason};
use super::known::KnownIdentifiers;
use chrono::{NaiveDate, NaiveDateTime};
use common::model::{ClaimStatus, EntityKind};
use std::num::IntErrorKind;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

const TIMESTAMP_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Typed access to the cells of one raw row. Every accessor trims the value
/// and treats an empty cell like an absent one.
pub(super) struct Fields<'a> {
    row: &'a RawRow,
}

impl<'a> Fields<'a> {
    pub(super) fn new(row: &'a RawRow) -> Self {
        Self { row }
    }

    fn cell(&self, column: &str) -> Option<&'a str> {
        self.row
            .get(column)
            .or_else(|| {
                self.row
                    .iter()
                    .find(|(key, _)| key.trim().eq_ignore_ascii_case(column))
                    .map(|(_, value)| value)
            })
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub(super) fn required(&self, column: &str) -> Result<&'a str, ValidationError> {
        self.cell(column)
            .ok_or_else(|| ValidationError::new(column, ValidationReason::Missing))
    }

    pub(super) fn optional(&self, column: &str) -> Option<String> {
        self.cell(column).map(str::to_string)
    }

    pub(super) fn text(&self, column: &str) -> Result<String, ValidationError> {
        self.required(column).map(str::to_string)
    }

    /// A whole number that fits SQLite's INTEGER storage class.
    fn integer(&self, column: &str) -> Result<i64, ValidationError> {
        let raw = self.required(column)?;
        raw.parse::<i64>().map_err(|e| {
            let value = raw.to_string();
            let reason = match e.kind() {
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                    ValidationReason::OutOfRange { value }
                }
                _ => ValidationReason::NotAnInteger { value },
            };
            ValidationError::new(column, reason)
        })
    }

    pub(super) fn identifier(&self, column: &str) -> Result<i64, ValidationError> {
        let id = self.integer(column)?;
        if id <= 0 {
            return Err(ValidationError::new(
                column,
                ValidationReason::NonPositiveIdentifier { value: id },
            ));
        }
        Ok(id)
    }

    /// An identifier that must already exist in `target`.
    pub(super) fn reference(
        &self,
        column: &str,
        target: EntityKind,
        known: &KnownIdentifiers,
    ) -> Result<i64, ValidationError> {
        let id = self.identifier(column)?;
        if !known.contains(target, id) {
            return Err(ValidationError::new(
                column,
                ValidationReason::UnknownReference { entity: target, id },
            ));
        }
        Ok(id)
    }

    /// Negative and fractional quantities are rejected, never clamped.
    pub(super) fn quantity(&self, column: &str) -> Result<i64, ValidationError> {
        let value = self.integer(column)?;
        if value < 0 {
            return Err(ValidationError::new(
                column,
                ValidationReason::NegativeQuantity { value },
            ));
        }
        Ok(value)
    }

    pub(super) fn date(&self, column: &str) -> Result<NaiveDate, ValidationError> {
        let raw = self.required(column)?;
        DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
            .ok_or_else(|| {
                ValidationError::new(
                    column,
                    ValidationReason::InvalidDate {
                        value: raw.to_string(),
                    },
                )
            })
    }

    pub(super) fn timestamp(&self, column: &str) -> Result<NaiveDateTime, ValidationError> {
        let raw = self.required(column)?;
        TIMESTAMP_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .ok_or_else(|| {
                ValidationError::new(
                    column,
                    ValidationReason::InvalidTimestamp {
                        value: raw.to_string(),
                    },
                )
            })
    }

    pub(super) fn status(&self, column: &str) -> Result<ClaimStatus, ValidationError> {
        let raw = self.required(column)?;
        raw.parse().map_err(|_| {
            ValidationError::new(
                column,
                ValidationReason::InvalidStatus {
                    value: raw.to_string(),
                },
            )
        })
    }
}
