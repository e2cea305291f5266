//! Row validation: turns one untyped CSV row into a typed record or explains
//! which field is wrong.
//!
//! Validation never touches storage. Referential checks use the
//! `KnownIdentifiers` handed in by the caller.

mod fields;
mod known;

pub use known::KnownIdentifiers;

use common::model::{Claim, EntityKind, FoodListing, Provider, Receiver};
use fields::Fields;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

/// Column name to cell value, as parsed from CSV.
pub type RawRow = HashMap<String, String>;

/// A row that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "entity", content = "record", rename_all = "snake_case")]
pub enum Record {
    Provider(Provider),
    Receiver(Receiver),
    FoodListing(FoodListing),
    Claim(Claim),
}

impl Record {
    pub fn kind(&self) -> EntityKind {
        match self {
            Record::Provider(_) => EntityKind::Providers,
            Record::Receiver(_) => EntityKind::Receivers,
            Record::FoodListing(_) => EntityKind::FoodListings,
            Record::Claim(_) => EntityKind::Claims,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Record::Provider(p) => p.provider_id,
            Record::Receiver(r) => r.receiver_id,
            Record::FoodListing(l) => l.food_id,
            Record::Claim(c) => c.claim_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: ValidationReason) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationReason {
    #[error("required value is missing")]
    Missing,
    #[error("'{value}' is not an integer")]
    NotAnInteger { value: String },
    #[error("'{value}' is out of range")]
    OutOfRange { value: String },
    #[error("identifier {value} must be positive")]
    NonPositiveIdentifier { value: i64 },
    #[error("quantity {value} is negative")]
    NegativeQuantity { value: i64 },
    #[error("'{value}' is not a valid calendar date")]
    InvalidDate { value: String },
    #[error("'{value}' is not a valid timestamp")]
    InvalidTimestamp { value: String },
    #[error("'{value}' is not one of Pending, Completed, Cancelled")]
    InvalidStatus { value: String },
    #[error("no {entity} row with identifier {id}")]
    UnknownReference { entity: EntityKind, id: i64 },
}

/// Validates `row` as an entity of `kind`.
///
/// Fields are checked in header order and the first failure is returned.
pub fn validate(
    kind: EntityKind,
    row: &RawRow,
    known: &KnownIdentifiers,
) -> Result<Record, ValidationError> {
    let f = Fields::new(row);
    let record = match kind {
        EntityKind::Providers => Record::Provider(Provider {
            provider_id: f.identifier("Provider_ID")?,
            name: f.text("Name")?,
            provider_type: f.optional("Type"),
            address: f.optional("Address"),
            city: f.optional("City"),
            contact: f.optional("Contact"),
        }),
        EntityKind::Receivers => Record::Receiver(Receiver {
            receiver_id: f.identifier("Receiver_ID")?,
            name: f.text("Name")?,
            receiver_type: f.optional("Type"),
            city: f.optional("City"),
            contact: f.optional("Contact"),
        }),
        EntityKind::FoodListings => Record::FoodListing(FoodListing {
            food_id: f.identifier("Food_ID")?,
            food_name: f.text("Food_Name")?,
            quantity: f.quantity("Quantity")?,
            expiry_date: f.date("Expiry_Date")?,
            provider_id: f.reference("Provider_ID", EntityKind::Providers, known)?,
            provider_type: f.optional("Provider_Type"),
            location: f.optional("Location"),
            food_type: f.optional("Food_Type"),
            meal_type: f.optional("Meal_Type"),
        }),
        EntityKind::Claims => Record::Claim(Claim {
            claim_id: f.identifier("Claim_ID")?,
            food_id: f.reference("Food_ID", EntityKind::FoodListings, known)?,
            receiver_id: f.reference("Receiver_ID", EntityKind::Receivers, known)?,
            status: f.status("Status")?,
            timestamp: f.timestamp("Timestamp")?,
        }),
    };
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use common::model::ClaimStatus;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn listing(quantity: &str, expiry: &str, provider: &str) -> RawRow {
        row(&[
            ("Food_ID", "10"),
            ("Food_Name", "Rice"),
            ("Quantity", quantity),
            ("Expiry_Date", expiry),
            ("Provider_ID", provider),
            ("Provider_Type", "Restaurant"),
            ("Location", "Chennai"),
            ("Food_Type", "Vegetarian"),
            ("Meal_Type", "Lunch"),
        ])
    }

    fn known_provider(id: i64) -> KnownIdentifiers {
        let mut known = KnownIdentifiers::default();
        known.insert(EntityKind::Providers, id);
        known
    }

    #[test]
    fn negative_quantity_names_the_quantity_field() {
        let err = validate(
            EntityKind::FoodListings,
            &listing("-5", "2025-03-17", "1"),
            &known_provider(1),
        )
        .unwrap_err();
        assert_eq!(err.field, "Quantity");
        assert_eq!(err.reason, ValidationReason::NegativeQuantity { value: -5 });
    }

    #[test]
    fn zero_quantity_is_accepted() {
        let record = validate(
            EntityKind::FoodListings,
            &listing("0", "2025-03-17", "1"),
            &known_provider(1),
        )
        .unwrap();
        match record {
            Record::FoodListing(l) => {
                assert_eq!(l.quantity, 0);
                assert_eq!(l.expiry_date, NaiveDate::from_ymd_opt(2025, 3, 17).unwrap());
            }
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[test]
    fn fractional_quantity_is_not_rounded() {
        let err = validate(
            EntityKind::FoodListings,
            &listing("2.5", "2025-03-17", "1"),
            &known_provider(1),
        )
        .unwrap_err();
        assert_eq!(err.field, "Quantity");
        assert!(matches!(err.reason, ValidationReason::NotAnInteger { .. }));
    }

    #[test]
    fn quantity_beyond_32_bits_is_kept() {
        let record = validate(
            EntityKind::FoodListings,
            &listing("5000000000", "2025-03-17", "1"),
            &known_provider(1),
        )
        .unwrap();
        let Record::FoodListing(l) = record else {
            panic!("expected a food listing");
        };
        assert_eq!(l.quantity, 5_000_000_000);
    }

    #[test]
    fn quantity_overflowing_storage_is_out_of_range() {
        let err = validate(
            EntityKind::FoodListings,
            &listing("99999999999999999999", "2025-03-17", "1"),
            &known_provider(1),
        )
        .unwrap_err();
        assert_eq!(err.field, "Quantity");
        assert_eq!(
            err.reason,
            ValidationReason::OutOfRange {
                value: "99999999999999999999".to_string()
            }
        );
    }

    #[test]
    fn impossible_calendar_date_is_rejected() {
        let err = validate(
            EntityKind::FoodListings,
            &listing("3", "2025-02-30", "1"),
            &known_provider(1),
        )
        .unwrap_err();
        assert_eq!(err.field, "Expiry_Date");
    }

    #[test]
    fn us_style_dates_are_understood() {
        let record = validate(
            EntityKind::FoodListings,
            &listing("3", "3/17/2025", "1"),
            &known_provider(1),
        )
        .unwrap();
        let Record::FoodListing(l) = record else {
            panic!("expected a food listing");
        };
        assert_eq!(l.expiry_date, NaiveDate::from_ymd_opt(2025, 3, 17).unwrap());
    }

    #[test]
    fn unknown_provider_is_a_reference_error() {
        let err = validate(
            EntityKind::FoodListings,
            &listing("3", "2025-03-17", "42"),
            &known_provider(1),
        )
        .unwrap_err();
        assert_eq!(err.field, "Provider_ID");
        assert_eq!(
            err.reason,
            ValidationReason::UnknownReference {
                entity: EntityKind::Providers,
                id: 42
            }
        );
    }

    #[test]
    fn whitespace_is_trimmed_and_blank_means_missing() {
        let provider = row(&[
            ("Provider_ID", "  7 "),
            ("Name", " Gulf Kitchen "),
            ("Type", "   "),
            ("Address", ""),
            ("City", "Pune"),
            ("Contact", ""),
        ]);
        let Record::Provider(p) =
            validate(EntityKind::Providers, &provider, &KnownIdentifiers::default()).unwrap()
        else {
            panic!("expected a provider");
        };
        assert_eq!(p.provider_id, 7);
        assert_eq!(p.name, "Gulf Kitchen");
        assert_eq!(p.provider_type, None);
        assert_eq!(p.city.as_deref(), Some("Pune"));

        let nameless = row(&[("Provider_ID", "8"), ("Name", "  ")]);
        let err =
            validate(EntityKind::Providers, &nameless, &KnownIdentifiers::default()).unwrap_err();
        assert_eq!(err, ValidationError::new("Name", ValidationReason::Missing));
    }

    #[test]
    fn identifiers_must_be_positive_integers() {
        let receiver = row(&[("Receiver_ID", "0"), ("Name", "Shelter")]);
        let err =
            validate(EntityKind::Receivers, &receiver, &KnownIdentifiers::default()).unwrap_err();
        assert_eq!(err.reason, ValidationReason::NonPositiveIdentifier { value: 0 });

        let receiver = row(&[("Receiver_ID", "R-1"), ("Name", "Shelter")]);
        let err =
            validate(EntityKind::Receivers, &receiver, &KnownIdentifiers::default()).unwrap_err();
        assert!(matches!(err.reason, ValidationReason::NotAnInteger { .. }));
    }

    fn claim(status: &str, timestamp: &str) -> RawRow {
        row(&[
            ("Claim_ID", "1"),
            ("Food_ID", "10"),
            ("Receiver_ID", "5"),
            ("Status", status),
            ("Timestamp", timestamp),
        ])
    }

    fn known_for_claims() -> KnownIdentifiers {
        let mut known = KnownIdentifiers::default();
        known.insert(EntityKind::FoodListings, 10);
        known.insert(EntityKind::Receivers, 5);
        known
    }

    #[test]
    fn claim_status_outside_the_enumeration_is_rejected() {
        let err = validate(
            EntityKind::Claims,
            &claim("Delivered", "2025-03-05 05:26"),
            &known_for_claims(),
        )
        .unwrap_err();
        assert_eq!(err.field, "Status");
        assert!(matches!(err.reason, ValidationReason::InvalidStatus { .. }));
    }

    #[test]
    fn claim_accepts_lowercase_status_and_minute_precision() {
        let Record::Claim(c) = validate(
            EntityKind::Claims,
            &claim("completed", "2025-03-05 05:26"),
            &known_for_claims(),
        )
        .unwrap() else {
            panic!("expected a claim");
        };
        assert_eq!(c.status, ClaimStatus::Completed);
        assert_eq!(c.timestamp.format("%H:%M:%S").to_string(), "05:26:00");
    }

    #[test]
    fn claim_needs_both_references() {
        let mut known = KnownIdentifiers::default();
        known.insert(EntityKind::Receivers, 5);
        let err = validate(
            EntityKind::Claims,
            &claim("Pending", "2025-03-05 05:26"),
            &known,
        )
        .unwrap_err();
        assert_eq!(err.field, "Food_ID");
    }

    #[test]
    fn header_case_differences_are_tolerated() {
        let receiver = row(&[("receiver_id", "3"), ("NAME", "Shelter")]);
        let record =
            validate(EntityKind::Receivers, &receiver, &KnownIdentifiers::default()).unwrap();
        assert_eq!(record.id(), 3);
        assert_eq!(record.kind(), EntityKind::Receivers);
    }
}
