//! Housekeeping over loaded data: removing expired listings and summarising
//! data quality.

use crate::storage::{Storage, DATE_FORMAT};
use chrono::NaiveDate;
use common::model::EntityKind;
use rusqlite::params;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpiredListing {
    pub food_id: i64,
    pub food_name: String,
    pub expiry_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurgeSummary {
    pub listings_removed: Vec<ExpiredListing>,
    /// Claims dropped because they pointed at a removed listing.
    pub claims_removed: usize,
}

/// Deletes listings that expired before `today`, together with the claims
/// referencing them, in one transaction.
pub fn purge_expired(storage: &mut Storage, today: NaiveDate) -> rusqlite::Result<PurgeSummary> {
    let cutoff = today.format(DATE_FORMAT).to_string();
    let tx = storage.transaction()?;

    let listings_removed = {
        let mut stmt = tx.prepare(
            "SELECT Food_ID, Food_Name, Expiry_Date FROM food_listings
             WHERE date(Expiry_Date) < date(?1)
             ORDER BY date(Expiry_Date), Food_ID",
        )?;
        let listings = stmt
            .query_map(params![cutoff], |row| {
                Ok(ExpiredListing {
                    food_id: row.get(0)?,
                    food_name: row.get(1)?,
                    expiry_date: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        listings
    };

    let claims_removed = tx.execute(
        "DELETE FROM claims WHERE Food_ID IN
            (SELECT Food_ID FROM food_listings WHERE date(Expiry_Date) < date(?1))",
        params![cutoff],
    )?;
    tx.execute(
        "DELETE FROM food_listings WHERE date(Expiry_Date) < date(?1)",
        params![cutoff],
    )?;
    tx.commit()?;

    if listings_removed.is_empty() {
        log::info!("no expired food found");
    } else {
        log::info!(
            "deleted {} expired food items and {claims_removed} dependent claims",
            listings_removed.len()
        );
    }
    Ok(PurgeSummary {
        listings_removed,
        claims_removed,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableQuality {
    pub entity: EntityKind,
    pub rows: i64,
    /// NULL cells across the table's optional columns.
    pub missing_values: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityReport {
    pub tables: Vec<TableQuality>,
    pub zero_quantity_listings: i64,
    pub expired_listings: i64,
}

/// Counts rows, missing optional values, empty listings and expired listings.
pub fn quality_report(storage: &Storage, today: NaiveDate) -> rusqlite::Result<QualityReport> {
    let conn = storage.connection();
    let mut tables = Vec::with_capacity(EntityKind::IMPORT_ORDER.len());
    for kind in EntityKind::IMPORT_ORDER {
        let null_sum = kind
            .columns()
            .iter()
            .map(|column| format!("SUM(CASE WHEN {column} IS NULL THEN 1 ELSE 0 END)"))
            .collect::<Vec<_>>()
            .join(" + ");
        let (rows, missing_values) = conn.query_row(
            &format!(
                "SELECT COUNT(*), COALESCE({null_sum}, 0) FROM {}",
                kind.table_name()
            ),
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        tables.push(TableQuality {
            entity: kind,
            rows,
            missing_values,
        });
    }

    let zero_quantity_listings = conn.query_row(
        "SELECT COUNT(*) FROM food_listings WHERE Quantity = 0",
        [],
        |row| row.get(0),
    )?;
    let expired_listings = conn.query_row(
        "SELECT COUNT(*) FROM food_listings WHERE date(Expiry_Date) < date(?1)",
        params![today.format(DATE_FORMAT).to_string()],
        |row| row.get(0),
    )?;

    Ok(QualityReport {
        tables,
        zero_quantity_listings,
        expired_listings,
    })
}

pub fn log_quality_report(report: &QualityReport) {
    for table in &report.tables {
        if table.missing_values == 0 {
            log::info!("{}: {} rows, no missing values", table.entity, table.rows);
        } else {
            log::warn!(
                "{}: {} rows, {} missing values",
                table.entity,
                table.rows,
                table.missing_values
            );
        }
    }
    if report.zero_quantity_listings > 0 {
        log::warn!("food_listings: {} listings with zero quantity", report.zero_quantity_listings);
    }
    if report.expired_listings > 0 {
        log::warn!("food_listings: {} expired listings still present", report.expired_listings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Storage {
        let storage = Storage::open_in_memory().unwrap();
        storage.initialize_schema().unwrap();
        storage
            .connection()
            .execute_batch(
                "INSERT INTO providers (Provider_ID, Name, City) VALUES (1, 'Cafe', NULL);
                 INSERT INTO receivers (Receiver_ID, Name, City) VALUES (1, 'Shelter', 'Pune');
                 INSERT INTO food_listings (Food_ID, Food_Name, Quantity, Expiry_Date, Provider_ID)
                     VALUES (1, 'Bread', 4, '2025-03-01', 1),
                            (2, 'Soup', 0, '2025-03-20', 1);
                 INSERT INTO claims (Claim_ID, Food_ID, Receiver_ID, Status, Timestamp)
                     VALUES (1, 1, 1, 'Pending', '2025-02-28 09:00:00'),
                            (2, 2, 1, 'Completed', '2025-03-02 10:00:00');",
            )
            .unwrap();
        storage
    }

    #[test]
    fn purge_drops_expired_listings_and_their_claims() {
        let mut storage = seeded();
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let summary = purge_expired(&mut storage, today).unwrap();

        assert_eq!(summary.listings_removed.len(), 1);
        assert_eq!(summary.listings_removed[0].food_id, 1);
        assert_eq!(summary.claims_removed, 1);

        let known = storage.known_identifiers().unwrap();
        assert!(!known.contains(EntityKind::FoodListings, 1));
        assert!(known.contains(EntityKind::FoodListings, 2));
        assert!(known.contains(EntityKind::Claims, 2));
    }

    #[test]
    fn quality_report_counts_gaps() {
        let storage = seeded();
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let report = quality_report(&storage, today).unwrap();

        let providers = &report.tables[0];
        assert_eq!(providers.entity, EntityKind::Providers);
        assert_eq!(providers.rows, 1);
        // Type, Address, City and Contact are all NULL.
        assert_eq!(providers.missing_values, 4);
        assert_eq!(report.zero_quantity_listings, 1);
        assert_eq!(report.expired_listings, 1);
    }
}
