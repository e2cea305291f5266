//! Table definitions and idempotent schema creation.

use crate::error::SchemaError;
use common::model::EntityKind;
use rusqlite::Connection;

struct TableDef {
    entity: EntityKind,
    ddl: &'static str,
    /// Column name and declared SQLite type.
    columns: &'static [(&'static str, &'static str)],
}

/// Ordered so that referenced tables are created first.
const TABLES: [TableDef; 4] = [
    TableDef {
        entity: EntityKind::Providers,
        ddl: "CREATE TABLE IF NOT EXISTS providers (
            Provider_ID INTEGER PRIMARY KEY,
            Name TEXT NOT NULL,
            Type TEXT,
            Address TEXT,
            City TEXT,
            Contact TEXT
        )",
        columns: &[
            ("Provider_ID", "INTEGER"),
            ("Name", "TEXT"),
            ("Type", "TEXT"),
            ("Address", "TEXT"),
            ("City", "TEXT"),
            ("Contact", "TEXT"),
        ],
    },
    TableDef {
        entity: EntityKind::Receivers,
        ddl: "CREATE TABLE IF NOT EXISTS receivers (
            Receiver_ID INTEGER PRIMARY KEY,
            Name TEXT NOT NULL,
            Type TEXT,
            City TEXT,
            Contact TEXT
        )",
        columns: &[
            ("Receiver_ID", "INTEGER"),
            ("Name", "TEXT"),
            ("Type", "TEXT"),
            ("City", "TEXT"),
            ("Contact", "TEXT"),
        ],
    },
    TableDef {
        entity: EntityKind::FoodListings,
        ddl: "CREATE TABLE IF NOT EXISTS food_listings (
            Food_ID INTEGER PRIMARY KEY,
            Food_Name TEXT NOT NULL,
            Quantity INTEGER NOT NULL CHECK (Quantity >= 0),
            Expiry_Date TEXT NOT NULL,
            Provider_ID INTEGER NOT NULL REFERENCES providers(Provider_ID),
            Provider_Type TEXT,
            Location TEXT,
            Food_Type TEXT,
            Meal_Type TEXT
        )",
        columns: &[
            ("Food_ID", "INTEGER"),
            ("Food_Name", "TEXT"),
            ("Quantity", "INTEGER"),
            ("Expiry_Date", "TEXT"),
            ("Provider_ID", "INTEGER"),
            ("Provider_Type", "TEXT"),
            ("Location", "TEXT"),
            ("Food_Type", "TEXT"),
            ("Meal_Type", "TEXT"),
        ],
    },
    TableDef {
        entity: EntityKind::Claims,
        ddl: "CREATE TABLE IF NOT EXISTS claims (
            Claim_ID INTEGER PRIMARY KEY,
            Food_ID INTEGER NOT NULL REFERENCES food_listings(Food_ID),
            Receiver_ID INTEGER NOT NULL REFERENCES receivers(Receiver_ID),
            Status TEXT NOT NULL CHECK (Status IN ('Pending', 'Completed', 'Cancelled')),
            Timestamp TEXT NOT NULL
        )",
        columns: &[
            ("Claim_ID", "INTEGER"),
            ("Food_ID", "INTEGER"),
            ("Receiver_ID", "INTEGER"),
            ("Status", "TEXT"),
            ("Timestamp", "TEXT"),
        ],
    },
];

/// Creates the four tables when absent and checks that whatever is already
/// there declares the expected columns with the expected types.
///
/// Safe to call on every startup.
pub fn initialize_schema(conn: &Connection) -> Result<(), SchemaError> {
    for table in &TABLES {
        conn.execute(table.ddl, [])?;
    }
    for table in &TABLES {
        verify_table(conn, table)?;
    }
    log::debug!("schema ready: {} tables verified", TABLES.len());
    Ok(())
}

fn verify_table(conn: &Connection, table: &TableDef) -> Result<(), SchemaError> {
    let name = table.entity.table_name();
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({name})"))?;
    let existing: Vec<(String, String)> = stmt
        .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?)))?
        .collect::<Result<_, _>>()?;

    for (column, expected_type) in table.columns {
        match existing
            .iter()
            .find(|(existing_name, _)| existing_name.eq_ignore_ascii_case(column))
        {
            None => {
                return Err(SchemaError::Incompatible {
                    table: name,
                    detail: format!("missing column {column}"),
                });
            }
            Some((_, declared)) if !declared.eq_ignore_ascii_case(expected_type) => {
                return Err(SchemaError::Incompatible {
                    table: name,
                    detail: format!("column {column} is {declared}, expected {expected_type}"),
                });
            }
            Some(_) => {}
        }
    }
    Ok(())
}
