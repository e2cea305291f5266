//! Explicit handle on the SQLite database.
//!
//! A `Storage` owns one connection with foreign keys switched on. It is opened
//! by whoever runs an import or a query and released when dropped, so every
//! exit path (including early returns on validation or source errors) closes
//! it.

mod records;
pub mod schema;

pub(crate) use records::insert_record;

use crate::error::SchemaError;
use crate::validation::KnownIdentifiers;
use common::model::EntityKind;
use rusqlite::{Connection, Transaction};
use std::path::Path;
use std::time::Duration;

/// Storage format of `Expiry_Date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Storage format of `Timestamp`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        log::debug!("opening storage at {}", path.display());
        Self::configure(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, SchemaError> {
        Self::configure(Connection::open_in_memory()?)
    }

    fn configure(conn: Connection) -> Result<Self, SchemaError> {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self { conn })
    }

    /// Opens the database and makes sure the schema is in place.
    pub fn open_initialized(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let storage = Self::open(path)?;
        storage.initialize_schema()?;
        Ok(storage)
    }

    pub fn initialize_schema(&self) -> Result<(), SchemaError> {
        schema::initialize_schema(&self.conn)
    }

    /// Read access for queries.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn transaction(&mut self) -> rusqlite::Result<Transaction<'_>> {
        self.conn.transaction()
    }

    pub fn known_identifiers(&self) -> rusqlite::Result<KnownIdentifiers> {
        load_known_identifiers(&self.conn, EntityKind::IMPORT_ORDER)
    }

    /// Removes every row of the four tables, children first.
    pub fn clear_all(&mut self) -> rusqlite::Result<()> {
        let tx = self.conn.transaction()?;
        for kind in EntityKind::IMPORT_ORDER.iter().rev() {
            let removed = tx.execute(&format!("DELETE FROM {}", kind.table_name()), [])?;
            log::info!("cleared {removed} rows from {kind}");
        }
        tx.commit()
    }

    pub fn table_counts(&self) -> rusqlite::Result<Vec<(EntityKind, i64)>> {
        EntityKind::IMPORT_ORDER
            .iter()
            .map(|kind| {
                let count = self.conn.query_row(
                    &format!("SELECT COUNT(*) FROM {}", kind.table_name()),
                    [],
                    |row| row.get(0),
                )?;
                Ok((*kind, count))
            })
            .collect()
    }
}

/// Identifiers of the `kinds` tables, as seen through `conn` (which may be an
/// open transaction).
pub(crate) fn load_known_identifiers(
    conn: &Connection,
    kinds: impl IntoIterator<Item = EntityKind>,
) -> rusqlite::Result<KnownIdentifiers> {
    let mut known = KnownIdentifiers::default();
    for kind in kinds {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {}",
            kind.id_column(),
            kind.table_name()
        ))?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        known.extend(kind, ids);
    }
    Ok(known)
}
