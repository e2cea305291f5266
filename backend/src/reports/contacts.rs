use super::query_table;
use crate::storage::Storage;
use common::model::report::ContactDirectory;

const PROVIDERS_SQL: &str = "SELECT Provider_ID, Name, Type, City, Contact
     FROM providers
     ORDER BY Name, Provider_ID";

const RECEIVERS_SQL: &str = "SELECT Receiver_ID, Name, Type, City, Contact
     FROM receivers
     ORDER BY Name, Receiver_ID";

const CLAIMING_RECEIVERS_SQL: &str = "SELECT DISTINCT r.Receiver_ID, r.Name, r.City, r.Contact
     FROM receivers r
     JOIN claims c ON c.Receiver_ID = r.Receiver_ID
     ORDER BY r.Name, r.Receiver_ID";

/// Who to call: every provider and receiver, plus the receivers that have
/// claimed something.
pub fn contact_directory(storage: &Storage) -> rusqlite::Result<ContactDirectory> {
    Ok(ContactDirectory {
        providers: query_table(storage, "Providers", PROVIDERS_SQL, [])?,
        receivers: query_table(storage, "Receivers", RECEIVERS_SQL, [])?,
        claiming_receivers: query_table(
            storage,
            "Receivers with claims",
            CLAIMING_RECEIVERS_SQL,
            [],
        )?,
    })
}
