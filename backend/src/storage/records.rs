use super::{DATE_FORMAT, TIMESTAMP_FORMAT};
use crate::validation::Record;
use rusqlite::{params, Connection};

const INSERT_PROVIDER: &str = "INSERT INTO providers (Provider_ID, Name, Type, Address, City, Contact)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    ON CONFLICT(Provider_ID) DO NOTHING";

const INSERT_RECEIVER: &str = "INSERT INTO receivers (Receiver_ID, Name, Type, City, Contact)
    VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT(Receiver_ID) DO NOTHING";

const INSERT_FOOD_LISTING: &str = "INSERT INTO food_listings
    (Food_ID, Food_Name, Quantity, Expiry_Date, Provider_ID, Provider_Type, Location, Food_Type, Meal_Type)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
    ON CONFLICT(Food_ID) DO NOTHING";

const INSERT_CLAIM: &str = "INSERT INTO claims (Claim_ID, Food_ID, Receiver_ID, Status, Timestamp)
    VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT(Claim_ID) DO NOTHING";

/// Inserts one validated record, leaving an existing row with the same
/// identifier untouched. Returns whether a row was written.
pub(crate) fn insert_record(conn: &Connection, record: &Record) -> rusqlite::Result<bool> {
    let changed = match record {
        Record::Provider(p) => conn.prepare_cached(INSERT_PROVIDER)?.execute(params![
            p.provider_id,
            p.name,
            p.provider_type,
            p.address,
            p.city,
            p.contact,
        ])?,
        Record::Receiver(r) => conn.prepare_cached(INSERT_RECEIVER)?.execute(params![
            r.receiver_id,
            r.name,
            r.receiver_type,
            r.city,
            r.contact,
        ])?,
        Record::FoodListing(l) => conn.prepare_cached(INSERT_FOOD_LISTING)?.execute(params![
            l.food_id,
            l.food_name,
            l.quantity,
            l.expiry_date.format(DATE_FORMAT).to_string(),
            l.provider_id,
            l.provider_type,
            l.location,
            l.food_type,
            l.meal_type,
        ])?,
        Record::Claim(c) => conn.prepare_cached(INSERT_CLAIM)?.execute(params![
            c.claim_id,
            c.food_id,
            c.receiver_id,
            c.status.as_str(),
            c.timestamp.format(TIMESTAMP_FORMAT).to_string(),
        ])?,
    };
    Ok(changed > 0)
}
