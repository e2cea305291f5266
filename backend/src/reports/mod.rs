//! Read-only queries consumed by dashboards: the filtered listing browser, the
//! contact directory and the fixed set of insight tables.

mod contacts;
mod insights;

pub use contacts::contact_directory;
pub use insights::{run_insight, Insight};

use crate::storage::{Storage, DATE_FORMAT};
use chrono::NaiveDate;
use common::model::report::{ListingFilter, ListingView, ReportTable};
use rusqlite::types::{Type, ValueRef};
use rusqlite::{params_from_iter, Params, Row};
use serde_json::Value;

/// Listings with their provider, soonest expiry first.
pub fn browse_listings(
    storage: &Storage,
    filter: &ListingFilter,
) -> rusqlite::Result<Vec<ListingView>> {
    let mut conditions = Vec::new();
    let mut params: Vec<&str> = Vec::new();
    for (column, values) in [
        ("l.Location", &filter.locations),
        ("p.Name", &filter.provider_names),
        ("l.Food_Type", &filter.food_types),
    ] {
        if values.is_empty() {
            continue;
        }
        let placeholders = vec!["?"; values.len()].join(",");
        conditions.push(format!("{column} IN ({placeholders})"));
        params.extend(values.iter().map(String::as_str));
    }
    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let sql = format!(
        "SELECT l.Food_ID, l.Food_Name, l.Quantity, l.Expiry_Date,
                p.Name, p.Type, p.City, p.Contact,
                l.Location, l.Food_Type, l.Meal_Type
         FROM food_listings l
         LEFT JOIN providers p ON p.Provider_ID = l.Provider_ID
         {where_clause}
         ORDER BY date(l.Expiry_Date) ASC, l.Food_ID ASC"
    );

    let mut stmt = storage.connection().prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(params), |row| {
        Ok(ListingView {
            food_id: row.get(0)?,
            food_name: row.get(1)?,
            quantity: row.get(2)?,
            expiry_date: date_column(row, 3)?,
            provider_name: row.get(4)?,
            provider_type: row.get(5)?,
            provider_city: row.get(6)?,
            provider_contact: row.get(7)?,
            location: row.get(8)?,
            food_type: row.get(9)?,
            meal_type: row.get(10)?,
        })
    })?;
    rows.collect()
}

/// Runs `sql` and keeps every cell as JSON, under the column names SQLite
/// reports.
fn query_table<P: Params>(
    storage: &Storage,
    title: &str,
    sql: &str,
    params: P,
) -> rusqlite::Result<ReportTable> {
    let mut stmt = storage.connection().prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();
    let width = columns.len();

    let rows = stmt
        .query_map(params, |row| {
            (0..width)
                .map(|idx| row.get_ref(idx).map(json_value))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(ReportTable {
        title: title.to_string(),
        columns,
        rows,
    })
}

fn json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(String::from_utf8_lossy(b).into_owned()),
    }
}

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
