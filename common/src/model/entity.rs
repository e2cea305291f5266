use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The four tables fed by CSV import.
///
/// Each kind knows the table it lands in, the CSV header it expects (column
/// names are shared between CSV and database) and which other kinds its rows
/// reference. The declaration order is the order imports must run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Providers,
    Receivers,
    FoodListings,
    Claims,
}

impl EntityKind {
    /// Referenced kinds always come before the kinds that reference them.
    pub const IMPORT_ORDER: [EntityKind; 4] = [
        EntityKind::Providers,
        EntityKind::Receivers,
        EntityKind::FoodListings,
        EntityKind::Claims,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Providers => "providers",
            EntityKind::Receivers => "receivers",
            EntityKind::FoodListings => "food_listings",
            EntityKind::Claims => "claims",
        }
    }

    pub fn id_column(&self) -> &'static str {
        match self {
            EntityKind::Providers => "Provider_ID",
            EntityKind::Receivers => "Receiver_ID",
            EntityKind::FoodListings => "Food_ID",
            EntityKind::Claims => "Claim_ID",
        }
    }

    /// Every column of the table, which is also the required CSV header.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Providers => &["Provider_ID", "Name", "Type", "Address", "City", "Contact"],
            EntityKind::Receivers => &["Receiver_ID", "Name", "Type", "City", "Contact"],
            EntityKind::FoodListings => &[
                "Food_ID",
                "Food_Name",
                "Quantity",
                "Expiry_Date",
                "Provider_ID",
                "Provider_Type",
                "Location",
                "Food_Type",
                "Meal_Type",
            ],
            EntityKind::Claims => &["Claim_ID", "Food_ID", "Receiver_ID", "Status", "Timestamp"],
        }
    }

    /// Kinds whose identifiers must already exist before rows of this kind
    /// can be accepted.
    pub fn references(&self) -> &'static [EntityKind] {
        match self {
            EntityKind::Providers | EntityKind::Receivers => &[],
            EntityKind::FoodListings => &[EntityKind::Providers],
            EntityKind::Claims => &[EntityKind::FoodListings, EntityKind::Receivers],
        }
    }

    /// File name used for this kind inside a data directory.
    pub fn source_file_name(&self) -> &'static str {
        match self {
            EntityKind::Providers => "providers_data.csv",
            EntityKind::Receivers => "receivers_data.csv",
            EntityKind::FoodListings => "food_listings_data.csv",
            EntityKind::Claims => "claims_data.csv",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown entity kind '{0}'")]
pub struct UnknownEntityKind(pub String);

impl FromStr for EntityKind {
    type Err = UnknownEntityKind;

    /// Accepts table names as well as the singular and hyphenated spellings
    /// used on the command line and in upload requests.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "providers" | "provider" => Ok(EntityKind::Providers),
            "receivers" | "receiver" => Ok(EntityKind::Receivers),
            "food_listings" | "food_listing" | "listings" => Ok(EntityKind::FoodListings),
            "claims" | "claim" => Ok(EntityKind::Claims),
            _ => Err(UnknownEntityKind(s.to_string())),
        }
    }
}
