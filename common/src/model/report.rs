use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Narrows the listing browser. Empty vectors mean "no restriction"; values
/// inside one vector are alternatives, separate vectors must all match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingFilter {
    pub locations: Vec<String>,
    pub provider_names: Vec<String>,
    pub food_types: Vec<String>,
}

/// A food listing joined with the provider that offers it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingView {
    pub food_id: i64,
    pub food_name: String,
    pub quantity: i64,
    pub expiry_date: NaiveDate,
    pub provider_name: Option<String>,
    pub provider_type: Option<String>,
    pub provider_city: Option<String>,
    pub provider_contact: Option<String>,
    pub location: Option<String>,
    pub food_type: Option<String>,
    pub meal_type: Option<String>,
}

/// A read-only result table, shaped for direct rendering by a dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTable {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

/// Provider and receiver contact lists, as shown on a directory page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactDirectory {
    pub providers: ReportTable,
    pub receivers: ReportTable,
    /// Receivers with at least one claim, each listed once.
    pub claiming_receivers: ReportTable,
}
