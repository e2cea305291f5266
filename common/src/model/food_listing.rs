use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A quantity of one food item offered by a provider until its expiry date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodListing {
    pub food_id: i64,
    pub food_name: String,
    /// Never negative.
    pub quantity: i64,
    pub expiry_date: NaiveDate,
    pub provider_id: i64,
    pub provider_type: Option<String>,
    pub location: Option<String>,
    pub food_type: Option<String>,
    pub meal_type: Option<String>,
}
