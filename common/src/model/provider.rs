use serde::{Deserialize, Serialize};

/// An organisation that supplies food listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub provider_id: i64,
    pub name: String,
    pub provider_type: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub contact: Option<String>,
}
