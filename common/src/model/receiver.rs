use serde::{Deserialize, Serialize};

/// An organisation or person that claims food listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receiver {
    pub receiver_id: i64,
    pub name: String,
    pub receiver_type: Option<String>,
    pub city: Option<String>,
    pub contact: Option<String>,
}
