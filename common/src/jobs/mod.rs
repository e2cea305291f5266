use serde::{Deserialize, Serialize};

/// Lifecycle of a background job as seen by a polling client.
///
/// `InProgress` carries the number of rows handled so far. `Completed`
/// carries a JSON document describing the result (for imports, the
/// serialized import reports).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    InProgress(u32),
    Completed(String),
    Failed(String),
}
