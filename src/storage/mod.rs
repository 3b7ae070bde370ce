//! Storage backends for payment records.

pub mod memory;
pub mod mongo;
pub mod traits;

use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use traits::PaymentStore;

/// One stored payment record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// When the payment happened.
    pub dt: NaiveDateTime,
    /// Vocabulary dimension used for filtering and grouping.
    pub category: String,
    /// Payment value.
    pub value: f64,
}

/// Load a payment list from a JSON file holding an array of records, the
/// seed format consumed by `tally seed`.
pub fn load_payments(path: impl AsRef<Path>) -> Result<Vec<Payment>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
