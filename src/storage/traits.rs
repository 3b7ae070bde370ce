//! Storage trait definitions.

use async_trait::async_trait;

use crate::error::Result;
use crate::query::{Pipeline, ResultRow, Vocabulary};

/// The seam between the query core and a database.
///
/// The core treats both operations as single awaited calls: one atomic read
/// per request, no partial results, no retries. Handles are passed
/// explicitly; the core never reaches for ambient connection state.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// List the known category names (the validation vocabulary).
    async fn categories(&self) -> Result<Vocabulary>;

    /// Execute one aggregation pipeline and collect its rows.
    async fn run(&self, pipeline: &Pipeline) -> Result<Vec<ResultRow>>;
}
