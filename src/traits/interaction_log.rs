use async_trait::async_trait;

use crate::models::error::LogWriteError;
use crate::models::types::InteractionRecord;

/// Append-only sink for interaction records.
///
/// Each `append` must be atomic with respect to concurrent appends: a record is
/// either written whole or not at all.
#[async_trait]
pub trait InteractionLog: Send + Sync {
    async fn append(&self, record: &InteractionRecord) -> Result<(), LogWriteError>;
}
