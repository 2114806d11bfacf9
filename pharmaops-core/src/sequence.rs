use async_trait::async_trait;

use crate::repository::StoreResult;

/// Source of order-number ordinals. Every call returns a value no other
/// caller has seen, even under concurrent use.
#[async_trait]
pub trait OrderSequence: Send + Sync {
    async fn next_ordinal(&self) -> StoreResult<u64>;
}
