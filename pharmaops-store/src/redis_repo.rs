use async_trait::async_trait;
use pharmaops_core::{OrderSequence, StoreError, StoreResult};
use redis::AsyncCommands;
use tracing::debug;

pub const ORDER_SEQUENCE_KEY: &str = "pharmaops:order_number_seq";

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    pub async fn incr(&self, key: &str) -> redis::RedisResult<i64> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.incr(key, 1).await
    }
}

/// Order ordinals from a Redis counter shared by every process
#[derive(Clone)]
pub struct RedisOrderSequence {
    redis: RedisClient,
    key: String,
}

impl RedisOrderSequence {
    pub fn new(redis: RedisClient) -> Self {
        Self {
            redis,
            key: ORDER_SEQUENCE_KEY.to_string(),
        }
    }
}

#[async_trait]
impl OrderSequence for RedisOrderSequence {
    async fn next_ordinal(&self) -> StoreResult<u64> {
        let next = self
            .redis
            .incr(&self.key)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        debug!("Next order ordinal from {}: {}", self.key, next);
        u64::try_from(next).map_err(|_| StoreError::Serialization(format!("negative ordinal {}", next)))
    }
}
