use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pharmaops_shared::EntityType;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::BoxError;

/// Proof that a content hash was written to a ledger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnchorReceipt {
    pub id: Uuid,
    pub entity_id: Uuid,
    pub entity_type: EntityType,
    pub data_hash: String,
    pub tx_hash: String,
    pub block_timestamp: DateTime<Utc>,
    pub network: String,
}

#[async_trait]
pub trait AnchorService: Send + Sync {
    async fn anchor(
        &self,
        entity_id: Uuid,
        entity_type: EntityType,
        hash: &str,
    ) -> Result<AnchorReceipt, BoxError>;
}

/// Pretends to anchor on a chain and hands back a random transaction hash
pub struct MockAnchor;

#[async_trait]
impl AnchorService for MockAnchor {
    async fn anchor(
        &self,
        entity_id: Uuid,
        entity_type: EntityType,
        hash: &str,
    ) -> Result<AnchorReceipt, BoxError> {
        let tx_bytes: [u8; 32] = rand::thread_rng().gen();

        tracing::debug!("Anchoring {} {} with hash {}", entity_type, entity_id, hash);

        Ok(AnchorReceipt {
            id: Uuid::new_v4(),
            entity_id,
            entity_type,
            data_hash: hash.to_string(),
            tx_hash: format!("0x{}", hex::encode(tx_bytes)),
            block_timestamp: Utc::now(),
            network: "mock".to_string(),
        })
    }
}
