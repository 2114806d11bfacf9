use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::BoxError;

/// Where an uploaded file ended up
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub locator: String,
}

#[async_trait]
pub trait DocumentStorage: Send + Sync {
    async fn store(&self, bytes: &[u8], file_name: &str, folder: &str) -> Result<StoredObject, BoxError>;
}

/// Accepts every upload without keeping the bytes and returns an S3-style locator
pub struct MockStorage {
    bucket: String,
}

impl MockStorage {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
        }
    }
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new("pharmaops-documents")
    }
}

#[async_trait]
impl DocumentStorage for MockStorage {
    async fn store(&self, bytes: &[u8], file_name: &str, folder: &str) -> Result<StoredObject, BoxError> {
        let key = format!("{}/{}-{}", folder, chrono::Utc::now().timestamp_millis(), file_name);

        tracing::debug!("Storing {} bytes at {}", bytes.len(), key);

        Ok(StoredObject {
            locator: format!("s3://{}/{}", self.bucket, key),
            key,
        })
    }
}

/// Lowercase hex SHA-256 of the content
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash() {
        assert_eq!(
            content_hash(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn test_mock_storage_locator() {
        let storage = MockStorage::new("docs");
        let stored = storage.store(b"pdf", "coa.pdf", "orders/ORD-00001").await.unwrap();

        assert!(stored.key.starts_with("orders/ORD-00001/"));
        assert!(stored.key.ends_with("-coa.pdf"));
        assert_eq!(stored.locator, format!("s3://docs/{}", stored.key));
    }
}
