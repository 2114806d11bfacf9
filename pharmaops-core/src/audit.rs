use async_trait::async_trait;
use pharmaops_shared::AuditEntry;
use std::sync::Arc;

use crate::repository::ComplianceStore;
use crate::BoxError;

/// Fire-and-forget audit writer. Callers log failures and carry on.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, entry: &AuditEntry) -> Result<(), BoxError>;
}

/// Writes each entry to the audit trail in its own transaction
pub struct StoreAuditSink {
    store: Arc<dyn ComplianceStore>,
}

impl StoreAuditSink {
    pub fn new(store: Arc<dyn ComplianceStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuditSink for StoreAuditSink {
    async fn record(&self, entry: &AuditEntry) -> Result<(), BoxError> {
        let mut tx = self.store.begin().await?;
        tx.append_audit(entry).await?;
        tx.commit().await?;
        Ok(())
    }
}

/// Forwards to several sinks. Every sink is tried; the first error is returned.
pub struct FanoutAuditSink {
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl FanoutAuditSink {
    pub fn new(sinks: Vec<Arc<dyn AuditSink>>) -> Self {
        Self { sinks }
    }
}

#[async_trait]
impl AuditSink for FanoutAuditSink {
    async fn record(&self, entry: &AuditEntry) -> Result<(), BoxError> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = sink.record(entry).await {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
