use pharmaops_catalog::VendorProfile;
use pharmaops_shared::{Actor, AuditEntry, EntityType, Role};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::anchor::{AnchorReceipt, AnchorService};
use crate::audit::AuditSink;
use crate::error::{ComplianceError, ComplianceResult};
use crate::repository::{ComplianceStore, StoreError, StoreResult, StoreTransaction};
use crate::sequence::OrderSequence;
use crate::settings::WorkflowSettings;
use crate::storage::DocumentStorage;

pub mod catalog;
pub mod documents;
pub mod orders;
pub mod trace;

pub use catalog::CatalogService;
pub use documents::{DocumentService, DocumentUpload, MasterSopUpload};
pub use orders::{OrderService, VendorOrderView};
pub use trace::{TraceService, Workload};

/// Collaborators shared by every service, built once at startup
#[derive(Clone)]
pub struct ServiceContext {
    pub store: Arc<dyn ComplianceStore>,
    pub sequence: Arc<dyn OrderSequence>,
    pub audit: Arc<dyn AuditSink>,
    pub storage: Arc<dyn DocumentStorage>,
    pub anchor: Arc<dyn AnchorService>,
    pub settings: WorkflowSettings,
}

impl ServiceContext {
    /// Run `attempt`, replaying it when the store reports a conflict
    pub(crate) async fn retrying<T, F, Fut>(&self, operation: &'static str, mut attempt: F) -> ComplianceResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ComplianceResult<T>>,
    {
        let mut retries = 0;
        loop {
            match attempt().await {
                Err(e) if e.is_retryable() && retries < self.settings.conflict_retries => {
                    retries += 1;
                    warn!(
                        "{} conflicted, retrying ({}/{}): {}",
                        operation, retries, self.settings.conflict_retries, e
                    );
                }
                result => return result,
            }
        }
    }

    /// Hand committed audit entries to the sink. Failures are logged only.
    pub(crate) async fn publish(&self, entries: Vec<AuditEntry>) {
        for entry in &entries {
            if let Err(e) = self.audit.record(entry).await {
                warn!("Failed to record audit entry {} on {}: {}", entry.action, entry.entity_type, e);
            }
        }
    }

    /// Anchor a content hash and keep the receipt. Failures are logged only.
    pub(crate) async fn anchor_hash(&self, entity_id: Uuid, entity_type: EntityType, hash: &str) {
        let receipt = match self.anchor.anchor(entity_id, entity_type, hash).await {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!("Anchoring {} {} failed: {}", entity_type, entity_id, e);
                return;
            }
        };

        match self.save_receipt(&receipt).await {
            Ok(()) => debug!("Anchored {} {} in tx {}", entity_type, entity_id, receipt.tx_hash),
            Err(e) => warn!("Failed to save anchor receipt for {} {}: {}", entity_type, entity_id, e),
        }
    }

    async fn save_receipt(&self, receipt: &AnchorReceipt) -> StoreResult<()> {
        let mut tx = self.store.begin().await?;
        tx.save_anchor(receipt).await?;
        tx.commit().await
    }
}

pub(crate) fn require_role(actor: &Actor, allowed: &[Role], operation: &str) -> ComplianceResult<()> {
    if actor.has_role(allowed) {
        return Ok(());
    }
    Err(ComplianceError::Forbidden(format!(
        "role {} may not {}",
        actor.role, operation
    )))
}

/// The caller's vendor profile, if it belongs to the caller's company
pub(crate) async fn vendor_profile_of(
    tx: &mut dyn StoreTransaction,
    actor: &Actor,
) -> ComplianceResult<Option<VendorProfile>> {
    let profile = tx.find_vendor_by_user(actor.user_id).await?;
    Ok(profile.filter(|v| v.company_id == actor.company_id))
}

pub(crate) fn require_text(value: &str, field: &str) -> ComplianceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ComplianceError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// A unique-key conflict on insert means a concurrent caller claimed the key after
/// our existence check; report it the same way the check would have.
pub(crate) fn duplicate_as_validation(err: StoreError, message: impl FnOnce() -> String) -> ComplianceError {
    match err {
        StoreError::Conflict(_) => ComplianceError::Validation(message()),
        other => other.into(),
    }
}

/// All workflow services over one set of collaborators
pub struct ComplianceServices {
    pub catalog: CatalogService,
    pub orders: OrderService,
    pub documents: DocumentService,
    pub trace: TraceService,
}

impl ComplianceServices {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            catalog: CatalogService::new(ctx.clone()),
            orders: OrderService::new(ctx.clone()),
            documents: DocumentService::new(ctx.clone()),
            trace: TraceService::new(ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_guard() {
        let qa = Actor::new(Uuid::new_v4(), Uuid::new_v4(), Role::Qa);
        assert!(require_role(&qa, &[Role::Qa, Role::Admin], "review documents").is_ok());

        let err = require_role(&qa, &[Role::Vendor], "upload documents").unwrap_err();
        assert_eq!(err.to_string(), "Forbidden: role QA may not upload documents");
    }

    #[test]
    fn test_require_text() {
        assert_eq!(require_text("  CoA ", "doc_type").unwrap(), "CoA");
        assert!(matches!(require_text("   ", "doc_type"), Err(ComplianceError::Validation(_))));
    }

    #[test]
    fn test_duplicate_insert_is_a_validation_error() {
        let err = duplicate_as_validation(StoreError::Conflict("duplicate key value".into()), || {
            "Product with SKU PARA-500 already exists".to_string()
        });
        assert_eq!(err.to_string(), "Validation failed: Product with SKU PARA-500 already exists");

        let err = duplicate_as_validation(StoreError::Backend("connection reset".into()), || unreachable!());
        assert!(matches!(err, ComplianceError::Storage(_)));
    }
}
