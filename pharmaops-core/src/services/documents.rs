use pharmaops_order::checklist::ReviewCascade;
use pharmaops_order::{review, Checklist, Document, DocumentStatus, Order, OrderLifecycle, ReviewAction};
use pharmaops_shared::{Actor, AuditAction, AuditEntry, EntityType, Role};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use super::orders::ready_to_ship_entry;
use super::{require_role, require_text, vendor_profile_of, ServiceContext};
use crate::error::{ComplianceError, ComplianceResult};
use crate::repository::DocumentFilter;
use crate::storage::content_hash;

/// Vendor upload for one checklist doc type of an order
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentUpload {
    pub order_id: Uuid,
    pub doc_type: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Product-level SOP upload
#[derive(Debug, Clone, Deserialize)]
pub struct MasterSopUpload {
    pub product_id: Uuid,
    pub doc_type: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

struct Reviewed {
    document: Document,
    previous: DocumentStatus,
    order_ready: Option<Order>,
}

/// Vendor uploads and the QA review gate
pub struct DocumentService {
    ctx: ServiceContext,
}

impl DocumentService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Attach a document to an order. The matching checklist entry goes back to PENDING_REVIEW.
    pub async fn upload_document(&self, actor: &Actor, upload: &DocumentUpload) -> ComplianceResult<Document> {
        require_role(actor, &[Role::Vendor], "upload documents")?;
        let doc_type = require_text(&upload.doc_type, "doc_type")?;
        let file_name = require_text(&upload.file_name, "file_name")?;

        let document = self
            .ctx
            .retrying("upload_document", || {
                self.try_upload(actor, upload.order_id, &doc_type, &file_name, &upload.bytes)
            })
            .await?;

        self.ctx
            .publish(vec![AuditEntry::new(actor, AuditAction::DocumentUploaded, EntityType::Document, document.id)
                .with_change(
                    None,
                    Some(json!({
                        "order_id": document.order_id,
                        "doc_type": document.doc_type,
                        "file_name": document.file_name,
                        "status": document.status,
                    })),
                )])
            .await;
        if let Some(hash) = &document.file_hash {
            self.ctx.anchor_hash(document.id, EntityType::Document, hash).await;
        }

        Ok(document)
    }

    async fn try_upload(
        &self,
        actor: &Actor,
        order_id: Uuid,
        doc_type: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> ComplianceResult<Document> {
        let mut tx = self.ctx.store.begin().await?;

        let vendor = vendor_profile_of(tx.as_mut(), actor)
            .await?
            .ok_or_else(|| ComplianceError::not_found("Vendor profile", actor.user_id))?;
        let order = tx
            .lock_order(actor.company_id, order_id)
            .await?
            .filter(|o| o.vendor_id == vendor.id)
            .ok_or_else(|| ComplianceError::not_found("Order", order_id))?;

        OrderLifecycle::ensure_accepts_uploads(&order)?;

        let stored = self
            .ctx
            .storage
            .store(bytes, file_name, &format!("orders/{}", order.order_number))
            .await
            .map_err(|e| ComplianceError::Storage(e.to_string()))?;

        let document = review::transactional_document(
            &order,
            doc_type,
            file_name,
            stored.locator,
            Some(content_hash(bytes)),
            actor,
        );
        tx.save_document(&document).await?;

        let mut checklist = Checklist::new(tx.find_checklist(order.id).await?);
        match checklist.record_upload(&document) {
            Some(entry) => tx.save_checklist_entry(&entry).await?,
            None => debug!("Order {} has no checklist entry for {}", order.order_number, doc_type),
        }

        tx.commit().await?;

        info!("Document {} uploaded for order {}", document.doc_type, order.order_number);
        Ok(document)
    }

    /// QA decision on a pending document, cascaded into the order's checklist and readiness
    pub async fn review_document(
        &self,
        actor: &Actor,
        document_id: Uuid,
        action: ReviewAction,
        comments: Option<String>,
    ) -> ComplianceResult<Document> {
        require_role(actor, &[Role::Qa, Role::Admin], "review documents")?;

        let reviewed = self
            .ctx
            .retrying("review_document", || {
                self.try_review(actor, document_id, action, comments.clone())
            })
            .await?;

        let document = reviewed.document;
        let audit_action = match document.status {
            DocumentStatus::Rejected => AuditAction::DocumentRejected,
            _ => AuditAction::DocumentApproved,
        };
        let mut entries = vec![AuditEntry::new(actor, audit_action, EntityType::Document, document.id)
            .with_change(
                Some(json!({ "status": reviewed.previous })),
                Some(json!({ "status": document.status })),
            )
            .with_comments(document.review_comments.clone())];
        if let Some(order) = &reviewed.order_ready {
            entries.push(ready_to_ship_entry(actor, order));
        }
        self.ctx.publish(entries).await;

        Ok(document)
    }

    async fn try_review(
        &self,
        actor: &Actor,
        document_id: Uuid,
        action: ReviewAction,
        comments: Option<String>,
    ) -> ComplianceResult<Reviewed> {
        let mut tx = self.ctx.store.begin().await?;

        let order_id = tx
            .get_document(actor.company_id, document_id)
            .await?
            .ok_or_else(|| ComplianceError::not_found("Document", document_id))?
            .order_id;

        // Order before document
        let mut order = match order_id {
            Some(id) => tx.lock_order(actor.company_id, id).await?,
            None => None,
        };
        let mut document = tx
            .lock_document(actor.company_id, document_id)
            .await?
            .ok_or_else(|| ComplianceError::not_found("Document", document_id))?;

        let previous = document.status;
        review::review(&mut document, action, actor, comments)?;
        tx.save_document(&document).await?;

        let mut order_ready = None;
        if let Some(order) = order.as_mut() {
            let mut checklist = Checklist::new(tx.find_checklist(order.id).await?);
            match checklist.record_review(&document) {
                ReviewCascade::Updated(entry) => tx.save_checklist_entry(&entry).await?,
                ReviewCascade::NoEntry => debug!(
                    "Order {} has no checklist entry for {}",
                    order.order_number, document.doc_type
                ),
            }

            if OrderLifecycle::recompute_readiness(order, checklist.entries()) {
                tx.save_order(order).await?;
                info!("Order {} is ready to ship", order.order_number);
                order_ready = Some(order.clone());
            }
        }

        tx.commit().await?;

        info!("Document {} {}", document.id, document.status);
        Ok(Reviewed {
            document,
            previous,
            order_ready,
        })
    }

    /// Documents waiting for QA, newest first
    pub async fn pending_documents(&self, actor: &Actor) -> ComplianceResult<Vec<Document>> {
        require_role(actor, &[Role::Qa, Role::Admin], "list pending documents")?;
        let mut tx = self.ctx.store.begin().await?;
        Ok(tx
            .find_documents(actor.company_id, &DocumentFilter::with_status(DocumentStatus::PendingReview))
            .await?)
    }

    pub async fn get_document(&self, actor: &Actor, document_id: Uuid) -> ComplianceResult<Document> {
        require_role(actor, &[Role::Admin, Role::Qa, Role::Auditor], "view documents")?;
        let mut tx = self.ctx.store.begin().await?;
        tx.get_document(actor.company_id, document_id)
            .await?
            .ok_or_else(|| ComplianceError::not_found("Document", document_id))
    }
}
