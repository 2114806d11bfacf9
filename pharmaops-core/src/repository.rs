use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pharmaops_catalog::{ComplianceRequirement, Product, VendorProfile};
use pharmaops_order::{ChecklistEntry, Document, DocumentStatus, Order, Shipment};
use pharmaops_shared::{AuditAction, AuditEntry, EntityType};
use uuid::Uuid;

use crate::anchor::AnchorReceipt;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Serialization failure, deadlock or unique violation
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentFilter {
    pub order_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub status: Option<DocumentStatus>,
}

impl DocumentFilter {
    pub fn for_order(order_id: Uuid) -> Self {
        Self {
            order_id: Some(order_id),
            ..Default::default()
        }
    }

    pub fn with_status(status: DocumentStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.order_id.map_or(true, |id| doc.order_id == Some(id))
            && self.product_id.map_or(true, |id| doc.product_id == Some(id))
            && self.status.map_or(true, |s| doc.status == s)
    }
}

/// Audit trail query. Empty `entity_ids` means any entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub entity_type: Option<EntityType>,
    pub entity_ids: Vec<Uuid>,
    pub action: Option<AuditAction>,
    pub limit: usize,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            entity_type: None,
            entity_ids: Vec::new(),
            action: None,
            limit: 100,
        }
    }
}

impl AuditQuery {
    pub fn for_entities(entity_ids: Vec<Uuid>, limit: usize) -> Self {
        Self {
            entity_ids,
            limit,
            ..Default::default()
        }
    }

    pub fn matches(&self, entry: &AuditEntry) -> bool {
        self.start.map_or(true, |s| entry.timestamp >= s)
            && self.end.map_or(true, |e| entry.timestamp <= e)
            && self.entity_type.map_or(true, |t| entry.entity_type == t)
            && self.action.map_or(true, |a| entry.action == a)
            && (self.entity_ids.is_empty()
                || entry.entity_id.is_some_and(|id| self.entity_ids.contains(&id)))
    }
}

/// Entry point to the backing store
#[async_trait]
pub trait ComplianceStore: Send + Sync {
    /// Open a unit of work. Dropping it without `commit` discards every change.
    async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>>;
}

/// One unit of work. `lock_*` reads take a row lock held until commit or drop;
/// callers lock the order before its documents. Reads are scoped by company
/// where the entity carries one. Lists of orders and documents come back newest first.
#[async_trait]
pub trait StoreTransaction: Send {
    async fn get_product(&mut self, company_id: Uuid, id: Uuid) -> StoreResult<Option<Product>>;
    async fn find_product_by_sku(&mut self, sku: &str) -> StoreResult<Option<Product>>;
    async fn find_products(&mut self, company_id: Uuid) -> StoreResult<Vec<Product>>;
    async fn save_product(&mut self, product: &Product) -> StoreResult<()>;

    async fn get_vendor(&mut self, company_id: Uuid, id: Uuid) -> StoreResult<Option<VendorProfile>>;
    async fn find_vendor_by_user(&mut self, user_id: Uuid) -> StoreResult<Option<VendorProfile>>;
    async fn find_vendors(&mut self, company_id: Uuid) -> StoreResult<Vec<VendorProfile>>;
    async fn save_vendor(&mut self, vendor: &VendorProfile) -> StoreResult<()>;

    /// Requirements of one product in definition order
    async fn find_requirements(&mut self, company_id: Uuid, product_id: Uuid) -> StoreResult<Vec<ComplianceRequirement>>;
    async fn save_requirement(&mut self, requirement: &ComplianceRequirement) -> StoreResult<()>;

    async fn get_order(&mut self, company_id: Uuid, id: Uuid) -> StoreResult<Option<Order>>;
    async fn lock_order(&mut self, company_id: Uuid, id: Uuid) -> StoreResult<Option<Order>>;
    async fn find_orders(&mut self, company_id: Uuid, vendor_id: Option<Uuid>) -> StoreResult<Vec<Order>>;
    async fn count_orders(&mut self, company_id: Uuid) -> StoreResult<u64>;
    async fn save_order(&mut self, order: &Order) -> StoreResult<()>;

    async fn find_checklist(&mut self, order_id: Uuid) -> StoreResult<Vec<ChecklistEntry>>;
    async fn save_checklist_entry(&mut self, entry: &ChecklistEntry) -> StoreResult<()>;

    async fn get_document(&mut self, company_id: Uuid, id: Uuid) -> StoreResult<Option<Document>>;
    async fn lock_document(&mut self, company_id: Uuid, id: Uuid) -> StoreResult<Option<Document>>;
    async fn find_documents(&mut self, company_id: Uuid, filter: &DocumentFilter) -> StoreResult<Vec<Document>>;
    async fn count_documents(&mut self, company_id: Uuid, filter: &DocumentFilter) -> StoreResult<u64>;
    async fn save_document(&mut self, document: &Document) -> StoreResult<()>;

    async fn find_shipments(&mut self, order_id: Uuid) -> StoreResult<Vec<Shipment>>;
    async fn save_shipment(&mut self, shipment: &Shipment) -> StoreResult<()>;

    /// Append only; entries are never updated
    async fn append_audit(&mut self, entry: &AuditEntry) -> StoreResult<()>;
    /// Newest first, at most `query.limit` entries
    async fn find_audit(&mut self, company_id: Uuid, query: &AuditQuery) -> StoreResult<Vec<AuditEntry>>;

    async fn save_anchor(&mut self, receipt: &AnchorReceipt) -> StoreResult<()>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;
}
