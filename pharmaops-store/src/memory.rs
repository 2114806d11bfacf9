use async_trait::async_trait;
use pharmaops_catalog::{ComplianceRequirement, Product, VendorProfile};
use pharmaops_core::{
    AnchorReceipt, AuditQuery, ComplianceServices, ComplianceStore, DocumentFilter, MockAnchor, MockStorage,
    OrderSequence, ServiceContext, StoreAuditSink, StoreError, StoreResult, StoreTransaction, WorkflowSettings,
};
use pharmaops_order::{ChecklistEntry, Document, Order, Shipment};
use pharmaops_shared::AuditEntry;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
struct MemoryState {
    products: Vec<Product>,
    vendors: Vec<VendorProfile>,
    requirements: Vec<ComplianceRequirement>,
    orders: Vec<Order>,
    checklist: Vec<ChecklistEntry>,
    documents: Vec<Document>,
    shipments: Vec<Shipment>,
    audit: Vec<AuditEntry>,
    anchors: Vec<AnchorReceipt>,
}

/// Process-local store. Transactions are serialized by one async mutex and
/// work on a staged copy that replaces the live state on commit.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored anchor receipt, oldest first
    pub async fn anchors(&self) -> Vec<AnchorReceipt> {
        self.state.lock().await.anchors.clone()
    }
}

#[async_trait]
impl ComplianceStore for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryTransaction { guard, staged }))
    }
}

struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

/// Replace the row with the same id or append a new one
fn upsert<T: Clone>(rows: &mut Vec<T>, row: &T, same: impl Fn(&T) -> bool) {
    match rows.iter_mut().find(|r| same(r)) {
        Some(existing) => *existing = row.clone(),
        None => rows.push(row.clone()),
    }
}

/// Newest first; rows created at the same instant keep reverse insertion order
fn newest_first<T: Clone, K: Ord>(rows: impl DoubleEndedIterator<Item = T>, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut out: Vec<T> = rows.rev().collect();
    out.sort_by(|a, b| key(b).cmp(&key(a)));
    out
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn get_product(&mut self, company_id: Uuid, id: Uuid) -> StoreResult<Option<Product>> {
        Ok(self
            .staged
            .products
            .iter()
            .find(|p| p.id == id && p.company_id == company_id)
            .cloned())
    }

    async fn find_product_by_sku(&mut self, sku: &str) -> StoreResult<Option<Product>> {
        Ok(self.staged.products.iter().find(|p| p.sku == sku).cloned())
    }

    async fn find_products(&mut self, company_id: Uuid) -> StoreResult<Vec<Product>> {
        Ok(self
            .staged
            .products
            .iter()
            .filter(|p| p.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn save_product(&mut self, product: &Product) -> StoreResult<()> {
        if self.staged.products.iter().any(|p| p.sku == product.sku && p.id != product.id) {
            return Err(StoreError::Conflict(format!("duplicate sku {}", product.sku)));
        }
        upsert(&mut self.staged.products, product, |p| p.id == product.id);
        Ok(())
    }

    async fn get_vendor(&mut self, company_id: Uuid, id: Uuid) -> StoreResult<Option<VendorProfile>> {
        Ok(self
            .staged
            .vendors
            .iter()
            .find(|v| v.id == id && v.company_id == company_id)
            .cloned())
    }

    async fn find_vendor_by_user(&mut self, user_id: Uuid) -> StoreResult<Option<VendorProfile>> {
        Ok(self.staged.vendors.iter().find(|v| v.user_id == user_id).cloned())
    }

    async fn find_vendors(&mut self, company_id: Uuid) -> StoreResult<Vec<VendorProfile>> {
        Ok(self
            .staged
            .vendors
            .iter()
            .filter(|v| v.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn save_vendor(&mut self, vendor: &VendorProfile) -> StoreResult<()> {
        if self.staged.vendors.iter().any(|v| v.user_id == vendor.user_id && v.id != vendor.id) {
            return Err(StoreError::Conflict(format!("user {} already has a vendor profile", vendor.user_id)));
        }
        upsert(&mut self.staged.vendors, vendor, |v| v.id == vendor.id);
        Ok(())
    }

    async fn find_requirements(&mut self, company_id: Uuid, product_id: Uuid) -> StoreResult<Vec<ComplianceRequirement>> {
        Ok(self
            .staged
            .requirements
            .iter()
            .filter(|r| r.company_id == company_id && r.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn save_requirement(&mut self, requirement: &ComplianceRequirement) -> StoreResult<()> {
        upsert(&mut self.staged.requirements, requirement, |r| r.id == requirement.id);
        Ok(())
    }

    async fn get_order(&mut self, company_id: Uuid, id: Uuid) -> StoreResult<Option<Order>> {
        Ok(self
            .staged
            .orders
            .iter()
            .find(|o| o.id == id && o.company_id == company_id)
            .cloned())
    }

    async fn lock_order(&mut self, company_id: Uuid, id: Uuid) -> StoreResult<Option<Order>> {
        // The transaction already holds the whole store
        self.get_order(company_id, id).await
    }

    async fn find_orders(&mut self, company_id: Uuid, vendor_id: Option<Uuid>) -> StoreResult<Vec<Order>> {
        let rows = self
            .staged
            .orders
            .iter()
            .filter(|o| o.company_id == company_id && vendor_id.map_or(true, |v| o.vendor_id == v))
            .cloned()
            .collect::<Vec<_>>();
        Ok(newest_first(rows.into_iter(), |o| o.created_at))
    }

    async fn count_orders(&mut self, company_id: Uuid) -> StoreResult<u64> {
        Ok(self.staged.orders.iter().filter(|o| o.company_id == company_id).count() as u64)
    }

    async fn save_order(&mut self, order: &Order) -> StoreResult<()> {
        if self
            .staged
            .orders
            .iter()
            .any(|o| o.order_number == order.order_number && o.id != order.id)
        {
            return Err(StoreError::Conflict(format!("duplicate order number {}", order.order_number)));
        }
        upsert(&mut self.staged.orders, order, |o| o.id == order.id);
        Ok(())
    }

    async fn find_checklist(&mut self, order_id: Uuid) -> StoreResult<Vec<ChecklistEntry>> {
        Ok(self
            .staged
            .checklist
            .iter()
            .filter(|e| e.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn save_checklist_entry(&mut self, entry: &ChecklistEntry) -> StoreResult<()> {
        if self
            .staged
            .checklist
            .iter()
            .any(|e| e.order_id == entry.order_id && e.doc_type == entry.doc_type && e.id != entry.id)
        {
            return Err(StoreError::Conflict(format!(
                "order {} already tracks {}",
                entry.order_id, entry.doc_type
            )));
        }
        upsert(&mut self.staged.checklist, entry, |e| e.id == entry.id);
        Ok(())
    }

    async fn get_document(&mut self, company_id: Uuid, id: Uuid) -> StoreResult<Option<Document>> {
        Ok(self
            .staged
            .documents
            .iter()
            .find(|d| d.id == id && d.company_id == company_id)
            .cloned())
    }

    async fn lock_document(&mut self, company_id: Uuid, id: Uuid) -> StoreResult<Option<Document>> {
        self.get_document(company_id, id).await
    }

    async fn find_documents(&mut self, company_id: Uuid, filter: &DocumentFilter) -> StoreResult<Vec<Document>> {
        let rows = self
            .staged
            .documents
            .iter()
            .filter(|d| d.company_id == company_id && filter.matches(d))
            .cloned()
            .collect::<Vec<_>>();
        Ok(newest_first(rows.into_iter(), |d| d.created_at))
    }

    async fn count_documents(&mut self, company_id: Uuid, filter: &DocumentFilter) -> StoreResult<u64> {
        Ok(self
            .staged
            .documents
            .iter()
            .filter(|d| d.company_id == company_id && filter.matches(d))
            .count() as u64)
    }

    async fn save_document(&mut self, document: &Document) -> StoreResult<()> {
        upsert(&mut self.staged.documents, document, |d| d.id == document.id);
        Ok(())
    }

    async fn find_shipments(&mut self, order_id: Uuid) -> StoreResult<Vec<Shipment>> {
        Ok(self
            .staged
            .shipments
            .iter()
            .filter(|s| s.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn save_shipment(&mut self, shipment: &Shipment) -> StoreResult<()> {
        upsert(&mut self.staged.shipments, shipment, |s| s.id == shipment.id);
        Ok(())
    }

    async fn append_audit(&mut self, entry: &AuditEntry) -> StoreResult<()> {
        if self.staged.audit.iter().any(|a| a.id == entry.id) {
            return Err(StoreError::Conflict(format!("audit entry {} already written", entry.id)));
        }
        self.staged.audit.push(entry.clone());
        Ok(())
    }

    async fn find_audit(&mut self, company_id: Uuid, query: &AuditQuery) -> StoreResult<Vec<AuditEntry>> {
        let rows = self
            .staged
            .audit
            .iter()
            .filter(|a| a.company_id == company_id && query.matches(a))
            .cloned()
            .collect::<Vec<_>>();
        let mut rows = newest_first(rows.into_iter(), |a| a.timestamp);
        rows.truncate(query.limit);
        Ok(rows)
    }

    async fn save_anchor(&mut self, receipt: &AnchorReceipt) -> StoreResult<()> {
        upsert(&mut self.staged.anchors, receipt, |a| a.id == receipt.id);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTransaction { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }
}

/// Atomic in-process ordinal counter
#[derive(Debug, Default)]
pub struct MemorySequence {
    last: AtomicU64,
}

impl MemorySequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue after an existing ordinal
    pub fn starting_after(last: u64) -> Self {
        Self {
            last: AtomicU64::new(last),
        }
    }
}

#[async_trait]
impl OrderSequence for MemorySequence {
    async fn next_ordinal(&self) -> StoreResult<u64> {
        Ok(self.last.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// Services wired to a fresh in-memory store and mock collaborators
pub fn in_memory_services(settings: WorkflowSettings) -> (ComplianceServices, MemoryStore) {
    let store = MemoryStore::new();
    let shared: Arc<dyn ComplianceStore> = Arc::new(store.clone());

    let ctx = ServiceContext {
        store: shared.clone(),
        sequence: Arc::new(MemorySequence::new()),
        audit: Arc::new(StoreAuditSink::new(shared)),
        storage: Arc::new(MockStorage::default()),
        anchor: Arc::new(MockAnchor),
        settings,
    };

    (ComplianceServices::new(ctx), store)
}
