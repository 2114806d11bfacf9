use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pharmaops_catalog::{ComplianceRequirement, Product, VendorProfile};
use pharmaops_core::{AnchorReceipt, AuditQuery, DocumentFilter, StoreError, StoreResult, StoreTransaction};
use pharmaops_order::{ChecklistEntry, Document, Order, Shipment};
use pharmaops_shared::AuditEntry;
use serde_json::Value;
use sqlx::{Postgres, Transaction};
use std::str::FromStr;
use uuid::Uuid;

use crate::database::db_error;

fn parse<T: FromStr<Err = String>>(value: &str) -> StoreResult<T> {
    value.parse().map_err(StoreError::Serialization)
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    sku: String,
    description: Option<String>,
    company_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            sku: row.sku,
            description: row.description,
            company_id: row.company_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct VendorRow {
    id: Uuid,
    user_id: Uuid,
    company_name: String,
    license_number: Option<String>,
    warehouse_address: Option<String>,
    capacity: i32,
    status: String,
    company_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<VendorRow> for VendorProfile {
    type Error = StoreError;

    fn try_from(row: VendorRow) -> StoreResult<Self> {
        Ok(VendorProfile {
            id: row.id,
            user_id: row.user_id,
            company_name: row.company_name,
            license_number: row.license_number,
            warehouse_address: row.warehouse_address,
            capacity: row.capacity,
            status: parse(&row.status)?,
            company_id: row.company_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RequirementRow {
    id: Uuid,
    product_id: Uuid,
    destination: String,
    doc_type: String,
    category: String,
    requirement: String,
    company_id: Uuid,
    created_at: DateTime<Utc>,
}

impl TryFrom<RequirementRow> for ComplianceRequirement {
    type Error = StoreError;

    fn try_from(row: RequirementRow) -> StoreResult<Self> {
        Ok(ComplianceRequirement {
            id: row.id,
            product_id: row.product_id,
            destination: row.destination,
            doc_type: row.doc_type,
            category: parse(&row.category)?,
            requirement: row.requirement,
            company_id: row.company_id,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    order_number: String,
    vendor_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    destination: String,
    status: String,
    company_id: Uuid,
    created_by_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> StoreResult<Self> {
        Ok(Order {
            id: row.id,
            order_number: row.order_number,
            vendor_id: row.vendor_id,
            product_id: row.product_id,
            quantity: row.quantity,
            destination: row.destination,
            status: parse(&row.status)?,
            company_id: row.company_id,
            created_by_id: row.created_by_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ChecklistRow {
    id: Uuid,
    order_id: Uuid,
    requirement_id: Option<Uuid>,
    doc_type: String,
    category: String,
    required: bool,
    status: String,
    uploaded_doc_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ChecklistRow> for ChecklistEntry {
    type Error = StoreError;

    fn try_from(row: ChecklistRow) -> StoreResult<Self> {
        Ok(ChecklistEntry {
            id: row.id,
            order_id: row.order_id,
            requirement_id: row.requirement_id,
            doc_type: row.doc_type,
            category: parse(&row.category)?,
            required: row.required,
            status: parse(&row.status)?,
            uploaded_doc_id: row.uploaded_doc_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: Uuid,
    doc_type: String,
    file_name: String,
    locator: String,
    file_hash: Option<String>,
    status: String,
    category: String,
    company_id: Uuid,
    uploaded_by_id: Uuid,
    order_id: Option<Uuid>,
    product_id: Option<Uuid>,
    reviewed_by_id: Option<Uuid>,
    reviewed_at: Option<DateTime<Utc>>,
    review_comments: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DocumentRow> for Document {
    type Error = StoreError;

    fn try_from(row: DocumentRow) -> StoreResult<Self> {
        Ok(Document {
            id: row.id,
            doc_type: row.doc_type,
            file_name: row.file_name,
            locator: row.locator,
            file_hash: row.file_hash,
            status: parse(&row.status)?,
            category: parse(&row.category)?,
            company_id: row.company_id,
            uploaded_by_id: row.uploaded_by_id,
            order_id: row.order_id,
            product_id: row.product_id,
            reviewed_by_id: row.reviewed_by_id,
            reviewed_at: row.reviewed_at,
            review_comments: row.review_comments,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ShipmentRow {
    id: Uuid,
    order_id: Uuid,
    order_number: String,
    tracking_number: String,
    courier: String,
    status: String,
    location: Option<String>,
    company_id: Uuid,
    created_by_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ShipmentRow> for Shipment {
    type Error = StoreError;

    fn try_from(row: ShipmentRow) -> StoreResult<Self> {
        Ok(Shipment {
            id: row.id,
            order_id: row.order_id,
            order_number: row.order_number,
            tracking_number: row.tracking_number,
            courier: row.courier,
            status: parse(&row.status)?,
            location: row.location,
            company_id: row.company_id,
            created_by_id: row.created_by_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AuditRow {
    id: Uuid,
    company_id: Uuid,
    actor_user_id: Uuid,
    action: String,
    entity_id: Option<Uuid>,
    entity_type: String,
    old_value: Option<Value>,
    new_value: Option<Value>,
    comments: Option<String>,
    occurred_at: DateTime<Utc>,
}

impl TryFrom<AuditRow> for AuditEntry {
    type Error = StoreError;

    fn try_from(row: AuditRow) -> StoreResult<Self> {
        Ok(AuditEntry {
            id: row.id,
            company_id: row.company_id,
            actor_user_id: row.actor_user_id,
            action: parse(&row.action)?,
            entity_id: row.entity_id,
            entity_type: parse(&row.entity_type)?,
            old_value: row.old_value,
            new_value: row.new_value,
            comments: row.comments,
            timestamp: row.occurred_at,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

const PRODUCT_COLUMNS: &str = "id, name, sku, description, company_id, created_at, updated_at";
const VENDOR_COLUMNS: &str = "id, user_id, company_name, license_number, warehouse_address, capacity, status, \
     company_id, created_at, updated_at";
const REQUIREMENT_COLUMNS: &str = "id, product_id, destination, doc_type, category, requirement, company_id, created_at";
const ORDER_COLUMNS: &str = "id, order_number, vendor_id, product_id, quantity, destination, status, company_id, \
     created_by_id, created_at, updated_at";
const CHECKLIST_COLUMNS: &str = "id, order_id, requirement_id, doc_type, category, required, status, \
     uploaded_doc_id, created_at, updated_at";
const DOCUMENT_COLUMNS: &str = "id, doc_type, file_name, locator, file_hash, status, category, company_id, \
     uploaded_by_id, order_id, product_id, reviewed_by_id, reviewed_at, review_comments, created_at, updated_at";
const SHIPMENT_COLUMNS: &str = "id, order_id, order_number, tracking_number, courier, status, location, \
     company_id, created_by_id, created_at, updated_at";
const AUDIT_COLUMNS: &str = "id, company_id, actor_user_id, action, entity_id, entity_type, old_value, \
     new_value, comments, occurred_at";

const DOCUMENT_FILTER: &str = "company_id = $1 \
     AND ($2::uuid IS NULL OR order_id = $2) \
     AND ($3::uuid IS NULL OR product_id = $3) \
     AND ($4::text IS NULL OR status = $4)";

/// One PostgreSQL transaction; rolled back by sqlx when dropped uncommitted
pub struct PgTransaction {
    tx: Transaction<'static, Postgres>,
}

impl PgTransaction {
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl StoreTransaction for PgTransaction {
    async fn get_product(&mut self, company_id: Uuid, id: Uuid) -> StoreResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND company_id = $2"
        ))
        .bind(id)
        .bind(company_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error)?;
        Ok(row.map(Product::from))
    }

    async fn find_product_by_sku(&mut self, sku: &str) -> StoreResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = $1"))
            .bind(sku)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db_error)?;
        Ok(row.map(Product::from))
    }

    async fn find_products(&mut self, company_id: Uuid) -> StoreResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE company_id = $1 ORDER BY created_at"
        ))
        .bind(company_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn save_product(&mut self, product: &Product) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, sku, description, company_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET description = EXCLUDED.description, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.description)
        .bind(product.company_id)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn get_vendor(&mut self, company_id: Uuid, id: Uuid) -> StoreResult<Option<VendorProfile>> {
        let row: Option<VendorRow> = sqlx::query_as(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendor_profiles WHERE id = $1 AND company_id = $2"
        ))
        .bind(id)
        .bind(company_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error)?;
        row.map(VendorProfile::try_from).transpose()
    }

    async fn find_vendor_by_user(&mut self, user_id: Uuid) -> StoreResult<Option<VendorProfile>> {
        let row: Option<VendorRow> = sqlx::query_as(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendor_profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error)?;
        row.map(VendorProfile::try_from).transpose()
    }

    async fn find_vendors(&mut self, company_id: Uuid) -> StoreResult<Vec<VendorProfile>> {
        let rows: Vec<VendorRow> = sqlx::query_as(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendor_profiles WHERE company_id = $1 ORDER BY created_at"
        ))
        .bind(company_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error)?;
        convert_all(rows)
    }

    async fn save_vendor(&mut self, vendor: &VendorProfile) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO vendor_profiles
                (id, user_id, company_name, license_number, warehouse_address, capacity, status, company_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                company_name = EXCLUDED.company_name,
                license_number = EXCLUDED.license_number,
                warehouse_address = EXCLUDED.warehouse_address,
                capacity = EXCLUDED.capacity,
                status = EXCLUDED.status,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(vendor.id)
        .bind(vendor.user_id)
        .bind(&vendor.company_name)
        .bind(&vendor.license_number)
        .bind(&vendor.warehouse_address)
        .bind(vendor.capacity)
        .bind(vendor.status.as_str())
        .bind(vendor.company_id)
        .bind(vendor.created_at)
        .bind(vendor.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn find_requirements(&mut self, company_id: Uuid, product_id: Uuid) -> StoreResult<Vec<ComplianceRequirement>> {
        let rows: Vec<RequirementRow> = sqlx::query_as(&format!(
            "SELECT {REQUIREMENT_COLUMNS} FROM compliance_requirements \
             WHERE company_id = $1 AND product_id = $2 ORDER BY created_at, id"
        ))
        .bind(company_id)
        .bind(product_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error)?;
        convert_all(rows)
    }

    async fn save_requirement(&mut self, requirement: &ComplianceRequirement) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO compliance_requirements
                (id, product_id, destination, doc_type, category, requirement, company_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(requirement.id)
        .bind(requirement.product_id)
        .bind(&requirement.destination)
        .bind(&requirement.doc_type)
        .bind(requirement.category.as_str())
        .bind(&requirement.requirement)
        .bind(requirement.company_id)
        .bind(requirement.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn get_order(&mut self, company_id: Uuid, id: Uuid) -> StoreResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND company_id = $2"
        ))
        .bind(id)
        .bind(company_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error)?;
        row.map(Order::try_from).transpose()
    }

    async fn lock_order(&mut self, company_id: Uuid, id: Uuid) -> StoreResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND company_id = $2 FOR UPDATE"
        ))
        .bind(id)
        .bind(company_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error)?;
        row.map(Order::try_from).transpose()
    }

    async fn find_orders(&mut self, company_id: Uuid, vendor_id: Option<Uuid>) -> StoreResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE company_id = $1 AND ($2::uuid IS NULL OR vendor_id = $2) \
             ORDER BY created_at DESC"
        ))
        .bind(company_id)
        .bind(vendor_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error)?;
        convert_all(rows)
    }

    async fn count_orders(&mut self, company_id: Uuid) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE company_id = $1")
            .bind(company_id)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(db_error)?;
        Ok(count.max(0) as u64)
    }

    async fn save_order(&mut self, order: &Order) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO orders
                (id, order_number, vendor_id, product_id, quantity, destination, status, company_id, created_by_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET status = EXCLUDED.status, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(order.id)
        .bind(&order.order_number)
        .bind(order.vendor_id)
        .bind(order.product_id)
        .bind(order.quantity)
        .bind(&order.destination)
        .bind(order.status.as_str())
        .bind(order.company_id)
        .bind(order.created_by_id)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn find_checklist(&mut self, order_id: Uuid) -> StoreResult<Vec<ChecklistEntry>> {
        let rows: Vec<ChecklistRow> = sqlx::query_as(&format!(
            "SELECT {CHECKLIST_COLUMNS} FROM order_document_status WHERE order_id = $1 ORDER BY created_at, doc_type"
        ))
        .bind(order_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error)?;
        convert_all(rows)
    }

    async fn save_checklist_entry(&mut self, entry: &ChecklistEntry) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO order_document_status
                (id, order_id, requirement_id, doc_type, category, required, status, uploaded_doc_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                uploaded_doc_id = EXCLUDED.uploaded_doc_id,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(entry.id)
        .bind(entry.order_id)
        .bind(entry.requirement_id)
        .bind(&entry.doc_type)
        .bind(entry.category.as_str())
        .bind(entry.required)
        .bind(entry.status.as_str())
        .bind(entry.uploaded_doc_id)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn get_document(&mut self, company_id: Uuid, id: Uuid) -> StoreResult<Option<Document>> {
        let row: Option<DocumentRow> = sqlx::query_as(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1 AND company_id = $2"
        ))
        .bind(id)
        .bind(company_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error)?;
        row.map(Document::try_from).transpose()
    }

    async fn lock_document(&mut self, company_id: Uuid, id: Uuid) -> StoreResult<Option<Document>> {
        let row: Option<DocumentRow> = sqlx::query_as(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1 AND company_id = $2 FOR UPDATE"
        ))
        .bind(id)
        .bind(company_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error)?;
        row.map(Document::try_from).transpose()
    }

    async fn find_documents(&mut self, company_id: Uuid, filter: &DocumentFilter) -> StoreResult<Vec<Document>> {
        let rows: Vec<DocumentRow> = sqlx::query_as(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE {DOCUMENT_FILTER} ORDER BY created_at DESC"
        ))
        .bind(company_id)
        .bind(filter.order_id)
        .bind(filter.product_id)
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error)?;
        convert_all(rows)
    }

    async fn count_documents(&mut self, company_id: Uuid, filter: &DocumentFilter) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM documents WHERE {DOCUMENT_FILTER}"))
            .bind(company_id)
            .bind(filter.order_id)
            .bind(filter.product_id)
            .bind(filter.status.map(|s| s.as_str()))
            .fetch_one(&mut *self.tx)
            .await
            .map_err(db_error)?;
        Ok(count.max(0) as u64)
    }

    async fn save_document(&mut self, document: &Document) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO documents
                (id, doc_type, file_name, locator, file_hash, status, category, company_id, uploaded_by_id,
                 order_id, product_id, reviewed_by_id, reviewed_at, review_comments, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                reviewed_by_id = EXCLUDED.reviewed_by_id,
                reviewed_at = EXCLUDED.reviewed_at,
                review_comments = EXCLUDED.review_comments,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(document.id)
        .bind(&document.doc_type)
        .bind(&document.file_name)
        .bind(&document.locator)
        .bind(&document.file_hash)
        .bind(document.status.as_str())
        .bind(document.category.as_str())
        .bind(document.company_id)
        .bind(document.uploaded_by_id)
        .bind(document.order_id)
        .bind(document.product_id)
        .bind(document.reviewed_by_id)
        .bind(document.reviewed_at)
        .bind(&document.review_comments)
        .bind(document.created_at)
        .bind(document.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn find_shipments(&mut self, order_id: Uuid) -> StoreResult<Vec<Shipment>> {
        let rows: Vec<ShipmentRow> = sqlx::query_as(&format!(
            "SELECT {SHIPMENT_COLUMNS} FROM shipments WHERE order_id = $1 ORDER BY created_at"
        ))
        .bind(order_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error)?;
        convert_all(rows)
    }

    async fn save_shipment(&mut self, shipment: &Shipment) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO shipments
                (id, order_id, order_number, tracking_number, courier, status, location, company_id, created_by_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                location = EXCLUDED.location,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(shipment.id)
        .bind(shipment.order_id)
        .bind(&shipment.order_number)
        .bind(&shipment.tracking_number)
        .bind(&shipment.courier)
        .bind(shipment.status.as_str())
        .bind(&shipment.location)
        .bind(shipment.company_id)
        .bind(shipment.created_by_id)
        .bind(shipment.created_at)
        .bind(shipment.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn append_audit(&mut self, entry: &AuditEntry) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_trails
                (id, company_id, actor_user_id, action, entity_id, entity_type, old_value, new_value, comments, occurred_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(entry.id)
        .bind(entry.company_id)
        .bind(entry.actor_user_id)
        .bind(entry.action.as_str())
        .bind(entry.entity_id)
        .bind(entry.entity_type.as_str())
        .bind(&entry.old_value)
        .bind(&entry.new_value)
        .bind(&entry.comments)
        .bind(entry.timestamp)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn find_audit(&mut self, company_id: Uuid, query: &AuditQuery) -> StoreResult<Vec<AuditEntry>> {
        let rows: Vec<AuditRow> = sqlx::query_as(&format!(
            "SELECT {AUDIT_COLUMNS} FROM audit_trails \
             WHERE company_id = $1 \
               AND ($2::timestamptz IS NULL OR occurred_at >= $2) \
               AND ($3::timestamptz IS NULL OR occurred_at <= $3) \
               AND ($4::text IS NULL OR entity_type = $4) \
               AND ($5::text IS NULL OR action = $5) \
               AND (cardinality($6::uuid[]) = 0 OR entity_id = ANY($6)) \
             ORDER BY occurred_at DESC \
             LIMIT $7"
        ))
        .bind(company_id)
        .bind(query.start)
        .bind(query.end)
        .bind(query.entity_type.map(|t| t.as_str()))
        .bind(query.action.map(|a| a.as_str()))
        .bind(&query.entity_ids)
        .bind(i64::try_from(query.limit).unwrap_or(i64::MAX))
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error)?;
        convert_all(rows)
    }

    async fn save_anchor(&mut self, receipt: &AnchorReceipt) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO blockchain_anchors (id, entity_id, entity_type, data_hash, tx_hash, block_timestamp, network)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(receipt.id)
        .bind(receipt.entity_id)
        .bind(receipt.entity_type.as_str())
        .bind(&receipt.data_hash)
        .bind(&receipt.tx_hash)
        .bind(receipt.block_timestamp)
        .bind(&receipt.network)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await.map_err(db_error)
    }
}
