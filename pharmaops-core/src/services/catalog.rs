use pharmaops_catalog::{
    applicable_requirements, ComplianceRequirement, NewProduct, NewRequirement, NewVendor, Product, VendorProfile,
    VendorStatus,
};
use pharmaops_order::{review, Document};
use pharmaops_shared::{Actor, AuditAction, AuditEntry, EntityType, Role};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use super::{duplicate_as_validation, require_role, require_text, vendor_profile_of, MasterSopUpload, ServiceContext};
use crate::error::{ComplianceError, ComplianceResult};
use crate::storage::content_hash;

const STAFF: &[Role] = &[Role::Admin, Role::Qa, Role::Auditor];

/// Products, vendors and the compliance requirement catalog
pub struct CatalogService {
    ctx: ServiceContext,
}

impl CatalogService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn register_product(&self, actor: &Actor, request: NewProduct) -> ComplianceResult<Product> {
        require_role(actor, &[Role::Admin], "register products")?;
        let product = request.into_product(actor.company_id)?;

        let mut tx = self.ctx.store.begin().await?;
        let duplicate = || format!("Product with SKU {} already exists", product.sku);
        if tx.find_product_by_sku(&product.sku).await?.is_some() {
            return Err(ComplianceError::Validation(duplicate()));
        }
        tx.save_product(&product)
            .await
            .map_err(|err| duplicate_as_validation(err, duplicate))?;
        tx.commit().await?;

        info!("Registered product {} ({})", product.name, product.sku);
        self.ctx
            .publish(vec![AuditEntry::new(actor, AuditAction::ProductCreated, EntityType::Product, product.id)
                .with_change(None, serde_json::to_value(&product).ok())])
            .await;

        Ok(product)
    }

    pub async fn update_product_description(
        &self,
        actor: &Actor,
        product_id: Uuid,
        description: Option<String>,
    ) -> ComplianceResult<Product> {
        require_role(actor, &[Role::Admin], "update products")?;

        let mut tx = self.ctx.store.begin().await?;
        let mut product = tx
            .get_product(actor.company_id, product_id)
            .await?
            .ok_or_else(|| ComplianceError::not_found("Product", product_id))?;

        product.update_description(description.filter(|d| !d.trim().is_empty()));
        tx.save_product(&product).await?;
        tx.commit().await?;

        Ok(product)
    }

    pub async fn list_products(&self, actor: &Actor) -> ComplianceResult<Vec<Product>> {
        require_role(actor, STAFF, "list products")?;
        let mut tx = self.ctx.store.begin().await?;
        Ok(tx.find_products(actor.company_id).await?)
    }

    /// Create a vendor profile in INVITED state. A user holds at most one profile.
    pub async fn invite_vendor(&self, actor: &Actor, request: NewVendor) -> ComplianceResult<VendorProfile> {
        require_role(actor, &[Role::Admin], "invite vendors")?;
        let vendor = request.into_profile(actor.company_id)?;

        let mut tx = self.ctx.store.begin().await?;
        let duplicate = || "User already has a vendor profile".to_string();
        if tx.find_vendor_by_user(vendor.user_id).await?.is_some() {
            return Err(ComplianceError::Validation(duplicate()));
        }
        tx.save_vendor(&vendor)
            .await
            .map_err(|err| duplicate_as_validation(err, duplicate))?;
        tx.commit().await?;

        info!("Invited vendor {} ({})", vendor.company_name, vendor.id);
        self.ctx
            .publish(vec![AuditEntry::new(actor, AuditAction::VendorInvited, EntityType::Vendor, vendor.id)
                .with_change(None, serde_json::to_value(&vendor).ok())])
            .await;

        Ok(vendor)
    }

    /// The calling vendor accepts its invitation
    pub async fn activate_vendor(&self, actor: &Actor) -> ComplianceResult<VendorProfile> {
        require_role(actor, &[Role::Vendor], "activate a vendor profile")?;

        let mut tx = self.ctx.store.begin().await?;
        let mut vendor = vendor_profile_of(tx.as_mut(), actor)
            .await?
            .ok_or_else(|| ComplianceError::not_found("Vendor profile", actor.user_id))?;

        if vendor.status == VendorStatus::Accepted {
            return Err(ComplianceError::InvalidState("Vendor profile is already active".to_string()));
        }

        let old_status = vendor.status;
        vendor.activate();
        tx.save_vendor(&vendor).await?;
        tx.commit().await?;

        self.ctx
            .publish(vec![AuditEntry::new(actor, AuditAction::VendorAccepted, EntityType::Vendor, vendor.id)
                .with_change(
                    Some(json!({ "status": old_status.as_str() })),
                    Some(json!({ "status": vendor.status.as_str() })),
                )])
            .await;

        Ok(vendor)
    }

    pub async fn list_vendors(&self, actor: &Actor) -> ComplianceResult<Vec<VendorProfile>> {
        require_role(actor, STAFF, "list vendors")?;
        let mut tx = self.ctx.store.begin().await?;
        Ok(tx.find_vendors(actor.company_id).await?)
    }

    /// Add a rule to the catalog. Duplicates are accepted; checklists collapse them.
    pub async fn define_requirement(
        &self,
        actor: &Actor,
        request: NewRequirement,
    ) -> ComplianceResult<ComplianceRequirement> {
        require_role(actor, &[Role::Admin], "define requirements")?;
        let requirement = request.into_requirement(actor.company_id)?;

        let mut tx = self.ctx.store.begin().await?;
        tx.get_product(actor.company_id, requirement.product_id)
            .await?
            .ok_or_else(|| ComplianceError::not_found("Product", requirement.product_id))?;
        tx.save_requirement(&requirement).await?;
        tx.commit().await?;

        info!(
            "Defined requirement {} for product {} to {}",
            requirement.doc_type, requirement.product_id, requirement.destination
        );
        self.ctx
            .publish(vec![AuditEntry::new(
                actor,
                AuditAction::RequirementDefined,
                EntityType::Requirement,
                requirement.id,
            )
            .with_change(None, serde_json::to_value(&requirement).ok())])
            .await;

        Ok(requirement)
    }

    /// Requirements for `product_id` matching `destination` exactly or through the `ALL` wildcard
    pub async fn find_applicable(
        &self,
        actor: &Actor,
        product_id: Uuid,
        destination: &str,
    ) -> ComplianceResult<Vec<ComplianceRequirement>> {
        let mut tx = self.ctx.store.begin().await?;
        let catalog = tx.find_requirements(actor.company_id, product_id).await?;
        Ok(applicable_requirements(&catalog, product_id, destination))
    }

    /// Store a product-level SOP. It is approved on creation and touches no order.
    pub async fn upload_master_sop(&self, actor: &Actor, upload: MasterSopUpload) -> ComplianceResult<Document> {
        require_role(actor, &[Role::Admin], "upload master documents")?;
        let doc_type = require_text(&upload.doc_type, "doc_type")?;
        let file_name = require_text(&upload.file_name, "file_name")?;

        let mut tx = self.ctx.store.begin().await?;
        let product = tx
            .get_product(actor.company_id, upload.product_id)
            .await?
            .ok_or_else(|| ComplianceError::not_found("Product", upload.product_id))?;

        let stored = self
            .ctx
            .storage
            .store(&upload.bytes, &file_name, &format!("master/{}", product.sku))
            .await
            .map_err(|e| ComplianceError::Storage(e.to_string()))?;
        let hash = content_hash(&upload.bytes);

        let document = review::master_document(product.id, &doc_type, &file_name, stored.locator, Some(hash.clone()), actor);
        tx.save_document(&document).await?;
        tx.commit().await?;

        info!("Master SOP {} stored for product {}", document.doc_type, product.sku);
        self.ctx
            .publish(vec![AuditEntry::new(actor, AuditAction::MasterSopUploaded, EntityType::Document, document.id)
                .with_change(None, Some(json!({ "doc_type": document.doc_type, "status": document.status })))])
            .await;
        self.ctx.anchor_hash(document.id, EntityType::Document, &hash).await;

        Ok(document)
    }
}
