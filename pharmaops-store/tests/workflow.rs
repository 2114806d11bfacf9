use pharmaops_catalog::{NewProduct, NewRequirement, NewVendor, Product, VendorProfile, VendorStatus};
use pharmaops_core::services::{DocumentUpload, MasterSopUpload};
use pharmaops_core::{AuditQuery, ComplianceError, ComplianceServices, WorkflowSettings};
use pharmaops_order::{
    ChecklistStatus, DateRange, Document, DocumentStatus, NewOrder, NewShipment, Order, OrderStatus, ReviewAction,
    ShipmentStatus, TimelineEventKind,
};
use pharmaops_shared::{Actor, AuditAction, EntityType, Role};
use pharmaops_store::{in_memory_services, MemoryStore};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

struct Fixture {
    services: ComplianceServices,
    store: MemoryStore,
    admin: Actor,
    qa: Actor,
    auditor: Actor,
    vendor_user: Actor,
    vendor: VendorProfile,
    product: Product,
}

async fn fixture() -> Fixture {
    let (services, store) = in_memory_services(WorkflowSettings::default());
    let company_id = Uuid::new_v4();
    let admin = Actor::new(Uuid::new_v4(), company_id, Role::Admin);
    let qa = Actor::new(Uuid::new_v4(), company_id, Role::Qa);
    let auditor = Actor::new(Uuid::new_v4(), company_id, Role::Auditor);
    let vendor_user = Actor::new(Uuid::new_v4(), company_id, Role::Vendor);

    let product = services
        .catalog
        .register_product(&admin, NewProduct::new("Paracetamol 500mg", "PARA-500", None))
        .await
        .unwrap();
    services
        .catalog
        .define_requirement(&admin, NewRequirement::new(product.id, "CoA", "Certificate of Analysis"))
        .await
        .unwrap();

    services
        .catalog
        .invite_vendor(&admin, NewVendor::new(vendor_user.user_id, "Rhine Pharma Logistics"))
        .await
        .unwrap();
    let vendor = services.catalog.activate_vendor(&vendor_user).await.unwrap();

    Fixture {
        services,
        store,
        admin,
        qa,
        auditor,
        vendor_user,
        vendor,
        product,
    }
}

impl Fixture {
    async fn create_order(&self) -> Order {
        self.services
            .orders
            .create_order(&self.admin, &NewOrder::new(self.vendor.id, self.product.id, 100, "Berlin"))
            .await
            .unwrap()
    }

    async fn upload(&self, order_id: Uuid, contents: &[u8]) -> Document {
        self.services
            .documents
            .upload_document(
                &self.vendor_user,
                &DocumentUpload {
                    order_id,
                    doc_type: "CoA".to_string(),
                    file_name: "coa.pdf".to_string(),
                    bytes: contents.to_vec(),
                },
            )
            .await
            .unwrap()
    }

    async fn review(&self, document_id: Uuid, action: ReviewAction) -> Document {
        self.services
            .documents
            .review_document(&self.qa, document_id, action, Some("checked".to_string()))
            .await
            .unwrap()
    }

    async fn order(&self, order_id: Uuid) -> Order {
        self.services.trace.get_order_trace(&self.auditor, order_id).await.unwrap().order
    }

    /// Order created, accepted, CoA approved
    async fn ready_order(&self) -> Order {
        let order = self.create_order().await;
        self.services.orders.accept_order(&self.vendor_user, order.id).await.unwrap();
        let doc = self.upload(order.id, b"assay 99.8%").await;
        self.review(doc.id, ReviewAction::Approve).await;
        self.order(order.id).await
    }

    async fn second_vendor(&self) -> Actor {
        let other = Actor::new(Uuid::new_v4(), self.admin.company_id, Role::Vendor);
        self.services
            .catalog
            .invite_vendor(&self.admin, NewVendor::new(other.user_id, "Danube Cold Chain"))
            .await
            .unwrap();
        self.services.catalog.activate_vendor(&other).await.unwrap();
        other
    }
}

#[tokio::test]
async fn test_order_snapshots_applicable_requirements() {
    let fx = fixture().await;
    let order = fx.create_order().await;

    assert_eq!(order.order_number, "ORD-00001");
    assert_eq!(order.status, OrderStatus::Requested);

    let trace = fx.services.trace.get_order_trace(&fx.auditor, order.id).await.unwrap();
    assert_eq!(trace.checklist.len(), 1);
    assert_eq!(trace.checklist[0].doc_type, "CoA");
    assert_eq!(trace.checklist[0].status, ChecklistStatus::Missing);
    assert!(trace.checklist[0].required);
}

#[tokio::test]
async fn test_duplicate_doc_types_collapse_into_one_entry() {
    let fx = fixture().await;
    fx.services
        .catalog
        .define_requirement(
            &fx.admin,
            NewRequirement::new(fx.product.id, "CoA", "EU batch certificate").for_destination("Berlin"),
        )
        .await
        .unwrap();
    fx.services
        .catalog
        .define_requirement(
            &fx.admin,
            NewRequirement::new(fx.product.id, "Import Permit", "Japanese permit").for_destination("Tokyo"),
        )
        .await
        .unwrap();

    let order = fx.create_order().await;
    let trace = fx.services.trace.get_order_trace(&fx.auditor, order.id).await.unwrap();

    let doc_types: Vec<&str> = trace.checklist.iter().map(|e| e.doc_type.as_str()).collect();
    assert_eq!(doc_types, vec!["CoA"]);
}

#[tokio::test]
async fn test_find_applicable_matches_destination_or_wildcard() {
    let fx = fixture().await;
    fx.services
        .catalog
        .define_requirement(
            &fx.admin,
            NewRequirement::new(fx.product.id, "Import Permit", "Japanese permit").for_destination("Tokyo"),
        )
        .await
        .unwrap();

    let paris = fx.services.catalog.find_applicable(&fx.qa, fx.product.id, "Paris").await.unwrap();
    assert_eq!(paris.len(), 1);

    let tokyo = fx.services.catalog.find_applicable(&fx.qa, fx.product.id, "Tokyo").await.unwrap();
    assert_eq!(tokyo.len(), 2);
}

#[tokio::test]
async fn test_approval_unblocks_order_for_shipment() {
    let fx = fixture().await;
    let order = fx.create_order().await;

    let accepted = fx.services.orders.accept_order(&fx.vendor_user, order.id).await.unwrap();
    assert_eq!(accepted.status, OrderStatus::DocsPending);

    let doc = fx.upload(order.id, b"assay 99.8%").await;
    assert_eq!(doc.status, DocumentStatus::PendingReview);
    assert_eq!(doc.order_id, Some(order.id));
    assert!(doc.file_hash.is_some());

    let trace = fx.services.trace.get_order_trace(&fx.auditor, order.id).await.unwrap();
    assert_eq!(trace.checklist[0].status, ChecklistStatus::PendingReview);
    assert_eq!(trace.checklist[0].uploaded_doc_id, Some(doc.id));

    let pending = fx.services.documents.pending_documents(&fx.qa).await.unwrap();
    assert_eq!(pending.len(), 1);

    let approved = fx.review(doc.id, ReviewAction::Approve).await;
    assert_eq!(approved.status, DocumentStatus::Approved);
    assert_eq!(approved.reviewed_by_id, Some(fx.qa.user_id));
    assert!(approved.reviewed_at.is_some());

    let trace = fx.services.trace.get_order_trace(&fx.auditor, order.id).await.unwrap();
    assert_eq!(trace.checklist[0].status, ChecklistStatus::Approved);
    assert_eq!(trace.order.status, OrderStatus::ReadyToShip);
    assert!(fx.services.documents.pending_documents(&fx.qa).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rejection_keeps_order_blocked() {
    let fx = fixture().await;
    let order = fx.create_order().await;
    fx.services.orders.accept_order(&fx.vendor_user, order.id).await.unwrap();
    let doc = fx.upload(order.id, b"assay 91%").await;

    let rejected = fx.review(doc.id, ReviewAction::Reject).await;
    assert_eq!(rejected.status, DocumentStatus::Rejected);
    assert_eq!(rejected.review_comments.as_deref(), Some("checked"));

    let trace = fx.services.trace.get_order_trace(&fx.auditor, order.id).await.unwrap();
    assert_eq!(trace.checklist[0].status, ChecklistStatus::Rejected);
    assert_eq!(trace.order.status, OrderStatus::DocsPending);
}

#[tokio::test]
async fn test_shipment_requires_ready_order() {
    let fx = fixture().await;
    let order = fx.create_order().await;
    fx.services.orders.accept_order(&fx.vendor_user, order.id).await.unwrap();

    let result = fx
        .services
        .orders
        .create_shipment(&fx.vendor_user, order.id, &NewShipment::new("TRK-1", "DHL"))
        .await;
    assert!(matches!(result, Err(ComplianceError::InvalidState(_))));

    let trace = fx.services.trace.get_order_trace(&fx.auditor, order.id).await.unwrap();
    assert!(trace.shipments.is_empty());
    assert_eq!(trace.order.status, OrderStatus::DocsPending);
}

#[tokio::test]
async fn test_master_sop_is_approved_without_touching_orders() {
    let fx = fixture().await;
    let order = fx.create_order().await;

    let sop = fx
        .services
        .catalog
        .upload_master_sop(
            &fx.admin,
            MasterSopUpload {
                product_id: fx.product.id,
                doc_type: "CoA".to_string(),
                file_name: "storage-sop.pdf".to_string(),
                bytes: b"store below 25C".to_vec(),
            },
        )
        .await
        .unwrap();

    assert_eq!(sop.status, DocumentStatus::Approved);
    assert_eq!(sop.order_id, None);
    assert_eq!(sop.product_id, Some(fx.product.id));
    assert!(sop.locator.contains("master/PARA-500"));

    let trace = fx.services.trace.get_order_trace(&fx.auditor, order.id).await.unwrap();
    assert_eq!(trace.checklist[0].status, ChecklistStatus::Missing);
    assert_eq!(trace.order.status, OrderStatus::Requested);
    assert!(trace.documents.is_empty());

    let anchors = fx.store.anchors().await;
    assert!(anchors.iter().any(|a| a.entity_id == sop.id));
}

#[tokio::test]
async fn test_order_accepts_only_once() {
    let fx = fixture().await;
    let order = fx.create_order().await;
    fx.services.orders.accept_order(&fx.vendor_user, order.id).await.unwrap();

    let again = fx.services.orders.accept_order(&fx.vendor_user, order.id).await;
    assert!(matches!(again, Err(ComplianceError::InvalidState(_))));
}

#[tokio::test]
async fn test_accepting_order_without_requirements_makes_it_ready() {
    let fx = fixture().await;
    let bare = fx
        .services
        .catalog
        .register_product(&fx.admin, NewProduct::new("Saline 0.9%", "SAL-09", Some("IV bags")))
        .await
        .unwrap();
    let order = fx
        .services
        .orders
        .create_order(&fx.admin, &NewOrder::new(fx.vendor.id, bare.id, 10, "Berlin"))
        .await
        .unwrap();

    let accepted = fx.services.orders.accept_order(&fx.vendor_user, order.id).await.unwrap();
    assert_eq!(accepted.status, OrderStatus::ReadyToShip);
}

#[tokio::test]
async fn test_other_vendor_cannot_accept() {
    let fx = fixture().await;
    let order = fx.create_order().await;
    let other = fx.second_vendor().await;

    let result = fx.services.orders.accept_order(&other, order.id).await;
    assert!(matches!(result, Err(ComplianceError::NotFound { entity: "Order", .. })));
    assert_eq!(fx.order(order.id).await.status, OrderStatus::Requested);
}

#[tokio::test]
async fn test_shipment_dispatches_once() {
    let fx = fixture().await;
    let order = fx.ready_order().await;
    assert_eq!(order.status, OrderStatus::ReadyToShip);

    let shipment = fx
        .services
        .orders
        .create_shipment(&fx.vendor_user, order.id, &NewShipment::new(" TRK-778 ", "DHL"))
        .await
        .unwrap();
    assert_eq!(shipment.status, ShipmentStatus::InTransit);
    assert_eq!(shipment.tracking_number, "TRK-778");
    assert_eq!(shipment.location.as_deref(), Some("Warehouse"));
    assert_eq!(shipment.order_number, order.order_number);
    assert_eq!(fx.order(order.id).await.status, OrderStatus::InTransit);

    let again = fx
        .services
        .orders
        .create_shipment(&fx.vendor_user, order.id, &NewShipment::new("TRK-779", "DHL"))
        .await;
    assert!(matches!(again, Err(ComplianceError::InvalidState(_))));

    let anchors = fx.store.anchors().await;
    assert!(anchors
        .iter()
        .any(|a| a.entity_id == shipment.id && a.entity_type == EntityType::Shipment));
}

#[tokio::test]
async fn test_other_vendor_cannot_ship() {
    let fx = fixture().await;
    let order = fx.ready_order().await;
    let other = fx.second_vendor().await;

    let result = fx
        .services
        .orders
        .create_shipment(&other, order.id, &NewShipment::new("TRK-1", "DHL"))
        .await;
    match result {
        Err(ComplianceError::InvalidState(msg)) => assert_eq!(msg, "Order is not assigned to this vendor"),
        other => panic!("expected InvalidState, got {:?}", other),
    }
    assert_eq!(fx.order(order.id).await.status, OrderStatus::ReadyToShip);
}

#[tokio::test]
async fn test_blank_carrier_details_are_rejected() {
    let fx = fixture().await;
    let order = fx.ready_order().await;

    let result = fx
        .services
        .orders
        .create_shipment(&fx.vendor_user, order.id, &NewShipment::new("  ", "DHL"))
        .await;
    assert!(matches!(result, Err(ComplianceError::Validation(_))));
    assert_eq!(fx.order(order.id).await.status, OrderStatus::ReadyToShip);
}

#[tokio::test]
async fn test_uploads_closed_once_ready() {
    let fx = fixture().await;
    let order = fx.ready_order().await;

    let result = fx
        .services
        .documents
        .upload_document(
            &fx.vendor_user,
            &DocumentUpload {
                order_id: order.id,
                doc_type: "CoA".to_string(),
                file_name: "late.pdf".to_string(),
                bytes: b"late".to_vec(),
            },
        )
        .await;
    assert!(matches!(result, Err(ComplianceError::InvalidState(_))));
}

#[tokio::test]
async fn test_reviewing_twice_is_rejected() {
    let fx = fixture().await;
    let order = fx.create_order().await;
    fx.services.orders.accept_order(&fx.vendor_user, order.id).await.unwrap();
    let doc = fx.upload(order.id, b"assay").await;
    fx.review(doc.id, ReviewAction::Reject).await;

    let again = fx
        .services
        .documents
        .review_document(&fx.qa, doc.id, ReviewAction::Approve, None)
        .await;
    assert!(matches!(again, Err(ComplianceError::InvalidState(_))));

    let stored = fx.services.documents.get_document(&fx.qa, doc.id).await.unwrap();
    assert_eq!(stored.status, DocumentStatus::Rejected);
}

#[tokio::test]
async fn test_reupload_after_rejection_reopens_entry() {
    let fx = fixture().await;
    let order = fx.create_order().await;
    fx.services.orders.accept_order(&fx.vendor_user, order.id).await.unwrap();

    let first = fx.upload(order.id, b"assay 91%").await;
    fx.review(first.id, ReviewAction::Reject).await;

    let second = fx.upload(order.id, b"assay 99.5%").await;
    let trace = fx.services.trace.get_order_trace(&fx.auditor, order.id).await.unwrap();
    assert_eq!(trace.checklist[0].status, ChecklistStatus::PendingReview);
    assert_eq!(trace.checklist[0].uploaded_doc_id, Some(second.id));

    fx.review(second.id, ReviewAction::Approve).await;
    assert_eq!(fx.order(order.id).await.status, OrderStatus::ReadyToShip);
}

#[tokio::test]
async fn test_review_of_older_upload_relinks_checklist() {
    let fx = fixture().await;
    let order = fx.create_order().await;
    fx.services.orders.accept_order(&fx.vendor_user, order.id).await.unwrap();

    let first = fx.upload(order.id, b"draft").await;
    let second = fx.upload(order.id, b"final").await;

    let reviewed = fx.review(first.id, ReviewAction::Approve).await;
    assert_eq!(reviewed.status, DocumentStatus::Approved);

    let trace = fx.services.trace.get_order_trace(&fx.auditor, order.id).await.unwrap();
    assert_eq!(trace.checklist[0].status, ChecklistStatus::Approved);
    assert_eq!(trace.checklist[0].uploaded_doc_id, Some(first.id));
    assert_eq!(trace.order.status, OrderStatus::ReadyToShip);

    // Reviewing the later upload moves the entry back onto it
    fx.review(second.id, ReviewAction::Reject).await;
    let trace = fx.services.trace.get_order_trace(&fx.auditor, order.id).await.unwrap();
    assert_eq!(trace.checklist[0].status, ChecklistStatus::Rejected);
    assert_eq!(trace.checklist[0].uploaded_doc_id, Some(second.id));
    assert_eq!(trace.order.status, OrderStatus::ReadyToShip);
}

#[tokio::test]
async fn test_role_checks() {
    let fx = fixture().await;

    let result = fx
        .services
        .orders
        .create_order(&fx.vendor_user, &NewOrder::new(fx.vendor.id, fx.product.id, 1, "Berlin"))
        .await;
    assert!(matches!(result, Err(ComplianceError::Forbidden(_))));

    let order = fx.create_order().await;
    let result = fx
        .services
        .documents
        .upload_document(
            &fx.qa,
            &DocumentUpload {
                order_id: order.id,
                doc_type: "CoA".to_string(),
                file_name: "coa.pdf".to_string(),
                bytes: vec![1, 2, 3],
            },
        )
        .await;
    assert!(matches!(result, Err(ComplianceError::Forbidden(_))));

    let result = fx.services.trace.get_order_trace(&fx.vendor_user, order.id).await;
    assert!(matches!(result, Err(ComplianceError::Forbidden(_))));

    let result = fx
        .services
        .documents
        .review_document(&fx.auditor, Uuid::new_v4(), ReviewAction::Approve, None)
        .await;
    assert!(matches!(result, Err(ComplianceError::Forbidden(_))));
}

#[tokio::test]
async fn test_order_validation() {
    let fx = fixture().await;

    let zero = fx
        .services
        .orders
        .create_order(&fx.admin, &NewOrder::new(fx.vendor.id, fx.product.id, 0, "Berlin"))
        .await;
    assert!(matches!(zero, Err(ComplianceError::Validation(_))));

    let missing = NewOrder {
        destination: None,
        ..NewOrder::new(fx.vendor.id, fx.product.id, 5, "Berlin")
    };
    let result = fx.services.orders.create_order(&fx.admin, &missing).await;
    assert!(matches!(result, Err(ComplianceError::Validation(_))));

    let unknown = fx
        .services
        .orders
        .create_order(&fx.admin, &NewOrder::new(fx.vendor.id, Uuid::new_v4(), 5, "Berlin"))
        .await;
    assert!(matches!(unknown, Err(ComplianceError::NotFound { entity: "Product", .. })));

    assert!(fx.services.orders.list_orders(&fx.admin).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_catalog_uniqueness() {
    let fx = fixture().await;

    let sku = fx
        .services
        .catalog
        .register_product(&fx.admin, NewProduct::new("Paracetamol 1g", "PARA-500", None))
        .await;
    assert!(matches!(sku, Err(ComplianceError::Validation(_))));

    let vendor = fx
        .services
        .catalog
        .invite_vendor(&fx.admin, NewVendor::new(fx.vendor_user.user_id, "Duplicate GmbH"))
        .await;
    assert!(matches!(vendor, Err(ComplianceError::Validation(_))));

    let activate = fx.services.catalog.activate_vendor(&fx.vendor_user).await;
    assert!(matches!(activate, Err(ComplianceError::InvalidState(_))));

    let vendors = fx.services.catalog.list_vendors(&fx.auditor).await.unwrap();
    assert_eq!(vendors.len(), 1);
    assert_eq!(vendors[0].status, VendorStatus::Accepted);
}

#[tokio::test]
async fn test_product_description_update() {
    let fx = fixture().await;

    let updated = fx
        .services
        .catalog
        .update_product_description(&fx.admin, fx.product.id, Some("Film-coated tablets".to_string()))
        .await
        .unwrap();
    assert_eq!(updated.description.as_deref(), Some("Film-coated tablets"));

    let cleared = fx
        .services
        .catalog
        .update_product_description(&fx.admin, fx.product.id, Some("   ".to_string()))
        .await
        .unwrap();
    assert_eq!(cleared.description, None);
}

#[tokio::test]
async fn test_companies_are_isolated() {
    let fx = fixture().await;
    let order = fx.create_order().await;
    let outsider = Actor::admin(Uuid::new_v4());

    assert!(fx.services.orders.list_orders(&outsider).await.unwrap().is_empty());
    assert!(fx.services.catalog.list_products(&outsider).await.unwrap().is_empty());

    let auditor = Actor::new(Uuid::new_v4(), outsider.company_id, Role::Auditor);
    let trace = fx.services.trace.get_order_trace(&auditor, order.id).await;
    assert!(matches!(trace, Err(ComplianceError::NotFound { .. })));
}

#[tokio::test]
async fn test_concurrent_orders_get_distinct_numbers() {
    let fx = fixture().await;
    let services = Arc::new(fx.services);
    let request = NewOrder::new(fx.vendor.id, fx.product.id, 10, "Berlin");

    let mut handles = Vec::new();
    for _ in 0..20 {
        let services = services.clone();
        let admin = fx.admin;
        let request = request.clone();
        handles.push(tokio::spawn(async move {
            services.orders.create_order(&admin, &request).await
        }));
    }

    let mut numbers = HashSet::new();
    for handle in handles {
        let order = handle.await.unwrap().unwrap();
        numbers.insert(order.order_number);
    }

    assert_eq!(numbers.len(), 20);
    assert!(numbers.contains("ORD-00001"));
    assert!(numbers.contains("ORD-00020"));
    assert_eq!(services.orders.list_orders(&fx.admin).await.unwrap().len(), 20);
}

#[tokio::test]
async fn test_order_trace_timeline_and_audit() {
    let fx = fixture().await;
    let order = fx.ready_order().await;
    let shipment = fx
        .services
        .orders
        .create_shipment(&fx.vendor_user, order.id, &NewShipment::new("TRK-9", "UPS"))
        .await
        .unwrap();

    let trace = fx.services.trace.get_order_trace(&fx.auditor, order.id).await.unwrap();
    let kinds: Vec<TimelineEventKind> = trace.timeline.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TimelineEventKind::OrderCreated,
            TimelineEventKind::DocumentUploaded,
            TimelineEventKind::DocumentApproved,
            TimelineEventKind::ShipmentCreated,
        ]
    );
    assert_eq!(trace.timeline[3].entity_id, shipment.id);
    assert_eq!(trace.shipments.len(), 1);
    assert_eq!(trace.documents.len(), 1);

    let actions: Vec<AuditAction> = trace.audit_logs.iter().map(|a| a.action).collect();
    for expected in [
        AuditAction::OrderCreated,
        AuditAction::OrderAccepted,
        AuditAction::DocumentUploaded,
        AuditAction::DocumentApproved,
        AuditAction::OrderReadyToShip,
        AuditAction::ShipmentCreated,
    ] {
        assert!(actions.contains(&expected), "missing {:?}", expected);
    }
    assert!(trace.audit_logs.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[tokio::test]
async fn test_compliance_report() {
    let fx = fixture().await;
    let order = fx.create_order().await;
    fx.services.orders.accept_order(&fx.vendor_user, order.id).await.unwrap();
    let first = fx.upload(order.id, b"assay 91%").await;
    fx.review(first.id, ReviewAction::Reject).await;
    let second = fx.upload(order.id, b"assay 99.5%").await;
    fx.review(second.id, ReviewAction::Approve).await;
    fx.create_order().await;

    let report = fx
        .services
        .trace
        .generate_compliance_report(&fx.auditor, DateRange::default(), None)
        .await
        .unwrap();

    assert_eq!(report.report_type, "COMPLIANCE_SUMMARY");
    assert_eq!(report.generated_by, fx.auditor.user_id);
    assert_eq!(report.orders.total, 2);
    assert_eq!(report.orders.completed, 0);
    assert_eq!(report.orders.completion_rate, 0.0);
    assert_eq!(report.documents.total, 2);
    assert_eq!(report.documents.approved, 1);
    assert_eq!(report.documents.rejected, 1);
    assert_eq!(report.documents.approval_rate, 50.0);
    assert_eq!(report.lines[0].order_number, "ORD-00002");

    let result = fx
        .services
        .trace
        .generate_compliance_report(&fx.vendor_user, DateRange::default(), None)
        .await;
    assert!(matches!(result, Err(ComplianceError::Forbidden(_))));
}

#[tokio::test]
async fn test_audit_log_queries() {
    let fx = fixture().await;
    fx.create_order().await;
    fx.create_order().await;

    let created = fx
        .services
        .trace
        .audit_logs(
            &fx.auditor,
            AuditQuery {
                action: Some(AuditAction::OrderCreated),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(created.len(), 2);
    assert!(created[0].timestamp >= created[1].timestamp);

    let limited = fx
        .services
        .trace
        .audit_logs(
            &fx.auditor,
            AuditQuery {
                limit: 3,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(limited.len(), 3);

    let defaulted = fx
        .services
        .trace
        .audit_logs(
            &fx.auditor,
            AuditQuery {
                limit: 0,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(defaulted.len() >= 6);

    let products = fx
        .services
        .trace
        .audit_logs(
            &fx.admin,
            AuditQuery {
                entity_type: Some(EntityType::Product),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].entity_id, Some(fx.product.id));
}

#[tokio::test]
async fn test_workload_counts() {
    let fx = fixture().await;
    fx.ready_order().await;
    let pending = fx.create_order().await;
    fx.upload(pending.id, b"assay 98.1%").await;

    let workload = fx.services.trace.workload(&fx.qa).await.unwrap();
    assert_eq!(workload.orders, 2);
    assert_eq!(workload.documents, 2);
    assert_eq!(workload.pending_review, 1);

    let result = fx.services.trace.workload(&fx.vendor_user).await;
    assert!(matches!(result, Err(ComplianceError::Forbidden(_))));
}

#[tokio::test]
async fn test_vendor_activation_is_audited() {
    let fx = fixture().await;

    let accepted = fx
        .services
        .trace
        .audit_logs(
            &fx.auditor,
            AuditQuery {
                action: Some(AuditAction::VendorAccepted),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].entity_id, Some(fx.vendor.id));
    assert_eq!(accepted[0].entity_type, EntityType::Vendor);
    assert_eq!(accepted[0].actor_user_id, fx.vendor_user.user_id);
}
