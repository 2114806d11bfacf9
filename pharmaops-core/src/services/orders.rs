use pharmaops_catalog::applicable_requirements;
use pharmaops_order::fulfillment::{self, CarrierDetails};
use pharmaops_order::{
    Checklist, ChecklistEntry, NewOrder, NewShipment, Order, OrderDraft, OrderLifecycle, OrderStatus, Shipment,
};
use pharmaops_shared::{Actor, AuditAction, AuditEntry, EntityType, Role};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use super::{require_role, vendor_profile_of, ServiceContext};
use crate::error::{ComplianceError, ComplianceResult};
use crate::storage::content_hash;

/// An order as its vendor sees it
#[derive(Debug, Clone, Serialize)]
pub struct VendorOrderView {
    pub order: Order,
    pub checklist: Vec<ChecklistEntry>,
}

/// Order lifecycle: creation, vendor acceptance and dispatch
pub struct OrderService {
    ctx: ServiceContext,
}

impl OrderService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create an order in REQUESTED state with its checklist snapshotted from the catalog
    pub async fn create_order(&self, actor: &Actor, request: &NewOrder) -> ComplianceResult<Order> {
        require_role(actor, &[Role::Admin], "create orders")?;
        let draft = request.validate()?;

        let order = self
            .ctx
            .retrying("create_order", || self.try_create_order(actor, &draft))
            .await?;

        self.ctx
            .publish(vec![AuditEntry::new(actor, AuditAction::OrderCreated, EntityType::Order, order.id)
                .with_change(
                    None,
                    Some(json!({
                        "order_number": order.order_number,
                        "status": order.status,
                        "quantity": order.quantity,
                        "destination": order.destination,
                    })),
                )])
            .await;

        Ok(order)
    }

    async fn try_create_order(&self, actor: &Actor, draft: &OrderDraft) -> ComplianceResult<Order> {
        let mut tx = self.ctx.store.begin().await?;

        tx.get_product(actor.company_id, draft.product_id)
            .await?
            .ok_or_else(|| ComplianceError::not_found("Product", draft.product_id))?;
        tx.get_vendor(actor.company_id, draft.vendor_id)
            .await?
            .ok_or_else(|| ComplianceError::not_found("Vendor", draft.vendor_id))?;

        let ordinal = self.ctx.sequence.next_ordinal().await?;
        let order_number = self.ctx.settings.order_numbers.format(ordinal);
        let order = draft.clone().into_order(order_number, actor);
        tx.save_order(&order).await?;

        let catalog = tx.find_requirements(actor.company_id, order.product_id).await?;
        let applicable = applicable_requirements(&catalog, order.product_id, &order.destination);
        let checklist = Checklist::materialize(&order, &applicable);
        for entry in checklist.entries() {
            tx.save_checklist_entry(entry).await?;
        }

        tx.commit().await?;

        info!(
            "Created order {} with {} checklist entries",
            order.order_number,
            checklist.entries().len()
        );
        Ok(order)
    }

    /// Vendor accepts an order. An order whose checklist is already satisfied
    /// goes straight on to READY_TO_SHIP.
    pub async fn accept_order(&self, actor: &Actor, order_id: Uuid) -> ComplianceResult<Order> {
        require_role(actor, &[Role::Vendor], "accept orders")?;

        let (order, became_ready) = self
            .ctx
            .retrying("accept_order", || self.try_accept_order(actor, order_id))
            .await?;

        let mut entries = vec![AuditEntry::new(actor, AuditAction::OrderAccepted, EntityType::Order, order.id)
            .with_change(
                Some(json!({ "status": OrderStatus::Requested })),
                Some(json!({ "status": OrderStatus::DocsPending })),
            )];
        if became_ready {
            entries.push(ready_to_ship_entry(actor, &order));
        }
        self.ctx.publish(entries).await;

        Ok(order)
    }

    async fn try_accept_order(&self, actor: &Actor, order_id: Uuid) -> ComplianceResult<(Order, bool)> {
        let mut tx = self.ctx.store.begin().await?;

        let vendor = vendor_profile_of(tx.as_mut(), actor)
            .await?
            .ok_or_else(|| ComplianceError::not_found("Vendor profile", actor.user_id))?;
        let mut order = tx
            .lock_order(actor.company_id, order_id)
            .await?
            .ok_or_else(|| ComplianceError::not_found("Order", order_id))?;

        OrderLifecycle::accept(&mut order, vendor.id)?;

        let checklist = tx.find_checklist(order.id).await?;
        let became_ready = OrderLifecycle::recompute_readiness(&mut order, &checklist);

        tx.save_order(&order).await?;
        tx.commit().await?;

        info!("Order {} accepted by vendor {}", order.order_number, vendor.id);
        if became_ready {
            info!("Order {} is ready to ship", order.order_number);
        }
        Ok((order, became_ready))
    }

    /// Dispatch a READY_TO_SHIP order. Succeeds once per order.
    pub async fn create_shipment(
        &self,
        actor: &Actor,
        order_id: Uuid,
        request: &NewShipment,
    ) -> ComplianceResult<Shipment> {
        require_role(actor, &[Role::Vendor], "create shipments")?;
        let carrier = request.validate()?;

        let shipment = self
            .ctx
            .retrying("create_shipment", || self.try_create_shipment(actor, order_id, &carrier))
            .await?;

        self.ctx
            .publish(vec![AuditEntry::new(actor, AuditAction::ShipmentCreated, EntityType::Shipment, shipment.id)
                .with_change(
                    Some(json!({ "order_status": OrderStatus::ReadyToShip })),
                    Some(json!({
                        "order_status": OrderStatus::InTransit,
                        "tracking_number": shipment.tracking_number,
                        "courier": shipment.courier,
                    })),
                )])
            .await;

        let fingerprint = serde_json::to_vec(&shipment).unwrap_or_default();
        self.ctx
            .anchor_hash(shipment.id, EntityType::Shipment, &content_hash(&fingerprint))
            .await;

        Ok(shipment)
    }

    async fn try_create_shipment(
        &self,
        actor: &Actor,
        order_id: Uuid,
        carrier: &CarrierDetails,
    ) -> ComplianceResult<Shipment> {
        let mut tx = self.ctx.store.begin().await?;

        let mut order = tx
            .lock_order(actor.company_id, order_id)
            .await?
            .ok_or_else(|| ComplianceError::not_found("Order", order_id))?;
        let vendor = vendor_profile_of(tx.as_mut(), actor)
            .await?
            .ok_or_else(|| ComplianceError::InvalidState("Order is not assigned to this vendor".to_string()))?;

        let shipment = fulfillment::dispatch(&mut order, vendor.id, carrier.clone(), actor)?;

        tx.save_shipment(&shipment).await?;
        tx.save_order(&order).await?;
        tx.commit().await?;

        info!(
            "Order {} shipped via {} ({})",
            order.order_number, shipment.courier, shipment.tracking_number
        );
        Ok(shipment)
    }

    /// Company orders, newest first
    pub async fn list_orders(&self, actor: &Actor) -> ComplianceResult<Vec<Order>> {
        require_role(actor, &[Role::Admin, Role::Qa, Role::Auditor], "list orders")?;
        let mut tx = self.ctx.store.begin().await?;
        Ok(tx.find_orders(actor.company_id, None).await?)
    }

    /// The calling vendor's orders with their checklists
    pub async fn vendor_orders(&self, actor: &Actor) -> ComplianceResult<Vec<VendorOrderView>> {
        require_role(actor, &[Role::Vendor], "list vendor orders")?;

        let mut tx = self.ctx.store.begin().await?;
        let vendor = vendor_profile_of(tx.as_mut(), actor)
            .await?
            .ok_or_else(|| ComplianceError::not_found("Vendor profile", actor.user_id))?;

        let orders = tx.find_orders(actor.company_id, Some(vendor.id)).await?;
        let mut views = Vec::with_capacity(orders.len());
        for order in orders {
            let checklist = tx.find_checklist(order.id).await?;
            views.push(VendorOrderView { order, checklist });
        }

        debug!("Vendor {} has {} orders", vendor.id, views.len());
        Ok(views)
    }
}

pub(crate) fn ready_to_ship_entry(actor: &Actor, order: &Order) -> AuditEntry {
    AuditEntry::new(actor, AuditAction::OrderReadyToShip, EntityType::Order, order.id).with_change(
        Some(json!({ "status": OrderStatus::DocsPending })),
        Some(json!({ "status": OrderStatus::ReadyToShip })),
    )
}
