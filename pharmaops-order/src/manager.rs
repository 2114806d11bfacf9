use crate::models::{ChecklistEntry, Order, OrderStatus};
use chrono::Utc;
use pharmaops_shared::Actor;
use serde::Deserialize;
use uuid::Uuid;

/// Order number layout: `prefix` followed by the ordinal zero-padded to `width` digits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderNumberFormat {
    pub prefix: String,
    pub width: usize,
}

impl OrderNumberFormat {
    pub fn new(prefix: &str, width: usize) -> Self {
        Self { prefix: prefix.to_string(), width }
    }

    pub fn format(&self, ordinal: u64) -> String {
        format!("{}{:0width$}", self.prefix, ordinal, width = self.width)
    }
}

impl Default for OrderNumberFormat {
    fn default() -> Self {
        Self::new("ORD-", 5)
    }
}

/// Order creation request. Every field is optional so absent input can be reported.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewOrder {
    pub vendor_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub quantity: Option<i64>,
    pub destination: Option<String>,
}

/// A validated order request, waiting for its order number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub vendor_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub destination: String,
}

impl NewOrder {
    pub fn new(vendor_id: Uuid, product_id: Uuid, quantity: i64, destination: &str) -> Self {
        Self {
            vendor_id: Some(vendor_id),
            product_id: Some(product_id),
            quantity: Some(quantity),
            destination: Some(destination.to_string()),
        }
    }

    pub fn validate(&self) -> Result<OrderDraft, OrderError> {
        let vendor_id = self.vendor_id.ok_or(OrderError::MissingField("vendor_id"))?;
        let product_id = self.product_id.ok_or(OrderError::MissingField("product_id"))?;
        let quantity = self.quantity.ok_or(OrderError::MissingField("quantity"))?;
        let destination = self
            .destination
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or(OrderError::MissingField("destination"))?;

        if quantity <= 0 {
            return Err(OrderError::Validation("quantity must be greater than zero".to_string()));
        }
        let quantity = i32::try_from(quantity)
            .map_err(|_| OrderError::Validation("quantity is too large".to_string()))?;

        Ok(OrderDraft {
            vendor_id,
            product_id,
            quantity,
            destination: destination.to_string(),
        })
    }
}

impl OrderDraft {
    pub fn into_order(self, order_number: String, actor: &Actor) -> Order {
        let now = Utc::now();
        Order {
            id: Uuid::new_v4(),
            order_number,
            vendor_id: self.vendor_id,
            product_id: self.product_id,
            quantity: self.quantity,
            destination: self.destination,
            status: OrderStatus::Requested,
            company_id: actor.company_id,
            created_by_id: actor.user_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Order lifecycle state machine:
/// REQUESTED → DOCS_PENDING → READY_TO_SHIP → IN_TRANSIT → DELIVERED
pub struct OrderLifecycle;

impl OrderLifecycle {
    /// Transition: Requested → DocsPending (vendor accepts)
    pub fn accept(order: &mut Order, vendor_profile_id: Uuid) -> Result<(), OrderError> {
        if order.vendor_id != vendor_profile_id {
            return Err(OrderError::NotOwned(order.id.to_string()));
        }

        if order.status != OrderStatus::Requested {
            return Err(OrderError::InvalidState(
                "Order cannot be accepted in current status".to_string(),
            ));
        }

        Self::transition(order, OrderStatus::DocsPending)
    }

    /// Transition: DocsPending → ReadyToShip once every required entry is approved.
    ///
    /// Returns `true` when the order moved. An empty checklist counts as complete.
    pub fn recompute_readiness(order: &mut Order, checklist: &[ChecklistEntry]) -> bool {
        if order.status != OrderStatus::DocsPending {
            return false;
        }

        if !Self::is_ready(checklist) {
            return false;
        }

        order.update_status(OrderStatus::ReadyToShip);
        true
    }

    pub fn is_ready(checklist: &[ChecklistEntry]) -> bool {
        checklist.iter().all(ChecklistEntry::is_satisfied)
    }

    /// Transition: ReadyToShip → InTransit (vendor dispatches)
    pub fn ship(order: &mut Order, vendor_profile_id: Uuid) -> Result<(), OrderError> {
        if order.status != OrderStatus::ReadyToShip {
            return Err(OrderError::InvalidState("Order is not ready to ship".to_string()));
        }

        if order.vendor_id != vendor_profile_id {
            return Err(OrderError::InvalidState(
                "Order is not assigned to this vendor".to_string(),
            ));
        }

        Self::transition(order, OrderStatus::InTransit)
    }

    /// Uploads are only accepted before the order is unblocked for shipment
    pub fn ensure_accepts_uploads(order: &Order) -> Result<(), OrderError> {
        match order.status {
            OrderStatus::Requested | OrderStatus::DocsPending => Ok(()),
            _ => Err(OrderError::InvalidState(format!(
                "Documents can no longer be uploaded for an order in status {}",
                order.status
            ))),
        }
    }

    fn transition(order: &mut Order, to: OrderStatus) -> Result<(), OrderError> {
        if !Self::is_valid_transition(order.status, to) {
            return Err(OrderError::InvalidTransition {
                from: order.status.to_string(),
                to: to.to_string(),
            });
        }

        order.update_status(to);
        Ok(())
    }

    fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
        matches!(
            (from, to),
            (OrderStatus::Requested, OrderStatus::DocsPending)
                | (OrderStatus::DocsPending, OrderStatus::ReadyToShip)
                | (OrderStatus::ReadyToShip, OrderStatus::InTransit)
                | (OrderStatus::InTransit, OrderStatus::Delivered)
        )
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Order {0} does not belong to this vendor")]
    NotOwned(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition {
        from: String,
        to: String,
    },
}
