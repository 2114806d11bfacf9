use chrono::Utc;
use pharmaops_shared::Actor;
use serde::Deserialize;
use uuid::Uuid;

use crate::manager::{OrderError, OrderLifecycle};
use crate::models::{Order, Shipment, ShipmentStatus};

/// Where a shipment starts its journey
pub const INITIAL_LOCATION: &str = "Warehouse";

/// Shipment request from the vendor
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewShipment {
    pub tracking_number: Option<String>,
    pub courier: Option<String>,
}

/// Validated carrier details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarrierDetails {
    pub tracking_number: String,
    pub courier: String,
}

impl NewShipment {
    pub fn new(tracking_number: &str, courier: &str) -> Self {
        Self {
            tracking_number: Some(tracking_number.to_string()),
            courier: Some(courier.to_string()),
        }
    }

    pub fn validate(&self) -> Result<CarrierDetails, OrderError> {
        let tracking_number = non_blank(self.tracking_number.as_deref(), "tracking_number")?;
        let courier = non_blank(self.courier.as_deref(), "courier")?;
        Ok(CarrierDetails { tracking_number, courier })
    }
}

fn non_blank(value: Option<&str>, field: &'static str) -> Result<String, OrderError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(OrderError::MissingField(field))
}

/// Dispatch an unblocked order: moves it to IN_TRANSIT and returns the shipment record.
pub fn dispatch(
    order: &mut Order,
    vendor_profile_id: Uuid,
    carrier: CarrierDetails,
    actor: &Actor,
) -> Result<Shipment, OrderError> {
    OrderLifecycle::ship(order, vendor_profile_id)?;

    let now = Utc::now();
    Ok(Shipment {
        id: Uuid::new_v4(),
        order_id: order.id,
        order_number: order.order_number.clone(),
        tracking_number: carrier.tracking_number,
        courier: carrier.courier,
        status: ShipmentStatus::InTransit,
        location: Some(INITIAL_LOCATION.to_string()),
        company_id: order.company_id,
        created_by_id: actor.user_id,
        created_at: now,
        updated_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::NewOrder;
    use crate::models::OrderStatus;
    use pharmaops_shared::Role;

    fn ready_order(vendor_id: Uuid) -> Order {
        let admin = Actor::new(Uuid::new_v4(), Uuid::new_v4(), Role::Admin);
        let mut order = NewOrder::new(vendor_id, Uuid::new_v4(), 40, "Berlin")
            .validate()
            .unwrap()
            .into_order("ORD-00003".into(), &admin);
        OrderLifecycle::accept(&mut order, vendor_id).unwrap();
        OrderLifecycle::recompute_readiness(&mut order, &[]);
        order
    }

    #[test]
    fn test_carrier_validation() {
        assert_eq!(
            NewShipment::new("  ", "DHL").validate(),
            Err(OrderError::MissingField("tracking_number"))
        );
        assert_eq!(
            NewShipment { courier: None, ..NewShipment::new("TRK-1", "DHL") }.validate(),
            Err(OrderError::MissingField("courier"))
        );

        let carrier = NewShipment::new(" TRK-1 ", "DHL").validate().unwrap();
        assert_eq!(carrier.tracking_number, "TRK-1");
    }

    #[test]
    fn test_dispatch_creates_shipment() {
        let vendor = Uuid::new_v4();
        let mut order = ready_order(vendor);
        let actor = Actor::new(Uuid::new_v4(), order.company_id, Role::Vendor);
        let carrier = NewShipment::new("TRK-1", "DHL").validate().unwrap();

        let shipment = dispatch(&mut order, vendor, carrier, &actor).unwrap();

        assert_eq!(order.status, OrderStatus::InTransit);
        assert_eq!(shipment.status, ShipmentStatus::InTransit);
        assert_eq!(shipment.order_number, order.order_number);
        assert_eq!(shipment.location.as_deref(), Some(INITIAL_LOCATION));
        assert_eq!(shipment.created_by_id, actor.user_id);
    }

    #[test]
    fn test_dispatch_only_once() {
        let vendor = Uuid::new_v4();
        let mut order = ready_order(vendor);
        let actor = Actor::new(Uuid::new_v4(), order.company_id, Role::Vendor);
        let carrier = NewShipment::new("TRK-1", "DHL").validate().unwrap();

        dispatch(&mut order, vendor, carrier.clone(), &actor).unwrap();
        let second = dispatch(&mut order, vendor, carrier, &actor);

        assert_eq!(second, Err(OrderError::InvalidState("Order is not ready to ship".to_string())));
    }
}
