pub mod models;
pub mod manager;
pub mod checklist;
pub mod review;
pub mod fulfillment;
pub mod trace;
pub mod report;

pub use models::{
    ChecklistEntry, ChecklistStatus, Document, DocumentStatus, Order, OrderStatus, Shipment, ShipmentStatus,
};
pub use manager::{NewOrder, OrderDraft, OrderError, OrderLifecycle, OrderNumberFormat};
pub use checklist::{Checklist, ReviewCascade};
pub use review::ReviewAction;
pub use fulfillment::NewShipment;
pub use trace::{OrderTrace, TimelineEvent, TimelineEventKind};
pub use report::{ComplianceReport, DateRange};
