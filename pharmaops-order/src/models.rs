use chrono::{DateTime, Utc};
use pharmaops_catalog::DocumentCategory;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Order status in the fulfilment lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Requested,
    DocsPending,
    ReadyToShip,
    InTransit,
    /// Reserved; no transition reaches it yet
    Delivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Requested => "REQUESTED",
            OrderStatus::DocsPending => "DOCS_PENDING",
            OrderStatus::ReadyToShip => "READY_TO_SHIP",
            OrderStatus::InTransit => "IN_TRANSIT",
            OrderStatus::Delivered => "DELIVERED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REQUESTED" => Ok(OrderStatus::Requested),
            "DOCS_PENDING" => Ok(OrderStatus::DocsPending),
            "READY_TO_SHIP" => Ok(OrderStatus::ReadyToShip),
            "IN_TRANSIT" => Ok(OrderStatus::InTransit),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            other => Err(format!("unknown order status: {}", other)),
        }
    }
}

/// Status of a checklist entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChecklistStatus {
    Missing,
    PendingReview,
    Approved,
    Rejected,
}

impl ChecklistStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChecklistStatus::Missing => "MISSING",
            ChecklistStatus::PendingReview => "PENDING_REVIEW",
            ChecklistStatus::Approved => "APPROVED",
            ChecklistStatus::Rejected => "REJECTED",
        }
    }
}

impl FromStr for ChecklistStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MISSING" => Ok(ChecklistStatus::Missing),
            "PENDING_REVIEW" => Ok(ChecklistStatus::PendingReview),
            "APPROVED" => Ok(ChecklistStatus::Approved),
            "REJECTED" => Ok(ChecklistStatus::Rejected),
            other => Err(format!("unknown checklist status: {}", other)),
        }
    }
}

impl From<DocumentStatus> for ChecklistStatus {
    fn from(status: DocumentStatus) -> Self {
        match status {
            DocumentStatus::PendingReview => ChecklistStatus::PendingReview,
            DocumentStatus::Approved => ChecklistStatus::Approved,
            DocumentStatus::Rejected => ChecklistStatus::Rejected,
        }
    }
}

/// Review status of an uploaded document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    PendingReview,
    Approved,
    Rejected,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::PendingReview => "PENDING_REVIEW",
            DocumentStatus::Approved => "APPROVED",
            DocumentStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING_REVIEW" => Ok(DocumentStatus::PendingReview),
            "APPROVED" => Ok(DocumentStatus::Approved),
            "REJECTED" => Ok(DocumentStatus::Rejected),
            other => Err(format!("unknown document status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentStatus {
    Preparing,
    InTransit,
    Delivered,
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Preparing => "PREPARING",
            ShipmentStatus::InTransit => "IN_TRANSIT",
            ShipmentStatus::Delivered => "DELIVERED",
        }
    }
}

impl FromStr for ShipmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PREPARING" => Ok(ShipmentStatus::Preparing),
            "IN_TRANSIT" => Ok(ShipmentStatus::InTransit),
            "DELIVERED" => Ok(ShipmentStatus::Delivered),
            other => Err(format!("unknown shipment status: {}", other)),
        }
    }
}

/// A purchase order placed with a vendor. Only `status` changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub vendor_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub destination: String,
    pub status: OrderStatus,
    pub company_id: Uuid,
    pub created_by_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn update_status(&mut self, new_status: OrderStatus) {
        self.status = new_status;
        self.updated_at = Utc::now();
    }
}

/// Per-order, per-doc-type tracking row (order document status)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChecklistEntry {
    pub id: Uuid,
    pub order_id: Uuid,
    pub requirement_id: Option<Uuid>,
    pub doc_type: String,
    pub category: DocumentCategory,
    pub required: bool,
    pub status: ChecklistStatus,
    /// Most recent document uploaded for this doc type
    pub uploaded_doc_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChecklistEntry {
    pub fn is_satisfied(&self) -> bool {
        !self.required || self.status == ChecklistStatus::Approved
    }

    pub fn link(&mut self, document_id: Uuid, status: ChecklistStatus) {
        self.status = status;
        self.uploaded_doc_id = Some(document_id);
        self.updated_at = Utc::now();
    }
}

/// Uploaded compliance document. Transactional documents carry `order_id`;
/// master documents carry `product_id` only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub doc_type: String,
    pub file_name: String,
    pub locator: String,
    pub file_hash: Option<String>,
    pub status: DocumentStatus,
    pub category: DocumentCategory,
    pub company_id: Uuid,
    pub uploaded_by_id: Uuid,
    pub order_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub reviewed_by_id: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Shipment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub order_number: String,
    pub tracking_number: String,
    pub courier: String,
    pub status: ShipmentStatus,
    pub location: Option<String>,
    pub company_id: Uuid,
    pub created_by_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
