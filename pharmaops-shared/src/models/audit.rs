use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::actor::Actor;

/// Actions recorded in the audit trail
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    ProductCreated,
    VendorInvited,
    VendorAccepted,
    RequirementDefined,
    MasterSopUploaded,
    OrderCreated,
    OrderAccepted,
    OrderReadyToShip,
    DocumentUploaded,
    DocumentApproved,
    DocumentRejected,
    ShipmentCreated,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::ProductCreated => "PRODUCT_CREATED",
            AuditAction::VendorInvited => "VENDOR_INVITED",
            AuditAction::VendorAccepted => "VENDOR_ACCEPTED",
            AuditAction::RequirementDefined => "REQUIREMENT_DEFINED",
            AuditAction::MasterSopUploaded => "MASTER_SOP_UPLOADED",
            AuditAction::OrderCreated => "ORDER_CREATED",
            AuditAction::OrderAccepted => "ORDER_ACCEPTED",
            AuditAction::OrderReadyToShip => "ORDER_READY_TO_SHIP",
            AuditAction::DocumentUploaded => "DOCUMENT_UPLOADED",
            AuditAction::DocumentApproved => "DOCUMENT_APPROVED",
            AuditAction::DocumentRejected => "DOCUMENT_REJECTED",
            AuditAction::ShipmentCreated => "SHIPMENT_CREATED",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let action = match s {
            "PRODUCT_CREATED" => AuditAction::ProductCreated,
            "VENDOR_INVITED" => AuditAction::VendorInvited,
            "VENDOR_ACCEPTED" => AuditAction::VendorAccepted,
            "REQUIREMENT_DEFINED" => AuditAction::RequirementDefined,
            "MASTER_SOP_UPLOADED" => AuditAction::MasterSopUploaded,
            "ORDER_CREATED" => AuditAction::OrderCreated,
            "ORDER_ACCEPTED" => AuditAction::OrderAccepted,
            "ORDER_READY_TO_SHIP" => AuditAction::OrderReadyToShip,
            "DOCUMENT_UPLOADED" => AuditAction::DocumentUploaded,
            "DOCUMENT_APPROVED" => AuditAction::DocumentApproved,
            "DOCUMENT_REJECTED" => AuditAction::DocumentRejected,
            "SHIPMENT_CREATED" => AuditAction::ShipmentCreated,
            other => return Err(format!("unknown audit action: {}", other)),
        };
        Ok(action)
    }
}

/// Kind of entity an audit entry refers to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Product,
    Vendor,
    Requirement,
    Order,
    Document,
    Shipment,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Product => "PRODUCT",
            EntityType::Vendor => "VENDOR",
            EntityType::Requirement => "REQUIREMENT",
            EntityType::Order => "ORDER",
            EntityType::Document => "DOCUMENT",
            EntityType::Shipment => "SHIPMENT",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PRODUCT" => Ok(EntityType::Product),
            "VENDOR" => Ok(EntityType::Vendor),
            "REQUIREMENT" => Ok(EntityType::Requirement),
            "ORDER" => Ok(EntityType::Order),
            "DOCUMENT" => Ok(EntityType::Document),
            "SHIPMENT" => Ok(EntityType::Shipment),
            other => Err(format!("unknown entity type: {}", other)),
        }
    }
}

/// Append-only audit trail record. Never updated or deleted once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEntry {
    pub id: Uuid,
    pub company_id: Uuid,
    pub actor_user_id: Uuid,
    pub action: AuditAction,
    pub entity_id: Option<Uuid>,
    pub entity_type: EntityType,
    pub old_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
    pub comments: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(actor: &Actor, action: AuditAction, entity_type: EntityType, entity_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_id: actor.company_id,
            actor_user_id: actor.user_id,
            action,
            entity_id: Some(entity_id),
            entity_type,
            old_value: None,
            new_value: None,
            comments: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_change(mut self, old_value: Option<serde_json::Value>, new_value: Option<serde_json::Value>) -> Self {
        self.old_value = old_value;
        self.new_value = new_value;
        self
    }

    pub fn with_comments(mut self, comments: Option<String>) -> Self {
        self.comments = comments;
        self
    }
}
