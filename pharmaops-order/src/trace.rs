use chrono::{DateTime, Utc};
use pharmaops_shared::AuditEntry;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{ChecklistEntry, Document, DocumentStatus, Order, Shipment};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimelineEventKind {
    OrderCreated,
    DocumentUploaded,
    DocumentApproved,
    DocumentRejected,
    ShipmentCreated,
}

impl TimelineEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimelineEventKind::OrderCreated => "ORDER_CREATED",
            TimelineEventKind::DocumentUploaded => "DOCUMENT_UPLOADED",
            TimelineEventKind::DocumentApproved => "DOCUMENT_APPROVED",
            TimelineEventKind::DocumentRejected => "DOCUMENT_REJECTED",
            TimelineEventKind::ShipmentCreated => "SHIPMENT_CREATED",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimelineEvent {
    pub timestamp: DateTime<Utc>,
    pub kind: TimelineEventKind,
    pub description: String,
    pub entity_id: Uuid,
}

/// Everything known about one order, for auditors
#[derive(Debug, Clone, Serialize)]
pub struct OrderTrace {
    pub order: Order,
    pub documents: Vec<Document>,
    pub checklist: Vec<ChecklistEntry>,
    pub shipments: Vec<Shipment>,
    pub audit_logs: Vec<AuditEntry>,
    pub timeline: Vec<TimelineEvent>,
}

impl OrderTrace {
    pub fn assemble(
        order: Order,
        mut documents: Vec<Document>,
        checklist: Vec<ChecklistEntry>,
        mut shipments: Vec<Shipment>,
        mut audit_logs: Vec<AuditEntry>,
    ) -> Self {
        documents.sort_by_key(|d| d.created_at);
        shipments.sort_by_key(|s| s.created_at);
        audit_logs.sort_by_key(|a| a.timestamp);

        let timeline = build_timeline(&order, &documents, &shipments);

        Self {
            order,
            documents,
            checklist,
            shipments,
            audit_logs,
            timeline,
        }
    }
}

/// Union of creation, upload, review and shipment events in ascending time.
///
/// Events with equal timestamps keep their collection order.
pub fn build_timeline(order: &Order, documents: &[Document], shipments: &[Shipment]) -> Vec<TimelineEvent> {
    let mut events = vec![TimelineEvent {
        timestamp: order.created_at,
        kind: TimelineEventKind::OrderCreated,
        description: format!("Order {} created", order.order_number),
        entity_id: order.id,
    }];

    events.extend(documents.iter().map(|doc| TimelineEvent {
        timestamp: doc.created_at,
        kind: TimelineEventKind::DocumentUploaded,
        description: format!("Document {} uploaded", doc.doc_type),
        entity_id: doc.id,
    }));

    events.extend(documents.iter().filter_map(|doc| {
        let reviewed_at = doc.reviewed_at?;
        let kind = match doc.status {
            DocumentStatus::Approved => TimelineEventKind::DocumentApproved,
            DocumentStatus::Rejected => TimelineEventKind::DocumentRejected,
            DocumentStatus::PendingReview => return None,
        };
        Some(TimelineEvent {
            timestamp: reviewed_at,
            kind,
            description: format!("Document {} {}", doc.doc_type, doc.status.as_str().to_lowercase()),
            entity_id: doc.id,
        })
    }));

    events.extend(shipments.iter().map(|shipment| TimelineEvent {
        timestamp: shipment.created_at,
        kind: TimelineEventKind::ShipmentCreated,
        description: format!("Shipment created with tracking {}", shipment.tracking_number),
        entity_id: shipment.id,
    }));

    events.sort_by_key(|e| e.timestamp);
    events
}
