use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Document, DocumentStatus, Order, OrderStatus};

pub const DEFAULT_REPORT_TYPE: &str = "COMPLIANCE_SUMMARY";

/// Inclusive creation-time window; an open bound means unbounded
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| at >= s) && self.end.map_or(true, |e| at <= e)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderSummary {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DocumentSummary {
    pub total: usize,
    pub approved: usize,
    pub rejected: usize,
    pub pending: usize,
    pub approval_rate: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderLine {
    pub order_number: String,
    pub status: OrderStatus,
    pub quantity: i32,
    pub destination: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplianceReport {
    pub report_type: String,
    pub generated_at: DateTime<Utc>,
    pub generated_by: Uuid,
    pub date_range: DateRange,
    pub orders: OrderSummary,
    pub documents: DocumentSummary,
    pub lines: Vec<OrderLine>,
}

impl ComplianceReport {
    /// Aggregate the company's orders and documents created inside `range`.
    pub fn generate(
        orders: &[Order],
        documents: &[Document],
        range: DateRange,
        report_type: Option<String>,
        generated_by: Uuid,
    ) -> Self {
        let mut in_range: Vec<&Order> = orders.iter().filter(|o| range.contains(o.created_at)).collect();
        in_range.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let completed = in_range.iter().filter(|o| o.status == OrderStatus::Delivered).count();
        let order_summary = OrderSummary {
            total: in_range.len(),
            completed,
            pending: in_range.len() - completed,
            completion_rate: percentage(completed, in_range.len()),
        };

        let docs: Vec<&Document> = documents.iter().filter(|d| range.contains(d.created_at)).collect();
        let count = |status: DocumentStatus| docs.iter().filter(|d| d.status == status).count();
        let approved = count(DocumentStatus::Approved);
        let document_summary = DocumentSummary {
            total: docs.len(),
            approved,
            rejected: count(DocumentStatus::Rejected),
            pending: count(DocumentStatus::PendingReview),
            approval_rate: percentage(approved, docs.len()),
        };

        let lines = in_range
            .iter()
            .map(|o| OrderLine {
                order_number: o.order_number.clone(),
                status: o.status,
                quantity: o.quantity,
                destination: o.destination.clone(),
                created_at: o.created_at,
            })
            .collect();

        Self {
            report_type: report_type.unwrap_or_else(|| DEFAULT_REPORT_TYPE.to_string()),
            generated_at: Utc::now(),
            generated_by,
            date_range: range,
            orders: order_summary,
            documents: document_summary,
            lines,
        }
    }
}

/// Percentage rounded to two decimals; zero for an empty denominator
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 * 10_000.0 / total as f64).round() / 100.0
}
