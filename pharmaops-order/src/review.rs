use chrono::Utc;
use pharmaops_catalog::DocumentCategory;
use pharmaops_shared::Actor;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::manager::OrderError;
use crate::models::{Document, DocumentStatus, Order};

/// QA decision on a pending document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl ReviewAction {
    pub fn resulting_status(&self) -> DocumentStatus {
        match self {
            ReviewAction::Approve => DocumentStatus::Approved,
            ReviewAction::Reject => DocumentStatus::Rejected,
        }
    }
}

impl FromStr for ReviewAction {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "APPROVE" => Ok(ReviewAction::Approve),
            "REJECT" => Ok(ReviewAction::Reject),
            _ => Err(OrderError::Validation(
                "Invalid action. Must be APPROVE or REJECT".to_string(),
            )),
        }
    }
}

/// Vendor upload against an order; waits for QA review
pub fn transactional_document(
    order: &Order,
    doc_type: &str,
    file_name: &str,
    locator: String,
    file_hash: Option<String>,
    uploader: &Actor,
) -> Document {
    let now = Utc::now();
    Document {
        id: Uuid::new_v4(),
        doc_type: doc_type.to_string(),
        file_name: file_name.to_string(),
        locator,
        file_hash,
        status: DocumentStatus::PendingReview,
        category: DocumentCategory::Transactional,
        company_id: order.company_id,
        uploaded_by_id: uploader.user_id,
        order_id: Some(order.id),
        product_id: Some(order.product_id),
        reviewed_by_id: None,
        reviewed_at: None,
        review_comments: None,
        created_at: now,
        updated_at: now,
    }
}

/// Product-level SOP. Approved on creation and never attached to an order.
pub fn master_document(
    product_id: Uuid,
    doc_type: &str,
    file_name: &str,
    locator: String,
    file_hash: Option<String>,
    uploader: &Actor,
) -> Document {
    let now = Utc::now();
    Document {
        id: Uuid::new_v4(),
        doc_type: doc_type.to_string(),
        file_name: file_name.to_string(),
        locator,
        file_hash,
        status: DocumentStatus::Approved,
        category: DocumentCategory::Master,
        company_id: uploader.company_id,
        uploaded_by_id: uploader.user_id,
        order_id: None,
        product_id: Some(product_id),
        reviewed_by_id: None,
        reviewed_at: None,
        review_comments: None,
        created_at: now,
        updated_at: now,
    }
}

/// Record a QA decision. Only PENDING_REVIEW documents can be reviewed.
pub fn review(
    document: &mut Document,
    action: ReviewAction,
    reviewer: &Actor,
    comments: Option<String>,
) -> Result<(), OrderError> {
    if document.status != DocumentStatus::PendingReview {
        return Err(OrderError::InvalidState("Document is not pending review".to_string()));
    }

    let now = Utc::now();
    document.status = action.resulting_status();
    document.reviewed_by_id = Some(reviewer.user_id);
    document.reviewed_at = Some(now);
    document.review_comments = comments;
    document.updated_at = now;
    Ok(())
}
