use std::collections::HashSet;

use chrono::Utc;
use pharmaops_catalog::ComplianceRequirement;
use uuid::Uuid;

use crate::manager::OrderLifecycle;
use crate::models::{ChecklistEntry, ChecklistStatus, Document, Order};

/// Outcome of cascading a review decision into the checklist
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewCascade {
    /// The entry now mirrors the reviewed document
    Updated(ChecklistEntry),
    /// The order has no entry for this doc type
    NoEntry,
}

/// The document checklist of one order. The set of entries is fixed when the
/// order is created; only statuses and document links change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Checklist {
    entries: Vec<ChecklistEntry>,
}

impl Checklist {
    pub fn new(entries: Vec<ChecklistEntry>) -> Self {
        Self { entries }
    }

    /// Snapshot the applicable requirements into MISSING entries.
    ///
    /// Duplicate requirements for the same doc type collapse into the first one,
    /// so there is exactly one entry per (order, doc_type).
    pub fn materialize(order: &Order, requirements: &[ComplianceRequirement]) -> Self {
        let mut seen = HashSet::new();
        let now = Utc::now();

        let entries = requirements
            .iter()
            .filter(|req| seen.insert(req.doc_type.clone()))
            .map(|req| ChecklistEntry {
                id: Uuid::new_v4(),
                order_id: order.id,
                requirement_id: Some(req.id),
                doc_type: req.doc_type.clone(),
                category: req.category,
                required: true,
                status: ChecklistStatus::Missing,
                uploaded_doc_id: None,
                created_at: now,
                updated_at: now,
            })
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &[ChecklistEntry] {
        &self.entries
    }

    pub fn is_complete(&self) -> bool {
        OrderLifecycle::is_ready(&self.entries)
    }

    /// A new upload resets its entry to PENDING_REVIEW, whatever the previous status.
    /// Returns the updated entry, if the order tracks this doc type.
    pub fn record_upload(&mut self, document: &Document) -> Option<ChecklistEntry> {
        let entry = self.find_mut(&document.doc_type)?;
        entry.link(document.id, ChecklistStatus::PendingReview);
        Some(entry.clone())
    }

    /// Mirror a reviewed document's status into its entry. The last review wins:
    /// the entry links the reviewed document even if a later upload had replaced it.
    pub fn record_review(&mut self, document: &Document) -> ReviewCascade {
        let Some(entry) = self.find_mut(&document.doc_type) else {
            return ReviewCascade::NoEntry;
        };

        entry.link(document.id, document.status.into());
        ReviewCascade::Updated(entry.clone())
    }

    fn find_mut(&mut self, doc_type: &str) -> Option<&mut ChecklistEntry> {
        self.entries.iter_mut().find(|e| e.doc_type == doc_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::NewOrder;
    use crate::models::DocumentStatus;
    use crate::review;
    use pharmaops_catalog::{DocumentCategory, NewRequirement};
    use pharmaops_shared::{Actor, Role};

    fn setup() -> (Order, Actor) {
        let admin = Actor::new(Uuid::new_v4(), Uuid::new_v4(), Role::Admin);
        let order = NewOrder::new(Uuid::new_v4(), Uuid::new_v4(), 10, "Berlin")
            .validate()
            .unwrap()
            .into_order("ORD-00001".into(), &admin);
        (order, admin)
    }

    fn requirement(order: &Order, doc_type: &str, category: DocumentCategory) -> ComplianceRequirement {
        NewRequirement::new(order.product_id, doc_type, "required")
            .with_category(category)
            .into_requirement(order.company_id)
            .unwrap()
    }

    fn upload(order: &Order, doc_type: &str) -> Document {
        let vendor = Actor::new(Uuid::new_v4(), order.company_id, Role::Vendor);
        review::transactional_document(order, doc_type, "coa.pdf", "s3://bucket/coa.pdf".into(), None, &vendor)
    }

    #[test]
    fn test_materialize_snapshots_requirements() {
        let (order, _) = setup();
        let reqs = vec![
            requirement(&order, "CoA", DocumentCategory::Transactional),
            requirement(&order, "GMP Certificate", DocumentCategory::Master),
        ];

        let checklist = Checklist::materialize(&order, &reqs);

        assert_eq!(checklist.entries().len(), 2);
        assert!(checklist.entries().iter().all(|e| e.status == ChecklistStatus::Missing && e.required));
        assert_eq!(checklist.entries()[0].requirement_id, Some(reqs[0].id));
        assert_eq!(checklist.entries()[1].category, DocumentCategory::Master);
        assert!(!checklist.is_complete());
    }

    #[test]
    fn test_duplicate_requirements_collapse() {
        let (order, _) = setup();
        let reqs = vec![
            requirement(&order, "CoA", DocumentCategory::Transactional),
            requirement(&order, "CoA", DocumentCategory::Master),
        ];

        let checklist = Checklist::materialize(&order, &reqs);

        assert_eq!(checklist.entries().len(), 1);
        assert_eq!(checklist.entries()[0].category, DocumentCategory::Transactional);
    }

    #[test]
    fn test_empty_checklist_is_complete() {
        let (order, _) = setup();
        assert!(Checklist::materialize(&order, &[]).is_complete());
    }

    #[test]
    fn test_upload_resets_entry() {
        let (order, _) = setup();
        let mut checklist = Checklist::materialize(&order, &[requirement(&order, "CoA", DocumentCategory::Transactional)]);

        let first = upload(&order, "CoA");
        let updated = checklist.record_upload(&first).unwrap();
        assert_eq!(updated.status, ChecklistStatus::PendingReview);
        assert_eq!(updated.uploaded_doc_id, Some(first.id));

        let mut reviewed = first.clone();
        reviewed.status = DocumentStatus::Rejected;
        checklist.record_review(&reviewed);
        assert_eq!(checklist.entries()[0].status, ChecklistStatus::Rejected);

        // Re-upload after rejection goes back to review
        let second = upload(&order, "CoA");
        checklist.record_upload(&second);
        assert_eq!(checklist.entries()[0].status, ChecklistStatus::PendingReview);
        assert_eq!(checklist.entries()[0].uploaded_doc_id, Some(second.id));
    }

    #[test]
    fn test_upload_for_untracked_doc_type() {
        let (order, _) = setup();
        let mut checklist = Checklist::materialize(&order, &[requirement(&order, "CoA", DocumentCategory::Transactional)]);

        assert!(checklist.record_upload(&upload(&order, "Invoice")).is_none());
        assert_eq!(checklist.entries()[0].status, ChecklistStatus::Missing);
    }

    #[test]
    fn test_review_of_older_upload_relinks_entry() {
        let (order, _) = setup();
        let mut checklist = Checklist::materialize(&order, &[requirement(&order, "CoA", DocumentCategory::Transactional)]);

        let old = upload(&order, "CoA");
        let new = upload(&order, "CoA");
        checklist.record_upload(&old);
        checklist.record_upload(&new);

        let mut approved_old = old.clone();
        approved_old.status = DocumentStatus::Approved;

        let ReviewCascade::Updated(entry) = checklist.record_review(&approved_old) else {
            panic!("expected the entry to be updated");
        };
        assert_eq!(entry.status, ChecklistStatus::Approved);
        assert_eq!(entry.uploaded_doc_id, Some(old.id));
        assert!(checklist.is_complete());
    }

    #[test]
    fn test_review_without_entry() {
        let (order, _) = setup();
        let mut checklist = Checklist::materialize(&order, &[]);
        assert_eq!(checklist.record_review(&upload(&order, "CoA")), ReviewCascade::NoEntry);
    }
}
