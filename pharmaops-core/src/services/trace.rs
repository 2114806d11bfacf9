use pharmaops_order::{ComplianceReport, DateRange, DocumentStatus, OrderTrace};
use pharmaops_shared::{Actor, AuditEntry, Role};
use serde::Serialize;
use uuid::Uuid;

use super::{require_role, ServiceContext};
use crate::error::{ComplianceError, ComplianceResult};
use crate::repository::{AuditQuery, DocumentFilter};

const AUDIT_READERS: &[Role] = &[Role::Auditor, Role::Admin];

/// Headline counts for a company dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Workload {
    pub orders: u64,
    pub documents: u64,
    pub pending_review: u64,
}

/// Read-only views across orders, documents, shipments and the audit trail
pub struct TraceService {
    ctx: ServiceContext,
}

impl TraceService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn get_order_trace(&self, actor: &Actor, order_id: Uuid) -> ComplianceResult<OrderTrace> {
        require_role(actor, AUDIT_READERS, "trace orders")?;

        let mut tx = self.ctx.store.begin().await?;
        let order = tx
            .get_order(actor.company_id, order_id)
            .await?
            .ok_or_else(|| ComplianceError::not_found("Order", order_id))?;

        let documents = tx
            .find_documents(actor.company_id, &DocumentFilter::for_order(order.id))
            .await?;
        let checklist = tx.find_checklist(order.id).await?;
        let shipments = tx.find_shipments(order.id).await?;

        let mut entity_ids = vec![order.id];
        entity_ids.extend(documents.iter().map(|d| d.id));
        entity_ids.extend(shipments.iter().map(|s| s.id));
        let audit_logs = tx
            .find_audit(actor.company_id, &AuditQuery::for_entities(entity_ids, usize::MAX))
            .await?;

        Ok(OrderTrace::assemble(order, documents, checklist, shipments, audit_logs))
    }

    pub async fn generate_compliance_report(
        &self,
        actor: &Actor,
        range: DateRange,
        report_type: Option<String>,
    ) -> ComplianceResult<ComplianceReport> {
        require_role(actor, AUDIT_READERS, "generate compliance reports")?;

        let mut tx = self.ctx.store.begin().await?;
        let orders = tx.find_orders(actor.company_id, None).await?;
        let documents = tx.find_documents(actor.company_id, &DocumentFilter::default()).await?;

        Ok(ComplianceReport::generate(&orders, &documents, range, report_type, actor.user_id))
    }

    /// Company audit trail, newest first. A zero limit falls back to the configured default.
    pub async fn audit_logs(&self, actor: &Actor, mut query: AuditQuery) -> ComplianceResult<Vec<AuditEntry>> {
        require_role(actor, AUDIT_READERS, "read audit logs")?;
        if query.limit == 0 {
            query.limit = self.ctx.settings.audit_limit;
        }

        let mut tx = self.ctx.store.begin().await?;
        Ok(tx.find_audit(actor.company_id, &query).await?)
    }

    pub async fn workload(&self, actor: &Actor) -> ComplianceResult<Workload> {
        require_role(actor, &[Role::Admin, Role::Qa, Role::Auditor], "view workload")?;

        let mut tx = self.ctx.store.begin().await?;
        Ok(Workload {
            orders: tx.count_orders(actor.company_id).await?,
            documents: tx.count_documents(actor.company_id, &DocumentFilter::default()).await?,
            pending_review: tx
                .count_documents(actor.company_id, &DocumentFilter::with_status(DocumentStatus::PendingReview))
                .await?,
        })
    }
}
