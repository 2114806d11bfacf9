use uuid::Uuid;

use crate::models::audit::AuditEntry;

/// Envelope published to the audit stream for each recorded audit entry
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct AuditRecordedEvent {
    pub company_id: Uuid,
    pub entry: AuditEntry,
    pub emitted_at: i64,
}

impl AuditRecordedEvent {
    pub fn new(entry: AuditEntry) -> Self {
        Self {
            company_id: entry.company_id,
            entry,
            emitted_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Partition key: keeps one company's trail ordered within a partition
    pub fn key(&self) -> String {
        self.company_id.to_string()
    }
}
