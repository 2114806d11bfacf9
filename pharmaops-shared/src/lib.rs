pub mod actor;
pub mod models;

pub use actor::{Actor, Role};
pub use models::audit::{AuditAction, AuditEntry, EntityType};
pub use models::events::AuditRecordedEvent;
