pub mod anchor;
pub mod audit;
pub mod error;
pub mod repository;
pub mod sequence;
pub mod services;
pub mod settings;
pub mod storage;

pub use anchor::{AnchorReceipt, AnchorService, MockAnchor};
pub use audit::{AuditSink, FanoutAuditSink, StoreAuditSink};
pub use error::{ComplianceError, ComplianceResult};
pub use repository::{AuditQuery, ComplianceStore, DocumentFilter, StoreError, StoreResult, StoreTransaction};
pub use sequence::OrderSequence;
pub use services::{ComplianceServices, ServiceContext};
pub use settings::WorkflowSettings;
pub use storage::{content_hash, DocumentStorage, MockStorage, StoredObject};

/// Error type returned by external collaborators (storage, anchoring, audit sinks)
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
