use pharmaops_order::OrderNumberFormat;

/// Tunables for the workflow services
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    pub order_numbers: OrderNumberFormat,
    /// Default page size for audit log queries
    pub audit_limit: usize,
    /// How many times a conflicting transaction is replayed before the error surfaces
    pub conflict_retries: u32,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            order_numbers: OrderNumberFormat::default(),
            audit_limit: 100,
            conflict_retries: 1,
        }
    }
}
