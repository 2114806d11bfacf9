pub mod product;
pub mod vendor;
pub mod requirement;

pub use product::{NewProduct, Product};
pub use vendor::{NewVendor, VendorProfile, VendorStatus};
pub use requirement::{
    applicable_requirements, ComplianceRequirement, DocumentCategory, NewRequirement, ALL_DESTINATIONS,
};

/// Input errors raised while building catalog entities
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid value for {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },
}

/// Treats `None` and whitespace-only strings the same way: absent.
pub fn required_text(value: Option<&str>, field: &'static str) -> Result<String, CatalogError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(CatalogError::MissingField(field)),
    }
}
