use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::{required_text, CatalogError};

/// Destination wildcard: the requirement applies to every destination
pub const ALL_DESTINATIONS: &str = "ALL";

/// Document category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentCategory {
    /// Product-scoped, pre-approved (SOPs, licences)
    Master,
    /// Order-scoped, reviewed by QA
    Transactional,
}

impl DocumentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentCategory::Master => "MASTER",
            DocumentCategory::Transactional => "TRANSACTIONAL",
        }
    }
}

impl FromStr for DocumentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MASTER" => Ok(DocumentCategory::Master),
            "TRANSACTIONAL" => Ok(DocumentCategory::Transactional),
            other => Err(format!("unknown document category: {}", other)),
        }
    }
}

/// Admin-defined rule: orders of `product_id` shipped to `destination` need a `doc_type` document.
///
/// Never mutated after creation. No uniqueness on (product, destination, doc_type).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComplianceRequirement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub destination: String,
    pub doc_type: String,
    pub category: DocumentCategory,
    pub requirement: String,
    pub company_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl ComplianceRequirement {
    /// Product matches and destination matches exactly or is the wildcard
    pub fn applies_to(&self, product_id: Uuid, destination: &str) -> bool {
        self.product_id == product_id
            && (self.destination == destination || self.destination == ALL_DESTINATIONS)
    }
}

/// Requirement definition request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewRequirement {
    pub product_id: Option<Uuid>,
    pub destination: Option<String>,
    pub doc_type: Option<String>,
    pub category: Option<DocumentCategory>,
    pub requirement: Option<String>,
}

impl NewRequirement {
    pub fn new(product_id: Uuid, doc_type: &str, requirement: &str) -> Self {
        Self {
            product_id: Some(product_id),
            doc_type: Some(doc_type.to_string()),
            requirement: Some(requirement.to_string()),
            ..Default::default()
        }
    }

    pub fn for_destination(mut self, destination: &str) -> Self {
        self.destination = Some(destination.to_string());
        self
    }

    pub fn with_category(mut self, category: DocumentCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Validate and build. Destination defaults to `ALL`, category to TRANSACTIONAL.
    pub fn into_requirement(self, company_id: Uuid) -> Result<ComplianceRequirement, CatalogError> {
        let product_id = self.product_id.ok_or(CatalogError::MissingField("product_id"))?;
        let doc_type = required_text(self.doc_type.as_deref(), "doc_type")?;
        let requirement = required_text(self.requirement.as_deref(), "requirement")?;
        let destination = self
            .destination
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| ALL_DESTINATIONS.to_string());

        Ok(ComplianceRequirement {
            id: Uuid::new_v4(),
            product_id,
            destination,
            doc_type,
            category: self.category.unwrap_or(DocumentCategory::Transactional),
            requirement,
            company_id,
            created_at: Utc::now(),
        })
    }
}

/// Select the requirements that apply to an order of `product_id` to `destination`,
/// preserving catalog order.
pub fn applicable_requirements<'a, I>(
    requirements: I,
    product_id: Uuid,
    destination: &str,
) -> Vec<ComplianceRequirement>
where
    I: IntoIterator<Item = &'a ComplianceRequirement>,
{
    requirements
        .into_iter()
        .filter(|r| r.applies_to(product_id, destination))
        .cloned()
        .collect()
}
