use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{required_text, CatalogError};

/// A product the company ships. Immutable after creation except `description`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub company_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product registration request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProduct {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub description: Option<String>,
}

impl NewProduct {
    pub fn new(name: &str, sku: &str, description: Option<&str>) -> Self {
        Self {
            name: Some(name.to_string()),
            sku: Some(sku.to_string()),
            description: description.map(str::to_string),
        }
    }

    /// Validate the request and build the product for `company_id`
    pub fn into_product(self, company_id: Uuid) -> Result<Product, CatalogError> {
        let name = required_text(self.name.as_deref(), "name")?;
        let sku = required_text(self.sku.as_deref(), "sku")?;
        let now = Utc::now();

        Ok(Product {
            id: Uuid::new_v4(),
            name,
            sku,
            description: self.description.filter(|d| !d.trim().is_empty()),
            company_id,
            created_at: now,
            updated_at: now,
        })
    }
}

impl Product {
    pub fn update_description(&mut self, description: Option<String>) {
        self.description = description;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_requires_name_and_sku() {
        let company = Uuid::new_v4();

        let missing_sku = NewProduct { name: Some("Atenolol 50mg".into()), ..Default::default() };
        assert_eq!(missing_sku.into_product(company), Err(CatalogError::MissingField("sku")));

        let blank_name = NewProduct::new("  ", "ATN-50-001", None);
        assert_eq!(blank_name.into_product(company), Err(CatalogError::MissingField("name")));

        let product = NewProduct::new("Atenolol 50mg Tablets", "ATN-50-001", Some("Beta-blocker"))
            .into_product(company)
            .unwrap();
        assert_eq!(product.sku, "ATN-50-001");
        assert_eq!(product.company_id, company);
    }

    #[test]
    fn test_description_update() {
        let mut product = NewProduct::new("Metformin 500mg", "MET-500-001", None)
            .into_product(Uuid::new_v4())
            .unwrap();
        let created = product.updated_at;

        product.update_description(Some("Diabetes medication".into()));

        assert_eq!(product.description.as_deref(), Some("Diabetes medication"));
        assert!(product.updated_at >= created);
    }
}
