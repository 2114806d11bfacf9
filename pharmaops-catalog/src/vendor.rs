use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::{required_text, CatalogError};

const DEFAULT_CAPACITY: i32 = 1000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VendorStatus {
    Invited,
    Pending,
    Accepted,
}

impl VendorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VendorStatus::Invited => "INVITED",
            VendorStatus::Pending => "PENDING",
            VendorStatus::Accepted => "ACCEPTED",
        }
    }
}

impl FromStr for VendorStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INVITED" => Ok(VendorStatus::Invited),
            "PENDING" => Ok(VendorStatus::Pending),
            "ACCEPTED" => Ok(VendorStatus::Accepted),
            other => Err(format!("unknown vendor status: {}", other)),
        }
    }
}

/// Vendor (logistics partner) profile. `Order::vendor_id` points here, and a
/// vendor user is mapped to its profile through `user_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VendorProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_name: String,
    pub license_number: Option<String>,
    pub warehouse_address: Option<String>,
    pub capacity: i32,
    pub status: VendorStatus,
    pub company_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VendorProfile {
    pub fn activate(&mut self) {
        self.status = VendorStatus::Accepted;
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewVendor {
    pub user_id: Option<Uuid>,
    pub company_name: Option<String>,
    pub license_number: Option<String>,
    pub warehouse_address: Option<String>,
    pub capacity: Option<i32>,
}

impl NewVendor {
    pub fn new(user_id: Uuid, company_name: &str) -> Self {
        Self {
            user_id: Some(user_id),
            company_name: Some(company_name.to_string()),
            ..Default::default()
        }
    }

    pub fn into_profile(self, company_id: Uuid) -> Result<VendorProfile, CatalogError> {
        let user_id = self.user_id.ok_or(CatalogError::MissingField("user_id"))?;
        let company_name = required_text(self.company_name.as_deref(), "company_name")?;
        let capacity = self.capacity.unwrap_or(DEFAULT_CAPACITY);
        if capacity <= 0 {
            return Err(CatalogError::InvalidField {
                field: "capacity",
                reason: "must be positive".to_string(),
            });
        }
        let now = Utc::now();

        Ok(VendorProfile {
            id: Uuid::new_v4(),
            user_id,
            company_name,
            license_number: self.license_number,
            warehouse_address: self.warehouse_address,
            capacity,
            status: VendorStatus::Invited,
            company_id,
            created_at: now,
            updated_at: now,
        })
    }
}
