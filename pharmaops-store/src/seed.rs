use pharmaops_catalog::{NewProduct, NewRequirement, NewVendor, Product, VendorProfile};
use pharmaops_core::{ComplianceResult, ComplianceServices};
use pharmaops_shared::{Actor, Role};
use tracing::info;
use uuid::Uuid;

const PRODUCTS: &[(&str, &str, &str)] = &[
    ("Atenolol 50mg Tablets", "ATN-50-001", "Beta-blocker medication"),
    ("Lisinopril 10mg Tablets", "LIS-10-001", "ACE inhibitor"),
    ("Metformin 500mg Tablets", "MET-500-001", "Diabetes medication"),
];

/// What a seeded company looks like
#[derive(Debug, Clone)]
pub struct SeedSummary {
    pub admin: Actor,
    pub vendor_user: Actor,
    pub vendor: VendorProfile,
    pub products: Vec<Product>,
}

/// Starter catalog for `company_id`: three products, each requiring a CoA
/// everywhere, and one accepted vendor. Running it again adds nothing.
pub async fn seed_company(services: &ComplianceServices, company_id: Uuid) -> ComplianceResult<SeedSummary> {
    let admin = Actor::new(Uuid::new_v4(), company_id, Role::Admin);

    let mut products = services.catalog.list_products(&admin).await?;
    for (name, sku, description) in PRODUCTS {
        if products.iter().any(|p| p.sku == *sku) {
            continue;
        }
        let product = services
            .catalog
            .register_product(&admin, NewProduct::new(name, sku, Some(*description)))
            .await?;
        services
            .catalog
            .define_requirement(&admin, NewRequirement::new(product.id, "CoA", "Certificate of Analysis per batch"))
            .await?;
        products.push(product);
    }

    let vendor = match services.catalog.list_vendors(&admin).await?.into_iter().next() {
        Some(existing) => existing,
        None => {
            let invited = services
                .catalog
                .invite_vendor(
                    &admin,
                    NewVendor {
                        license_number: Some("LIC-FL-2024".to_string()),
                        warehouse_address: Some("Berlin Dock 4".to_string()),
                        ..NewVendor::new(Uuid::new_v4(), "FastLogistics Inc.")
                    },
                )
                .await?;
            let vendor_user = Actor::new(invited.user_id, company_id, Role::Vendor);
            services.catalog.activate_vendor(&vendor_user).await?
        }
    };

    info!("Seeded company {} with {} products", company_id, products.len());
    Ok(SeedSummary {
        admin,
        vendor_user: Actor::new(vendor.user_id, company_id, Role::Vendor),
        vendor,
        products,
    })
}
