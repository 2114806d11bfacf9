use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use pharmaops_catalog::{NewProduct, NewRequirement, NewVendor};
use pharmaops_core::services::DocumentUpload;
use pharmaops_core::{AuditQuery, ComplianceServices};
use pharmaops_order::{DateRange, NewOrder, NewShipment, ReviewAction};
use pharmaops_shared::{Actor, Role};
use pharmaops_store::app_config::{Backend, Config};
use pharmaops_store::{build_services, seed_company, DbClient};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "pharmaops")]
#[command(about = "Supply-chain compliance tracking for pharmaceutical orders")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations (postgres backend only)
    Migrate,

    /// Create the starter catalog and vendor for a company
    Seed {
        /// Existing company id; a new one is generated when omitted
        #[arg(long)]
        company: Option<Uuid>,
    },

    /// Run one order through the whole workflow and print its trace
    Demo {
        /// Reject the first upload before approving a corrected one
        #[arg(long)]
        with_rejection: bool,
    },

    /// Print the chain-of-custody trace of an order
    Trace {
        #[arg(long)]
        company: Uuid,
        #[arg(long)]
        order: Uuid,
    },

    /// Print a compliance summary for a company
    Report {
        #[arg(long)]
        company: Uuid,
        /// Inclusive lower bound, RFC 3339
        #[arg(long)]
        from: Option<DateTime<Utc>>,
        /// Inclusive upper bound, RFC 3339
        #[arg(long)]
        to: Option<DateTime<Utc>>,
        #[arg(long)]
        report_type: Option<String>,
    },

    /// Print recent audit entries for a company
    Audit {
        #[arg(long)]
        company: Uuid,
        #[arg(long, default_value = "0")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pharmaops_core=debug,pharmaops_store=debug,pharmaops=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load().context("Failed to load config")?;

    match cli.command {
        Commands::Migrate => migrate(&config).await,
        Commands::Seed { company } => {
            let services = build_services(&config).await?;
            let summary = seed_company(&services, company.unwrap_or_else(Uuid::new_v4)).await?;
            println!("company: {}", summary.admin.company_id);
            println!("vendor:  {} (user {})", summary.vendor.id, summary.vendor_user.user_id);
            for product in &summary.products {
                println!("product: {} {}", product.sku, product.id);
            }
            Ok(())
        }
        Commands::Demo { with_rejection } => {
            let services = build_services(&config).await?;
            demo(&services, with_rejection).await
        }
        Commands::Trace { company, order } => {
            let services = build_services(&config).await?;
            let auditor = Actor::new(Uuid::new_v4(), company, Role::Auditor);
            let trace = services.trace.get_order_trace(&auditor, order).await?;
            println!("{}", serde_json::to_string_pretty(&trace)?);
            Ok(())
        }
        Commands::Report {
            company,
            from,
            to,
            report_type,
        } => {
            let services = build_services(&config).await?;
            let auditor = Actor::new(Uuid::new_v4(), company, Role::Auditor);
            let report = services
                .trace
                .generate_compliance_report(&auditor, DateRange::new(from, to), report_type)
                .await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Commands::Audit { company, limit } => {
            let services = build_services(&config).await?;
            let auditor = Actor::new(Uuid::new_v4(), company, Role::Auditor);
            let entries = services
                .trace
                .audit_logs(
                    &auditor,
                    AuditQuery {
                        limit,
                        ..Default::default()
                    },
                )
                .await?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
            Ok(())
        }
    }
}

async fn migrate(config: &Config) -> Result<()> {
    if config.database.backend != Backend::Postgres {
        bail!("migrate needs database.backend = \"postgres\"");
    }
    let url = config
        .database
        .url
        .as_deref()
        .context("database.url is required for the postgres backend")?;
    let db = DbClient::new(url, config.database.max_connections).await?;
    db.migrate().await?;
    Ok(())
}

async fn demo(services: &ComplianceServices, with_rejection: bool) -> Result<()> {
    let company_id = Uuid::new_v4();
    let admin = Actor::new(Uuid::new_v4(), company_id, Role::Admin);
    let qa = Actor::new(Uuid::new_v4(), company_id, Role::Qa);
    let auditor = Actor::new(Uuid::new_v4(), company_id, Role::Auditor);
    let vendor_user = Actor::new(Uuid::new_v4(), company_id, Role::Vendor);

    let sku = format!("DEMO-{}", &company_id.simple().to_string()[..8]);
    let product = services
        .catalog
        .register_product(&admin, NewProduct::new("Paracetamol 500mg", &sku, Some("Blister pack of 20")))
        .await?;
    services
        .catalog
        .define_requirement(&admin, NewRequirement::new(product.id, "CoA", "Certificate of Analysis per batch"))
        .await?;
    services
        .catalog
        .define_requirement(
            &admin,
            NewRequirement::new(product.id, "GDP Certificate", "Good Distribution Practice certificate")
                .for_destination("Berlin"),
        )
        .await?;

    services
        .catalog
        .invite_vendor(&admin, NewVendor::new(vendor_user.user_id, "Rhine Pharma Logistics"))
        .await?;
    let vendor = services.catalog.activate_vendor(&vendor_user).await?;

    let order = services
        .orders
        .create_order(&admin, &NewOrder::new(vendor.id, product.id, 500, "Berlin"))
        .await?;
    info!("Demo order {} created", order.order_number);
    services.orders.accept_order(&vendor_user, order.id).await?;

    for doc_type in ["CoA", "GDP Certificate"] {
        if with_rejection && doc_type == "CoA" {
            let draft = upload(services, &vendor_user, order.id, doc_type, b"assay 91.2%").await?;
            services
                .documents
                .review_document(&qa, draft, ReviewAction::Reject, Some("Assay below specification".into()))
                .await?;
        }
        let document = upload(services, &vendor_user, order.id, doc_type, b"assay 99.7%").await?;
        services
            .documents
            .review_document(&qa, document, ReviewAction::Approve, None)
            .await?;
    }

    services
        .orders
        .create_shipment(&vendor_user, order.id, &NewShipment::new("1Z999AA10123456784", "UPS"))
        .await?;

    let trace = services.trace.get_order_trace(&auditor, order.id).await?;
    println!("{}", serde_json::to_string_pretty(&trace)?);

    let report = services
        .trace
        .generate_compliance_report(&auditor, DateRange::default(), None)
        .await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn upload(
    services: &ComplianceServices,
    vendor_user: &Actor,
    order_id: Uuid,
    doc_type: &str,
    contents: &[u8],
) -> Result<Uuid> {
    let file_name = format!("{}.pdf", doc_type.to_lowercase().replace(' ', "-"));
    let document = services
        .documents
        .upload_document(
            vendor_user,
            &DocumentUpload {
                order_id,
                doc_type: doc_type.to_string(),
                file_name,
                bytes: contents.to_vec(),
            },
        )
        .await?;
    Ok(document.id)
}
