use async_trait::async_trait;
use pharmaops_core::{ComplianceStore, OrderSequence, StoreError, StoreResult, StoreTransaction};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::info;

use crate::pg_store::PgTransaction;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(connection_string: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations").run(&self.pool).await?;
        info!("Migrations completed successfully.");
        Ok(())
    }
}

/// PostgreSQL-backed store; each unit of work is one database transaction
#[derive(Clone)]
pub struct PgStore {
    db: DbClient,
}

impl PgStore {
    pub fn new(db: DbClient) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ComplianceStore for PgStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>> {
        let tx = self.db.pool.begin().await.map_err(db_error)?;
        Ok(Box::new(PgTransaction::new(tx)))
    }
}

/// Order ordinals from the `order_number_seq` sequence
#[derive(Clone)]
pub struct PgOrderSequence {
    db: DbClient,
}

impl PgOrderSequence {
    pub fn new(db: DbClient) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderSequence for PgOrderSequence {
    async fn next_ordinal(&self) -> StoreResult<u64> {
        let next: i64 = sqlx::query_scalar("SELECT nextval('order_number_seq')")
            .fetch_one(&self.db.pool)
            .await
            .map_err(db_error)?;
        u64::try_from(next).map_err(|_| StoreError::Serialization(format!("negative ordinal {}", next)))
    }
}

/// Serialization failures, deadlocks and unique violations are conflicts the caller may retry
pub(crate) fn db_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) => match db.code().as_deref() {
            Some("40001") | Some("40P01") | Some("23505") => StoreError::Conflict(db.message().to_string()),
            _ => StoreError::Backend(err.to_string()),
        },
        sqlx::Error::RowNotFound => StoreError::NotFound(err.to_string()),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => StoreError::Serialization(err.to_string()),
        _ => StoreError::Backend(err.to_string()),
    }
}
