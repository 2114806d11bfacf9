use pharmaops_core::{
    AuditSink, ComplianceServices, ComplianceStore, FanoutAuditSink, MockAnchor, MockStorage, OrderSequence,
    ServiceContext, StoreAuditSink,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::app_config::{Backend, Config};
use crate::database::{DbClient, PgOrderSequence, PgStore};
use crate::memory::{MemorySequence, MemoryStore};
use crate::redis_repo::{RedisClient, RedisOrderSequence};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("database.url is required for the postgres backend")]
    MissingDatabaseUrl,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[cfg(feature = "kafka")]
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),
}

/// Wire the services described by `config`
pub async fn build_services(config: &Config) -> Result<ComplianceServices, BootstrapError> {
    let (store, db_sequence): (Arc<dyn ComplianceStore>, Arc<dyn OrderSequence>) = match config.database.backend {
        Backend::Memory => {
            info!("Using in-memory store");
            (Arc::new(MemoryStore::new()), Arc::new(MemorySequence::new()))
        }
        Backend::Postgres => {
            let url = config
                .database
                .url
                .as_deref()
                .ok_or(BootstrapError::MissingDatabaseUrl)?;
            let db = DbClient::new(url, config.database.max_connections).await?;
            if config.database.run_migrations {
                db.migrate().await?;
            }
            info!("Connected to PostgreSQL");
            (Arc::new(PgStore::new(db.clone())), Arc::new(PgOrderSequence::new(db)))
        }
    };

    let sequence: Arc<dyn OrderSequence> = match &config.redis {
        Some(redis) => {
            info!("Order numbers from Redis at {}", redis.url);
            Arc::new(RedisOrderSequence::new(RedisClient::new(&redis.url).await?))
        }
        None => db_sequence,
    };

    let mut sinks: Vec<Arc<dyn AuditSink>> = vec![Arc::new(StoreAuditSink::new(store.clone()))];
    if let Some(kafka) = &config.kafka {
        match kafka_sink(kafka)? {
            Some(sink) => sinks.push(sink),
            None => warn!("Kafka configured but the kafka feature is disabled; audit stream is off"),
        }
    }

    let ctx = ServiceContext {
        store,
        sequence,
        audit: Arc::new(FanoutAuditSink::new(sinks)),
        storage: Arc::new(MockStorage::new(&config.storage.bucket)),
        anchor: Arc::new(MockAnchor),
        settings: config.workflow.settings(),
    };

    Ok(ComplianceServices::new(ctx))
}

#[cfg(feature = "kafka")]
fn kafka_sink(kafka: &crate::app_config::KafkaConfig) -> Result<Option<Arc<dyn AuditSink>>, BootstrapError> {
    let producer = crate::events::EventProducer::new(&kafka.brokers)?;
    info!("Streaming audit entries to {}", kafka.audit_topic);
    Ok(Some(Arc::new(crate::events::KafkaAuditSink::new(producer, kafka.audit_topic.clone()))))
}

#[cfg(not(feature = "kafka"))]
fn kafka_sink(_kafka: &crate::app_config::KafkaConfig) -> Result<Option<Arc<dyn AuditSink>>, BootstrapError> {
    Ok(None)
}
