pub mod app_config;
pub mod bootstrap;
pub mod database;
pub mod memory;
pub mod pg_store;
pub mod redis_repo;
pub mod seed;
#[cfg(feature = "kafka")]
pub mod events;

pub use bootstrap::{build_services, BootstrapError};
pub use database::{DbClient, PgOrderSequence, PgStore};
pub use memory::{in_memory_services, MemorySequence, MemoryStore};
pub use redis_repo::{RedisClient, RedisOrderSequence};
pub use seed::{seed_company, SeedSummary};
#[cfg(feature = "kafka")]
pub use events::{EventProducer, KafkaAuditSink};
