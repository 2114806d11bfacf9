use pharmaops_core::WorkflowSettings;
use pharmaops_order::OrderNumberFormat;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub redis: Option<RedisConfig>,
    pub kafka: Option<KafkaConfig>,
    pub storage: StorageConfig,
    pub workflow: WorkflowConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Memory,
    Postgres,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub backend: Backend,
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 { 5 }
fn default_true() -> bool { true }

/// When present, order numbers come from a Redis counter instead of the database
#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KafkaConfig {
    pub brokers: String,
    #[serde(default = "default_audit_topic")]
    pub audit_topic: String,
}

fn default_audit_topic() -> String { "pharmaops.audit".into() }

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub bucket: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WorkflowConfig {
    pub order_number_prefix: String,
    pub order_number_width: usize,
    pub audit_limit: usize,
    #[serde(default = "default_conflict_retries")]
    pub conflict_retries: u32,
}

fn default_conflict_retries() -> u32 { 1 }

impl WorkflowConfig {
    pub fn settings(&self) -> WorkflowSettings {
        WorkflowSettings {
            order_numbers: OrderNumberFormat::new(&self.order_number_prefix, self.order_number_width),
            audit_limit: self.audit_limit,
            conflict_retries: self.conflict_retries,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `PHARMAOPS_DATABASE__BACKEND=postgres`
            .add_source(config::Environment::with_prefix("PHARMAOPS").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Config {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_default_file_parses() {
        let config = parse(include_str!("../../config/default.toml"));

        assert_eq!(config.database.backend, Backend::Memory);
        assert!(config.kafka.is_none());

        let settings = config.workflow.settings();
        assert_eq!(settings.order_numbers.format(7), "ORD-00007");
        assert_eq!(settings.audit_limit, 100);
    }

    #[test]
    fn test_optional_sections_default() {
        let config = parse(
            r#"
            [database]
            backend = "postgres"
            url = "postgres://localhost/pharmaops"

            [kafka]
            brokers = "localhost:9092"

            [storage]
            bucket = "docs"

            [workflow]
            order_number_prefix = "PO-"
            order_number_width = 6
            audit_limit = 50
            "#,
        );

        assert_eq!(config.database.max_connections, 5);
        assert!(config.database.run_migrations);
        assert_eq!(config.kafka.unwrap().audit_topic, "pharmaops.audit");
        assert_eq!(config.workflow.conflict_retries, 1);
        assert_eq!(config.workflow.settings().order_numbers.format(12), "PO-000012");
    }
}
