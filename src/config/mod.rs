use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

use crate::domain::Tier;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub reminders: ReminderConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Upper bound on any single store round-trip issued by a service.
    pub store_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub session_duration_hours: i64,
    #[serde(default)]
    pub secure_cookies: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LedgerConfig {
    pub tiers: Vec<Tier>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReminderConfig {
    pub organisation: String,
    pub subject: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            tiers: vec![
                Tier::new(5000, "Seed Plan", "Feeds 2 orphans monthly"),
                Tier::new(10000, "Hive Plan", "Supports 1 widow + 2 children"),
                Tier::new(25000, "Queen Plan", "Transforms an entire family situation"),
            ],
        }
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            organisation: "Hanny's Hive".to_string(),
            subject: "Gentle Reminder: Hanny's Hive Monthly Pledge".to_string(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.base_url", "http://localhost:8080")?
            .set_default("database.url", "sqlite://hive.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("database.store_timeout_secs", 5)?
            .set_default("auth.session_duration_hours", 24)?
            .set_default("auth.secure_cookies", false)?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with HIVE__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("HIVE").separator("__"))

            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                base_url: "http://localhost:8080".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://hive.db?mode=rwc".to_string(),
                max_connections: 10,
                store_timeout_secs: 5,
            },
            auth: AuthConfig {
                session_duration_hours: 24,
                secure_cookies: false,
            },
            ledger: LedgerConfig::default(),
            reminders: ReminderConfig::default(),
        }
    }
}
