use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub max_connections: u32,
    pub debug: bool,
    pub enable_swagger: bool,
    pub port: u16,
    pub default_timezone: String,
    pub reference_attempts: u32,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            // Load from environment variables with APP_ prefix
            .add_source(Environment::with_prefix("APP").try_parsing(true))
            .set_default("database_url", "sqlite://studio.db")?
            .set_default("max_connections", 5)?
            .set_default("debug", false)?
            .set_default("enable_swagger", true)?
            .set_default("port", 8080)?
            .set_default("default_timezone", "Asia/Kolkata")?
            .set_default("reference_attempts", 5)?
            .build()?;

        config.try_deserialize()
    }
}
