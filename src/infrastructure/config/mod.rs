use serde::Deserialize;
use std::env;

use crate::infrastructure::feed::DEFAULT_FEED_BASE_URL;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    // Review feed
    pub feed_base_url: String,
    pub default_poll_interval_secs: i64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            database_url: env::var("DATABASE_URL")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "production" => Environment::Production,
                    _ => Environment::Development,
                })?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })?,
            feed_base_url: env::var("FEED_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_FEED_BASE_URL.to_string()),
            default_poll_interval_secs: env::var("DEFAULT_POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()?,
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}
