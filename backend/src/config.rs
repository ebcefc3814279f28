//! Configuration management for FertiStock
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with FERTISTOCK__ prefix

use chrono::FixedOffset;
use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Billing configuration
    pub sales: SalesConfig,

    /// Stock alert configuration
    pub inventory: InventoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SalesConfig {
    /// Tax added on top of the subtotal, as a fraction (0.18 = 18%)
    pub tax_rate: Decimal,

    /// Offset east of UTC, in minutes, that defines where a business day starts
    pub day_offset_minutes: i32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InventoryConfig {
    /// A product is low on stock at or below this many units
    pub low_stock_threshold: i64,

    /// Lots expiring within this many days are flagged as near expiry
    pub expiry_warning_days: i64,

    /// Number of notifications returned by the "recent" endpoint
    pub recent_notifications: i64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("FERTISTOCK_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 5000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("sales.tax_rate", "0.18")?
            .set_default("sales.day_offset_minutes", 0)?
            .set_default("inventory.low_stock_threshold", 50)?
            .set_default("inventory.expiry_warning_days", 60)?
            .set_default("inventory.recent_notifications", 2)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (FERTISTOCK__ prefix)
            .add_source(
                Environment::with_prefix("FERTISTOCK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl SalesConfig {
    /// The fixed offset used for every day boundary
    pub fn day_offset(&self) -> AppResult<FixedOffset> {
        FixedOffset::east_opt(self.day_offset_minutes * 60).ok_or_else(|| {
            AppError::Configuration(format!(
                "sales.day_offset_minutes out of range: {}",
                self.day_offset_minutes
            ))
        })
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.tax_rate < Decimal::ZERO {
            return Err(AppError::Configuration(
                "sales.tax_rate cannot be negative".to_string(),
            ));
        }
        self.day_offset().map(|_| ())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for SalesConfig {
    fn default() -> Self {
        Self {
            tax_rate: shared::DEFAULT_TAX_RATE,
            day_offset_minutes: 0,
        }
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            low_stock_threshold: 50,
            expiry_warning_days: 60,
            recent_notifications: 2,
        }
    }
}
