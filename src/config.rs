//! Configuration module

use std::env;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: [u8; 4],

    /// Server port
    pub port: u16,

    /// Serialized classifier artifact
    pub model_path: PathBuf,

    /// Ordered feature-column list the classifier was trained on
    pub feature_columns_path: PathBuf,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: [0, 0, 0, 0],
            port: 8080,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            feature_columns_path: PathBuf::from(DEFAULT_FEATURE_COLUMNS_PATH),
            environment: "development".to_string(),
        }
    }
}

pub const DEFAULT_MODEL_PATH: &str = "vaccine_risk_model.json";
pub const DEFAULT_FEATURE_COLUMNS_PATH: &str = "feature_columns.json";

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            host: lookup("HOST")
                .and_then(|h| parse_ipv4(&h))
                .unwrap_or(defaults.host),

            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            model_path: lookup("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),

            feature_columns_path: lookup("FEATURE_COLUMNS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.feature_columns_path),

            environment: lookup("ENVIRONMENT")
                .unwrap_or(defaults.environment),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_ipv4(raw: &str) -> Option<[u8; 4]> {
    raw.parse::<std::net::Ipv4Addr>().ok().map(|ip| ip.octets())
}
