//! Server configuration
//!
//! Every field can be overridden through an environment variable:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | WORK_DIR | /var/lib/cantina | Working directory (database, uploads, logs) |
//! | HTTP_PORT | 3000 | HTTP API port |
//! | APP_URL | http://localhost:3000 | Public base URL, used to build image URLs |
//! | ENVIRONMENT | development | development \| staging \| production |
//! | CORS_ORIGIN | (any) | Allowed CORS origin |
//! | SWEEP_INTERVAL_SECS | 300 | Auto-completion sweep interval |
//! | AUTO_COMPLETE_AFTER_MINUTES | 120 | Age at which a delivering order is closed |
//! | STORE_TIMEOUT_MS | 5000 | Bound on a single datastore call |
//! | JWT_SECRET / JWT_ISSUER / JWT_AUDIENCE | — | Token verification |
//! | PAYMENT_BASE_URL / PAYMENT_SECRET_KEY / PAYMENT_CURRENCY | — | Payment provider |

use std::path::PathBuf;
use std::time::Duration;

use crate::auth::JwtConfig;
use crate::services::PaymentConfig;

#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory holding the database and uploads
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Public base URL of this server
    pub app_url: String,
    /// development | staging | production
    pub environment: String,
    /// Allowed CORS origin; `None` allows any
    pub cors_origin: Option<String>,
    /// Sweep interval for the auto-completion task (seconds)
    pub sweep_interval_secs: u64,
    /// Age threshold for auto-completing delivering orders (minutes)
    pub auto_complete_after_minutes: u64,
    /// Bound on a single datastore call (milliseconds)
    pub store_timeout_ms: u64,
    /// Token verification
    pub jwt: JwtConfig,
    /// Payment provider
    pub payment: PaymentConfig,
}

impl Config {
    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/cantina".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            app_url: std::env::var("APP_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            cors_origin: std::env::var("CORS_ORIGIN").ok(),
            sweep_interval_secs: std::env::var("SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(300),
            auto_complete_after_minutes: std::env::var("AUTO_COMPLETE_AFTER_MINUTES")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(120),
            store_timeout_ms: std::env::var("STORE_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            jwt: JwtConfig::from_env(),
            payment: PaymentConfig::from_env(),
        }
    }

    /// Database directory under the working dir
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// Upload directory under the working dir
    pub fn upload_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("uploads")
    }

    /// Log directory under the working dir
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// Public URL prefix under which stored images are served
    pub fn files_base_url(&self) -> String {
        format!("{}/files", self.app_url.trim_end_matches('/'))
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn auto_complete_after(&self) -> Duration {
        Duration::from_secs(self.auto_complete_after_minutes * 60)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            work_dir: "/tmp/cantina-test".to_string(),
            http_port: 3000,
            app_url: "http://localhost:3000/".to_string(),
            environment: "development".to_string(),
            cors_origin: None,
            sweep_interval_secs: 300,
            auto_complete_after_minutes: 120,
            store_timeout_ms: 5000,
            jwt: JwtConfig {
                secret: "test-secret-test-secret-test-secret".to_string(),
                issuer: "test".to_string(),
                audience: "test".to_string(),
            },
            payment: PaymentConfig {
                base_url: "http://localhost:1".to_string(),
                secret_key: String::new(),
                currency: "brl".to_string(),
            },
        }
    }

    #[test]
    fn test_derived_paths() {
        let config = base_config();
        assert_eq!(config.db_path(), PathBuf::from("/tmp/cantina-test/database"));
        assert_eq!(config.upload_dir(), PathBuf::from("/tmp/cantina-test/uploads"));
    }

    #[test]
    fn test_files_base_url_strips_trailing_slash() {
        let config = base_config();
        assert_eq!(config.files_base_url(), "http://localhost:3000/files");
    }

    #[test]
    fn test_durations() {
        let config = base_config();
        assert_eq!(config.sweep_interval(), Duration::from_secs(300));
        assert_eq!(config.auto_complete_after(), Duration::from_secs(7200));
        assert_eq!(config.store_timeout(), Duration::from_millis(5000));
    }
}
