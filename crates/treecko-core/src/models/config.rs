//! Configuration structures for the ingestion pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::access::{AuthorizationConfig, AuthorizationMode, RateLimitConfig};

/// Main configuration for treecko.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeckoConfig {
    /// PDF acquisition configuration.
    pub pdf: PdfConfig,

    /// Receipt extraction configuration.
    pub extraction: ExtractionConfig,

    /// Transaction store configuration.
    pub store: StoreConfig,

    /// Spreadsheet mirror configuration.
    pub sheet: SheetConfig,

    /// Per-user rate limiting.
    pub rate_limit: RateLimitConfig,

    /// User authorization.
    pub auth: AuthorizationConfig,

    /// Health endpoint configuration.
    pub health: HealthConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// PDF acquisition configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Largest accepted document in bytes.
    pub max_size_bytes: usize,

    /// Reject documents that do not start with `%PDF`.
    pub require_magic_bytes: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: 10 * 1024 * 1024,
            require_magic_bytes: true,
        }
    }
}

/// Receipt extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Locale code of the keyword and pattern set.
    pub locale: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            locale: "es".to_string(),
        }
    }
}

/// Transaction store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file.
    pub database_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("transactions.db"),
        }
    }
}

/// Spreadsheet mirror configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// CSV file rows are appended to. Mirroring is off when unset.
    pub path: Option<PathBuf>,

    /// Worksheet title, used in log lines and status output.
    pub worksheet: String,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            path: None,
            worksheet: "Transactions".to_string(),
        }
    }
}

/// Health endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub enabled: bool,
    pub port: u16,
    /// Seconds a client may take to send its request head.
    pub read_timeout_seconds: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 8081,
            read_timeout_seconds: 5,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// DEBUG, INFO, WARNING, ERROR or CRITICAL.
    pub level: String,

    /// `text` or `json`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            format: "text".to_string(),
        }
    }
}

impl TreeckoConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Override values from process environment variables.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Override values using `lookup` for variable access.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("DATABASE_PATH").filter(|v| !v.is_empty()) {
            self.store.database_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("SHEET_PATH").filter(|v| !v.is_empty()) {
            self.sheet.path = Some(PathBuf::from(path));
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Some(max) = lookup("RATE_LIMIT_MAX_REQUESTS").and_then(|v| v.trim().parse().ok()) {
            self.rate_limit.max_requests = max;
        }
        if let Some(window) =
            lookup("RATE_LIMIT_WINDOW_SECONDS").and_then(|v| v.trim().parse().ok())
        {
            self.rate_limit.window_seconds = window;
        }
        if let Some(port) = lookup("HEALTH_PORT").and_then(|v| v.trim().parse().ok()) {
            self.health.port = port;
            self.health.enabled = true;
        }

        let mode = lookup("AUTH_MODE");
        let admins = lookup("ADMIN_USER_IDS");
        let whitelist = lookup("WHITELISTED_USER_IDS");
        if mode.is_some() || admins.is_some() || whitelist.is_some() {
            let parsed = AuthorizationConfig::from_env_values(
                mode.as_deref(),
                admins.as_deref(),
                whitelist.as_deref(),
            );
            // Only replace the mode when one was given.
            let mode = if mode.is_some() { parsed.mode } else { self.auth.mode };
            self.auth = AuthorizationConfig {
                enabled: mode != AuthorizationMode::Open,
                mode,
                admin_user_ids: merge(&self.auth.admin_user_ids, parsed.admin_user_ids, admins.is_some()),
                whitelisted_user_ids: merge(
                    &self.auth.whitelisted_user_ids,
                    parsed.whitelisted_user_ids,
                    whitelist.is_some(),
                ),
            };
        }
    }
}

fn merge(current: &BTreeSet<i64>, parsed: BTreeSet<i64>, replace: bool) -> BTreeSet<i64> {
    if replace { parsed } else { current.clone() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = TreeckoConfig::default();
        assert_eq!(config.pdf.max_size_bytes, 10 * 1024 * 1024);
        assert_eq!(config.store.database_path, PathBuf::from("transactions.db"));
        assert_eq!(config.rate_limit.max_requests, 10);
        assert_eq!(config.rate_limit.window_seconds, 60);
        assert_eq!(config.health.port, 8081);
        assert_eq!(config.auth.mode, AuthorizationMode::Open);
        assert!(config.sheet.path.is_none());
    }

    #[test]
    fn test_apply_env_overrides() {
        let vars = env(&[
            ("DATABASE_PATH", "/tmp/tx.db"),
            ("SHEET_PATH", "/tmp/sheet.csv"),
            ("LOG_LEVEL", "DEBUG"),
            ("AUTH_MODE", "whitelist"),
            ("WHITELISTED_USER_IDS", "12, 34,abc"),
            ("RATE_LIMIT_MAX_REQUESTS", "3"),
        ]);

        let mut config = TreeckoConfig::default();
        config.apply_env_with(|k| vars.get(k).cloned());

        assert_eq!(config.store.database_path, PathBuf::from("/tmp/tx.db"));
        assert_eq!(config.sheet.path, Some(PathBuf::from("/tmp/sheet.csv")));
        assert_eq!(config.logging.level, "DEBUG");
        assert_eq!(config.auth.mode, AuthorizationMode::Whitelist);
        assert!(config.auth.enabled);
        assert_eq!(config.auth.whitelisted_user_ids, BTreeSet::from([12, 34]));
        assert_eq!(config.rate_limit.max_requests, 3);
    }

    #[test]
    fn test_file_round_trip_keeps_defaults_for_missing_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"health": {"enabled": true}}"#).unwrap();

        let config = TreeckoConfig::from_file(&path).unwrap();
        assert!(config.health.enabled);
        assert_eq!(config.health.port, 8081);
        assert_eq!(config.extraction.locale, "es");
    }
}
