//! Subcommand implementations.

pub mod batch;
pub mod categories;
pub mod config;
pub mod export;
pub mod health;
pub mod ingest;
pub mod parse;
pub mod report;

use std::path::{Path, PathBuf};

use tracing::debug;
use treecko_core::{ReceiptLocale, ReceiptParser, SqliteStore, TreeckoConfig};

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("treecko")
        .join("config.json")
}

/// Configuration from `path` (or the default file when present), then the environment.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<TreeckoConfig> {
    let mut config = match path {
        Some(path) => TreeckoConfig::from_file(path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file {}: {}", path.display(), e)
        })?,
        None => {
            let default_path = default_config_path();
            if default_path.exists() {
                TreeckoConfig::from_file(&default_path)?
            } else {
                TreeckoConfig::default()
            }
        }
    };

    config.apply_env();
    Ok(config)
}

/// Open the configured transaction database.
pub fn open_store(config: &TreeckoConfig) -> anyhow::Result<SqliteStore> {
    let path = &config.store.database_path;
    debug!("Opening database {}", path.display());
    SqliteStore::open(path)
        .map_err(|e| anyhow::anyhow!("Failed to open database {}: {}", path.display(), e))
}

/// Whether a path names a PDF by extension.
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Receipt parser for the configured locale.
pub fn build_parser(config: &TreeckoConfig) -> ReceiptParser {
    ReceiptParser::new().with_locale(ReceiptLocale::for_code(&config.extraction.locale))
}
