//! Log subscriber setup.

use tracing::{Level, Subscriber};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::FmtSubscriber;

use crate::models::config::LoggingConfig;

/// Output format of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// `json` (any case) selects JSON; everything else is text.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// How the process logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Text,
        }
    }
}

impl LogConfig {
    /// Build from `LOG_LEVEL` / `LOG_FORMAT` style values.
    pub fn from_env_values(level: Option<&str>, format: Option<&str>) -> Self {
        Self {
            level: level.map(parse_level).unwrap_or(Level::INFO),
            format: format.map(LogFormat::parse).unwrap_or_default(),
        }
    }

    pub fn from_config(config: &LoggingConfig) -> Self {
        Self::from_env_values(Some(&config.level), Some(&config.format))
    }

    /// Raise the level by `verbose` steps; never lowers it.
    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        let requested = match verbose {
            0 => return self,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        };
        // `Level` orders TRACE as the greatest
        if requested > self.level {
            self.level = requested;
        }
        self
    }
}

/// DEBUG, INFO, WARNING, ERROR, CRITICAL; anything else is INFO.
fn parse_level(value: &str) -> Level {
    match value.trim().to_uppercase().as_str() {
        "DEBUG" => Level::DEBUG,
        "INFO" => Level::INFO,
        "WARNING" => Level::WARN,
        "ERROR" | "CRITICAL" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Build a subscriber writing to stderr. `RUST_LOG` directives refine the level.
pub fn build_subscriber(config: &LogConfig) -> Box<dyn Subscriber + Send + Sync> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.level).into())
        .from_env_lossy();

    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match config.format {
        LogFormat::Json => Box::new(builder.json().finish()),
        LogFormat::Text => Box::new(builder.finish()),
    }
}
