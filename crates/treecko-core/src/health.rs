//! Service health status.

use chrono::Utc;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::json;

pub const HEALTH_PATH: &str = "/health";
pub const DEFAULT_HEALTH_PORT: u16 = 8081;

/// Point-in-time health of the ingestion service.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthStatus {
    pub status: String,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
    pub database_connected: bool,
    pub sheets_configured: bool,
}

impl HealthStatus {
    /// Status stamped with the current time.
    pub fn now(database_connected: bool, sheets_configured: bool) -> Self {
        let status = if database_connected { "healthy" } else { "unhealthy" };
        Self {
            status: status.to_string(),
            timestamp: Utc::now().timestamp_micros() as f64 / 1_000_000.0,
            database_connected,
            sheets_configured,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "status": self.status,
            "timestamp": self.timestamp,
            "checks": {
                "database": if self.database_connected { "ok" } else { "not_connected" },
                "sheets": if self.sheets_configured { "configured" } else { "not_configured" },
            }
        })
    }
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self::now(true, false)
    }
}

impl Serialize for HealthStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self.to_json();
        let mut state = serializer.serialize_struct("HealthStatus", 3)?;
        state.serialize_field("status", &value["status"])?;
        state.serialize_field("timestamp", &value["timestamp"])?;
        state.serialize_field("checks", &value["checks"])?;
        state.end()
    }
}

/// Body returned for unknown paths.
pub fn not_found_body() -> serde_json::Value {
    json!({ "error": "Not Found" })
}
