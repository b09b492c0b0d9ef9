//! User authorization by id lists.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::UserId;

/// Who may use the ingestion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationMode {
    /// Everyone.
    #[default]
    Open,
    /// Whitelisted users and admins.
    Whitelist,
    /// Admins only.
    AdminOnly,
}

impl AuthorizationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Whitelist => "whitelist",
            Self::AdminOnly => "admin_only",
        }
    }

    /// Parse a mode name; unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" => Some(Self::Open),
            "whitelist" => Some(Self::Whitelist),
            "admin_only" => Some(Self::AdminOnly),
            _ => None,
        }
    }
}

/// Authorization configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorizationConfig {
    pub mode: AuthorizationMode,
    pub admin_user_ids: BTreeSet<UserId>,
    pub whitelisted_user_ids: BTreeSet<UserId>,
    pub enabled: bool,
}

impl AuthorizationConfig {
    /// Build a config from raw environment values.
    ///
    /// Id lists are comma separated; entries that are not positive integers
    /// are ignored. An unknown mode means open access.
    pub fn from_env_values(
        mode: Option<&str>,
        admin_ids: Option<&str>,
        whitelist_ids: Option<&str>,
    ) -> Self {
        let mode = mode
            .and_then(AuthorizationMode::parse)
            .unwrap_or_default();

        Self {
            mode,
            admin_user_ids: parse_ids(admin_ids),
            whitelisted_user_ids: parse_ids(whitelist_ids),
            enabled: mode != AuthorizationMode::Open,
        }
    }
}

fn parse_ids(raw: Option<&str>) -> BTreeSet<UserId> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()))
            .filter_map(|id| id.parse::<UserId>().ok())
            .filter(|id| *id > 0)
            .collect()
    })
    .unwrap_or_default()
}

/// Decides whether a user may use the pipeline.
#[derive(Debug, Clone, Default)]
pub struct UserAuthorization {
    config: AuthorizationConfig,
}

impl UserAuthorization {
    pub fn new(config: AuthorizationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AuthorizationConfig {
        &self.config
    }

    pub fn is_authorized(&self, user_id: UserId) -> bool {
        if !self.config.enabled {
            return true;
        }

        match self.config.mode {
            AuthorizationMode::Open => true,
            AuthorizationMode::AdminOnly => {
                let allowed = self.is_admin(user_id);
                if !allowed {
                    warn!(user_id, mode = "admin_only", "Unauthorized user");
                }
                allowed
            }
            AuthorizationMode::Whitelist => {
                let allowed = self.config.whitelisted_user_ids.contains(&user_id)
                    || self.is_admin(user_id);
                if !allowed {
                    warn!(user_id, mode = "whitelist", "Unauthorized user");
                }
                allowed
            }
        }
    }

    pub fn is_admin(&self, user_id: UserId) -> bool {
        self.config.admin_user_ids.contains(&user_id)
    }

    pub fn add_to_whitelist(&mut self, user_id: UserId) {
        self.config.whitelisted_user_ids.insert(user_id);
        info!(user_id, "Added user to whitelist");
    }

    pub fn remove_from_whitelist(&mut self, user_id: UserId) {
        self.config.whitelisted_user_ids.remove(&user_id);
        info!(user_id, "Removed user from whitelist");
    }

    pub fn add_admin(&mut self, user_id: UserId) {
        self.config.admin_user_ids.insert(user_id);
        info!(user_id, "Added admin user");
    }

    pub fn remove_admin(&mut self, user_id: UserId) {
        self.config.admin_user_ids.remove(&user_id);
        info!(user_id, "Removed admin user");
    }

    /// Short description of the current access policy.
    pub fn authorization_message(&self) -> &'static str {
        if !self.config.enabled {
            return "Open to all users.";
        }
        match self.config.mode {
            AuthorizationMode::Open => "Open to all users.",
            AuthorizationMode::AdminOnly => {
                "Admin-only mode. Only authorized administrators can ingest receipts."
            }
            AuthorizationMode::Whitelist => {
                "Whitelist mode. Only whitelisted users can ingest receipts. Contact the administrator for access."
            }
        }
    }

    /// Message shown to a refused user.
    pub fn unauthorized_message(&self) -> &'static str {
        match self.config.mode {
            AuthorizationMode::AdminOnly => {
                "Access denied: admin-only mode, you are not authorized."
            }
            AuthorizationMode::Whitelist => {
                "Access denied: you are not on the authorized users list. Contact the administrator for access."
            }
            AuthorizationMode::Open => "Access denied: you are not authorized.",
        }
    }
}
