//! Application configuration module
//!
//! Provides the configuration shared by the chat client and the server:
//! where the backend lives, how the chat timeline synchronizes, and which
//! email domain may use the dashboard.
//!
//! Configuration is built in code through [`AppConfigBuilder`] or read from
//! a TOML document:
//!
//! ```toml
//! server_url = "http://127.0.0.1:3000"
//! allowed_email_domain = "@sahyadri.edu.in"
//!
//! [sync]
//! snapshot_limit = 100
//! ordering = "by_created_at"
//!
//! [sync.edit]
//! optimistic = false
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of rows loaded by the snapshot
pub const DEFAULT_SNAPSHOT_LIMIT: usize = 100;

/// Largest window a single snapshot may request
pub const MAX_SNAPSHOT_LIMIT: usize = 1000;

/// Default institutional email suffix
pub const DEFAULT_EMAIL_DOMAIN: &str = "@sahyadri.edu.in";

/// Where live inserts land in the timeline
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderingPolicy {
    /// Insert at the position given by `created_at` (stable for equal timestamps)
    #[default]
    ByCreatedAt,
    /// Append to the end in arrival order
    Append,
}

/// Whether an action mutates the local list itself or waits for the change feed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionPolicy {
    pub optimistic: bool,
}

impl ActionPolicy {
    pub const OPTIMISTIC: ActionPolicy = ActionPolicy { optimistic: true };
    pub const FEED_ONLY: ActionPolicy = ActionPolicy { optimistic: false };
}

/// Synchronization settings of the chat timeline
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SyncPolicy {
    /// Maximum rows loaded by the snapshot
    pub snapshot_limit: usize,
    pub ordering: OrderingPolicy,
    pub send: ActionPolicy,
    pub edit: ActionPolicy,
    pub delete: ActionPolicy,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            snapshot_limit: DEFAULT_SNAPSHOT_LIMIT,
            ordering: OrderingPolicy::ByCreatedAt,
            send: ActionPolicy::OPTIMISTIC,
            edit: ActionPolicy::FEED_ONLY,
            delete: ActionPolicy::FEED_ONLY,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Server URL
    #[serde(default)]
    pub server_url: Option<String>,
    /// Email suffix admitted by the access middleware, always starting with '@'
    #[serde(default = "default_email_domain")]
    pub allowed_email_domain: String,
    #[serde(default)]
    pub sync: SyncPolicy,
}

fn default_email_domain() -> String {
    DEFAULT_EMAIL_DOMAIN.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            allowed_email_domain: default_email_domain(),
            sync: SyncPolicy::default(),
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let mut config: AppConfig =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.allowed_email_domain = normalize_domain(&config.allowed_email_domain)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&source)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.server_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }
        if self.sync.snapshot_limit == 0 || self.sync.snapshot_limit > MAX_SNAPSHOT_LIMIT {
            return Err(ConfigError::InvalidValue {
                field: "snapshot_limit",
                reason: format!("must be between 1 and {}", MAX_SNAPSHOT_LIMIT),
            });
        }
        if self.allowed_email_domain.len() < 2 || !self.allowed_email_domain.starts_with('@') {
            return Err(ConfigError::InvalidValue {
                field: "allowed_email_domain",
                reason: format!("'{}' is not an email domain suffix", self.allowed_email_domain),
            });
        }
        Ok(())
    }
}

/// Normalize a domain suffix to the `@domain` form, lower-cased
pub fn normalize_domain(domain: &str) -> Result<String, ConfigError> {
    let trimmed = domain.trim().trim_start_matches('@').to_ascii_lowercase();
    if trimmed.is_empty() {
        return Err(ConfigError::MissingValue("allowed_email_domain"));
    }
    Ok(format!("@{}", trimmed))
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    server_url: Option<String>,
    allowed_email_domain: Option<String>,
    sync: SyncPolicy,
}

impl AppConfigBuilder {
    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Set the admitted email domain (with or without the leading '@')
    pub fn allowed_email_domain(mut self, domain: impl Into<String>) -> Self {
        self.allowed_email_domain = Some(domain.into());
        self
    }

    pub fn snapshot_limit(mut self, limit: usize) -> Self {
        self.sync.snapshot_limit = limit;
        self
    }

    pub fn ordering(mut self, ordering: OrderingPolicy) -> Self {
        self.sync.ordering = ordering;
        self
    }

    pub fn send_policy(mut self, policy: ActionPolicy) -> Self {
        self.sync.send = policy;
        self
    }

    pub fn edit_policy(mut self, policy: ActionPolicy) -> Self {
        self.sync.edit = policy;
        self
    }

    pub fn delete_policy(mut self, policy: ActionPolicy) -> Self {
        self.sync.delete = policy;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let allowed_email_domain = match self.allowed_email_domain {
            Some(domain) => normalize_domain(&domain)?,
            None => default_email_domain(),
        };
        let config = AppConfig {
            server_url: self.server_url,
            allowed_email_domain,
            sync: self.sync,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("failed to read config: {0}")]
    Io(String),
}
