use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use crate::deadline::{Deadline, DEFAULT_MESSAGE};
use crate::error::{KitError, Result};

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Object storage connection settings.
    pub storage: StorageConfig,
    /// Deadline applied to every CLI command (optional).
    #[serde(default)]
    pub guard: GuardConfig,
}

/// Which [`ObjectStore`](crate::storage::backend::ObjectStore) to build.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    S3,
    Local,
}

/// Connection parameters for the object storage service.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: BackendKind,
    /// `host:port` of the S3-compatible server, without scheme.
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
    /// Use HTTPS when true, plain HTTP otherwise.
    #[serde(default = "default_secure")]
    pub secure: bool,
    #[serde(default = "default_region")]
    pub region: String,
    /// Root directory for the `local` backend; each bucket is a sub-directory.
    #[serde(default)]
    pub root: Option<PathBuf>,
}

/// Deadline settings.
#[derive(Debug, Deserialize, Clone)]
pub struct GuardConfig {
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
    #[serde(default = "default_message")]
    pub message: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self { deadline_secs: default_deadline_secs(), message: default_message() }
    }
}

impl GuardConfig {
    pub fn deadline(&self) -> Deadline {
        Deadline::new(Duration::from_secs(self.deadline_secs)).with_message(self.message.clone())
    }
}

fn default_secure() -> bool { true }
fn default_region() -> String { "us-east-1".into() }
fn default_deadline_secs() -> u64 { 30 }
fn default_message() -> String { DEFAULT_MESSAGE.into() }

impl StorageConfig {
    /// Full endpoint URL with the scheme picked by `secure`.
    pub fn endpoint_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{scheme}://{}", self.endpoint)
    }

    pub fn validate(&self) -> Result<()> {
        match self.backend {
            BackendKind::S3 => self.validate_s3(),
            BackendKind::Local => {
                if self.root.is_none() {
                    return Err(KitError::Config("root must be set for the local backend".into()));
                }
                Ok(())
            }
        }
    }

    /// Checks needed before an S3 client can be built.
    pub fn validate_s3(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(KitError::Config("endpoint must be set".into()));
        }
        if self.endpoint.contains("://") {
            return Err(KitError::Config(format!(
                "endpoint '{}' must not include a scheme, use `secure` instead",
                self.endpoint
            )));
        }
        if self.access_key.is_empty() || self.secret_key.is_empty() {
            return Err(KitError::Config("access_key and secret_key must be set".into()));
        }
        if self.region.trim().is_empty() {
            return Err(KitError::Config("region must not be empty".into()));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from a TOML file at `path`.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| KitError::Config(format!("Cannot read config file: {e}")))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| KitError::Config(format!("Invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.storage.validate()?;
        if self.guard.deadline_secs == 0 {
            return Err(KitError::Config("deadline_secs must be > 0".into()));
        }
        Ok(())
    }
}
