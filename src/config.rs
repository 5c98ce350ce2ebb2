//! Configuration management for Amity
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{AmityError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Amity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote API settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Local persistence settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Sign-in flow settings
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL the gateway paths (`/auth/start`, `/users/me`, ...) are
    /// appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout applied by the HTTP client (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("amity/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
        }
    }
}

/// Where the bearer credential is kept between runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialStoreKind {
    /// OS native keyring
    #[default]
    Keyring,
    /// The session database under the data directory (headless hosts)
    File,
}

impl std::str::FromStr for CredentialStoreKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keyring" => Ok(Self::Keyring),
            "file" => Ok(Self::File),
            other => Err(format!(
                "Invalid credential store: {}. Must be one of: keyring, file",
                other
            )),
        }
    }
}

/// Local persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for the session database; defaults to the platform data dir
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Credential backend
    #[serde(default)]
    pub credential_store: CredentialStoreKind,

    /// Keyring service name used when `credential_store` is `keyring`
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,
}

fn default_keyring_service() -> String {
    "amity".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            credential_store: CredentialStoreKind::default(),
            keyring_service: default_keyring_service(),
        }
    }
}

/// Sign-in flow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Number of digits in a one-time code
    #[serde(default = "default_code_length")]
    pub code_length: usize,
}

fn default_code_length() -> usize {
    6
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            code_length: default_code_length(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error; defaults are used instead.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AmityError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| AmityError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("AMITY_API_BASE_URL") {
            self.api.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("AMITY_API_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.api.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid AMITY_API_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(data_dir) = std::env::var("AMITY_DATA_DIR") {
            self.storage.data_dir = Some(data_dir);
        }

        if let Ok(store) = std::env::var("AMITY_CREDENTIAL_STORE") {
            match store.parse() {
                Ok(kind) => self.storage.credential_store = kind,
                Err(e) => tracing::warn!("Invalid AMITY_CREDENTIAL_STORE: {}", e),
            }
        }

        if let Ok(code_length) = std::env::var("AMITY_CODE_LENGTH") {
            if let Ok(value) = code_length.parse() {
                self.auth.code_length = value;
            } else {
                tracing::warn!("Invalid AMITY_CODE_LENGTH: {}", code_length);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(base_url) = &cli.api_base_url {
            self.api.base_url = base_url.clone();
        }

        if let Some(data_dir) = &cli.data_dir {
            self.storage.data_dir = Some(data_dir.to_string_lossy().to_string());
        }
    }

    /// Resolve the directory holding the session database
    ///
    /// # Errors
    ///
    /// Returns error if no directory is configured and the platform data
    /// directory cannot be determined
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.storage.data_dir {
            return Ok(PathBuf::from(dir));
        }

        let proj_dirs = ProjectDirs::from("com", "amity", "amity")
            .ok_or_else(|| AmityError::Storage("Could not determine data directory".into()))?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api.base_url).map_err(|e| {
            AmityError::Config(format!("Invalid api.base_url '{}': {}", self.api.base_url, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(AmityError::Config(format!(
                "api.base_url must use http or https, got: {}",
                url.scheme()
            ))
            .into());
        }

        if self.api.timeout_seconds == 0 {
            return Err(AmityError::Config(
                "api.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if !(4..=10).contains(&self.auth.code_length) {
            return Err(AmityError::Config(
                "auth.code_length must be between 4 and 10".to_string(),
            )
            .into());
        }

        if self.storage.credential_store == CredentialStoreKind::Keyring
            && self.storage.keyring_service.trim().is_empty()
        {
            return Err(AmityError::Config(
                "storage.keyring_service cannot be empty".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
