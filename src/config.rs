//! Configuration types for the folio server.
//!
//! Settings are loaded from a TOML file (`folio.toml` by default):
//!
//! - [`Config`] - Root configuration struct
//! - [`ServerConfig`] - HTTP bind address and CORS
//! - [`StoreConfig`] - Document store backend
//! - [`AuthConfig`] - Admin users and their bearer tokens
//! - [`LoggingConfig`] - Log format and level
//!
//! Every section is optional; missing sections fall back to defaults
//! suitable for local development.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants;
use crate::paths;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Non-fatal warnings that should be logged but don't prevent operation.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Returns true if there are any warnings.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// folio.toml configuration structure.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed to call the API from a browser. Empty disables CORS.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: constants::DEFAULT_HOST.to_string(),
            port: constants::DEFAULT_PORT,
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Persistent embedded database.
    #[default]
    Redb,
    /// In-process only; data is lost on exit.
    Memory,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Database file. Defaults to `~/.folio/folio.redb`.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub users: Vec<AuthUser>,
}

/// An admin allowed to call the authenticated API.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AuthUser {
    pub uid: String,
    /// Token inline in the config file.
    pub token: Option<String>,
    /// Name of an environment variable holding the token.
    pub token_env: Option<String>,
}

impl AuthUser {
    /// The bearer token for this user: `token` if set, else the value of
    /// `token_env`.
    ///
    /// # Errors
    ///
    /// Returns an error if neither is set or the variable is missing or empty.
    pub fn resolve_token(&self) -> Result<String> {
        if let Some(token) = self.token.as_deref().filter(|t| !t.is_empty()) {
            return Ok(token.to_string());
        }
        let Some(var) = self.token_env.as_deref().filter(|v| !v.is_empty()) else {
            anyhow::bail!("auth user '{}' has neither token nor token_env", self.uid);
        };
        let token = std::env::var(var)
            .with_context(|| format!("auth user '{}': environment variable {var} is not set", self.uid))?;
        if token.is_empty() {
            anyhow::bail!("auth user '{}': environment variable {var} is empty", self.uid);
        }
        Ok(token)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load `path` if given, else `folio.toml` in the current directory if
    /// it exists, else defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit path cannot be read, or if the file
    /// that was found contains invalid TOML.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let default = Path::new(constants::DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load_from(default)
                } else {
                    Ok(Self::default())
                }
            },
        }
    }

    /// Load configuration from the specified path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read (IO error)
    /// - The file contains invalid TOML syntax
    /// - Fields have invalid types
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Resolved database path for the redb backend.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is configured and the home directory
    /// cannot be determined.
    pub fn store_path(&self) -> Result<PathBuf> {
        match &self.store.path {
            Some(path) => Ok(path.clone()),
            None => paths::get_default_db_path(),
        }
    }

    /// Validate configuration.
    ///
    /// Returns a `ValidationResult` containing any non-fatal warnings.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails with one or more errors:
    /// - Port 0 or empty host
    /// - Empty or duplicate auth uids, users without a token
    /// - Empty store path
    /// - Unknown log level
    pub fn validate(&self) -> Result<ValidationResult> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        // 1. Server
        if self.server.host.trim().is_empty() {
            errors.push("server.host cannot be empty".to_string());
        }
        if self.server.port == 0 {
            errors.push(
                "Server port cannot be 0. Use a valid port number (1-65535)\n  \
                 Common ports: 3000 (default), 8080, 8000"
                    .to_string(),
            );
        }
        if self.server.port < 1024 && self.server.port > 0 {
            warnings.push(format!(
                "Server port {} is a system/privileged port (< 1024)\n  \
                 Recommendation: Use ports >= 1024 (e.g., 3000, 8080) to avoid permission issues",
                self.server.port
            ));
        }
        for origin in &self.server.cors_origins {
            if !(origin == "*" || origin.starts_with("http://") || origin.starts_with("https://")) {
                errors.push(format!(
                    "Invalid CORS origin '{origin}'. Expected '*' or an http(s):// origin"
                ));
            }
        }

        // 2. Store
        match self.store.backend {
            StoreBackend::Redb => {
                if let Some(path) = &self.store.path
                    && path.as_os_str().is_empty()
                {
                    errors.push("store.path cannot be empty".to_string());
                }
            },
            StoreBackend::Memory => warnings.push(
                "Store backend is 'memory'\n  \
                 All images, categories and pins are lost when the server stops"
                    .to_string(),
            ),
        }

        // 3. Auth
        if self.auth.users.is_empty() {
            warnings.push(
                "No [[auth.users]] configured\n  \
                 Every admin endpoint will answer 401 Unauthorized"
                    .to_string(),
            );
        }
        let mut uids = std::collections::HashSet::new();
        for user in &self.auth.users {
            if user.uid.trim().is_empty() {
                errors.push("auth user uid cannot be empty".to_string());
            } else if !uids.insert(user.uid.as_str()) {
                errors.push(format!("Duplicate auth user uid '{}'", user.uid));
            }
            let has_token = user.token.as_deref().is_some_and(|t| !t.is_empty());
            let has_env = user.token_env.as_deref().is_some_and(|v| !v.is_empty());
            if !has_token && !has_env {
                errors.push(format!(
                    "auth user '{}' needs a token or token_env",
                    user.uid
                ));
            }
            if let Some(token) = user.token.as_deref()
                && !token.is_empty()
                && token.len() < 16
            {
                warnings.push(format!(
                    "auth user '{}' has a short token ({} chars)\n  \
                     Recommendation: Use at least 32 random characters",
                    user.uid,
                    token.len()
                ));
            }
        }

        // 4. Logging
        if tracing_subscriber::EnvFilter::try_new(&self.logging.level).is_err() {
            errors.push(format!(
                "Invalid logging.level '{}'. Examples: info, debug, folio=debug",
                self.logging.level
            ));
        }

        if !errors.is_empty() {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }

        Ok(ValidationResult { warnings })
    }
}
