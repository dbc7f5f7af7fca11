use crate::auth::TokenIssuer;
use crate::error::{Result, TodoError};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Placeholder secret written by `todo config init`. `validate` flags it.
pub const DEV_JWT_SECRET: &str = "change-me-dev-secret";
const MIN_SECRET_BYTES: usize = 32;
/// Upper bounds for token lifetimes: one year either way.
pub const MAX_ACCESS_TTL_MINUTES: i64 = 365 * 24 * 60;
pub const MAX_REFRESH_TTL_DAYS: i64 = 365;
const REDACTED: &str = "********";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins. Empty means any origin.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cors_origins: Vec<String>,
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// DatabaseConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file; relative paths are resolved against the project root.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

fn default_database_path() -> PathBuf {
    PathBuf::from(paths::DEFAULT_DATABASE_FILE)
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

// ---------------------------------------------------------------------------
// AuthConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_minutes: i64,
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_days: i64,
}

fn default_jwt_secret() -> String {
    DEV_JWT_SECRET.to_string()
}

fn default_issuer() -> String {
    "todo".to_string()
}

fn default_access_ttl() -> i64 {
    60
}

fn default_refresh_ttl() -> i64 {
    7
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            issuer: default_issuer(),
            access_token_ttl_minutes: default_access_ttl(),
            refresh_token_ttl_days: default_refresh_ttl(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(TodoError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Like `load`, but a missing file yields the defaults.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        match Self::load(root) {
            Err(TodoError::NotInitialized) => {
                tracing::debug!(root = %root.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Apply `TODO_*` environment overrides through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup("TODO_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(db) = lookup("TODO_DATABASE") {
            self.database.path = PathBuf::from(db);
        }
        if let Some(bind) = lookup("TODO_BIND") {
            self.server.bind = bind;
        }
        if let Some(port) = lookup("TODO_PORT") {
            self.server.port = port.parse().map_err(|_| {
                TodoError::validation(format!("TODO_PORT must be a port number, got '{port}'"))
            })?;
        }
        Ok(())
    }

    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub fn database_path(&self, root: &Path) -> PathBuf {
        paths::database_path(root, &self.database.path)
    }

    /// Build the signer. Lifetimes chrono cannot represent are a validation
    /// error rather than a panic.
    pub fn token_issuer(&self) -> Result<TokenIssuer> {
        let access = chrono::Duration::try_minutes(self.auth.access_token_ttl_minutes)
            .ok_or_else(|| {
                TodoError::validation("auth.access_token_ttl_minutes is out of range")
            })?;
        let refresh = chrono::Duration::try_days(self.auth.refresh_token_ttl_days)
            .ok_or_else(|| TodoError::validation("auth.refresh_token_ttl_days is out of range"))?;
        Ok(TokenIssuer::new(
            self.auth.jwt_secret.as_bytes(),
            self.auth.issuer.clone(),
            access,
            refresh,
        ))
    }

    /// Copy safe to print: the signing secret is masked.
    pub fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        cfg.auth.jwt_secret = REDACTED.to_string();
        cfg
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.auth.jwt_secret.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "auth.jwt_secret is empty".to_string(),
            });
        } else if self.auth.jwt_secret == DEV_JWT_SECRET {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "auth.jwt_secret is the development placeholder; set TODO_JWT_SECRET"
                    .to_string(),
            });
        } else if self.auth.jwt_secret.len() < MIN_SECRET_BYTES {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "auth.jwt_secret is shorter than {MIN_SECRET_BYTES} bytes"
                ),
            });
        }

        let access = self.auth.access_token_ttl_minutes;
        let refresh = self.auth.refresh_token_ttl_days;
        if access <= 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "auth.access_token_ttl_minutes must be positive".to_string(),
            });
        } else if access > MAX_ACCESS_TTL_MINUTES {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "auth.access_token_ttl_minutes must be at most {MAX_ACCESS_TTL_MINUTES}"
                ),
            });
        }
        if refresh <= 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "auth.refresh_token_ttl_days must be positive".to_string(),
            });
        } else if refresh > MAX_REFRESH_TTL_DAYS {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "auth.refresh_token_ttl_days must be at most {MAX_REFRESH_TTL_DAYS}"
                ),
            });
        } else if refresh
            .checked_mul(24 * 60)
            .is_some_and(|refresh_minutes| refresh_minutes <= access)
        {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "refresh tokens expire before access tokens".to_string(),
            });
        }

        if self.server.bind.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "server.bind is empty".to_string(),
            });
        }

        warnings
    }

    pub fn has_errors(warnings: &[ConfigWarning]) -> bool {
        warnings.iter().any(|w| w.level == WarnLevel::Error)
    }
}
