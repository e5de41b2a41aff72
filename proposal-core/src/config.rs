//! Process-wide settings
//!
//! Settings are layered: built-in defaults, then an optional `proposal.toml`,
//! then `PROPOSAL__SECTION__KEY` environment variables, then the legacy
//! `JWT_SIGNING_SECRET` / `AUTH_EXPIRATION_TIME_MIN` variables.

use crate::config_error;
use crate::error::{CoreError, CoreResult, ErrorContext};
use crate::logging::LoggingConfig;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 5;
/// One week
pub const MAX_SESSION_TTL_MINUTES: i64 = 7 * 24 * 60;
pub const DEFAULT_CONFIG_FILE: &str = "proposal";

const LEGACY_SECRET_VAR: &str = "JWT_SIGNING_SECRET";
const LEGACY_TTL_VAR: &str = "AUTH_EXPIRATION_TIME_MIN";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub auth: AuthSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Clone, Deserialize)]
pub struct AuthSettings {
    /// HMAC key for bearer tokens
    pub signing_secret: String,
    pub session_ttl_minutes: i64,
    #[serde(default)]
    pub password_hash: PasswordHashSettings,
    /// Account created at startup when no account with its email exists
    #[serde(default)]
    pub bootstrap_user: Option<BootstrapUser>,
}

/// First account of a fresh deployment; every later account is invited by
/// an authenticated caller.
#[derive(Clone, Deserialize)]
pub struct BootstrapUser {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapUser")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

// Keep the secret out of logs and panics.
impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("signing_secret", &"<redacted>")
            .field("session_ttl_minutes", &self.session_ttl_minutes)
            .field("password_hash", &self.password_hash)
            .field("bootstrap_user", &self.bootstrap_user)
            .finish()
    }
}

impl AuthSettings {
    pub fn new(signing_secret: impl Into<String>, session_ttl_minutes: i64) -> Self {
        Self {
            signing_secret: signing_secret.into(),
            session_ttl_minutes,
            password_hash: PasswordHashSettings::default(),
            bootstrap_user: None,
        }
    }

    pub fn with_bootstrap_user(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.bootstrap_user = Some(BootstrapUser {
            email: email.into(),
            password: password.into(),
        });
        self
    }

    pub fn with_password_hash(mut self, password_hash: PasswordHashSettings) -> Self {
        self.password_hash = password_hash;
        self
    }

    /// The TTL as a duration, `None` when outside `1..=MAX_SESSION_TTL_MINUTES`
    pub fn session_ttl(&self) -> Option<chrono::Duration> {
        if !(1..=MAX_SESSION_TTL_MINUTES).contains(&self.session_ttl_minutes) {
            return None;
        }
        chrono::Duration::try_minutes(self.session_ttl_minutes)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.signing_secret.trim().is_empty() {
            return Err(config_error!(
                "Signing secret must not be empty",
                "auth.signing_secret"
            ));
        }

        if self.session_ttl_minutes <= 0 {
            return Err(config_error!(
                "Session TTL must be a positive number of minutes",
                "auth.session_ttl_minutes"
            ));
        }

        if self.session_ttl_minutes > MAX_SESSION_TTL_MINUTES {
            return Err(config_error!(
                format!("Session TTL must not exceed {MAX_SESSION_TTL_MINUTES} minutes"),
                "auth.session_ttl_minutes"
            ));
        }

        if let Some(user) = &self.bootstrap_user {
            if user.email.trim().is_empty() || user.password.is_empty() {
                return Err(config_error!(
                    "Bootstrap user needs both an email and a password",
                    "auth.bootstrap_user"
                ));
            }
        }

        self.password_hash.validate()
    }
}

/// Argon2 cost parameters. Higher values slow down every login on purpose.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PasswordHashSettings {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordHashSettings {
    fn default() -> Self {
        Self {
            memory_kib: 19456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl PasswordHashSettings {
    /// Cheapest parameters argon2 accepts; meant for tests only.
    pub fn minimal() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }

    fn validate(&self) -> CoreResult<()> {
        if self.iterations == 0 {
            return Err(config_error!(
                "Password hash iterations must be at least 1",
                "auth.password_hash.iterations"
            ));
        }
        if self.parallelism == 0 {
            return Err(config_error!(
                "Password hash parallelism must be at least 1",
                "auth.password_hash.parallelism"
            ));
        }
        if self.memory_kib < 8 * self.parallelism {
            return Err(config_error!(
                "Password hash memory must be at least 8 KiB per lane",
                "auth.password_hash.memory_kib"
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Interval of the expired-session reaper, 0 disables it
    pub session_reaper_interval_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            session_reaper_interval_secs: 3600,
        }
    }
}

impl ServerSettings {
    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 5,
        }
    }
}

impl Settings {
    /// Settings with defaults everywhere except the auth section
    pub fn new(auth: AuthSettings) -> Self {
        Self {
            auth,
            server: ServerSettings::default(),
            database: DatabaseSettings::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Load settings from `proposal.toml` (if present) and the environment.
    pub fn load() -> CoreResult<Self> {
        Self::load_from(None)
    }

    /// Load settings, reading the given file instead of the default one.
    pub fn load_from(path: Option<&Path>) -> CoreResult<Self> {
        let builder = match path {
            Some(path) => defaults()?.add_source(File::from(path).required(true)),
            None => defaults()?.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        let builder = builder.add_source(
            Environment::with_prefix("PROPOSAL")
                .separator("__")
                .try_parsing(true),
        );

        finish(with_legacy_overrides(builder)?)
    }

    /// Parse settings from a TOML document on top of the defaults.
    pub fn from_toml_str(document: &str) -> CoreResult<Self> {
        finish(defaults()?.add_source(File::from_str(document, FileFormat::Toml)))
    }

    pub fn validate(&self) -> CoreResult<()> {
        self.auth.validate()?;

        if self.database.max_connections == 0 {
            return Err(config_error!(
                "Database pool needs at least one connection",
                "database.max_connections"
            ));
        }

        Ok(())
    }
}

type Builder = ConfigBuilder<config::builder::DefaultState>;

fn defaults() -> CoreResult<Builder> {
    Config::builder()
        .set_default("auth.signing_secret", "")
        .and_then(|b| b.set_default("auth.session_ttl_minutes", DEFAULT_SESSION_TTL_MINUTES))
        .map_err(|e| source_error("Failed to apply default settings", e))
}

fn with_legacy_overrides(builder: Builder) -> CoreResult<Builder> {
    let secret = std::env::var(LEGACY_SECRET_VAR).ok().filter(|s| !s.is_empty());

    let ttl = match std::env::var(LEGACY_TTL_VAR).ok().filter(|s| !s.is_empty()) {
        Some(raw) => Some(raw.trim().parse::<i64>().map_err(|_| {
            config_error!(
                format!("{LEGACY_TTL_VAR} must be a whole number of minutes"),
                "auth.session_ttl_minutes"
            )
        })?),
        None => None,
    };

    builder
        .set_override_option("auth.signing_secret", secret)
        .and_then(|b| b.set_override_option("auth.session_ttl_minutes", ttl))
        .map_err(|e| source_error("Failed to apply legacy environment overrides", e))
}

fn finish(builder: Builder) -> CoreResult<Settings> {
    let settings = builder
        .build()
        .map_err(|e| source_error("Failed to build configuration", e))?
        .try_deserialize::<Settings>()
        .map_err(|e| source_error("Failed to deserialize configuration", e))?;

    settings.validate()?;
    Ok(settings)
}

fn source_error(message: &str, source: config::ConfigError) -> CoreError {
    CoreError::Config {
        message: format!("{message}: {source}"),
        field: None,
        source: Some(Box::new(source)),
        context: ErrorContext::new("config")
            .with_operation("load")
            .with_suggestion("Check proposal.toml syntax and value types"),
    }
}
