//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! optional TOML files and `PORTAL__`-prefixed environment variables. Every
//! field has a default, so an empty configuration yields an in-memory dev
//! server.

pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod session;
pub mod store;

use serde::{Deserialize, Serialize};

use self::app::ServerConfig;
use self::auth::{AuthConfig, MAX_TTL_SECONDS};
use self::database::DatabaseConfig;
use self::logging::LoggingConfig;
use self::session::SessionConfig;
use self::store::StoreConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Key-value store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Account database settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Token and credential settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Session lifetime and key layout.
    #[serde(default)]
    pub session: SessionConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Merges `config/default.toml`, an environment overlay `config/{env}.toml`
    /// and environment variables such as `PORTAL__AUTH__JWT_SECRET`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("PORTAL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject combinations that would break token or session guarantees.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.jwt_secret.is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must not be empty"));
        }
        if self.auth.access_ttl_seconds == 0 || self.auth.refresh_ttl_seconds == 0 {
            return Err(AppError::configuration("token TTLs must be positive"));
        }
        let bounded = [
            ("auth.access_ttl_seconds", self.auth.access_ttl_seconds),
            ("auth.refresh_ttl_seconds", self.auth.refresh_ttl_seconds),
            ("auth.leeway_seconds", self.auth.leeway_seconds),
            (
                "auth.revocation_ttl_seconds",
                self.auth.revocation_ttl_seconds.unwrap_or(0),
            ),
            ("session.absolute_ttl_seconds", self.session.absolute_ttl_seconds),
            (
                "session.terminated_retention_seconds",
                self.session.terminated_retention_seconds,
            ),
        ];
        if let Some((name, _)) = bounded.iter().find(|(_, v)| *v > MAX_TTL_SECONDS) {
            return Err(AppError::configuration(format!(
                "{name} must not exceed {MAX_TTL_SECONDS} seconds"
            )));
        }
        if self.session.absolute_ttl_seconds == 0 {
            return Err(AppError::configuration(
                "session.absolute_ttl_seconds must be positive",
            ));
        }
        if self.auth.password_min_length == 0 {
            return Err(AppError::configuration(
                "auth.password_min_length must be positive",
            ));
        }
        Ok(())
    }
}
