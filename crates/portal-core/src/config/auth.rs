//! Token and credential configuration.

use serde::{Deserialize, Serialize};

/// Placeholder secret shipped in defaults. Startup warns when it is in use.
pub const DEFAULT_JWT_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// Upper bound for any configured lifetime: ten years.
pub const MAX_TTL_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Access token TTL in seconds.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_seconds: u64,
    /// Refresh token TTL in seconds.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_seconds: u64,
    /// TTL of a revocation marker written at logout, in seconds.
    ///
    /// Values below the longest token lifetime plus the verification leeway
    /// are raised to it, so a revoked token can never outlive its marker.
    #[serde(default)]
    pub revocation_ttl_seconds: Option<u64>,
    /// Clock skew tolerated when checking `exp`, in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
    /// Minimum password length accepted at registration.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Argon2 cost parameters.
    #[serde(default)]
    pub argon2: Argon2Config,
}

impl AuthConfig {
    /// The longest lifetime any issued token can have.
    pub fn max_token_ttl_seconds(&self) -> u64 {
        self.access_ttl_seconds.max(self.refresh_ttl_seconds)
    }

    /// Effective TTL for revocation markers.
    ///
    /// Tokens verify until `exp + leeway`, so the leeway is part of the floor.
    pub fn effective_revocation_ttl_seconds(&self) -> u64 {
        let floor = self
            .max_token_ttl_seconds()
            .saturating_add(self.leeway_seconds);
        self.revocation_ttl_seconds.unwrap_or(floor).max(floor)
    }

    /// Whether the shipped placeholder secret is still configured.
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            access_ttl_seconds: default_access_ttl(),
            refresh_ttl_seconds: default_refresh_ttl(),
            revocation_ttl_seconds: None,
            leeway_seconds: default_leeway(),
            password_min_length: default_password_min(),
            argon2: Argon2Config::default(),
        }
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Argon2Config {
    /// Memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// Number of iterations.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Degree of parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

fn default_jwt_secret() -> String {
    DEFAULT_JWT_SECRET.to_string()
}

fn default_access_ttl() -> u64 {
    24 * 60 * 60
}

fn default_refresh_ttl() -> u64 {
    30 * 24 * 60 * 60
}

fn default_leeway() -> u64 {
    5
}

fn default_password_min() -> usize {
    6
}

fn default_memory_kib() -> u32 {
    19 * 1024
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}
