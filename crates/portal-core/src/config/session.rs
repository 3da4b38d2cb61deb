//! Session lifetime and key layout configuration.

use serde::{Deserialize, Serialize};

/// Session management configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Absolute session lifetime from creation, in seconds. Not sliding.
    #[serde(default = "default_absolute_ttl")]
    pub absolute_ttl_seconds: u64,
    /// How long a terminated session record is retained, in seconds.
    #[serde(default = "default_retention")]
    pub terminated_retention_seconds: u64,
    /// Key prefix for session hashes.
    #[serde(default = "default_session_prefix")]
    pub session_prefix: String,
    /// Key prefix for per-account active session sets.
    #[serde(default = "default_user_sessions_prefix")]
    pub user_sessions_prefix: String,
    /// Key prefix for revoked token markers.
    #[serde(default = "default_blacklist_prefix")]
    pub blacklist_prefix: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            absolute_ttl_seconds: default_absolute_ttl(),
            terminated_retention_seconds: default_retention(),
            session_prefix: default_session_prefix(),
            user_sessions_prefix: default_user_sessions_prefix(),
            blacklist_prefix: default_blacklist_prefix(),
        }
    }
}

fn default_absolute_ttl() -> u64 {
    30 * 24 * 60 * 60
}

fn default_retention() -> u64 {
    60 * 60
}

fn default_session_prefix() -> String {
    "session:".to_string()
}

fn default_user_sessions_prefix() -> String {
    "user_sessions:".to_string()
}

fn default_blacklist_prefix() -> String {
    "blacklist:".to_string()
}
