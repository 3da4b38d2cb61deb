//! Key builders for every entry the auth service writes.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses. The store provider adds
//! its own global prefix on top of these.

use uuid::Uuid;

use portal_core::config::session::SessionConfig;

/// Key layout for sessions, per-account session sets and revoked tokens.
#[derive(Debug, Clone)]
pub struct StoreKeys {
    session_prefix: String,
    user_sessions_prefix: String,
    blacklist_prefix: String,
}

impl StoreKeys {
    /// Build the layout from session configuration.
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            session_prefix: config.session_prefix.clone(),
            user_sessions_prefix: config.user_sessions_prefix.clone(),
            blacklist_prefix: config.blacklist_prefix.clone(),
        }
    }

    /// Hash holding one session record.
    pub fn session(&self, session_id: Uuid) -> String {
        format!("{}{session_id}", self.session_prefix)
    }

    /// Set of session ids believed active for an account.
    pub fn user_sessions(&self, user_id: Uuid) -> String {
        format!("{}{user_id}", self.user_sessions_prefix)
    }

    /// Marker for a revoked token id.
    pub fn blacklist(&self, token_id: &str) -> String {
        format!("{}{token_id}", self.blacklist_prefix)
    }
}

impl Default for StoreKeys {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let keys = StoreKeys::default();
        let id = Uuid::nil();
        assert_eq!(
            keys.session(id),
            "session:00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(
            keys.user_sessions(id),
            "user_sessions:00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(keys.blacklist("abc"), "blacklist:abc");
    }

    #[test]
    fn test_custom_prefixes() {
        let config = SessionConfig {
            session_prefix: "s/".into(),
            user_sessions_prefix: "us/".into(),
            blacklist_prefix: "bl/".into(),
            ..SessionConfig::default()
        };
        let keys = StoreKeys::from_config(&config);
        assert_eq!(keys.blacklist("t1"), "bl/t1");
    }
}
