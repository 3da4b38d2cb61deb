//! Session entity model.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::device::DeviceMeta;

/// One authenticated device login.
///
/// Stored as a flat hash in the key-value store and expired by TTL.
/// Once `is_active` turns false the record is kept only for a short
/// retention window and can never become active again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub device_info: String,
    pub ip_address: String,
    pub user_agent: String,
    pub login_time: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub is_active: bool,
}

impl Session {
    /// Hash field holding the last activity timestamp.
    pub const FIELD_LAST_ACTIVITY: &'static str = "lastActivity";
    /// Hash field holding the active flag.
    pub const FIELD_IS_ACTIVE: &'static str = "isActive";

    /// A fresh, active session for `user_id` starting at `now`.
    pub fn start(session_id: Uuid, user_id: Uuid, device: &DeviceMeta, now: DateTime<Utc>) -> Self {
        Self {
            session_id,
            user_id,
            device_info: device.device_info.clone(),
            ip_address: device.ip_address.clone(),
            user_agent: device.user_agent.clone(),
            login_time: now,
            last_activity: now,
            is_active: true,
        }
    }

    /// Whether the session is active and owned by `user_id`.
    pub fn is_usable_by(&self, user_id: Uuid) -> bool {
        self.is_active && self.user_id == user_id
    }

    /// Flatten into hash fields for storage.
    pub fn to_fields(&self) -> Vec<(String, String)> {
        vec![
            ("userId".into(), self.user_id.to_string()),
            ("sessionId".into(), self.session_id.to_string()),
            ("deviceInfo".into(), self.device_info.clone()),
            ("ipAddress".into(), self.ip_address.clone()),
            ("userAgent".into(), self.user_agent.clone()),
            ("loginTime".into(), self.login_time.to_rfc3339()),
            (
                Self::FIELD_LAST_ACTIVITY.into(),
                self.last_activity.to_rfc3339(),
            ),
            (Self::FIELD_IS_ACTIVE.into(), self.is_active.to_string()),
        ]
    }

    /// Rebuild from stored hash fields.
    ///
    /// Returns `None` for an empty hash (the record is gone) or when a
    /// required field is missing or unparseable.
    pub fn from_fields(fields: &HashMap<String, String>) -> Option<Self> {
        if fields.is_empty() {
            return None;
        }
        let text = |name: &str| fields.get(name).cloned().unwrap_or_default();
        let time = |name: &str| {
            fields
                .get(name)
                .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
                .map(|t| t.with_timezone(&Utc))
        };

        let login_time = time("loginTime")?;
        Some(Self {
            session_id: fields.get("sessionId")?.parse().ok()?,
            user_id: fields.get("userId")?.parse().ok()?,
            device_info: text("deviceInfo"),
            ip_address: text("ipAddress"),
            user_agent: text("userAgent"),
            login_time,
            last_activity: time(Self::FIELD_LAST_ACTIVITY).unwrap_or(login_time),
            is_active: fields
                .get(Self::FIELD_IS_ACTIVE)
                .is_some_and(|v| v == "true"),
        })
    }
}
