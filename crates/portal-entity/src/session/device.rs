//! Client device metadata captured at login.

use serde::{Deserialize, Serialize};

const UNKNOWN_IP: &str = "Unknown IP";
const UNKNOWN_USER_AGENT: &str = "Unknown User Agent";
const UNKNOWN_DEVICE: &str = "Unknown Device";

/// Where a login came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceMeta {
    pub device_info: String,
    pub ip_address: String,
    pub user_agent: String,
}

impl DeviceMeta {
    /// Build from optional request data, filling the usual placeholders.
    pub fn new(ip: Option<&str>, user_agent: Option<&str>, device_info: &str) -> Self {
        let non_empty = |v: Option<&str>| v.map(str::trim).filter(|v| !v.is_empty()).map(String::from);
        Self {
            device_info: if device_info.is_empty() {
                UNKNOWN_DEVICE.to_string()
            } else {
                device_info.to_string()
            },
            ip_address: non_empty(ip).unwrap_or_else(|| UNKNOWN_IP.to_string()),
            user_agent: non_empty(user_agent).unwrap_or_else(|| UNKNOWN_USER_AGENT.to_string()),
        }
    }

    /// Metadata for a login request, classifying the device from its user agent.
    pub fn from_request(ip: Option<&str>, user_agent: Option<&str>) -> Self {
        Self::new(ip, user_agent, classify_user_agent(user_agent))
    }

    /// Metadata recorded for the session opened by self-registration.
    pub fn registration() -> Self {
        Self::new(None, None, "Registration Device")
    }

    /// The client address, if one was actually captured.
    pub fn known_ip(&self) -> Option<&str> {
        (self.ip_address != UNKNOWN_IP).then_some(self.ip_address.as_str())
    }
}

/// Coarse device label from a user agent string.
///
/// Order matters: mobile and tablet markers win over browser names, and
/// Chrome is checked before Safari because Chrome agents also say "Safari".
pub fn classify_user_agent(user_agent: Option<&str>) -> &'static str {
    let Some(ua) = user_agent.filter(|ua| !ua.trim().is_empty()) else {
        return UNKNOWN_DEVICE;
    };
    if ua.contains("Mobile") {
        "Mobile Device"
    } else if ua.contains("Tablet") {
        "Tablet"
    } else if ua.contains("Chrome") {
        "Chrome Browser"
    } else if ua.contains("Firefox") {
        "Firefox Browser"
    } else if ua.contains("Safari") {
        "Safari Browser"
    } else if ua.contains("Edge") {
        "Edge Browser"
    } else {
        "Desktop Browser"
    }
}
