//! Service health

use serde::{Deserialize, Serialize};

/// Body of `/health`
///
/// The backend reports `db_connected`/`redis_connected` as best-effort
/// probes; older deployments omit them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `"ok"` whenever the service answers
    pub status: String,
    /// Database reachable from the backend
    #[serde(default)]
    pub db_connected: bool,
    /// Redis reachable from the backend
    #[serde(default)]
    pub redis_connected: bool,
    /// Backend version string
    #[serde(default)]
    pub version: String,
}

impl HealthStatus {
    /// Whether the service reported itself healthy
    #[inline]
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_minimal_body() {
        let h: HealthStatus = serde_json::from_str(r#"{"status":"ok","version":"1.2"}"#).unwrap();
        assert!(h.is_ok());
        assert_eq!(h.version, "1.2");
        assert!(!h.db_connected);
    }

    #[test]
    fn missing_status_is_rejected() {
        assert!(serde_json::from_str::<HealthStatus>(r#"{"version":"1.2"}"#).is_err());
    }
}
