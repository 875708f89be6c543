// ── Runtime notifier configuration ──
//
// Describes where the platform lives and how the notification layer should
// behave. Carries no credential (that lives in `Session`) and never touches
// disk: the CLI builds a `NotifierConfig` from its profile and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use shakwa_api::transport::{TlsMode, TransportConfig};
use shakwa_api::websocket::{DEFAULT_PUSH_PATH, DEFAULT_RECONNECT_DELAY, PushConfig};
use url::Url;

use crate::locale::Locale;

pub const DEFAULT_API_PATH: &str = "/api";
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// Bundled root store (strict).
    #[default]
    SystemDefaults,
    /// Also trust a custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (staging servers with self-signed certs).
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// Configuration for one mounted notification layer.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// Application origin, e.g. `https://complaints.example.gov`.
    pub origin: Url,
    /// REST prefix under the origin.
    pub api_path: String,
    /// Push endpoint path under the origin.
    pub push_path: String,
    /// Page size used by `NotificationStore::refresh`.
    pub page_size: u32,
    /// Fixed delay between a push drop and the next attempt.
    pub reconnect_delay: Duration,
    /// Locale used when the consumer does not supply one.
    pub locale: Locale,
    pub tls: TlsVerification,
    /// HTTP request timeout.
    pub timeout: Duration,
}

impl NotifierConfig {
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            api_path: DEFAULT_API_PATH.into(),
            push_path: DEFAULT_PUSH_PATH.into(),
            page_size: DEFAULT_PAGE_SIZE,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            locale: Locale::default(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: TlsMode::from(&self.tls),
            timeout: self.timeout,
        }
    }

    pub(crate) fn push(&self) -> PushConfig {
        PushConfig {
            origin: self.origin.clone(),
            path: self.push_path.clone(),
            reconnect_delay: self.reconnect_delay,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_platform_layout() {
        let config = NotifierConfig::new(Url::parse("https://complaints.example.gov").unwrap());
        assert_eq!(config.api_path, "/api");
        assert_eq!(config.push_path, "/ws/notifications");
        assert_eq!(config.page_size, 20);
        assert_eq!(config.reconnect_delay, Duration::from_secs(3));
        assert_eq!(config.locale, Locale::Ar);
    }

    #[test]
    fn push_config_carries_path_and_delay() {
        let mut config = NotifierConfig::new(Url::parse("http://localhost:8000").unwrap());
        config.push_path = "/realtime".into();
        config.reconnect_delay = Duration::from_millis(500);

        let push = config.push();
        assert_eq!(push.path, "/realtime");
        assert_eq!(push.reconnect_delay, Duration::from_millis(500));
        assert_eq!(push.origin.as_str(), "http://localhost:8000/");
    }

    #[test]
    fn insecure_tls_maps_to_transport() {
        let mut config = NotifierConfig::new(Url::parse("https://staging.example.gov").unwrap());
        config.tls = TlsVerification::DangerAcceptInvalid;
        assert!(matches!(config.transport().tls, TlsMode::DangerAcceptInvalid));
    }
}
