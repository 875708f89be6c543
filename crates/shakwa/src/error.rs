//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use shakwa_config::ConfigError;
use shakwa_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the platform at {url}")]
    #[diagnostic(
        code(shakwa::connection_failed),
        help(
            "Check that the platform is reachable and the origin is correct.\n\
             Staging servers with self-signed certificates need --insecure (-k)."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(shakwa::timeout),
        help("Increase the timeout with --timeout or check the platform's responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Session expired for profile '{profile}'")]
    #[diagnostic(
        code(shakwa::session_expired),
        help(
            "Sign in to the platform again and store the new token with:\n\
             shakwa config set-token --profile {profile}"
        )
    )]
    SessionExpired { profile: String },

    #[error("No token configured for profile '{profile}'")]
    #[diagnostic(
        code(shakwa::no_credentials),
        help(
            "Store one with: shakwa config set-token --profile {profile}\n\
             Or set the SHAKWA_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Notification '{identifier}' not found")]
    #[diagnostic(
        code(shakwa::not_found),
        help("Run: shakwa list to see available notifications")
    )]
    NotFound { identifier: String },

    #[error("Notification '{identifier}' has no link")]
    #[diagnostic(code(shakwa::no_link))]
    NoLink { identifier: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error{}: {message}", .status.map_or_else(String::new, |s| format!(" (HTTP {s})")))]
    #[diagnostic(code(shakwa::api_error))]
    ApiError {
        message: String,
        code: Option<String>,
        status: Option<u16>,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(shakwa::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(shakwa::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: shakwa config init --origin <URL> --name {name}"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No platform configured")]
    #[diagnostic(
        code(shakwa::no_config),
        help(
            "Create a profile with: shakwa config init --origin <URL>\n\
             Or pass --origin / set SHAKWA_ORIGIN.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(shakwa::config))]
    Config(#[from] ConfigError),

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::SessionExpired { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::NoLink { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. }
            | Self::Config(ConfigError::Validation { .. }) => exit_code::USAGE,
            Self::Config(ConfigError::NoCredentials { .. }) => exit_code::AUTH,
            _ => exit_code::GENERAL,
        }
    }

    /// Translate a core error, attributing auth failures to `profile`.
    pub fn from_core(err: CoreError, profile: &str) -> Self {
        match err {
            CoreError::SessionExpired => Self::SessionExpired {
                profile: profile.into(),
            },
            CoreError::MissingCredential => Self::NoCredentials {
                profile: profile.into(),
            },
            other => other.into(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::SessionExpired => CliError::SessionExpired {
                profile: "current".into(),
            },
            CoreError::MissingCredential => CliError::NoCredentials {
                profile: "current".into(),
            },
            CoreError::Timeout => CliError::Timeout,
            CoreError::NotFound { identifier } => CliError::NotFound { identifier },
            CoreError::Api {
                message,
                code,
                status,
            } => CliError::ApiError {
                message,
                code,
                status,
            },
            CoreError::Config { message } => CliError::Validation {
                field: "configuration".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_name_the_profile() {
        let err = CliError::from_core(CoreError::SessionExpired, "prod");
        assert!(matches!(err, CliError::SessionExpired { ref profile } if profile == "prod"));
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn exit_codes_by_category() {
        assert_eq!(CliError::Timeout.exit_code(), exit_code::TIMEOUT);
        assert_eq!(
            CliError::NotFound {
                identifier: "9".into()
            }
            .exit_code(),
            exit_code::NOT_FOUND
        );
        assert_eq!(
            CliError::NoConfig {
                path: "/tmp/x".into()
            }
            .exit_code(),
            exit_code::USAGE
        );
        assert_eq!(
            CliError::from(CoreError::Internal("boom".into())).exit_code(),
            exit_code::GENERAL
        );
    }

    #[test]
    fn api_error_message_includes_status() {
        let err = CliError::ApiError {
            message: "maintenance".into(),
            code: None,
            status: Some(503),
        };
        assert_eq!(err.to_string(), "API error (HTTP 503): maintenance");
    }
}
