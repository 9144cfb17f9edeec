use std::fmt;

use thiserror::Error;

/// Process configuration, resolved once at startup and shared read-only
/// through `AppState`.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(super) listen: ListenAddr,
    pub(super) runtime: RuntimeSettings,
    pub(super) api: ApiSettings,
    pub(super) auth: AuthSettings,
    pub(super) cors: CorsSettings,
    pub(super) database: DatabaseSettings,
    pub(super) telemetry: TelemetrySettings,
}

/// Host and port the HTTP listener binds to.
#[derive(Debug, Clone)]
pub(crate) struct ListenAddr {
    pub(super) host: String,
    pub(super) port: u16,
}

#[derive(Debug, Clone)]
pub(crate) struct ApiSettings {
    pub(crate) project_name: String,
    pub(crate) version: String,
    /// Mount point of every versioned route, always starting with `/`.
    pub(crate) api_v1_str: String,
}

/// Bearer tokens are minted by the identity service; this side only needs the
/// shared key to verify them.
#[derive(Debug, Clone)]
pub(crate) struct AuthSettings {
    pub(crate) signing_key: String,
    pub(crate) algorithm: String,
    pub(crate) token_ttl_minutes: u64,
}

#[derive(Debug, Clone)]
pub(crate) struct CorsSettings {
    pub(crate) origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct DatabaseSettings {
    pub(super) url: String,
    pub(crate) max_connections: u32,
}

#[derive(Debug, Clone)]
pub(crate) struct TelemetrySettings {
    pub(crate) log_level: String,
    pub(crate) json: bool,
    pub(crate) prometheus_enabled: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct RuntimeSettings {
    pub(crate) environment: Environment,
    /// Refuse generated or empty secrets. Always on in production.
    pub(crate) strict_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Environment {
    Development,
    Production,
    Staging,
    Test,
}

impl Environment {
    /// Unknown or missing labels fall back to development.
    pub(super) fn from_label(label: Option<&str>) -> Self {
        match label.map(str::to_ascii_lowercase).as_deref() {
            Some("production" | "prod") => Self::Production,
            Some("staging" | "stage") => Self::Staging,
            Some("test" | "testing") => Self::Test,
            _ => Self::Development,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Staging => "staging",
            Self::Test => "test",
        }
    }

    pub(super) fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("invalid listen address {host}:{port}")]
    InvalidListenAddr { host: String, port: String },
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("invalid cors origin: {0}")]
    InvalidOrigin(String),
    #[error("{0} must be set when strict configuration is on")]
    MissingSecret(&'static str),
}

impl ListenAddr {
    pub(super) fn parse(host: String, port: String) -> Result<Self, ConfigError> {
        let parsed = port.parse::<u16>().ok().filter(|port| *port != 0);
        match parsed {
            Some(port) if !host.trim().is_empty() => Ok(Self { host, port }),
            _ => Err(ConfigError::InvalidListenAddr { host, port }),
        }
    }

    pub(crate) fn host(&self) -> &str {
        &self.host
    }

    pub(crate) fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for ListenAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl DatabaseSettings {
    pub(crate) fn url(&self) -> &str {
        &self.url
    }
}
