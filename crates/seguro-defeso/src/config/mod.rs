use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use url::Url;

use crate::workflows::intake::IntakeProfile;

const DEFAULT_SESSION_API_BASE_URL: &str = "http://127.0.0.1:8000/v1";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub session: SessionApiConfig,
    pub intake: IntakeConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let raw_base_url = env::var("SESSION_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_SESSION_API_BASE_URL.to_string());
        let base_url = Url::parse(raw_base_url.trim())
            .map_err(|source| ConfigError::InvalidSessionUrl { source })?;

        let profile = match env::var("INTAKE_PROFILE") {
            Ok(raw) => IntakeProfile::parse(&raw).ok_or(ConfigError::UnknownIntakeProfile(raw))?,
            Err(_) => IntakeProfile::Standard,
        };
        let simulate_latency = env::var("INTAKE_SIMULATE_LATENCY")
            .map(|raw| parse_flag(&raw))
            .unwrap_or(true);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            session: SessionApiConfig { base_url },
            intake: IntakeConfig {
                profile,
                simulate_latency,
            },
        })
    }
}

fn parse_flag(raw: &str) -> bool {
    !matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Location of the cookie-based session API.
#[derive(Debug, Clone)]
pub struct SessionApiConfig {
    pub base_url: Url,
}

/// Document intake behavior: which slot set to present and whether the stubbed
/// classifier/scorer should simulate processing delays.
#[derive(Debug, Clone, Copy)]
pub struct IntakeConfig {
    pub profile: IntakeProfile,
    pub simulate_latency: bool,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            profile: IntakeProfile::Standard,
            simulate_latency: true,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidSessionUrl { source: url::ParseError },
    UnknownIntakeProfile(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSessionUrl { .. } => {
                write!(f, "SESSION_API_BASE_URL must be an absolute URL")
            }
            ConfigError::UnknownIntakeProfile(value) => write!(
                f,
                "INTAKE_PROFILE '{value}' is not one of: standard, pesqbrasil"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::UnknownIntakeProfile(_) => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidSessionUrl { source } => Some(source),
        }
    }
}
