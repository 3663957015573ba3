use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BOARD_URL: &str = "https://boards-api.greenhouse.io/v1/boards/Canonical/jobs";
const DEFAULT_PARTNERS_URL: &str = "https://partners.ubuntu.com/partners.json";

/// Job id used when a candidate applies without picking a specific role.
pub const DEFAULT_JOB_ID: &str = "1383152";

/// Largest application form body accepted, resume and cover letter included.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

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

/// Top-level configuration for the site.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub greenhouse: GreenhouseConfig,
    pub partners: PartnersConfig,
    pub upstream: UpstreamConfig,
    pub templates_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Configuration for the server; the Greenhouse API key is mandatory.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(true)
    }

    /// Configuration for commands that only read the job feed. A missing
    /// API key is left empty instead of failing.
    pub fn load_read_only() -> Result<Self, ConfigError> {
        Self::load_with(false)
    }

    fn load_with(require_api_key: bool) -> Result<Self, ConfigError> {
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

        let api_key = match env::var("GREENHOUSE_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
        {
            Some(key) => key,
            None if require_api_key => return Err(ConfigError::MissingApiKey),
            None => String::new(),
        };
        let greenhouse = GreenhouseConfig {
            board_url: env::var("GREENHOUSE_BOARD_URL")
                .unwrap_or_else(|_| DEFAULT_BOARD_URL.to_string()),
            api_key,
            default_job_id: env::var("GREENHOUSE_DEFAULT_JOB_ID")
                .unwrap_or_else(|_| DEFAULT_JOB_ID.to_string()),
            forward_cover_letter: parse_flag("GREENHOUSE_FORWARD_COVER_LETTER")?,
        };

        let partners = PartnersConfig {
            api_url: env::var("PARTNERS_API_URL")
                .unwrap_or_else(|_| DEFAULT_PARTNERS_URL.to_string()),
        };

        let upstream = UpstreamConfig {
            fallback_window: Duration::from_secs(parse_number("CACHE_FALLBACK_SECS", 300)?),
            timeout: Duration::from_secs(parse_number("UPSTREAM_TIMEOUT_SECS", 30)?),
        };

        let templates_dir = env::var("TEMPLATES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("templates"));
        let max_upload_bytes = parse_number("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES as u64)?
            .try_into()
            .map_err(|_| ConfigError::InvalidNumber {
                name: "MAX_UPLOAD_BYTES",
            })?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            greenhouse,
            partners,
            upstream,
            templates_dir,
            max_upload_bytes,
        })
    }
}

fn parse_number(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { name }),
        Err(_) => Ok(default),
    }
}

fn parse_flag(name: &'static str) -> Result<bool, ConfigError> {
    match env::var(name) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            _ => Err(ConfigError::InvalidFlag { name }),
        },
        Err(_) => Ok(false),
    }
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

/// Greenhouse boards API access.
#[derive(Clone)]
pub struct GreenhouseConfig {
    pub board_url: String,
    pub api_key: String,
    pub default_job_id: String,
    pub forward_cover_letter: bool,
}

impl fmt::Debug for GreenhouseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreenhouseConfig")
            .field("board_url", &self.board_url)
            .field("api_key", &"<redacted>")
            .field("default_job_id", &self.default_job_id)
            .field("forward_cover_letter", &self.forward_cover_letter)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct PartnersConfig {
    pub api_url: String,
}

/// Outbound HTTP behaviour shared by every upstream client.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub fallback_window: Duration,
    pub timeout: Duration,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    MissingApiKey,
    InvalidNumber { name: &'static str },
    InvalidFlag { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::MissingApiKey => {
                write!(f, "GREENHOUSE_API_KEY must be set to submit applications")
            }
            ConfigError::InvalidNumber { name } => {
                write!(f, "{name} must be a whole number")
            }
            ConfigError::InvalidFlag { name } => write!(f, "{name} must be true or false"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
