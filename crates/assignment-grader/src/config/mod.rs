use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_MAX_SCORE: f64 = 100.0;
const DEFAULT_ANALYZER_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

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

/// Top-level configuration for the grading service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub grading: GradingConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            grading: GradingConfig::from_env()?,
        })
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

/// Which sentence embedder backs semantic coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedderBackend {
    Hashing,
    Onnx,
    Disabled,
}

impl EmbedderBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hashing" => Some(Self::Hashing),
            "onnx" => Some(Self::Onnx),
            "none" | "disabled" | "off" => Some(Self::Disabled),
            _ => None,
        }
    }
}

/// Which classifier backs the tone analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentBackend {
    Lexicon,
    Onnx,
    Disabled,
}

impl SentimentBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lexicon" => Some(Self::Lexicon),
            "onnx" => Some(Self::Onnx),
            "none" | "disabled" | "off" => Some(Self::Disabled),
            _ => None,
        }
    }
}

/// Pipeline limits and capability selection.
#[derive(Debug, Clone)]
pub struct GradingConfig {
    pub default_max_score: f64,
    pub analyzer_timeout: Duration,
    pub max_upload_bytes: usize,
    pub embedder: EmbedderBackend,
    pub sentiment: SentimentBackend,
    pub embedding_model_dir: Option<PathBuf>,
    pub sentiment_model_dir: Option<PathBuf>,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            default_max_score: DEFAULT_MAX_SCORE,
            analyzer_timeout: Duration::from_millis(DEFAULT_ANALYZER_TIMEOUT_MS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            embedder: EmbedderBackend::Hashing,
            sentiment: SentimentBackend::Lexicon,
            embedding_model_dir: None,
            sentiment_model_dir: None,
        }
    }
}

impl GradingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let default_max_score = match env::var("GRADER_DEFAULT_MAX_SCORE") {
            Ok(raw) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|score| score.is_finite() && *score > 0.0)
                .ok_or(ConfigError::InvalidMaxScore)?,
            Err(_) => defaults.default_max_score,
        };

        let analyzer_timeout = match env::var("GRADER_ANALYZER_TIMEOUT_MS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|millis| *millis > 0)
                .map(Duration::from_millis)
                .ok_or(ConfigError::InvalidTimeout)?,
            Err(_) => defaults.analyzer_timeout,
        };

        let max_upload_bytes = match env::var("GRADER_MAX_UPLOAD_BYTES") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidUploadLimit)?,
            Err(_) => defaults.max_upload_bytes,
        };

        let embedder = match env::var("GRADER_EMBEDDER") {
            Ok(raw) => EmbedderBackend::parse(&raw).ok_or(ConfigError::UnknownBackend {
                var: "GRADER_EMBEDDER",
                value: raw,
            })?,
            Err(_) => defaults.embedder,
        };

        let sentiment = match env::var("GRADER_SENTIMENT") {
            Ok(raw) => SentimentBackend::parse(&raw).ok_or(ConfigError::UnknownBackend {
                var: "GRADER_SENTIMENT",
                value: raw,
            })?,
            Err(_) => defaults.sentiment,
        };

        Ok(Self {
            default_max_score,
            analyzer_timeout,
            max_upload_bytes,
            embedder,
            sentiment,
            embedding_model_dir: path_var("GRADER_EMBEDDING_MODEL_DIR"),
            sentiment_model_dir: path_var("GRADER_SENTIMENT_MODEL_DIR"),
        })
    }
}

fn path_var(name: &str) -> Option<PathBuf> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidMaxScore,
    InvalidTimeout,
    InvalidUploadLimit,
    UnknownBackend { var: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidMaxScore => {
                write!(f, "GRADER_DEFAULT_MAX_SCORE must be a positive number")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "GRADER_ANALYZER_TIMEOUT_MS must be a positive integer")
            }
            ConfigError::InvalidUploadLimit => {
                write!(f, "GRADER_MAX_UPLOAD_BYTES must be a byte count")
            }
            ConfigError::UnknownBackend { var, value } => {
                write!(f, "{var} does not name a known backend: '{value}'")
            }
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
