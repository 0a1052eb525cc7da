use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub fcm: FcmConfig,
    pub reminder: ReminderConfig,
}

/// Database connection pool configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

/// Firebase Cloud Messaging (HTTP v1) configuration
#[derive(Debug, Clone)]
pub struct FcmConfig {
    pub project_id: String,
    /// Path to the Google service-account JSON key
    pub service_account_path: PathBuf,
    /// Base URL of the FCM API, overridable for tests and emulators
    pub endpoint: String,
    pub timeout: Duration,
}

/// Daily appointment reminder configuration
#[derive(Debug, Clone)]
pub struct ReminderConfig {
    pub enabled: bool,
    /// Six-field cron expression (sec min hour day month weekday), server local time
    pub cron: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5001".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            database: DatabaseConfig::from_env()?,
            fcm: FcmConfig::from_env()?,
            reminder: ReminderConfig::from_env()?,
        })
    }
}

impl DatabaseConfig {
    /// Load database configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;

        Ok(Self {
            url,
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10),
            min_connections: parse_or("DATABASE_MIN_CONNECTIONS", 1),
            acquire_timeout: Duration::from_secs(parse_or("DATABASE_ACQUIRE_TIMEOUT_SECS", 5)),
            idle_timeout: Duration::from_secs(parse_or("DATABASE_IDLE_TIMEOUT_SECS", 600)),
            max_lifetime: Duration::from_secs(parse_or("DATABASE_MAX_LIFETIME_SECS", 1800)),
        })
    }
}

impl FcmConfig {
    pub const DEFAULT_ENDPOINT: &'static str = "https://fcm.googleapis.com";

    /// Load push gateway configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let project_id = env::var("FCM_PROJECT_ID")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingFcmProjectId)?;

        let service_account_path = env::var("FCM_SERVICE_ACCOUNT_PATH")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .ok_or(ConfigError::MissingServiceAccount)?;

        let endpoint =
            env::var("FCM_ENDPOINT").unwrap_or_else(|_| Self::DEFAULT_ENDPOINT.to_string());
        let parsed = url::Url::parse(&endpoint).map_err(|_| ConfigError::InvalidFcmEndpoint)?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::InvalidFcmEndpoint);
        }

        Ok(Self {
            project_id,
            service_account_path,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(parse_or("FCM_TIMEOUT_SECS", 30)),
        })
    }
}

impl ReminderConfig {
    pub const DEFAULT_CRON: &'static str = "0 0 8 * * *";

    /// Load reminder schedule configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let enabled = env::var("REMINDER_ENABLED")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(true);

        let cron = env::var("REMINDER_CRON").unwrap_or_else(|_| Self::DEFAULT_CRON.to_string());
        cron::Schedule::from_str(&cron).map_err(|_| ConfigError::InvalidReminderCron(cron.clone()))?;

        Ok(Self { enabled, cron })
    }
}

/// Reads a numeric env var, falling back to `default` when unset or unparsable
fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    MissingDatabaseUrl,
    MissingFcmProjectId,
    MissingServiceAccount,
    InvalidFcmEndpoint,
    InvalidReminderCron(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "PORT must be a valid number"),
            ConfigError::MissingDatabaseUrl => {
                write!(f, "DATABASE_URL environment variable is required")
            }
            ConfigError::MissingFcmProjectId => {
                write!(f, "FCM_PROJECT_ID environment variable is required")
            }
            ConfigError::MissingServiceAccount => {
                write!(f, "FCM_SERVICE_ACCOUNT_PATH environment variable is required")
            }
            ConfigError::InvalidFcmEndpoint => {
                write!(f, "FCM_ENDPOINT must be an http(s) URL")
            }
            ConfigError::InvalidReminderCron(expr) => {
                write!(f, "REMINDER_CRON is not a valid cron expression: {}", expr)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
