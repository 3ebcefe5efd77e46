use blocks_client::Endpoint;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Resolved chat endpoint, derived from the configured origin.
    pub endpoint: Endpoint,
    /// Whether choose prompts are answered without user interaction.
    pub automatic: bool,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let origin =
            std::env::var("CHAT_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());
        let endpoint = parse_origin(&origin)?;

        let automatic = match std::env::var("CHAT_AUTOMATIC") {
            Ok(value) => parse_bool("CHAT_AUTOMATIC", &value)?,
            Err(_) => false,
        };

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            endpoint,
            automatic,
            log_level,
        })
    }

    /// Applies command-line overrides on top of the environment.
    pub fn apply(mut self, origin: Option<&str>, automatic: bool) -> Result<Self, ConfigError> {
        if let Some(origin) = origin {
            self.endpoint = parse_origin(origin)?;
        }
        if automatic {
            self.automatic = true;
        }
        Ok(self)
    }
}

fn parse_origin(origin: &str) -> Result<Endpoint, ConfigError> {
    Endpoint::from_origin(origin)
        .map_err(|e| ConfigError::InvalidValue("CHAT_ORIGIN".to_string(), e.to_string()))
}

fn parse_bool(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(ConfigError::InvalidValue(
            var.to_string(),
            format!("'{}' is not a boolean", other),
        )),
    }
}
