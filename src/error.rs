use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Discord API error: {0}")]
    #[diagnostic(code(calbridge::discord_api))]
    DiscordApi(#[from] serenity::Error),

    #[error("Poise framework error: {0}")]
    #[diagnostic(code(calbridge::poise))]
    Poise(#[from] Box<dyn std::error::Error + Send + Sync>),

    #[error("Environment error: {0}")]
    #[diagnostic(code(calbridge::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(calbridge::config))]
    Config(String),

    #[error("Authentication error: {0}")]
    #[diagnostic(code(calbridge::auth))]
    Auth(String),

    #[error("Calendar provider error: {0}")]
    #[diagnostic(code(calbridge::provider))]
    Provider(String),

    #[error("Event mapping error: {0}")]
    #[diagnostic(code(calbridge::mapping))]
    Mapping(String),

    #[error("Event start {start} is already in the past (now {now})")]
    #[diagnostic(code(calbridge::past_start))]
    PastStart {
        start: chrono::DateTime<chrono::Utc>,
        now: chrono::DateTime<chrono::Utc>,
    },

    #[error("Publish error: {0}")]
    #[diagnostic(code(calbridge::publish))]
    Publish(String),

    #[error(transparent)]
    #[diagnostic(code(calbridge::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(calbridge::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(calbridge::other))]
    Other(String),
}

// Implement From for TOML serialization errors
impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type BotResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create authentication errors
pub fn auth_error(message: &str) -> Error {
    Error::Auth(message.to_string())
}

/// Helper to create calendar provider errors
pub fn provider_error(message: &str) -> Error {
    Error::Provider(message.to_string())
}

/// Helper to create event mapping errors
pub fn mapping_error(message: &str) -> Error {
    Error::Mapping(message.to_string())
}

/// Helper to create publish errors
pub fn publish_error(message: &str) -> Error {
    Error::Publish(message.to_string())
}

/// Helper to create other errors
#[allow(dead_code)]
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
