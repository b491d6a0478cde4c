//! Error types for the OCSF client

use thiserror::Error;

/// Result type for client operations
pub type Result<T> = std::result::Result<T, OcsfApiError>;

/// OCSF client errors
#[derive(Error, Debug)]
pub enum OcsfApiError {
    /// Transport failure or a non-2xx status from the schema server.
    #[error("Schema server unavailable at {endpoint}: {source}")]
    ServiceUnavailable {
        endpoint: String,
        source: reqwest::Error,
    },

    /// The server answered, but not with the expected document shape.
    #[error("Malformed response from {endpoint}: {source}")]
    MalformedResponse {
        endpoint: String,
        source: serde_json::Error,
    },

    #[error("Unknown schema version: {0}")]
    UnknownVersion(String),

    #[error("No schema versions available")]
    EmptyRegistry,

    #[error("No stable schema version available")]
    NoStableVersion,

    #[error("Invalid base URL {url}: {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("Failed to build HTTP client: {0}")]
    ClientInit(reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}
