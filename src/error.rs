//! Error types shared across the crate.

use std::string::FromUtf8Error;

use thiserror::Error;

/// Errors raised while defining or exposing the request metrics.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// An instrument could not be registered, typically because a collector
    /// with the same name already lives in the registry.
    #[error("failed to register metric `{name}`: {source}")]
    Registration {
        name: String,
        #[source]
        source: prometheus::Error,
    },

    #[error("invalid route template `{template}`: {source}")]
    Route {
        template: String,
        #[source]
        source: matchit::InsertError,
    },

    #[error("failed to encode metrics: {0}")]
    Encode(#[source] prometheus::Error),

    #[error("metrics encoding produced invalid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

/// Errors that abort process initialization.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("error loading configuration: {0}")]
    Config(#[from] figment::Error),

    #[error("invalid logging configuration: {0}")]
    Logging(String),

    #[error(transparent)]
    Metrics(#[from] MetricsError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}
