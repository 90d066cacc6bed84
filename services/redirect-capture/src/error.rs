//! Service-specific error types

use thiserror::Error;

/// Redirect-capture errors.
///
/// Exchange failures are provider errors (`stream_auth::Error`) handled
/// inside the callback as HTTP response text; they never propagate here.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to bind redirect listener on {addr}: {reason}")]
    ListenerStart { addr: String, reason: String },

    #[error("redirect request is missing the authorization code")]
    MissingAuthorizationCode,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result alias using service Error
pub type Result<T> = std::result::Result<T, Error>;
