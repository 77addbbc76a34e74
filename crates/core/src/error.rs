//! Error types for s3lib-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use thiserror::Error;

/// Result type alias for s3lib operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for s3lib operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credentials could not be loaded
    #[error("Credentials error: {0}")]
    Credentials(String),

    /// Caller supplied something unusable; raised before any network activity
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Connection refused, timed out or reset
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with a status the operation does not accept
    #[error("S3 request failed with: {status} {reason}\n{body}")]
    Protocol {
        status: u16,
        reason: String,
        body: String,
    },

    /// Response body did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidInput(_) | Error::Config(_) => 2, // UsageError
            Error::Transport(_) => 3,                        // NetworkError
            Error::Credentials(_) => 4,                      // AuthError
            Error::Protocol { status, .. } => match *status {
                401 | 403 => 4,
                404 => 5,
                409 | 412 => 6,
                500..=599 => 3,
                _ => 1,
            },
            _ => 1, // GeneralError
        }
    }

    /// Provider error code (`<Code>`) carried in a protocol failure body
    pub fn provider_code(&self) -> Option<String> {
        match self {
            Error::Protocol { body, .. } => crate::xml::parse_error_code(body.as_bytes()),
            _ => None,
        }
    }

    /// Build a protocol failure from a response that was not accepted
    pub fn protocol(status: u16, reason: impl Into<String>, body: &[u8]) -> Self {
        Error::Protocol {
            status,
            reason: reason.into(),
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Parse(err.to_string())
    }
}
