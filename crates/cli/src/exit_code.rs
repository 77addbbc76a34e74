//! Exit code definitions for the s3 CLI
//!
//! Scripts depend on these values; changing one is a breaking change.

/// Exit codes for the s3 CLI application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Operation completed successfully
    Success = 0,

    /// General/unspecified error
    GeneralError = 1,

    /// User input error: invalid arguments, malformed header, etc.
    UsageError = 2,

    /// Network error or server-side failure (5xx)
    NetworkError = 3,

    /// Authentication or permission failure
    AuthError = 4,

    /// Resource not found: bucket or object does not exist
    NotFound = 5,

    /// Conflict or precondition failure
    Conflict = 6,
}

impl ExitCode {
    /// Convert exit code to i32 for use with std::process::exit
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Create exit code from i32 value
    ///
    /// Returns None if the value doesn't correspond to a known exit code.
    pub const fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::GeneralError),
            2 => Some(Self::UsageError),
            3 => Some(Self::NetworkError),
            4 => Some(Self::AuthError),
            5 => Some(Self::NotFound),
            6 => Some(Self::Conflict),
            _ => None,
        }
    }

    /// Pick the exit code for a command failure
    ///
    /// Library errors carry their own classification; anything else (local
    /// file errors, for instance) is a general error.
    pub fn from_error(err: &anyhow::Error) -> Self {
        err.downcast_ref::<s3lib_core::Error>()
            .and_then(|e| Self::from_i32(e.exit_code()))
            .unwrap_or(Self::GeneralError)
    }

    /// Get a human-readable description of the exit code
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "Operation completed successfully",
            Self::GeneralError => "General error",
            Self::UsageError => "Invalid arguments",
            Self::NetworkError => "Network or server error",
            Self::AuthError => "Authentication or permission failure",
            Self::NotFound => "Resource not found",
            Self::Conflict => "Conflict or precondition failure",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use s3lib_core::Error;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::GeneralError.as_i32(), 1);
        assert_eq!(ExitCode::UsageError.as_i32(), 2);
        assert_eq!(ExitCode::NetworkError.as_i32(), 3);
        assert_eq!(ExitCode::AuthError.as_i32(), 4);
        assert_eq!(ExitCode::NotFound.as_i32(), 5);
        assert_eq!(ExitCode::Conflict.as_i32(), 6);
    }

    #[test]
    fn test_exit_code_from_i32() {
        assert_eq!(ExitCode::from_i32(0), Some(ExitCode::Success));
        assert_eq!(ExitCode::from_i32(5), Some(ExitCode::NotFound));
        assert_eq!(ExitCode::from_i32(6), Some(ExitCode::Conflict));
        assert_eq!(ExitCode::from_i32(99), None);
    }

    #[test]
    fn test_exit_code_from_error() {
        let err = anyhow::Error::new(Error::InvalidInput("bad".into()));
        assert_eq!(ExitCode::from_error(&err), ExitCode::UsageError);

        let err = anyhow::Error::new(Error::protocol(404, "Not Found", b""));
        assert_eq!(ExitCode::from_error(&err), ExitCode::NotFound);

        let err = anyhow::Error::new(Error::protocol(403, "Forbidden", b""));
        assert_eq!(ExitCode::from_error(&err), ExitCode::AuthError);

        let err = anyhow::Error::new(Error::Transport("reset".into()));
        assert_eq!(ExitCode::from_error(&err), ExitCode::NetworkError);
    }

    #[test]
    fn test_exit_code_from_wrapped_error() {
        let err = anyhow::Error::new(Error::protocol(412, "Precondition Failed", b""))
            .context("Failed to upload");
        assert_eq!(ExitCode::from_error(&err), ExitCode::Conflict);

        let err = anyhow::anyhow!("disk full");
        assert_eq!(ExitCode::from_error(&err), ExitCode::GeneralError);
    }

    #[test]
    fn test_exit_code_display() {
        let display = format!("{}", ExitCode::NotFound);
        assert!(display.contains("5"));
        assert!(display.contains("not found"));
    }
}
