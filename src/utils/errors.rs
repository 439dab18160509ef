use thiserror::Error;

/// Main error type for CareCompanion
#[derive(Error, Debug)]
pub enum CompanionError {
    /// Bad credentials or an unreachable auth boundary. The message is shown
    /// to the user as-is.
    #[error("{0}")]
    AuthError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error: {0}")]
    ApiError(String),

    /// The service refused the bearer token (401 or 403)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<reqwest::Error> for CompanionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::ApiError(format!("malformed response body: {}", err))
        } else {
            Self::NetworkError(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts() {
        let err: CompanionError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into();
        assert!(matches!(err, CompanionError::IoError(_)));
    }

    #[test]
    fn test_auth_error_displays_bare_message() {
        let err = CompanionError::AuthError("Invalid email or password".into());
        assert_eq!(err.to_string(), "Invalid email or password");
    }
}
