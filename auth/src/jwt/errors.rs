use thiserror::Error;

/// Error type for JWT operations.
///
/// `InvalidToken` and `TokenExpired` are kept apart for diagnostics; the HTTP
/// layer reports both as the same authentication failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is invalid: {0}")]
    InvalidToken(String),

    #[error("Token is expired")]
    TokenExpired,

    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),
}
