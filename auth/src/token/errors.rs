use thiserror::Error;

/// Error type for session token operations.
///
/// Validation failures are a closed set: callers can tell an expired token
/// from a tampered one, and either from bytes that never were a token.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Failed to sign token: {0}")]
    IssueFailed(String),

    #[error("Token is expired")]
    Expired,

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is malformed")]
    Malformed,
}
