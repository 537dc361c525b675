use thiserror::Error;

/// Error type for JWT operations.
///
/// Verification failures keep their reason apart: an expired token can be
/// renewed with a refresh token, a forged or garbled one cannot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    #[error("Invalid signing key: {0}")]
    InvalidKey(String),

    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is expired")]
    Expired,

    #[error("Token is not valid yet")]
    NotYetValid,

    #[error("Token is malformed: {0}")]
    Malformed(String),
}
