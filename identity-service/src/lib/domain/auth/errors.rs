use thiserror::Error;

use crate::user::errors::EmailError;
use crate::user::errors::NameError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::RoleError;

/// Client-facing message for any login failure.
pub const INVALID_CREDENTIALS: &str = "invalid credentials";
/// Client-facing message for a token of the wrong kind.
pub const INVALID_TOKEN_TYPE: &str = "invalid token type";
/// Client-facing message for an unusable refresh token.
pub const INVALID_REFRESH_TOKEN: &str = "invalid refresh token";

/// Top-level error for authentication operations.
///
/// Every failure is classified into one of these kinds before it leaves the
/// domain. `Internal` carries detail for logs only.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Request input broke a value-object rule.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("Email already exists: {0}")]
    Conflict(String),

    /// Unique constraint hit on insert after the availability check passed.
    #[error("Email was registered concurrently: {0}")]
    ConcurrentRegistration(String),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Timed out during {0}")]
    Timeout(&'static str),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn invalid_credentials() -> Self {
        AuthError::Unauthorized(INVALID_CREDENTIALS)
    }
}

impl From<NameError> for AuthError {
    fn from(err: NameError) -> Self {
        AuthError::Validation(format!("Invalid name: {}", err))
    }
}

impl From<EmailError> for AuthError {
    fn from(err: EmailError) -> Self {
        AuthError::Validation(format!("Invalid email: {}", err))
    }
}

impl From<PasswordPolicyError> for AuthError {
    fn from(err: PasswordPolicyError) -> Self {
        AuthError::Validation(format!("Invalid password: {}", err))
    }
}

impl From<RoleError> for AuthError {
    fn from(err: RoleError) -> Self {
        AuthError::Validation(format!("Invalid role: {}", err))
    }
}
