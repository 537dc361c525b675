use async_trait::async_trait;
use auth::TokenPair;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::AuthResult;
use crate::domain::auth::models::Credentials;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserProfile;

/// Port for authentication operations called by the transport layer.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Verify credentials and issue an access and refresh token.
    ///
    /// # Errors
    /// * `Unauthorized` - Unknown email or wrong password (same message)
    /// * `Timeout` - Store or hashing step exceeded its deadline
    /// * `Internal` - Store or token failure
    async fn login(&self, credentials: Credentials) -> Result<AuthResult, AuthError>;

    /// Create a user and issue tokens for it.
    ///
    /// # Errors
    /// * `Conflict` - Email is already registered
    /// * `ConcurrentRegistration` - Email was taken between check and insert
    /// * `Timeout` - Store or hashing step exceeded its deadline
    /// * `Internal` - Store, hashing or token failure
    async fn register(&self, command: RegisterCommand) -> Result<AuthResult, AuthError>;

    /// Exchange a valid refresh token for a new token pair.
    ///
    /// # Errors
    /// * `Unauthorized` - Token invalid, expired, of the wrong kind, or its
    ///   user no longer exists
    /// * `Timeout` - Store lookup exceeded its deadline
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;

    /// Retrieve a user's profile.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn get_profile(&self, user_id: &UserId) -> Result<UserProfile, AuthError>;

    /// Check that the credential store is reachable.
    async fn check_health(&self) -> Result<(), AuthError>;
}
