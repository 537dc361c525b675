use async_trait::async_trait;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::RepositoryError;

/// Credential store: durable persistence of user records.
///
/// The store owns email uniqueness. Implementations must reject a second
/// record with the same email even when callers pre-checked it.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, RepositoryError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;

    /// Retrieve user by email address (exact, case-sensitive match).
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, RepositoryError>;

    /// Check whether an email is already registered.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn email_exists(&self, email: &EmailAddress) -> Result<bool, RepositoryError>;

    /// Cheap round trip proving the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}
