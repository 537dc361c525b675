use std::fmt;

use auth::TokenPair;

use crate::domain::user::models::DisplayName;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::Role;
use crate::domain::user::models::UserProfile;

/// Login credentials, alive only for the duration of one call.
///
/// The email is kept raw: a malformed address must fail exactly like an
/// unknown one.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: String, password: String) -> Self {
        Self { email, password }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Command to register a new user with domain types
#[derive(Debug)]
pub struct RegisterCommand {
    pub name: DisplayName,
    pub email: EmailAddress,
    pub password: Password,
    /// Already resolved; an absent label has become the default role.
    pub role: Role,
}

impl RegisterCommand {
    pub fn new(name: DisplayName, email: EmailAddress, password: Password, role: Role) -> Self {
        Self {
            name,
            email,
            password,
            role,
        }
    }
}

/// Outcome of login and registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResult {
    pub user: UserProfile,
    pub tokens: TokenPair,
}
