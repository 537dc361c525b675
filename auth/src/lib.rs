//! Credential and token primitives for the identity service.
//!
//! - Password hashing (Argon2id, fail-closed verification)
//! - Signed, time-bounded access and refresh tokens (JWT)
//! - Authentication coordination
//!
//! One [`SigningScheme`] signs and verifies both token kinds. Key material is
//! handed in at construction; nothing here reads the environment.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, SigningScheme, TokenIdentity, TokenKind, TokenLifetimes};
//!
//! let scheme = SigningScheme::hs256("secret_key_at_least_32_bytes_long!");
//! let auth = Authenticator::new(&scheme, TokenLifetimes::default(), 0).unwrap();
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and mint tokens
//! let identity = TokenIdentity {
//!     user_id: uuid::Uuid::new_v4(),
//!     email: "ann@x.com".to_string(),
//!     role: "CMS_CUSTOMER".to_string(),
//! };
//! let pair = auth.authenticate("password123", &hash, &identity).unwrap();
//!
//! // Validate token
//! let claims = auth.verify_token(&pair.access_token).unwrap();
//! assert_eq!(claims.token_type, TokenKind::Access);
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use authenticator::IssuedToken;
pub use authenticator::TokenLifetimes;
pub use authenticator::TokenPair;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::SigningScheme;
pub use jwt::TokenIdentity;
pub use jwt::TokenKind;
pub use password::PasswordError;
pub use password::PasswordHasher;
