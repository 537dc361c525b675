use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::SigningScheme;
use crate::jwt::TokenIdentity;
use crate::jwt::TokenKind;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Lifetimes of the two token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
}

impl TokenLifetimes {
    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access,
            TokenKind::Refresh => self.refresh,
        }
    }
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: Duration::minutes(15),
            refresh: Duration::days(7),
        }
    }
}

/// A signed token and the instant it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Access and refresh token minted together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry of the access token
    pub expires_at: DateTime<Utc>,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

/// Authentication coordinator combining password verification and token
/// issuance.
///
/// Holds no mutable state; share it behind an `Arc`.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    lifetimes: TokenLifetimes,
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `scheme` - Signing scheme used for both token kinds
    /// * `lifetimes` - Access and refresh token TTLs
    /// * `leeway_seconds` - Clock skew tolerated on verification
    ///
    /// # Errors
    /// * `InvalidKey` - Key material rejected
    pub fn new(
        scheme: &SigningScheme,
        lifetimes: TokenLifetimes,
        leeway_seconds: u64,
    ) -> Result<Self, JwtError> {
        Ok(Self {
            password_hasher: PasswordHasher::new(),
            jwt_handler: JwtHandler::new(scheme, leeway_seconds)?,
            lifetimes,
        })
    }

    pub fn lifetimes(&self) -> TokenLifetimes {
        self.lifetimes
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a password against a stored hash. Malformed hashes never match.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Verify credentials and mint a token pair.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        identity: &TokenIdentity,
    ) -> Result<TokenPair, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash) {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.issue_pair(identity)?)
    }

    /// Mint a token of `kind` valid from now.
    pub fn issue_token(
        &self,
        identity: &TokenIdentity,
        kind: TokenKind,
    ) -> Result<IssuedToken, JwtError> {
        self.issue_token_at(identity, kind, Utc::now())
    }

    /// Mint a token of `kind` valid from `issued_at`.
    pub fn issue_token_at(
        &self,
        identity: &TokenIdentity,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, JwtError> {
        let claims = Claims::for_identity(identity, kind, issued_at, self.lifetimes.ttl(kind));
        let token = self.jwt_handler.encode(&claims)?;

        Ok(IssuedToken {
            token,
            expires_at: claims.expires_at(),
        })
    }

    /// Mint a fresh access and refresh token for `identity`.
    ///
    /// Generate tokens without password verification, for registration and
    /// refresh flows where the caller is already authenticated.
    pub fn issue_pair(&self, identity: &TokenIdentity) -> Result<TokenPair, JwtError> {
        let now = Utc::now();
        let access = self.issue_token_at(identity, TokenKind::Access, now)?;
        let refresh = self.issue_token_at(identity, TokenKind::Refresh, now)?;

        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            expires_at: access.expires_at,
        })
    }

    /// Validate and decode a token of either kind.
    ///
    /// Callers check `token_type` against the operation they perform.
    pub fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.jwt_handler.decode(token)
    }
}
