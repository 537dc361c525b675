use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::PasswordError;
use auth::Authenticator;
use auth::TokenKind;
use auth::TokenPair;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::errors::INVALID_REFRESH_TOKEN;
use crate::domain::auth::errors::INVALID_TOKEN_TYPE;
use crate::domain::auth::models::AuthResult;
use crate::domain::auth::models::Credentials;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserProfile;
use crate::user::errors::RepositoryError;
use crate::user::ports::UserRepository;

/// Domain service implementing login, registration, refresh and profile
/// lookup on top of a credential store.
///
/// Every store call and every hashing step runs under `operation_timeout`.
/// Hashing happens on the blocking pool so it never stalls the runtime.
pub struct AuthService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
    operation_timeout: Duration,
    // Verified against when the email is unknown, so both login failures cost
    // one Argon2 verification.
    timing_guard_hash: String,
}

impl<UR> AuthService<UR>
where
    UR: UserRepository,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Credential store implementation
    /// * `authenticator` - Password hashing and token issuance
    /// * `operation_timeout` - Deadline for each store call or hashing step
    ///
    /// # Errors
    /// * `PasswordError` - Timing guard hash could not be computed
    pub fn new(
        repository: Arc<UR>,
        authenticator: Arc<Authenticator>,
        operation_timeout: Duration,
    ) -> Result<Self, PasswordError> {
        let timing_guard_hash = authenticator.hash_password(&Uuid::new_v4().to_string())?;

        Ok(Self {
            repository,
            authenticator,
            operation_timeout,
            timing_guard_hash,
        })
    }

    async fn with_deadline<T, F>(&self, step: &'static str, future: F) -> Result<T, AuthError>
    where
        F: Future<Output = Result<T, AuthError>>,
    {
        match tokio::time::timeout(self.operation_timeout, future).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    step,
                    timeout_ms = self.operation_timeout.as_millis() as u64,
                    "Auth step timed out"
                );
                Err(AuthError::Timeout(step))
            }
        }
    }

    async fn run_blocking<T, F>(&self, step: &'static str, task: F) -> Result<T, AuthError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.with_deadline(step, async move {
            tokio::task::spawn_blocking(task)
                .await
                .map_err(|e| internal(step, e))
        })
        .await
    }

    fn issue_pair(&self, user: &User) -> Result<TokenPair, AuthError> {
        self.authenticator
            .issue_pair(&user.token_identity())
            .map_err(|e| internal("issue_tokens", e))
    }
}

fn internal(step: &'static str, err: impl fmt::Display) -> AuthError {
    tracing::error!(step, error = %err, "Auth operation failed");
    AuthError::Internal(format!("{}: {}", step, err))
}

fn store_failure(step: &'static str) -> impl FnOnce(RepositoryError) -> AuthError {
    move |err| internal(step, err)
}

#[async_trait]
impl<UR> AuthServicePort for AuthService<UR>
where
    UR: UserRepository,
{
    async fn login(&self, credentials: Credentials) -> Result<AuthResult, AuthError> {
        let Credentials { email, password } = credentials;

        let Ok(email) = EmailAddress::new(email) else {
            return Err(AuthError::invalid_credentials());
        };

        let user = self
            .with_deadline("find_user_by_email", async {
                self.repository
                    .find_by_email(&email)
                    .await
                    .map_err(store_failure("find_user_by_email"))
            })
            .await?;

        let authenticator = Arc::clone(&self.authenticator);

        let Some(user) = user else {
            let guard_hash = self.timing_guard_hash.clone();
            self.run_blocking("verify_password", move || {
                authenticator.verify_password(&password, &guard_hash)
            })
            .await?;

            tracing::info!("Login rejected: unknown email");
            return Err(AuthError::invalid_credentials());
        };

        let identity = user.token_identity();
        let stored_hash = user.password_hash.clone();
        let tokens = self
            .run_blocking("verify_password", move || {
                authenticator.authenticate(&password, &stored_hash, &identity)
            })
            .await?
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => {
                    tracing::info!(user_id = %user.id, "Login rejected: wrong password");
                    AuthError::invalid_credentials()
                }
                AuthenticationError::JwtError(err) => internal("issue_tokens", err),
            })?;

        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

        Ok(AuthResult {
            user: UserProfile::from(&user),
            tokens,
        })
    }

    async fn register(&self, command: RegisterCommand) -> Result<AuthResult, AuthError> {
        let RegisterCommand {
            name,
            email,
            password,
            role,
        } = command;

        let taken = self
            .with_deadline("check_email", async {
                self.repository
                    .email_exists(&email)
                    .await
                    .map_err(store_failure("check_email"))
            })
            .await?;

        if taken {
            return Err(AuthError::Conflict(email.to_string()));
        }

        let authenticator = Arc::clone(&self.authenticator);
        let password_hash = self
            .run_blocking("hash_password", move || {
                authenticator.hash_password(password.expose())
            })
            .await?
            .map_err(|e| internal("hash_password", e))?;

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            name,
            email,
            password_hash,
            role,
            verified: false,
            created_at: now,
            updated_at: now,
        };

        let email = user.email.to_string();
        let user = self
            .with_deadline("create_user", async {
                self.repository.create(user).await.map_err(|e| match e {
                    RepositoryError::EmailAlreadyExists(_) => {
                        tracing::warn!("Email registered concurrently, insert rejected by store");
                        AuthError::ConcurrentRegistration(email)
                    }
                    other => internal("create_user", other),
                })
            })
            .await?;

        let tokens = self.issue_pair(&user)?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");

        Ok(AuthResult {
            user: UserProfile::from(&user),
            tokens,
        })
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self
            .authenticator
            .verify_token(refresh_token)
            .map_err(|e| {
                tracing::info!(reason = %e, "Refresh token rejected");
                AuthError::Unauthorized(INVALID_REFRESH_TOKEN)
            })?;

        if claims.token_type != TokenKind::Refresh {
            tracing::info!(
                user_id = %claims.sub,
                token_type = %claims.token_type,
                "Refresh attempted with wrong token kind"
            );
            return Err(AuthError::Unauthorized(INVALID_TOKEN_TYPE));
        }

        let user_id = UserId(claims.sub);
        let user = self
            .with_deadline("find_user_by_id", async {
                self.repository
                    .find_by_id(&user_id)
                    .await
                    .map_err(store_failure("find_user_by_id"))
            })
            .await?
            .ok_or_else(|| {
                tracing::info!(user_id = %user_id, "Refresh rejected: user no longer exists");
                AuthError::Unauthorized(INVALID_REFRESH_TOKEN)
            })?;

        let tokens = self.issue_pair(&user)?;

        tracing::debug!(user_id = %user.id, "Token pair rotated");

        Ok(tokens)
    }

    async fn get_profile(&self, user_id: &UserId) -> Result<UserProfile, AuthError> {
        self.with_deadline("find_user_by_id", async {
            self.repository
                .find_by_id(user_id)
                .await
                .map_err(store_failure("find_user_by_id"))
        })
        .await?
        .map(|ref user| UserProfile::from(user))
        .ok_or(AuthError::NotFound(user_id.to_string()))
    }

    async fn check_health(&self) -> Result<(), AuthError> {
        self.with_deadline("ping_store", async {
            self.repository
                .ping()
                .await
                .map_err(store_failure("ping_store"))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use auth::SigningScheme;
    use auth::TokenLifetimes;
    use chrono::Duration as ChronoDuration;
    use mockall::mock;

    use super::*;
    use crate::domain::auth::errors::INVALID_CREDENTIALS;
    use crate::domain::user::models::DisplayName;
    use crate::domain::user::models::Password;
    use crate::domain::user::models::Role;

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, RepositoryError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
            async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, RepositoryError>;
            async fn email_exists(&self, email: &EmailAddress) -> Result<bool, RepositoryError>;
            async fn ping(&self) -> Result<(), RepositoryError>;
        }
    }

    fn authenticator() -> Arc<Authenticator> {
        Arc::new(
            Authenticator::new(
                &SigningScheme::hs256("test_secret_key_at_least_32_bytes!"),
                TokenLifetimes::default(),
                0,
            )
            .expect("Failed to build authenticator"),
        )
    }

    fn service(repository: MockTestUserRepository) -> AuthService<MockTestUserRepository> {
        AuthService::new(
            Arc::new(repository),
            authenticator(),
            Duration::from_secs(5),
        )
        .expect("Failed to build auth service")
    }

    #[test]
    fn test_timing_guard_hash_is_a_real_hash() {
        let service = service(MockTestUserRepository::new());

        assert!(service.timing_guard_hash.starts_with("$argon2id$"));
        assert!(!service
            .authenticator
            .verify_password("", &service.timing_guard_hash));
    }

    fn stored_user(password: &str) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            name: DisplayName::new("Ann".to_string()).unwrap(),
            email: EmailAddress::new("ann@x.com".to_string()).unwrap(),
            password_hash: auth::PasswordHasher::new().hash(password).unwrap(),
            role: Role::Customer,
            verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn register_command(role: Role) -> RegisterCommand {
        RegisterCommand::new(
            DisplayName::new("Ann".to_string()).unwrap(),
            EmailAddress::new("ann@x.com".to_string()).unwrap(),
            Password::new("Secret123!".to_string()).unwrap(),
            role,
        )
    }

    #[tokio::test]
    async fn test_login_success() {
        let mut repository = MockTestUserRepository::new();
        let user = stored_user("Secret123!");
        let user_id = user.id;

        repository
            .expect_find_by_email()
            .withf(|email| email.as_str() == "ann@x.com")
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = service(repository);
        let result = service
            .login(Credentials::new(
                "ann@x.com".to_string(),
                "Secret123!".to_string(),
            ))
            .await
            .expect("Login failed");

        assert_eq!(result.user.id, user_id);
        assert_eq!(result.user.role, Role::Customer);

        let claims = service
            .authenticator
            .verify_token(&result.tokens.access_token)
            .unwrap();
        assert_eq!(claims.sub, user_id.0);
        assert_eq!(claims.email, "ann@x.com");
        assert_eq!(claims.role, "CMS_CUSTOMER");
        assert_eq!(claims.token_type, TokenKind::Access);
        assert_eq!(claims.expires_at(), result.tokens.expires_at);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let mut repository = MockTestUserRepository::new();
        let user = stored_user("Secret123!");

        repository
            .expect_find_by_email()
            .withf(|email| email.as_str() == "ann@x.com")
            .returning(move |_| Ok(Some(user.clone())));
        repository
            .expect_find_by_email()
            .withf(|email| email.as_str() == "nobody@x.com")
            .returning(|_| Ok(None));

        let service = service(repository);

        let wrong_password = service
            .login(Credentials::new("ann@x.com".to_string(), "wrong".to_string()))
            .await
            .unwrap_err();
        let unknown_email = service
            .login(Credentials::new(
                "nobody@x.com".to_string(),
                "Secret123!".to_string(),
            ))
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AuthError::Unauthorized(INVALID_CREDENTIALS)));
        assert!(matches!(unknown_email, AuthError::Unauthorized(INVALID_CREDENTIALS)));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_login_malformed_email_skips_store() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_email().times(0);

        let service = service(repository);
        let result = service
            .login(Credentials::new("not-an-email".to_string(), "x".to_string()))
            .await;

        assert!(matches!(
            result,
            Err(AuthError::Unauthorized(INVALID_CREDENTIALS))
        ));
    }

    #[tokio::test]
    async fn test_login_store_failure_is_internal() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_email()
            .returning(|_| Err(RepositoryError::DatabaseError("connection reset".to_string())));

        let service = service(repository);
        let result = service
            .login(Credentials::new("ann@x.com".to_string(), "Secret123!".to_string()))
            .await;

        assert!(matches!(result, Err(AuthError::Internal(_))));
    }

    #[tokio::test]
    async fn test_register_success_defaults() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_email_exists()
            .times(1)
            .returning(|_| Ok(false));
        repository
            .expect_create()
            .withf(|user| {
                user.email.as_str() == "ann@x.com"
                    && user.name.as_str() == "Ann"
                    && user.password_hash.starts_with("$argon2")
                    && user.role == Role::Customer
                    && !user.verified
            })
            .times(1)
            .returning(|user| Ok(user));

        let service = service(repository);
        let result = service
            .register(register_command(Role::default()))
            .await
            .expect("Registration failed");

        assert_eq!(result.user.email, "ann@x.com");
        assert_eq!(result.user.role, Role::Customer);

        let claims = service
            .authenticator
            .verify_token(&result.tokens.refresh_token)
            .unwrap();
        assert_eq!(claims.sub, result.user.id.0);
        assert_eq!(claims.token_type, TokenKind::Refresh);
    }

    #[tokio::test]
    async fn test_register_keeps_requested_role() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_email_exists().returning(|_| Ok(false));
        repository
            .expect_create()
            .withf(|user| user.role == Role::RootAdmin)
            .returning(|user| Ok(user));

        let service = service(repository);
        let result = service
            .register(register_command(Role::RootAdmin))
            .await
            .unwrap();

        assert_eq!(result.user.role, Role::RootAdmin);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_email_exists()
            .times(1)
            .returning(|_| Ok(true));
        repository.expect_create().times(0);

        let service = service(repository);
        let result = service.register(register_command(Role::Customer)).await;

        assert!(matches!(result, Err(AuthError::Conflict(email)) if email == "ann@x.com"));
    }

    #[tokio::test]
    async fn test_register_race_is_distinct() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_email_exists().returning(|_| Ok(false));
        repository
            .expect_create()
            .times(1)
            .returning(|user| Err(RepositoryError::EmailAlreadyExists(user.email.to_string())));

        let service = service(repository);
        let result = service.register(register_command(Role::Customer)).await;

        assert!(matches!(
            result,
            Err(AuthError::ConcurrentRegistration(_))
        ));
    }

    #[tokio::test]
    async fn test_register_store_failure_is_internal() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_email_exists().returning(|_| Ok(false));
        repository
            .expect_create()
            .returning(|_| Err(RepositoryError::DatabaseError("disk full".to_string())));

        let service = service(repository);
        let result = service.register(register_command(Role::Customer)).await;

        assert!(matches!(result, Err(AuthError::Internal(_))));
    }

    #[tokio::test]
    async fn test_refresh_rotates_pair() {
        let mut repository = MockTestUserRepository::new();
        let user = stored_user("Secret123!");
        let user_id = user.id;
        let identity = user.token_identity();

        repository
            .expect_find_by_id()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = service(repository);
        let original = service.authenticator.issue_pair(&identity).unwrap();

        let rotated = service
            .refresh_token(&original.refresh_token)
            .await
            .expect("Refresh failed");

        assert_ne!(rotated.access_token, original.access_token);
        assert_ne!(rotated.refresh_token, original.refresh_token);

        let access = service.authenticator.verify_token(&rotated.access_token).unwrap();
        let refresh = service.authenticator.verify_token(&rotated.refresh_token).unwrap();
        assert_eq!(access.sub, identity.user_id);
        assert_eq!(access.email, identity.email);
        assert_eq!(access.role, identity.role);
        assert_eq!(access.token_type, TokenKind::Access);
        assert_eq!(refresh.sub, identity.user_id);
        assert_eq!(refresh.email, identity.email);
        assert_eq!(refresh.role, identity.role);
        assert_eq!(refresh.token_type, TokenKind::Refresh);
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_id().times(0);

        let service = service(repository);
        let pair = service
            .authenticator
            .issue_pair(&stored_user("Secret123!").token_identity())
            .unwrap();

        let result = service.refresh_token(&pair.access_token).await;

        assert!(matches!(
            result,
            Err(AuthError::Unauthorized(INVALID_TOKEN_TYPE))
        ));
    }

    #[tokio::test]
    async fn test_refresh_rejects_expired_token() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_id().times(0);

        let service = service(repository);
        let stale = service
            .authenticator
            .issue_token_at(
                &stored_user("Secret123!").token_identity(),
                TokenKind::Refresh,
                Utc::now() - ChronoDuration::days(8),
            )
            .unwrap();

        let result = service.refresh_token(&stale.token).await;

        assert!(matches!(
            result,
            Err(AuthError::Unauthorized(INVALID_REFRESH_TOKEN))
        ));
    }

    #[tokio::test]
    async fn test_refresh_rejects_deleted_user() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(repository);
        let pair = service
            .authenticator
            .issue_pair(&stored_user("Secret123!").token_identity())
            .unwrap();

        let result = service.refresh_token(&pair.refresh_token).await;

        assert!(matches!(
            result,
            Err(AuthError::Unauthorized(INVALID_REFRESH_TOKEN))
        ));
    }

    #[tokio::test]
    async fn test_get_profile() {
        let mut repository = MockTestUserRepository::new();
        let user = stored_user("Secret123!");
        let user_id = user.id;

        repository
            .expect_find_by_id()
            .withf(move |id| *id == user_id)
            .returning(move |_| Ok(Some(user.clone())));

        let service = service(repository);
        let profile = service.get_profile(&user_id).await.unwrap();

        assert_eq!(profile.id, user_id);
        assert_eq!(profile.name, "Ann");
    }

    #[tokio::test]
    async fn test_get_profile_not_found() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_id().returning(|_| Ok(None));

        let service = service(repository);
        let result = service.get_profile(&UserId::new()).await;

        assert!(matches!(result, Err(AuthError::NotFound(_))));
    }

    struct SlowRepository;

    #[async_trait]
    impl UserRepository for SlowRepository {
        async fn create(&self, user: User) -> Result<User, RepositoryError> {
            Ok(user)
        }

        async fn find_by_id(&self, _id: &UserId) -> Result<Option<User>, RepositoryError> {
            Ok(None)
        }

        async fn find_by_email(
            &self,
            _email: &EmailAddress,
        ) -> Result<Option<User>, RepositoryError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(None)
        }

        async fn email_exists(&self, _email: &EmailAddress) -> Result<bool, RepositoryError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(false)
        }

        async fn ping(&self) -> Result<(), RepositoryError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_slow_store_surfaces_timeout() {
        let service = AuthService::new(
            Arc::new(SlowRepository),
            authenticator(),
            Duration::from_millis(50),
        )
        .expect("Failed to build auth service");

        let login = service
            .login(Credentials::new("ann@x.com".to_string(), "Secret123!".to_string()))
            .await;
        assert!(matches!(login, Err(AuthError::Timeout("find_user_by_email"))));

        let register = service.register(register_command(Role::Customer)).await;
        assert!(matches!(register, Err(AuthError::Timeout("check_email"))));
    }
}
