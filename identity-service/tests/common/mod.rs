use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth::Authenticator;
use auth::SigningScheme;
use auth::TokenIdentity;
use auth::TokenKind;
use auth::TokenLifetimes;
use chrono::Utc;
use identity_service::domain::auth::service::AuthService;
use identity_service::domain::user::errors::RepositoryError;
use identity_service::domain::user::models::EmailAddress;
use identity_service::domain::user::models::User;
use identity_service::domain::user::models::UserId;
use identity_service::domain::user::ports::UserRepository;
use identity_service::inbound::http::router::create_router;
use serde_json::json;
use serde_json::Value;
use tokio::sync::RwLock;

const TEST_SECRET: &str = "test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Credential store kept in memory, with the same email uniqueness rule as
/// the Postgres table.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn remove(&self, id: &UserId) {
        self.users.write().await.remove(id);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, RepositoryError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::EmailAlreadyExists(
                user.email.as_str().to_string(),
            ));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }

    async fn email_exists(&self, email: &EmailAddress) -> Result<bool, RepositoryError> {
        Ok(self.users.read().await.values().any(|u| &u.email == email))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub repository: Arc<InMemoryUserRepository>,
    pub authenticator: Arc<Authenticator>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let repository = Arc::new(InMemoryUserRepository::default());
        let authenticator = Arc::new(
            Authenticator::new(
                &SigningScheme::hs256(TEST_SECRET),
                TokenLifetimes::default(),
                0,
            )
            .expect("Failed to build authenticator"),
        );

        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&repository),
            Arc::clone(&authenticator),
            Duration::from_secs(5),
        )
        .expect("Failed to build auth service"));

        let router = create_router(auth_service, Arc::clone(&authenticator));

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            repository,
            authenticator,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Register a user and return the parsed response body.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Value {
        let response = self
            .post("/auth/register")
            .json(&json!({
                "name": name,
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("Failed to parse response")
    }

    /// Mint a token of `kind` whose lifetime ended before now.
    pub fn expired_token(&self, user_id: &str, email: &str, kind: TokenKind) -> String {
        let identity = TokenIdentity {
            user_id: user_id.parse().expect("Invalid user id"),
            email: email.to_string(),
            role: "CMS_CUSTOMER".to_string(),
        };
        let issued_at = Utc::now() - self.authenticator.lifetimes().ttl(kind) - chrono::Duration::minutes(1);

        self.authenticator
            .issue_token_at(&identity, kind, issued_at)
            .expect("Failed to issue token")
            .token
    }
}
