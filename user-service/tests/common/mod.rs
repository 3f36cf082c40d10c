use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;

use async_trait::async_trait;
use auth::Authenticator;
use chrono::Duration;
use user_service::domain::user::models::EmailAddress;
use user_service::domain::user::models::User;
use user_service::domain::user::models::UserId;
use user_service::domain::user::ports::UserRepository;
use user_service::domain::user::ports::UserServicePort;
use user_service::domain::user::service::UserService;
use user_service::inbound::http::router::create_router;
use user_service::user::errors::UserError;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &[u8] = b"integration_test_secret_32_bytes!!";

/// Test application that spawns the real router on a random port
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub authenticator: Arc<Authenticator>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        let authenticator = Arc::new(Authenticator::new(TEST_JWT_SECRET, Duration::hours(24)));
        let repository = Arc::new(InMemoryUserRepository::new());

        let user_service: Arc<dyn UserServicePort> =
            Arc::new(UserService::new(repository, Arc::clone(&authenticator)));

        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let application = create_router(user_service, Arc::clone(&authenticator));
        tokio::spawn(async move {
            axum::serve(listener, application)
                .await
                .expect("Server stopped unexpectedly");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            authenticator,
        }
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.put(format!("{}{}", self.address, path))
    }

    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.delete(format!("{}{}", self.address, path))
    }

    /// Register a user and return the response body (panics on non-201)
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        roles: &[&str],
    ) -> serde_json::Value {
        let response = self
            .post("/api/auth/register")
            .json(&serde_json::json!({
                "name": name,
                "email": email,
                "password": password,
                "roles": roles,
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("Failed to parse response")
    }

    /// Register a user and return just the minted token
    pub async fn register_for_token(
        &self,
        name: &str,
        email: &str,
        password: &str,
        roles: &[&str],
    ) -> String {
        let body = self.register(name, email, password, roles).await;
        body["data"]["token"]
            .as_str()
            .expect("Missing token in response")
            .to_string()
    }
}

/// In-memory repository double backing the integration suite.
///
/// Mirrors the Postgres adapter's semantics: unique email enforced at write
/// time, NotFound on update/delete of missing rows.
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().unwrap();
        if users.values().any(|existing| existing.email == user.email) {
            return Err(UserError::EmailAlreadyExists(
                user.email.as_str().to_string(),
            ));
        }
        users.insert(user.id.0, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.read().unwrap().get(&id.0).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .find(|user| user.email == *email)
            .cloned())
    }

    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, UserError> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .any(|user| user.email == *email))
    }

    async fn exists_by_id(&self, id: &UserId) -> Result<bool, UserError> {
        Ok(self.users.read().unwrap().contains_key(&id.0))
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        Ok(self.users.read().unwrap().values().cloned().collect())
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().unwrap();

        if !users.contains_key(&user.id.0) {
            return Err(UserError::NotFound(user.id.to_string()));
        }

        if users
            .values()
            .any(|existing| existing.email == user.email && existing.id != user.id)
        {
            return Err(UserError::EmailAlreadyExists(
                user.email.as_str().to_string(),
            ));
        }

        users.insert(user.id.0, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        self.users
            .write()
            .unwrap()
            .remove(&id.0)
            .map(|_| ())
            .ok_or(UserError::NotFound(id.to_string()))
    }
}
