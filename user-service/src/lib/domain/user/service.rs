use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::Role;
use chrono::Utc;

use crate::domain::user::models::AuthSession;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::Credentials;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for registration, login, and user CRUD.
///
/// Each call is a single atomic sequence with no state held between calls;
/// the repository and the authenticator's signing secret are the only shared
/// collaborators.
pub struct UserService<R>
where
    R: UserRepository,
{
    repository: Arc<R>,
    authenticator: Arc<Authenticator>,
}

impl<R> UserService<R>
where
    R: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Credential verification and token issuance
    ///
    /// # Returns
    /// Configured user service instance
    pub fn new(repository: Arc<R>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    fn new_user(&self, command: CreateUserCommand, force_active: bool) -> Result<User, UserError> {
        let password_hash = self.authenticator.hash_password(&command.password)?;

        let roles = if command.roles.is_empty() {
            BTreeSet::from([Role::User])
        } else {
            command.roles
        };

        let active = if force_active {
            true
        } else {
            command.active.unwrap_or(true)
        };

        Ok(User {
            id: UserId::new(),
            name: command.name,
            email: command.email,
            password_hash,
            roles,
            active,
            created_at: Utc::now(),
        })
    }
}

#[async_trait]
impl<R> UserServicePort for UserService<R>
where
    R: UserRepository,
{
    async fn register(&self, command: CreateUserCommand) -> Result<AuthSession, UserError> {
        if self.repository.exists_by_email(&command.email).await? {
            return Err(UserError::EmailAlreadyExists(command.email.to_string()));
        }

        let user = self.new_user(command, true)?;

        // The existence check and the insert are not atomic; the store's
        // unique index maps a concurrent duplicate to EmailAlreadyExists here
        let user = self.repository.create(user).await?;

        let token = self
            .authenticator
            .issue_token(user.email.as_str(), &user.roles, Utc::now())?;

        Ok(AuthSession { token, user })
    }

    async fn login(&self, credentials: Credentials) -> Result<AuthSession, UserError> {
        // Unknown email, inactive identity, and wrong password all collapse
        // into the same InvalidCredentials
        let user = self
            .repository
            .find_by_email(&credentials.email)
            .await?
            .filter(|user| user.active)
            .ok_or(UserError::InvalidCredentials)?;

        let result = self
            .authenticator
            .authenticate(
                &credentials.password,
                &user.password_hash,
                user.email.as_str(),
                &user.roles,
                Utc::now(),
            )
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => UserError::InvalidCredentials,
                AuthenticationError::Password(err) => UserError::Password(err),
                AuthenticationError::Token(err) => UserError::Token(err),
            })?;

        Ok(AuthSession {
            token: result.access_token,
            user,
        })
    }

    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError> {
        if self.repository.exists_by_email(&command.email).await? {
            return Err(UserError::EmailAlreadyExists(command.email.to_string()));
        }

        let user = self.new_user(command, false)?;

        self.repository.create(user).await
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.repository.list_all().await
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<User, UserError> {
        let mut user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))?;

        if let Some(new_name) = command.name {
            user.name = new_name;
        }

        if let Some(new_email) = command.email {
            user.email = new_email;
        }

        if let Some(new_password) = command.password {
            user.password_hash = self.authenticator.hash_password(&new_password)?;
        }

        if let Some(new_roles) = command.roles {
            // The roles set stays non-empty
            if !new_roles.is_empty() {
                user.roles = new_roles;
            }
        }

        if let Some(active) = command.active {
            user.active = active;
        }

        self.repository.update(user).await
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), UserError> {
        if !self.repository.exists_by_id(id).await? {
            return Err(UserError::NotFound(id.to_string()));
        }

        self.repository.delete(id).await
    }
}
