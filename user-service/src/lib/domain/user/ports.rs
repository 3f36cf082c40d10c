use async_trait::async_trait;

use crate::domain::user::models::AuthSession;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::Credentials;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new identity and mint a session token for it.
    ///
    /// Roles default to `{USER}` when the command carries none; the new
    /// identity is always active.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered (checked before
    ///   the insert, and again surfaced if the store rejects a concurrent
    ///   duplicate at write time)
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: CreateUserCommand) -> Result<AuthSession, UserError>;

    /// Verify credentials and mint a session token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email, inactive identity, or wrong
    ///   password; deliberately indistinguishable
    /// * `DatabaseError` - Database operation failed
    async fn login(&self, credentials: Credentials) -> Result<AuthSession, UserError>;

    /// Create a new user on behalf of an administrator.
    ///
    /// Unlike registration this honors the command's `active` flag and does
    /// not mint a token.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError>;

    /// Retrieve all users.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_users(&self) -> Result<Vec<User>, UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Update existing user with optional fields.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `EmailAlreadyExists` - New email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn update_user(&self, id: &UserId, command: UpdateUserCommand)
        -> Result<User, UserError>;

    /// Delete existing user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete_user(&self, id: &UserId) -> Result<(), UserError>;
}

/// Persistence operations for the user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered (uniqueness is
    ///   enforced by the store; this is the backstop for concurrent
    ///   registrations)
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by email address.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError>;

    /// Check whether any user has this email address.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, UserError>;

    /// Check whether a user with this identifier exists.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn exists_by_id(&self, id: &UserId) -> Result<bool, UserError>;

    /// Retrieve all users from storage.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_all(&self) -> Result<Vec<User>, UserError>;

    /// Update existing user in storage.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `EmailAlreadyExists` - New email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn update(&self, user: User) -> Result<User, UserError>;

    /// Remove user from storage.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete(&self, id: &UserId) -> Result<(), UserError>;
}
