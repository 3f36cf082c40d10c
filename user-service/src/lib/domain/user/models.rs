use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use auth::Role;
use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::user::errors::EmailError;
use crate::user::errors::NameError;
use crate::user::errors::UserIdError;

/// User aggregate entity.
///
/// Represents a registered identity with credentials and role grants.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: DisplayName,
    pub email: EmailAddress,
    pub password_hash: String,
    pub roles: BTreeSet<Role>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The role reported in authentication responses.
    ///
    /// Roles are an ordered set, so the answer is deterministic: `ADMIN`
    /// wins over `USER` when both are granted.
    pub fn primary_role(&self) -> Role {
        self.roles.iter().next().copied().unwrap_or(Role::User)
    }
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    ///
    /// # Returns
    /// UserId with random UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Arguments
    /// * `s` - UUID string to parse
    ///
    /// # Returns
    /// Parsed UserId
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name value type
///
/// Free-form, but never blank and bounded in length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    const MAX_LENGTH: usize = 100;

    /// Create a new valid display name.
    ///
    /// Surrounding whitespace is trimmed before validation.
    ///
    /// # Arguments
    /// * `name` - Raw name string
    ///
    /// # Returns
    /// Validated DisplayName value object
    ///
    /// # Errors
    /// * `Empty` - Name is blank after trimming
    /// * `TooLong` - Name longer than 100 characters
    pub fn new(name: String) -> Result<Self, NameError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(NameError::Empty);
        }
        if name.len() > Self::MAX_LENGTH {
            return Err(NameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: name.len(),
            });
        }
        Ok(Self(name))
    }

    /// Get name as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates format using an RFC 5322 compliant parser and lowercases the
/// address, so uniqueness checks are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated, case-normalized email address.
    ///
    /// # Arguments
    /// * `email` - Raw email string
    ///
    /// # Returns
    /// Validated EmailAddress value object
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email.to_lowercase()))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Get email as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Command to create a new user with domain types.
///
/// Used both by public registration and by admin-side creation; the service
/// decides the defaults. An empty roles set means "default to USER".
#[derive(Debug)]
pub struct CreateUserCommand {
    pub name: DisplayName,
    pub email: EmailAddress,
    pub password: String,
    pub roles: BTreeSet<Role>,
    pub active: Option<bool>,
}

impl CreateUserCommand {
    pub fn new(
        name: DisplayName,
        email: EmailAddress,
        password: String,
        roles: BTreeSet<Role>,
        active: Option<bool>,
    ) -> Self {
        Self {
            name,
            email,
            password,
            roles,
            active,
        }
    }
}

/// Transient login credentials.
///
/// Never persisted; dropped after verification.
#[derive(Debug)]
pub struct Credentials {
    pub email: EmailAddress,
    pub password: String,
}

/// Command to update an existing user with optional validated fields.
///
/// All fields are optional to support partial updates.
/// Only provided fields will be updated.
#[derive(Debug)]
pub struct UpdateUserCommand {
    pub name: Option<DisplayName>,
    pub email: Option<EmailAddress>,
    pub password: Option<String>,
    pub roles: Option<BTreeSet<Role>>,
    pub active: Option<bool>,
}

/// Outcome of a successful registration or login.
///
/// The token is stateless: nothing about it is stored, and it stays valid
/// until its own expiry regardless of later changes to the user.
#[derive(Debug)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}
