use std::collections::BTreeSet;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::role::Role;
use crate::token::Claims;
use crate::token::TokenError;
use crate::token::TokenIssuer;

/// Authentication coordinator combining password verification and session
/// token issuance.
///
/// Holds the process-wide signing secret (via the embedded [`TokenIssuer`])
/// and the hasher; both are read-only after construction. Callers perform
/// their own identity lookup and pass the stored hash in, so a missing
/// identity and a wrong password can be collapsed into the same failure.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_issuer: TokenIssuer,
}

/// Result of successful authentication.
pub struct AuthenticationResult {
    /// Signed session token
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for token signing
    /// * `token_ttl` - Validity duration for issued tokens
    ///
    /// # Returns
    /// Configured Authenticator instance
    pub fn new(jwt_secret: &[u8], token_ttl: Duration) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            token_issuer: TokenIssuer::new(jwt_secret, token_ttl),
        }
    }

    /// Hash a password for storage.
    ///
    /// # Arguments
    /// * `password` - Plaintext password
    ///
    /// # Returns
    /// Hashed password string
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and issue a session token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `subject` - Identity email to encode as the token subject
    /// * `roles` - Roles granted to the subject
    /// * `now` - Issuance instant
    ///
    /// # Returns
    /// AuthenticationResult with access token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match the stored hash
    /// * `Token` - Token signing failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        subject: &str,
        roles: &BTreeSet<Role>,
        now: DateTime<Utc>,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash) {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let access_token = self.token_issuer.issue(subject, roles, now)?;

        Ok(AuthenticationResult { access_token })
    }

    /// Issue a session token without password verification.
    ///
    /// Used after registration, where the identity was just created and the
    /// plaintext never needs re-checking.
    ///
    /// # Errors
    /// * `TokenError` - Token signing failed
    pub fn issue_token(
        &self,
        subject: &str,
        roles: &BTreeSet<Role>,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        self.token_issuer.issue(subject, roles, now)
    }

    /// Validate a session token and extract its claims.
    ///
    /// # Errors
    /// * `TokenError` - Token is expired, tampered, or malformed
    pub fn validate_token(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        self.token_issuer.validate(token, now)
    }
}
