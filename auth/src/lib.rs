//! Authentication and authorization library
//!
//! Provides the building blocks for credential-based authentication:
//! - Password hashing (Argon2id)
//! - Signed, time-bounded session tokens (JWT, HS256)
//! - Closed role set and role-based access checks
//! - Authentication coordination
//!
//! Services own their user storage and adapt these primitives; nothing in
//! this crate performs lookups or holds mutable state. The signing secret is
//! injected at construction so each process (and each test) controls its own
//! key.
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
//! ## Session Tokens
//! ```
//! use std::collections::BTreeSet;
//!
//! use auth::{Role, TokenIssuer};
//! use chrono::{Duration, Utc};
//!
//! let issuer = TokenIssuer::new(b"secret_key_at_least_32_bytes_long!", Duration::hours(24));
//! let roles = BTreeSet::from([Role::User]);
//! let token = issuer.issue("alice@example.com", &roles, Utc::now()).unwrap();
//! let claims = issuer.validate(&token, Utc::now()).unwrap();
//! assert_eq!(claims.sub, "alice@example.com");
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use std::collections::BTreeSet;
//!
//! use auth::{Authenticator, Role};
//! use chrono::{Duration, Utc};
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!", Duration::hours(24));
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and generate token
//! let roles = BTreeSet::from([Role::User]);
//! let result = auth
//!     .authenticate("password123", &hash, "alice@example.com", &roles, Utc::now())
//!     .unwrap();
//!
//! // Validate token
//! let claims = auth.validate_token(&result.access_token, Utc::now()).unwrap();
//! assert!(claims.roles.contains(&Role::User));
//! ```

pub mod access;
pub mod authenticator;
pub mod password;
pub mod role;
pub mod token;

// Re-export commonly used items
pub use access::AccessPolicy;
pub use access::RequireMode;
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use role::Role;
pub use role::RoleError;
pub use token::Claims;
pub use token::TokenError;
pub use token::TokenIssuer;
