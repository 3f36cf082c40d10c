use std::collections::BTreeSet;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::TokenError;
use crate::role::Role;

/// Issues and validates signed session tokens.
///
/// Uses HS256 (HMAC with SHA-256); a token cannot be forged or altered
/// without the secret. The secret and TTL are fixed at construction and
/// shared read-only across arbitrarily many concurrent validations.
///
/// # Security Notes
/// - The secret should be at least 256 bits (32 bytes) for HS256
/// - Store secrets in environment variables or secure vaults, never in code
/// - Compromise of the secret invalidates every outstanding token
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl TokenIssuer {
    /// Create a new token issuer.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing and verifying tokens
    /// * `ttl` - Validity duration applied to every issued token
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            ttl,
        }
    }

    /// Issue a signed token for a subject.
    ///
    /// # Arguments
    /// * `subject` - Identity email the token is issued for
    /// * `roles` - Roles granted to the subject
    /// * `now` - Issuance instant; expiry is `now + ttl`
    ///
    /// # Returns
    /// Compact JWT string
    ///
    /// # Errors
    /// * `IssueFailed` - Signing failed
    pub fn issue(
        &self,
        subject: &str,
        roles: &BTreeSet<Role>,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims::new(subject, roles.clone(), now, self.ttl);
        let header = Header::new(self.algorithm);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::IssueFailed(e.to_string()))
    }

    /// Validate a token and extract its claims.
    ///
    /// The signature is verified before any claim is inspected, so a
    /// tampered token is rejected as `InvalidSignature` regardless of its
    /// contents. Expiry is then checked against the caller-supplied instant
    /// rather than the wall clock, which keeps validation deterministic
    /// under test.
    ///
    /// # Arguments
    /// * `token` - Compact JWT string
    /// * `now` - Instant to evaluate expiry against
    ///
    /// # Returns
    /// Decoded claims
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature check failed
    /// * `Expired` - Signature is valid but `now >= exp`
    /// * `Malformed` - Not parseable into the expected claims structure
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked below against the caller's clock
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Malformed,
                }
            })?;

        let claims = token_data.claims;
        if claims.is_expired(now) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}
