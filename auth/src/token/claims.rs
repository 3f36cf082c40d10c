use std::collections::BTreeSet;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::role::Role;

/// Session token payload.
///
/// Self-contained: subject identity, granted roles, and the validity window.
/// Tokens carrying these claims are stateless; nothing is recorded
/// server-side at issuance and validity is decided purely by signature and
/// expiry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (the identity's email address)
    pub sub: String,

    /// Roles granted to the subject at issuance
    pub roles: BTreeSet<Role>,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Build claims for a subject with a validity window starting now.
    ///
    /// # Arguments
    /// * `subject` - Identity email the token is issued for
    /// * `roles` - Roles granted to the subject
    /// * `issued_at` - Issuance instant (becomes `iat`)
    /// * `ttl` - Validity duration (`exp = iat + ttl`)
    pub fn new(
        subject: impl Into<String>,
        roles: BTreeSet<Role>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            sub: subject.into(),
            roles,
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }

    /// Check whether the token is expired at the given instant.
    ///
    /// The window is half-open: a token is valid for `iat <= now < exp` and
    /// expired from `exp` onwards.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn issued() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_new_sets_validity_window() {
        let roles = BTreeSet::from([Role::User]);
        let claims = Claims::new("alice@example.com", roles, issued(), Duration::hours(24));

        assert_eq!(claims.sub, "alice@example.com");
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let claims = Claims::new(
            "alice@example.com",
            BTreeSet::from([Role::User]),
            issued(),
            Duration::hours(1),
        );

        let just_before = issued() + Duration::minutes(59) + Duration::seconds(59);
        let at_expiry = issued() + Duration::hours(1);

        assert!(!claims.is_expired(issued()));
        assert!(!claims.is_expired(just_before));
        assert!(claims.is_expired(at_expiry));
        assert!(claims.is_expired(at_expiry + Duration::days(1)));
    }
}
