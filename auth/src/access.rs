use std::collections::BTreeSet;

use crate::role::Role;

/// How an endpoint's required roles are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequireMode {
    /// At least one required role must be granted.
    Any,
    /// Every required role must be granted.
    All,
}

/// Role-based access decisions.
///
/// Callers are expected to have validated the token already; this check only
/// compares role sets. A denial is terminal for the request.
pub struct AccessPolicy;

impl AccessPolicy {
    /// Decide whether the granted roles satisfy an endpoint's requirement.
    pub fn allows(granted: &BTreeSet<Role>, required: &[Role], mode: RequireMode) -> bool {
        match mode {
            RequireMode::Any => required.iter().any(|role| granted.contains(role)),
            RequireMode::All => required.iter().all(|role| granted.contains(role)),
        }
    }
}
