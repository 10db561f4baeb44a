//! Identity claims and role derivation.
//!
//! DESIGN
//! ======
//! Providers put roles under different keys depending on tenant setup. The
//! resolver holds an ordered list of claim sources and returns the first one
//! that yields a non-empty string array.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const ADMIN_ROLE: &str = "admin";

/// Raw claims object for the logged-in user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserClaims(pub Map<String, Value>);

impl UserClaims {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    fn string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(Value::as_str).map(str::to_string)
    }

    /// Display fields for the profile header.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity {
            sub: self.string("sub"),
            name: self.string("name"),
            email: self.string("email"),
            picture: self.string("picture"),
        }
    }
}

impl From<Value> for UserClaims {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

/// Display-only profile of the logged-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub sub: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub picture: Option<String>,
}

/// One place a roles array may live in the claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleClaimSource {
    /// Tenant-specific namespaced claim, e.g. `https://insper.edu.br/roles`.
    Namespaced(String),
    Roles,
    Permissions,
}

impl RoleClaimSource {
    fn key(&self) -> &str {
        match self {
            Self::Namespaced(key) => key,
            Self::Roles => "roles",
            Self::Permissions => "permissions",
        }
    }

    /// Extract the roles held under this source. `None` unless the claim is an
    /// array with at least one string in it.
    #[must_use]
    pub fn extract(&self, claims: &UserClaims) -> Option<BTreeSet<String>> {
        let roles: BTreeSet<String> = claims
            .get(self.key())?
            .as_array()?
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
        if roles.is_empty() { None } else { Some(roles) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleResolver {
    sources: Vec<RoleClaimSource>,
}

impl RoleResolver {
    #[must_use]
    pub fn new(sources: Vec<RoleClaimSource>) -> Self {
        Self { sources }
    }

    /// Namespaced claim first, then `roles`, then `permissions`.
    #[must_use]
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self::new(vec![
            RoleClaimSource::Namespaced(namespace.into()),
            RoleClaimSource::Roles,
            RoleClaimSource::Permissions,
        ])
    }

    #[must_use]
    pub fn sources(&self) -> &[RoleClaimSource] {
        &self.sources
    }

    #[must_use]
    pub fn resolve(&self, claims: &UserClaims) -> BTreeSet<String> {
        self.sources
            .iter()
            .find_map(|source| source.extract(claims))
            .unwrap_or_default()
    }
}

impl Default for RoleResolver {
    fn default() -> Self {
        Self::with_namespace(crate::config::DEFAULT_ROLES_CLAIM)
    }
}

/// Case-insensitive match against [`ADMIN_ROLE`].
#[must_use]
pub fn has_admin_role<'a, I>(roles: I) -> bool
where
    I: IntoIterator<Item = &'a String>,
{
    roles.into_iter().any(|role| role.to_lowercase() == ADMIN_ROLE)
}

#[cfg(test)]
#[path = "claims_test.rs"]
mod tests;
