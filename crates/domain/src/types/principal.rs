//! Principals: the identity a flag is evaluated against

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Requesting identity: a stable opaque id plus role names.
///
/// Resolved by the caller's authentication layer; evaluation only reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    #[serde(default)]
    pub roles: BTreeSet<String>,
}

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), roles: BTreeSet::new() }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Whether any of `names` is among this principal's roles.
    pub fn has_any_role(&self, names: &BTreeSet<String>) -> bool {
        // Iterate the smaller side
        if self.roles.len() <= names.len() {
            self.roles.iter().any(|role| names.contains(role))
        } else {
            names.iter().any(|name| self.roles.contains(name))
        }
    }
}
