//! Raw flag definitions as written by admins and seed files
//!
//! A definition carries a scope name, an untyped rule bag and an optional
//! rollout percentage. Converting it into a [`NewFlag`] checks that the rule
//! data matches the scope and produces the typed [`Targeting`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::{FlagwiseError, Result};
use crate::types::flag::{FlagScope, NewFlag, RolloutPercentage, Targeting};

/// Scope-dependent rule parameters in their loose, external form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_ids: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<BTreeSet<String>>,
}

/// Loose flag definition, validated on conversion into [`NewFlag`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagDefinition {
    pub key: String,
    /// Defaults to the key when omitted
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub scope: FlagScope,
    #[serde(default)]
    pub rules: RuleSet,
    #[serde(default)]
    pub rollout_percentage: Option<i64>,
    #[serde(default)]
    pub is_enabled: bool,
}

impl FlagDefinition {
    /// Build the typed targeting rules for this definition.
    ///
    /// Non-empty rule data for a scope that does not use it is rejected. A
    /// percentage scope without a percentage rolls out to nobody.
    ///
    /// # Errors
    /// Returns `FlagwiseError::Validation` on a scope/rule mismatch or an
    /// out-of-range percentage.
    pub fn targeting(&self) -> Result<Targeting> {
        let user_ids = self.rules.user_ids.clone().unwrap_or_default();
        let roles = self.rules.roles.clone().unwrap_or_default();

        if self.scope != FlagScope::User && !user_ids.is_empty() {
            return Err(self.mismatch("user_ids"));
        }
        if self.scope != FlagScope::Role && !roles.is_empty() {
            return Err(self.mismatch("roles"));
        }
        if self.scope != FlagScope::Percentage && self.rollout_percentage.is_some() {
            return Err(self.mismatch("rollout_percentage"));
        }

        Ok(match self.scope {
            FlagScope::Global => Targeting::Global,
            FlagScope::User => Targeting::User { ids: user_ids },
            FlagScope::Role => Targeting::Role { names: roles },
            FlagScope::Percentage => Targeting::Percentage {
                rollout_percentage: match self.rollout_percentage {
                    Some(value) => RolloutPercentage::new(value)?,
                    None => RolloutPercentage::NONE,
                },
            },
        })
    }

    fn mismatch(&self, field: &str) -> FlagwiseError {
        FlagwiseError::Validation(format!(
            "flag '{}': '{field}' is not valid for scope {}",
            self.key, self.scope
        ))
    }
}

impl TryFrom<FlagDefinition> for NewFlag {
    type Error = FlagwiseError;

    fn try_from(definition: FlagDefinition) -> Result<Self> {
        let targeting = definition.targeting()?;
        let display_name = definition
            .display_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| definition.key.clone());

        let new_flag = Self {
            key: definition.key,
            display_name,
            description: definition.description,
            is_enabled: definition.is_enabled,
            targeting,
        };
        new_flag.validate()?;
        Ok(new_flag)
    }
}
