//! Flag records and targeting rules

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_ROLLOUT_PERCENTAGE;
use crate::errors::{FlagwiseError, Result};
use crate::impl_domain_enum_conversions;
use crate::validation;

/// Targeting strategy of a flag.
///
/// Derived from [`Targeting`]; never stored separately from the rule data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FlagScope {
    Global,
    User,
    Role,
    Percentage,
}

impl_domain_enum_conversions!(FlagScope {
    Global => "GLOBAL",
    User => "USER",
    Role => "ROLE",
    Percentage => "PERCENTAGE",
});

impl TryFrom<String> for FlagScope {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FlagScope> for String {
    fn from(scope: FlagScope) -> Self {
        scope.as_str().to_string()
    }
}

/// Rollout percentage, always within `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct RolloutPercentage(u8);

impl RolloutPercentage {
    /// Nobody is included.
    pub const NONE: Self = Self(0);
    /// Everybody is included.
    pub const ALL: Self = Self(MAX_ROLLOUT_PERCENTAGE);

    /// Validate a raw percentage.
    ///
    /// # Errors
    /// Returns `FlagwiseError::Validation` when `value` is outside `[0, 100]`.
    pub fn new(value: i64) -> Result<Self> {
        u8::try_from(value)
            .ok()
            .filter(|pct| *pct <= MAX_ROLLOUT_PERCENTAGE)
            .map(Self)
            .ok_or_else(|| {
                FlagwiseError::Validation(format!(
                    "rollout percentage must be between 0 and {MAX_ROLLOUT_PERCENTAGE}, got {value}"
                ))
            })
    }

    /// Raw percentage value.
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for RolloutPercentage {
    type Error = FlagwiseError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<RolloutPercentage> for u8 {
    fn from(value: RolloutPercentage) -> Self {
        value.0
    }
}

impl std::fmt::Display for RolloutPercentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Scope-specific targeting rules.
///
/// The variant is the scope, so a flag can never be evaluated with rule data
/// belonging to another scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Targeting {
    /// On for everybody, including anonymous callers.
    Global,
    /// On for the listed principal ids.
    User {
        #[serde(default)]
        ids: BTreeSet<String>,
    },
    /// On for principals holding at least one of the listed roles.
    Role {
        #[serde(default)]
        names: BTreeSet<String>,
    },
    /// On for a deterministic share of principals.
    Percentage { rollout_percentage: RolloutPercentage },
}

impl Targeting {
    /// User allow-list targeting.
    pub fn users<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::User { ids: ids.into_iter().map(Into::into).collect() }
    }

    /// Role allow-list targeting.
    pub fn roles<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Role { names: names.into_iter().map(Into::into).collect() }
    }

    /// Percentage rollout targeting.
    ///
    /// # Errors
    /// Returns `FlagwiseError::Validation` when `percentage` is outside `[0, 100]`.
    pub fn percentage(percentage: i64) -> Result<Self> {
        Ok(Self::Percentage { rollout_percentage: RolloutPercentage::new(percentage)? })
    }

    /// Scope selected by these rules.
    pub const fn scope(&self) -> FlagScope {
        match self {
            Self::Global => FlagScope::Global,
            Self::User { .. } => FlagScope::User,
            Self::Role { .. } => FlagScope::Role,
            Self::Percentage { .. } => FlagScope::Percentage,
        }
    }
}

/// A named capability switch with its targeting configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    /// Store-assigned identifier used by management operations
    pub id: String,
    /// Unique lookup key used by evaluation
    pub key: String,
    pub display_name: String,
    pub description: Option<String>,
    /// Kill switch; `false` disables the flag for every principal
    pub is_enabled: bool,
    #[serde(flatten)]
    pub targeting: Targeting,
    /// Unix epoch seconds
    pub created_at: i64,
    /// Unix epoch seconds
    pub updated_at: i64,
}

impl Flag {
    /// Materialize a new flag record from validated input.
    pub fn from_new(id: impl Into<String>, new_flag: NewFlag, now: i64) -> Self {
        Self {
            id: id.into(),
            key: new_flag.key,
            display_name: new_flag.display_name,
            description: new_flag.description,
            is_enabled: new_flag.is_enabled,
            targeting: new_flag.targeting,
            created_at: now,
            updated_at: now,
        }
    }

    /// Scope selected by this flag's targeting rules.
    pub const fn scope(&self) -> FlagScope {
        self.targeting.scope()
    }
}

/// Input for creating a flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFlag {
    pub key: String,
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_enabled: bool,
    #[serde(flatten)]
    pub targeting: Targeting,
}

impl NewFlag {
    /// Create input for a flag that starts disabled.
    pub fn new(key: impl Into<String>, display_name: impl Into<String>, targeting: Targeting) -> Self {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            description: None,
            is_enabled: false,
            targeting,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_enabled(mut self, is_enabled: bool) -> Self {
        self.is_enabled = is_enabled;
        self
    }

    /// Check key format and display name.
    ///
    /// # Errors
    /// Returns `FlagwiseError::Validation` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        validation::validate_flag_key(&self.key)?;
        validation::validate_display_name(&self.display_name)
    }
}

/// Partial update of a flag.
///
/// `None` leaves a field untouched. An empty `description` clears it.
/// Replacing `targeting` swaps the scope and its rules together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagPatch {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_enabled: Option<bool>,
    #[serde(default)]
    pub targeting: Option<Targeting>,
}

impl FlagPatch {
    pub fn rename(key: impl Into<String>) -> Self {
        Self { key: Some(key.into()), ..Self::default() }
    }

    pub fn retarget(targeting: Targeting) -> Self {
        Self { targeting: Some(targeting), ..Self::default() }
    }

    /// Whether the patch changes nothing.
    pub const fn is_empty(&self) -> bool {
        self.key.is_none()
            && self.display_name.is_none()
            && self.description.is_none()
            && self.is_enabled.is_none()
            && self.targeting.is_none()
    }

    /// Key the flag will have after this patch, when it changes.
    pub fn new_key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Validate the fields present in the patch.
    ///
    /// # Errors
    /// Returns `FlagwiseError::Validation` for a malformed key or display name.
    pub fn validate(&self) -> Result<()> {
        if let Some(key) = &self.key {
            validation::validate_flag_key(key)?;
        }
        if let Some(display_name) = &self.display_name {
            validation::validate_display_name(display_name)?;
        }
        Ok(())
    }

    /// Apply the patch onto `flag`, stamping `updated_at` with `now`.
    pub fn apply(self, flag: &mut Flag, now: i64) {
        if let Some(key) = self.key {
            flag.key = key;
        }
        if let Some(display_name) = self.display_name {
            flag.display_name = display_name;
        }
        if let Some(description) = self.description {
            flag.description =
                if description.trim().is_empty() { None } else { Some(description) };
        }
        if let Some(is_enabled) = self.is_enabled {
            flag.is_enabled = is_enabled;
        }
        if let Some(targeting) = self.targeting {
            flag.targeting = targeting;
        }
        flag.updated_at = now;
    }
}
