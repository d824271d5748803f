//! Guard registration table
//!
//! Maps operation ids to the single flag key each operation requires. Built
//! once at setup and consulted at dispatch.

use std::collections::BTreeMap;

use flagwise_domain::validation::validate_flag_key;
use flagwise_domain::{FlagwiseError, Result};

/// Operation id -> required flag key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardRegistry {
    bindings: BTreeMap<String, String>,
}

impl GuardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from `(operation, flag_key)` pairs.
    ///
    /// # Errors
    /// Same as [`GuardRegistry::register`].
    pub fn from_bindings<I, O, K>(bindings: I) -> Result<Self>
    where
        I: IntoIterator<Item = (O, K)>,
        O: Into<String>,
        K: Into<String>,
    {
        let mut registry = Self::new();
        for (operation, flag_key) in bindings {
            registry.register(operation, flag_key)?;
        }
        Ok(registry)
    }

    /// Bind `operation` to `flag_key`.
    ///
    /// # Errors
    /// `Validation` for an empty operation id or malformed key, `Conflict`
    /// if the operation is already bound.
    pub fn register(
        &mut self,
        operation: impl Into<String>,
        flag_key: impl Into<String>,
    ) -> Result<()> {
        let operation = operation.into();
        let flag_key = flag_key.into();

        if operation.trim().is_empty() {
            return Err(FlagwiseError::Validation("operation id must not be empty".into()));
        }
        validate_flag_key(&flag_key)?;

        if let Some(existing) = self.bindings.get(&operation) {
            return Err(FlagwiseError::Conflict(format!(
                "operation '{operation}' is already guarded by flag '{existing}'"
            )));
        }

        self.bindings.insert(operation, flag_key);
        Ok(())
    }

    /// Builder form of [`GuardRegistry::register`].
    ///
    /// # Errors
    /// Same as [`GuardRegistry::register`].
    pub fn with_binding(
        mut self,
        operation: impl Into<String>,
        flag_key: impl Into<String>,
    ) -> Result<Self> {
        self.register(operation, flag_key)?;
        Ok(self)
    }

    /// Flag key required by `operation`, if it is guarded.
    pub fn required_flag(&self, operation: &str) -> Option<&str> {
        self.bindings.get(operation).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings ordered by operation id.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(operation, key)| (operation.as_str(), key.as_str()))
    }
}
