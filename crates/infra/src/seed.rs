//! Seeding flags from definition files
//!
//! A seed file lists flag definitions under `flags`. Seeding creates every
//! key that does not exist yet and leaves existing flags untouched, so running
//! it again is a no-op.
//!
//! ```toml
//! [[flags]]
//! key = "new-checkout"
//! scope = "PERCENTAGE"
//! rollout_percentage = 10
//! is_enabled = true
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use flagwise_core::FlagManagement;
use flagwise_domain::{FlagDefinition, FlagwiseError, NewFlag, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Contents of a seed file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub flags: Vec<FlagDefinition>,
}

impl SeedFile {
    /// Read a seed file, TOML or JSON by extension.
    ///
    /// # Errors
    /// `Config` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            FlagwiseError::Config(format!("Failed to read seed file {}: {e}", path.display()))
        })?;
        Self::parse(&contents, path)
    }

    /// Parse seed content; `path` only selects the format.
    ///
    /// # Errors
    /// `Config` for malformed content or an unknown extension.
    pub fn parse(contents: &str, path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()).unwrap_or("toml") {
            "toml" => toml::from_str(contents)
                .map_err(|e| FlagwiseError::Config(format!("Invalid TOML seed file: {e}"))),
            "json" => serde_json::from_str(contents)
                .map_err(|e| FlagwiseError::Config(format!("Invalid JSON seed file: {e}"))),
            other => Err(FlagwiseError::Config(format!("Unsupported seed format: {other}"))),
        }
    }
}

/// Outcome of a seeding run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// Keys created by this run
    pub created: Vec<String>,
    /// Keys that already existed
    pub skipped: Vec<String>,
}

/// Create every definition whose key is absent from `store`.
///
/// All definitions are validated before anything is written, so a bad file
/// changes nothing.
///
/// # Errors
/// `Validation` for an invalid or duplicated definition; store failures
/// propagate.
pub async fn seed_defaults<S>(store: &S, definitions: Vec<FlagDefinition>) -> Result<SeedReport>
where
    S: FlagManagement + ?Sized,
{
    let mut seen = BTreeSet::new();
    let mut new_flags = Vec::with_capacity(definitions.len());
    for definition in definitions {
        if !seen.insert(definition.key.clone()) {
            return Err(FlagwiseError::Validation(format!(
                "seed file defines flag '{}' more than once",
                definition.key
            )));
        }
        new_flags.push(NewFlag::try_from(definition)?);
    }

    let mut report = SeedReport::default();
    for new_flag in new_flags {
        let key = new_flag.key.clone();
        if store.find_by_key(&key).await?.is_some() {
            debug!(flag_key = %key, "seed skipped existing flag");
            report.skipped.push(key);
            continue;
        }

        match store.create(new_flag).await {
            Ok(_) => report.created.push(key),
            // Created concurrently since the lookup
            Err(FlagwiseError::Conflict(_)) => report.skipped.push(key),
            Err(err) => return Err(err),
        }
    }

    info!(
        created = report.created.len(),
        skipped = report.skipped.len(),
        "feature flag seeding completed"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use flagwise_core::FlagStore;
    use flagwise_domain::Targeting;

    use super::*;
    use crate::memory::InMemoryFlagRepository;

    const SEED_TOML: &str = r#"
[[flags]]
key = "x"
scope = "GLOBAL"
is_enabled = true

[[flags]]
key = "z"
display_name = "Admin tools"
scope = "ROLE"
rules = { roles = ["admin"] }
is_enabled = true
"#;

    #[tokio::test]
    async fn seeding_twice_is_a_noop() {
        let store = InMemoryFlagRepository::new();
        let seed = SeedFile::parse(SEED_TOML, Path::new("seed.toml")).unwrap();

        let first = seed_defaults(&store, seed.flags.clone()).await.unwrap();
        assert_eq!(first.created, vec!["x", "z"]);
        assert!(first.skipped.is_empty());

        let second = seed_defaults(&store, seed.flags).await.unwrap();
        assert!(second.created.is_empty());
        assert_eq!(second.skipped, vec!["x", "z"]);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn existing_flags_are_not_overwritten() {
        let store = InMemoryFlagRepository::new();
        store.create(NewFlag::new("x", "Hand made", Targeting::users(["1"]))).await.unwrap();
        let seed = SeedFile::parse(SEED_TOML, Path::new("seed.toml")).unwrap();

        let report = seed_defaults(&store, seed.flags).await.unwrap();

        assert_eq!(report.skipped, vec!["x"]);
        let x = store.find_by_key("x").await.unwrap().unwrap();
        assert_eq!(x.display_name, "Hand made");
        assert_eq!(x.targeting, Targeting::users(["1"]));
    }

    #[tokio::test]
    async fn invalid_definition_writes_nothing() {
        let store = InMemoryFlagRepository::new();
        let seed = SeedFile::parse(
            r#"{"flags": [
                {"key": "ok", "scope": "GLOBAL"},
                {"key": "bad", "scope": "PERCENTAGE", "rollout_percentage": 150}
            ]}"#,
            Path::new("seed.json"),
        )
        .unwrap();

        let err = seed_defaults(&store, seed.flags).await.unwrap_err();

        assert!(matches!(err, FlagwiseError::Validation(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn duplicate_keys_in_file_are_rejected() {
        let store = InMemoryFlagRepository::new();
        let seed = SeedFile::parse(
            "[[flags]]\nkey = \"x\"\nscope = \"GLOBAL\"\n\n[[flags]]\nkey = \"x\"\nscope = \"USER\"\n",
            Path::new("seed.toml"),
        )
        .unwrap();

        assert!(matches!(
            seed_defaults(&store, seed.flags).await,
            Err(FlagwiseError::Validation(_))
        ));
    }

    #[test]
    fn unknown_extension_is_a_config_error() {
        assert!(matches!(
            SeedFile::parse("flags: []", Path::new("seed.yaml")),
            Err(FlagwiseError::Config(_))
        ));
    }
}
