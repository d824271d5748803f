//! Integration tests for flag definition handling
//!
//! Covers the path a seed file or admin payload takes: loose TOML/JSON
//! definition -> validated `NewFlag` -> materialized `Flag`.

use flagwise_domain::{
    Flag, FlagDefinition, FlagPatch, FlagScope, FlagwiseError, NewFlag, RolloutPercentage,
    Targeting,
};

#[derive(serde::Deserialize)]
struct SeedDocument {
    flags: Vec<FlagDefinition>,
}

// ============================================================================
// Definition Parsing
// ============================================================================

#[test]
fn test_toml_seed_document_converts_every_scope() {
    let document: SeedDocument = toml::from_str(
        r#"
        [[flags]]
        key = "x"
        scope = "GLOBAL"
        is_enabled = true

        [[flags]]
        key = "y"
        display_name = "Gradual rollout"
        scope = "PERCENTAGE"
        rollout_percentage = 50
        is_enabled = true

        [[flags]]
        key = "z"
        scope = "ROLE"
        is_enabled = true
        rules = { roles = ["admin"] }

        [[flags]]
        key = "beta"
        scope = "USER"
        rules = { user_ids = ["42"] }
        "#,
    )
    .expect("seed document parses");

    let flags: Vec<NewFlag> = document
        .flags
        .into_iter()
        .map(NewFlag::try_from)
        .collect::<Result<_, _>>()
        .expect("all definitions are valid");

    let scopes: Vec<FlagScope> = flags.iter().map(|flag| flag.targeting.scope()).collect();
    assert_eq!(
        scopes,
        vec![FlagScope::Global, FlagScope::Percentage, FlagScope::Role, FlagScope::User]
    );
    assert_eq!(flags[1].display_name, "Gradual rollout");
    assert_eq!(
        flags[1].targeting,
        Targeting::Percentage { rollout_percentage: RolloutPercentage::new(50).unwrap() }
    );
    assert!(!flags[3].is_enabled, "is_enabled defaults to false");
}

#[test]
fn test_unknown_scope_fails_to_parse() {
    let result = serde_json::from_str::<FlagDefinition>(r#"{"key":"a","scope":"REGION"}"#);
    assert!(result.is_err());
}

// ============================================================================
// Flag Lifecycle
// ============================================================================

#[test]
fn test_patch_retargets_scope_and_rules_together() {
    let new_flag = NewFlag::new("z", "Z", Targeting::roles(["admin"])).with_enabled(true);
    let mut flag = Flag::from_new("id-1", new_flag, 100);

    FlagPatch::retarget(Targeting::percentage(25).unwrap()).apply(&mut flag, 200);

    assert_eq!(flag.scope(), FlagScope::Percentage);
    assert!(matches!(flag.targeting, Targeting::Percentage { rollout_percentage }
        if rollout_percentage.value() == 25));
    assert_eq!(flag.updated_at, 200);
}

#[test]
fn test_patch_validation_rejects_bad_rename() {
    let patch = FlagPatch::rename("bad key");
    assert!(matches!(patch.validate(), Err(FlagwiseError::Validation(_))));
}

#[test]
fn test_flag_json_roundtrip_keeps_targeting() {
    let flag = Flag::from_new(
        "id-2",
        NewFlag::new("beta", "Beta", Targeting::users(["42", "7"])).with_description("Beta users"),
        100,
    );

    let json = serde_json::to_string(&flag).expect("flag serializes");
    let parsed: Flag = serde_json::from_str(&json).expect("flag deserializes");

    assert_eq!(parsed, flag);
}
