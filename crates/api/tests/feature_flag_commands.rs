//! Integration tests for feature flag commands
//!
//! Runs every command against an in-memory context seeded with the reference
//! flags (`x` global, `y` 50%, `z` admins, `beta` users 42 and 7).

use std::io::Write as _;

use flagwise_core::EvaluationReason;
use flagwise_domain::{FlagPatch, FlagwiseError, Principal, Targeting};
use clap::Parser;
use flagwise_lib::cli::{self, Cli, Command, PrincipalArgs};
use flagwise_lib::{
    authorize_operation, check_flag, check_flags, create_flag, delete_flag, explain_flag, get_flag,
    list_enabled_flags, list_flags, seed_flags, toggle_flag, update_flag,
};
use serde_json::json;

mod support;
use support::{scenario_context, scenario_definitions};

fn customer() -> Principal {
    Principal::new("42").with_role("customer")
}

// ============================================================================
// Evaluation
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn reference_scenarios() {
    let ctx = scenario_context(&[]).await;

    // Global flag, anonymous caller
    assert!(check_flag(&ctx, "x", None).await.unwrap());
    // "42:y" lands in bucket 53, outside a 50% rollout
    assert!(!check_flag(&ctx, "y", Some(&customer())).await.unwrap());
    // Role flag, caller lacks the role
    assert!(!check_flag(&ctx, "z", Some(&customer())).await.unwrap());
    // Unknown key, anonymous caller
    assert!(!check_flag(&ctx, "missing", None).await.unwrap());

    assert!(check_flag(&ctx, "beta", Some(&customer())).await.unwrap());
    assert!(check_flag(&ctx, "z", Some(&Principal::new("1").with_role("admin"))).await.unwrap());
}

#[tokio::test(flavor = "multi_thread")]
async fn check_flags_answers_every_key() {
    let ctx = scenario_context(&[]).await;

    let results = check_flags(
        &ctx,
        vec!["x".into(), "y".into(), "beta".into(), "missing".into(), "x".into()],
        Some(&customer()),
    )
    .await
    .unwrap();

    assert_eq!(results.len(), 4);
    assert_eq!(results.get("x"), Some(&true));
    assert_eq!(results.get("y"), Some(&false));
    assert_eq!(results.get("beta"), Some(&true));
    assert_eq!(results.get("missing"), Some(&false));
}

#[tokio::test(flavor = "multi_thread")]
async fn check_flags_rejects_oversized_batches() {
    let ctx = scenario_context(&[]).await;
    let keys: Vec<String> = (0..21).map(|i| format!("flag-{i}")).collect();

    let result = check_flags(&ctx, keys, None).await;
    assert!(matches!(result, Err(FlagwiseError::Validation(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn enabled_keys_are_sorted_per_principal() {
    let ctx = scenario_context(&[]).await;

    assert_eq!(list_enabled_flags(&ctx, None).await.unwrap(), vec!["x"]);
    assert_eq!(list_enabled_flags(&ctx, Some(&customer())).await.unwrap(), vec!["beta", "x"]);

    // "a:y" lands in bucket 23
    let admin = Principal::new("a").with_role("admin");
    assert_eq!(list_enabled_flags(&ctx, Some(&admin)).await.unwrap(), vec!["x", "y", "z"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn explain_reports_reason_and_bucket() {
    let ctx = scenario_context(&[]).await;

    let explanation = explain_flag(&ctx, "y", Some(&customer())).await.unwrap();
    assert!(!explanation.evaluation.enabled);
    assert_eq!(explanation.evaluation.reason, EvaluationReason::RolloutExcluded { bucket: 53 });
    assert_eq!(
        serde_json::to_value(&explanation).unwrap(),
        json!({
            "flag_key": "y",
            "enabled": false,
            "reason": { "kind": "rollout_excluded", "bucket": 53 }
        })
    );

    let missing = explain_flag(&ctx, "missing", None).await.unwrap();
    assert_eq!(missing.evaluation.reason, EvaluationReason::FlagNotFound);

    let anonymous = explain_flag(&ctx, "beta", None).await.unwrap();
    assert_eq!(anonymous.evaluation.reason, EvaluationReason::PrincipalRequired);
}

// ============================================================================
// Administration
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn list_and_get_flags() {
    let ctx = scenario_context(&[]).await;

    let keys: Vec<String> = list_flags(&ctx).await.unwrap().into_iter().map(|f| f.key).collect();
    assert_eq!(keys, vec!["beta", "x", "y", "z"]);

    let beta = get_flag(&ctx, "beta").await.unwrap();
    assert_eq!(beta.display_name, "Beta dashboard");
    assert_eq!(beta.targeting, Targeting::users(["42", "7"]));

    // Display name falls back to the key
    assert_eq!(get_flag(&ctx, "x").await.unwrap().display_name, "x");

    assert!(matches!(get_flag(&ctx, "missing").await, Err(FlagwiseError::NotFound(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn kill_switch_applies_to_next_evaluation() {
    let ctx = scenario_context(&[]).await;

    let flag = toggle_flag(&ctx, "beta", false).await.unwrap();
    assert!(!flag.is_enabled);
    assert!(!check_flag(&ctx, "beta", Some(&customer())).await.unwrap());

    toggle_flag(&ctx, "beta", true).await.unwrap();
    assert!(check_flag(&ctx, "beta", Some(&customer())).await.unwrap());

    assert!(matches!(toggle_flag(&ctx, "missing", true).await, Err(FlagwiseError::NotFound(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn create_rejects_duplicates_and_bad_definitions() {
    let ctx = scenario_context(&[]).await;

    let duplicate = scenario_definitions().remove(0);
    assert!(matches!(create_flag(&ctx, duplicate).await, Err(FlagwiseError::Conflict(_))));

    let mismatched = serde_json::from_value(json!({
        "key": "mixed",
        "scope": "GLOBAL",
        "rules": { "roles": ["admin"] }
    }))
    .unwrap();
    assert!(matches!(create_flag(&ctx, mismatched).await, Err(FlagwiseError::Validation(_))));

    let out_of_range = serde_json::from_value(json!({
        "key": "too-wide",
        "scope": "PERCENTAGE",
        "rollout_percentage": 101
    }))
    .unwrap();
    assert!(matches!(create_flag(&ctx, out_of_range).await, Err(FlagwiseError::Validation(_))));

    assert_eq!(list_flags(&ctx).await.unwrap().len(), 4);
}

#[tokio::test(flavor = "multi_thread")]
async fn update_retargets_and_renames() {
    let ctx = scenario_context(&[]).await;

    let updated = update_flag(&ctx, "y", FlagPatch::retarget(Targeting::percentage(100).unwrap()))
        .await
        .unwrap();
    assert_eq!(updated.key, "y");
    assert!(check_flag(&ctx, "y", Some(&customer())).await.unwrap());

    update_flag(&ctx, "y", FlagPatch::rename("y-everyone")).await.unwrap();
    assert!(matches!(get_flag(&ctx, "y").await, Err(FlagwiseError::NotFound(_))));
    assert!(check_flag(&ctx, "y-everyone", Some(&customer())).await.unwrap());

    let collision = update_flag(&ctx, "y-everyone", FlagPatch::rename("x")).await;
    assert!(matches!(collision, Err(FlagwiseError::Conflict(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn deleted_flag_evaluates_as_missing() {
    let ctx = scenario_context(&[]).await;

    delete_flag(&ctx, "x").await.unwrap();
    assert!(!check_flag(&ctx, "x", None).await.unwrap());
    assert!(matches!(delete_flag(&ctx, "x").await, Err(FlagwiseError::NotFound(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn seeding_is_idempotent() {
    let ctx = scenario_context(&[]).await;

    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().expect("temp seed file");
    write!(
        file,
        r#"
[[flags]]
key = "x"
scope = "GLOBAL"
is_enabled = true

[[flags]]
key = "new-checkout"
scope = "PERCENTAGE"
rollout_percentage = 10
is_enabled = true
"#
    )
    .expect("seed file written");

    let first = seed_flags(&ctx, file.path()).await.unwrap();
    assert_eq!(first.created, vec!["new-checkout"]);
    assert_eq!(first.skipped, vec!["x"]);

    let second = seed_flags(&ctx, file.path()).await.unwrap();
    assert!(second.created.is_empty());
    assert_eq!(second.skipped, vec!["x", "new-checkout"]);
}

// ============================================================================
// Access guard
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn authorize_reports_feature_availability() {
    let ctx = scenario_context(&[("admin.console", "z"), ("dashboard.beta", "beta")]).await;

    let admin = Principal::new("1").with_role("admin");
    let decision = authorize_operation(&ctx, "admin.console", Some(&admin)).await.unwrap();
    assert!(decision.allowed);
    assert_eq!(decision.flag_key.as_deref(), Some("z"));

    let rejected = authorize_operation(&ctx, "admin.console", Some(&customer())).await.unwrap();
    assert!(!rejected.allowed);

    let anonymous = authorize_operation(&ctx, "dashboard.beta", None).await.unwrap();
    assert!(!anonymous.allowed);

    let unguarded = authorize_operation(&ctx, "reports.view", None).await.unwrap();
    assert!(unguarded.allowed);
    assert_eq!(unguarded.flag_key, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn guard_rejection_is_unavailable_not_permission() {
    let ctx = scenario_context(&[("admin.console", "z")]).await;

    let err = ctx.guard.check("admin.console", Some(&customer())).await.unwrap_err();
    assert_eq!(err, FlagwiseError::unavailable("z"));
    assert_eq!(err.label(), "feature_unavailable");
}

// ============================================================================
// CLI dispatch
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn cli_check_prints_key_and_result() {
    let ctx = scenario_context(&[]).await;
    let command = Command::Check {
        key: "beta".into(),
        principal: PrincipalArgs { user: Some("42".into()), roles: vec!["customer".into()] },
    };

    let output = cli::execute(&ctx, command).await.unwrap();
    assert_eq!(output, json!({ "flag_key": "beta", "enabled": true }));
}

#[tokio::test(flavor = "multi_thread")]
async fn cli_parse_then_execute() {
    let ctx = scenario_context(&[]).await;

    let cli = Cli::try_parse_from([
        "flagwise",
        "check-many",
        "x,z",
        "--user",
        "1",
        "--roles",
        "admin",
    ])
    .unwrap();
    let output = cli::execute(&ctx, cli.command).await.unwrap();
    assert_eq!(output, json!({ "x": true, "z": true }));

    let toggle = Cli::try_parse_from(["flagwise", "toggle", "x", "off"]).unwrap();
    let toggled = cli::execute(&ctx, toggle.command).await.unwrap();
    assert_eq!(toggled["is_enabled"], json!(false));
}

#[tokio::test(flavor = "multi_thread")]
async fn cli_guard_reports_decision() {
    let ctx = scenario_context(&[("admin.console", "z")]).await;

    let cli = Cli::try_parse_from([
        "flagwise",
        "guard",
        "admin.console",
        "--user",
        "1",
        "--roles",
        "admin,support",
    ])
    .unwrap();
    let output = cli::execute(&ctx, cli.command).await.unwrap();
    assert_eq!(output, json!({ "operation": "admin.console", "flag_key": "z", "allowed": true }));
}
