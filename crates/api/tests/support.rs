//! Shared fixtures for application-layer integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use flagwise_domain::{Config, FlagDefinition};
use flagwise_infra::InMemoryFlagRepository;
use flagwise_lib::{create_flag, AppContext};
use serde_json::json;

/// Flags from the reference scenarios, all enabled:
/// `x` global, `y` 50% rollout, `z` admins only, `beta` users 42 and 7.
pub fn scenario_definitions() -> Vec<FlagDefinition> {
    [
        json!({ "key": "x", "scope": "GLOBAL", "is_enabled": true }),
        json!({ "key": "y", "scope": "PERCENTAGE", "rollout_percentage": 50, "is_enabled": true }),
        json!({ "key": "z", "scope": "ROLE", "rules": { "roles": ["admin"] }, "is_enabled": true }),
        json!({
            "key": "beta",
            "display_name": "Beta dashboard",
            "scope": "USER",
            "rules": { "user_ids": ["42", "7"] },
            "is_enabled": true
        }),
    ]
    .into_iter()
    .map(|value| serde_json::from_value(value).expect("scenario definition deserializes"))
    .collect()
}

/// In-memory context seeded with [`scenario_definitions`].
pub async fn scenario_context(guards: &[(&str, &str)]) -> AppContext {
    let config = Config {
        guards: guards
            .iter()
            .map(|(operation, key)| ((*operation).to_string(), (*key).to_string()))
            .collect::<BTreeMap<_, _>>(),
        ..Config::default()
    };
    let ctx = AppContext::with_store(config, Arc::new(InMemoryFlagRepository::new()))
        .expect("context builds");

    for definition in scenario_definitions() {
        create_flag(&ctx, definition).await.expect("scenario flag created");
    }
    ctx
}
