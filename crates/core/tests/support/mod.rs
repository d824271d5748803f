//! Shared test helpers for `flagwise-core` integration tests.
//!
//! Lightweight in-memory stores so engine, batch and guard tests can focus on
//! behaviour instead of storage boilerplate.

#![allow(dead_code)]

pub mod stores;

use flagwise_domain::{Flag, NewFlag, Targeting};

/// Build a flag record directly, bypassing any store.
pub fn flag(key: &str, targeting: Targeting, is_enabled: bool) -> Flag {
    Flag::from_new(
        format!("flag-{key}"),
        NewFlag::new(key, key, targeting).with_enabled(is_enabled),
        1_700_000_000,
    )
}
