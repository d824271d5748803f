//! Targeting: decide whether a flag is on for a principal
//!
//! The decision order is fixed: missing flag, kill switch, global scope,
//! missing principal, then the scope-specific rule.

pub mod bucket;
pub mod engine;
pub mod evaluation;

pub use bucket::rollout_bucket;
pub use engine::{evaluate_flag, TargetingEngine};
pub use evaluation::{Evaluation, EvaluationReason};
