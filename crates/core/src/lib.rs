//! # Flagwise Core
//!
//! Pure targeting logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces for flag storage and management (traits)
//! - The targeting engine that decides whether a flag is on for a principal
//! - Batch evaluation and the access guard built on top of it
//!
//! ## Architecture Principles
//! - Only depends on `flagwise-domain`
//! - No database, HTTP, or platform code
//! - All storage access via traits
//! - Evaluation is read-only and holds no mutable state

pub mod batch;
pub mod guard;
pub mod targeting;

// Infrastructure ports
pub mod feature_flags_ports;

pub use batch::BatchEvaluator;
pub use feature_flags_ports::{FlagManagement, FlagStore};
pub use guard::{AccessGuard, GuardRegistry};
pub use targeting::{evaluate_flag, rollout_bucket, Evaluation, EvaluationReason, TargetingEngine};
