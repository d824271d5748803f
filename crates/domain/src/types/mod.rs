//! Domain types and models
//!
//! Flags, their targeting rules, and the principals they are evaluated
//! against.

pub mod definition;
pub mod flag;
pub mod principal;

pub use definition::{FlagDefinition, RuleSet};
pub use flag::{Flag, FlagPatch, FlagScope, NewFlag, RolloutPercentage, Targeting};
pub use principal::Principal;
