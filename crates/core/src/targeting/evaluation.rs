//! Evaluation outcomes

use serde::Serialize;

/// Why an evaluation came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvaluationReason {
    /// No flag with the requested key exists
    FlagNotFound,
    /// The flag's kill switch is off
    KillSwitch,
    /// Global scope, on for everybody
    Global,
    /// Scoped flag evaluated without a principal
    PrincipalRequired,
    UserListed,
    UserNotListed,
    RoleMatched,
    NoRoleMatched,
    /// Principal's bucket is inside the rollout
    RolloutIncluded { bucket: u8 },
    /// Principal's bucket is outside the rollout
    RolloutExcluded { bucket: u8 },
}

/// Result of evaluating one flag for one (optional) principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub enabled: bool,
    pub reason: EvaluationReason,
}

impl Evaluation {
    pub const fn enabled(reason: EvaluationReason) -> Self {
        Self { enabled: true, reason }
    }

    pub const fn disabled(reason: EvaluationReason) -> Self {
        Self { enabled: false, reason }
    }
}
