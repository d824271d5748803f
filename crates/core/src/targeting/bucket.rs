//! Stable rollout buckets
//!
//! A principal's bucket for a flag is `blake3("{principal_id}:{flag_key}")`,
//! first eight bytes read little-endian, modulo 100. No salt: the same pair
//! lands in the same bucket in every process, so raising a rollout percentage
//! only ever adds principals.

use flagwise_domain::constants::{ROLLOUT_BUCKETS, ROLLOUT_HASH_SEPARATOR};
use flagwise_domain::RolloutPercentage;

/// Bucket in `[0, 100)` for a principal and flag key.
pub fn rollout_bucket(principal_id: &str, flag_key: &str) -> u8 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(principal_id.as_bytes());
    hasher.update(ROLLOUT_HASH_SEPARATOR.as_bytes());
    hasher.update(flag_key.as_bytes());
    let digest = hasher.finalize();

    let mut prefix = [0_u8; 8];
    prefix.copy_from_slice(&digest.as_bytes()[..8]);

    // Always < 100
    (u64::from_le_bytes(prefix) % ROLLOUT_BUCKETS) as u8
}

/// Whether `bucket` falls inside `percentage`.
pub fn in_rollout(bucket: u8, percentage: RolloutPercentage) -> bool {
    bucket < percentage.value()
}
