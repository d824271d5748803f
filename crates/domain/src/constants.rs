//! Domain constants
//!
//! Centralized location for limits and defaults shared by every crate.

// Flag key limits
pub const MAX_FLAG_KEY_LENGTH: usize = 128;
pub const MAX_DISPLAY_NAME_LENGTH: usize = 200;

// Rollout
pub const MAX_ROLLOUT_PERCENTAGE: u8 = 100;
pub const ROLLOUT_BUCKETS: u64 = 100;
pub const ROLLOUT_HASH_SEPARATOR: &str = ":";

// Batch evaluation fan-out cap per call
pub const DEFAULT_MAX_BATCH_KEYS: usize = 20;

// Read-through cache defaults
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 30;
pub const DEFAULT_CACHE_MAX_CAPACITY: u64 = 10_000;

// Storage defaults
pub const DEFAULT_DB_PATH: &str = "flagwise.db";
pub const DEFAULT_DB_POOL_SIZE: u32 = 8;
