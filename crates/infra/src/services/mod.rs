//! Service layer implementations.
//!
//! Services add cross-cutting behaviour such as caching on top of
//! repositories.

pub mod feature_flag_service;

pub use feature_flag_service::CachedFlagService;
