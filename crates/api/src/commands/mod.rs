//! Commands exposed by the application layer

mod feature_flags;

pub use feature_flags::*;
