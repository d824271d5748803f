//! Macro for implementing Display and FromStr for unit-variant domain enums
//!
//! Flag scopes, storage backends and log formats all travel as plain strings
//! (config files, SQLite columns, CLI arguments). This macro keeps their
//! string forms in one table per enum.
//!
//! # Example
//!
//! ```rust
//! use flagwise_domain::impl_domain_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Environment {
//!     Staging,
//!     Production,
//! }
//!
//! impl_domain_enum_conversions!(Environment {
//!     Staging => "staging",
//!     Production => "production",
//! });
//!
//! assert_eq!("PRODUCTION".parse::<Environment>(), Ok(Environment::Production));
//! ```

/// Implements Display and FromStr traits for unit-variant enums
///
/// This macro generates:
/// - Display trait: writes the canonical string of each variant
/// - FromStr trait: parses ASCII case-insensitively into a variant
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their canonical string
///   representations
#[macro_export]
macro_rules! impl_domain_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical string form of the variant.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = ::std::string::String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                let trimmed = s.trim();
                $(
                    if trimmed.eq_ignore_ascii_case($str) {
                        return ::std::result::Result::Ok(Self::$variant);
                    }
                )+
                ::std::result::Result::Err(::std::format!(
                    "Invalid {}: {}",
                    ::std::stringify!($enum_name),
                    s
                ))
            }
        }
    };
}
