//! Macro for implementing Display and FromStr for wire-code enums
//!
//! Several domain enums travel as short lowercase codes (query strings, log
//! fields). This macro keeps the two directions of that mapping in one place.
//!
//! # Example
//!
//! ```rust
//! use rda_domain::impl_domain_code_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Outcome {
//!     Accepted,
//!     Rejected,
//! }
//!
//! impl_domain_code_conversions!(Outcome {
//!     Accepted => "accepted",
//!     Rejected => "rejected",
//! });
//!
//! assert_eq!(Outcome::Rejected.to_string(), "rejected");
//! assert_eq!("ACCEPTED".parse::<Outcome>().unwrap(), Outcome::Accepted);
//! ```

/// Implements Display and FromStr traits for code enums
///
/// This macro generates:
/// - Display trait: writes the variant's code
/// - FromStr trait: parses case-insensitive codes back to the variant
#[macro_export]
macro_rules! impl_domain_code_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
