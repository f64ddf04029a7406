//! Status enum text conversions
//!
//! Status enums are stored in SQLite and sent to the UI as SCREAMING_SNAKE
//! strings. This macro keeps the `Display` and `FromStr` spellings in one
//! place so the database text and the serde representation cannot drift.
//!
//! # Example
//!
//! ```rust
//! use docsync_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum BatchStatus {
//!     Pending,
//!     Completed,
//! }
//!
//! impl_domain_status_conversions!(BatchStatus {
//!     Pending => "PENDING",
//!     Completed => "COMPLETED",
//! });
//!
//! assert_eq!(BatchStatus::Pending.to_string(), "PENDING");
//! assert_eq!("completed".parse::<BatchStatus>().unwrap(), BatchStatus::Completed);
//! ```

/// Generates `as_str`, `Display`, and case-insensitive `FromStr` from a
/// `Variant => "TEXT"` table.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical string form of this status
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
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}
