//! Command entry points - UI shell to engine bridge
//!
//! Each command takes the shared [`AppContext`](crate::AppContext), returns
//! `Result<T, String>`, and logs its outcome.

mod documents;
mod health;
mod sync;

pub use documents::*;
pub use health::*;
pub use sync::*;
