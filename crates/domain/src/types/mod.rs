//! Domain types and models

pub mod auth;
pub mod character;
pub mod dashboard;
pub mod names;

pub use auth::*;
pub use character::*;
pub use dashboard::*;
pub use names::*;
