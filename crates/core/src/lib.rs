//! # EVE RDA Core
//!
//! Login, token lifecycle and dashboard logic - no infrastructure
//! dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits)
//! - The authorization initiator and callback state machine
//! - Token refresh and the dashboard loader
//!
//! ## Architecture Principles
//! - Only depends on `rda-common` (foundation tier) and `rda-domain`
//! - No HTTP, cache or storage code
//! - All external dependencies via traits

pub mod auth;
pub mod dashboard;
pub mod names;

// Re-export specific items to avoid ambiguity
pub use auth::callback::{CallbackOrchestrator, CallbackParams, LoginError, LoginOutcome, LoginSuccess};
pub use auth::initiator::{AuthorizationInitiator, AuthorizationRedirect};
pub use auth::ports::{ReplayGuard, SessionDirectory, SessionProvider, UpstreamAuth};
pub use auth::refresh::{RefreshedAccess, TokenRefreshService};
pub use dashboard::ports::CharacterData;
pub use dashboard::service::DashboardService;
pub use names::ports::{NameDirectory, NameLookup};
