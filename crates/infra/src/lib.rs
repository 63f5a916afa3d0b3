//! # RDA Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - EVE SSO and ESI HTTP adapters
//! - Session store adapters (HTTP admin API, in-memory)
//! - The batched, cached name resolver
//! - Attempt sealing and the replay ledger
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `rda-core`
//! - Depends on `rda-common`, `rda-domain` and `rda-core`
//! - Contains all "impure" code (network I/O, process-wide caches)

pub mod attempt;
pub mod config;
pub mod errors;
pub mod esi;
pub mod http;
pub mod names;
pub mod session;
pub mod sso;

// Re-export commonly used items
pub use attempt::{AttemptSealer, ReplayLedger};
pub use errors::InfraError;
pub use esi::EsiClient;
pub use http::HttpClient;
pub use names::{NameResolver, NameResolverConfig};
pub use session::{InMemorySessionStore, SessionStoreClient};
pub use sso::EveSsoClient;
