//! Internal session store adapters
//!
//! Both stores implement [`SessionProvider`](rda_core::SessionProvider) for
//! login bridging and [`SessionDirectory`](rda_core::SessionDirectory) for
//! request-time lookup and logout. The store is selected by URL:
//! `memory://` picks [`InMemorySessionStore`], anything else the HTTP admin
//! API.

mod http_store;
mod memory;

pub use http_store::SessionStoreClient;
pub use memory::InMemorySessionStore;
