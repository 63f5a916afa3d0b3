//! Shared outbound HTTP client

pub(crate) mod client;

pub use client::{HttpClient, DEFAULT_USER_AGENT};
