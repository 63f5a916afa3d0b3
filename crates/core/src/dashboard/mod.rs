//! Request-scoped dashboard loader

pub mod ports;
pub mod service;
