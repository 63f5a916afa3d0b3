//! Entity name resolution ports

pub mod ports;
