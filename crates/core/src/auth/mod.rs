//! Login handshake and token lifecycle

pub mod callback;
pub mod initiator;
pub mod ports;
pub mod refresh;
