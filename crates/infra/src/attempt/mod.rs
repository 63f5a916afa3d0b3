//! Login attempt persistence between the redirect and the callback
//!
//! The attempt itself travels in a signed cookie ([`AttemptSealer`]); the
//! process-wide [`ReplayLedger`] makes each attempt state usable once.

mod ledger;
mod sealer;

pub use ledger::ReplayLedger;
pub use sealer::AttemptSealer;
