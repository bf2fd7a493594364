//! Seat membership flows: enter, stake, bet and redeem.
//!
//! Every flow that moves tokens is two-phase: the authority prepares an
//! unsigned transaction, the external signer signs it, and the authority
//! relays it. The orchestrator only sequences those calls; the table actor
//! decides what the view does with each outcome.

pub mod errors;
pub mod orchestrator;

pub use errors::{FlowError, FlowResult};
pub use orchestrator::{Entry, Orchestrator, Session};
