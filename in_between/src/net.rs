//! Wire-level types and the collaborators the table client talks to.
//!
//! The authority, the signer and the event transport are external; this
//! module only fixes their shapes so the engine can be driven by any
//! implementation.

/// Collaborator traits and their request/response payloads.
pub mod authority;

/// Errors raised by collaborators.
pub mod errors;

/// Events broadcast on a board's state topic.
pub mod messages;
