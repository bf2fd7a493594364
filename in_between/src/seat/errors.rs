//! Seat flow error types.

use thiserror::Error;

use crate::{game::rules::RuleError, net::errors::ClientError};

/// Errors from a stake, bet or redeem flow
#[derive(Debug, Error)]
pub enum FlowError {
    /// Rejected locally before any network call
    #[error(transparent)]
    Rule(#[from] RuleError),

    /// A collaborator failed
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl FlowError {
    /// Text for the transient notice shown to the player.
    pub fn client_message(&self) -> String {
        match self {
            FlowError::Rule(RuleError::InsufficientBalance { .. }) => "Chips not enough".to_string(),
            FlowError::Rule(err) => err.to_string(),
            FlowError::Client(err) => err.client_message(),
        }
    }

    /// True if the failure happened before anything reached the network.
    pub fn is_local(&self) -> bool {
        matches!(self, FlowError::Rule(_) | FlowError::Client(ClientError::NotSeated))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, FlowError::Client(ClientError::SigningCancelled(_)))
    }
}

/// Result type for seat flows
pub type FlowResult<T> = Result<T, FlowError>;
