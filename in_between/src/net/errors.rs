//! Collaborator error types.

use thiserror::Error;

/// Errors from the authority, the signer or the event transport.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a usable response
    #[error("Request failed: {0}")]
    Request(String),

    /// The authority answered with an error body
    #[error("Rejected ({code}): {message}")]
    Rejected { code: i64, message: String },

    /// A payload could not be decoded
    #[error("Failed to decode payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// The user declined to sign
    #[error("Signing cancelled: {0}")]
    SigningCancelled(String),

    /// The event subscription failed or ended
    #[error("Subscription failed: {0}")]
    Subscription(String),

    /// An operation needed a seat credential the session does not hold
    #[error("Not seated at this board")]
    NotSeated,
}

impl ClientError {
    /// Message suitable for a transient notice.
    pub fn client_message(&self) -> String {
        match self {
            ClientError::Rejected { message, .. } => message.clone(),
            ClientError::SigningCancelled(_) => "You cancelled the transaction.".to_string(),
            ClientError::Decode(_) => "Unexpected response from server".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for collaborator calls
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_message_is_passed_through() {
        let err = ClientError::Rejected {
            code: 4001,
            message: "Board is full".to_string(),
        };
        assert_eq!(err.client_message(), "Board is full");
        assert!(err.to_string().contains("4001"));
    }

    #[test]
    fn test_signing_cancelled_message() {
        let err = ClientError::SigningCancelled("exit status 1".to_string());
        assert_eq!(err.client_message(), "You cancelled the transaction.");
    }

    #[test]
    fn test_decode_message_hides_details() {
        let err: ClientError = serde_json::from_str::<u8>("x").unwrap_err().into();
        assert_eq!(err.client_message(), "Unexpected response from server");
    }
}
