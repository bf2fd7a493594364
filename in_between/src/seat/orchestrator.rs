use std::sync::Arc;

use super::errors::FlowResult;
use crate::{
    game::{
        entities::{Card, Chips, PlayerId},
        rules::{RuleError, validate_wager},
    },
    net::{
        authority::{
            Authority, BetTicket, RedeemTicket, RelayReceipt, SeatRecord, Signer, StakeTicket,
        },
        errors::ClientResult,
    },
};

/// Identity of one view of a board. Lives as long as the view.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Session {
    pub session_id: String,
    pub board_id: String,
    /// Credential for the player's seat, if seated.
    pub seat_key: Option<String>,
    pub player_id: Option<PlayerId>,
}

impl Session {
    pub fn is_local(&self, player_id: &str) -> bool {
        self.player_id.as_deref() == Some(player_id)
    }
}

/// Everything the authority hands back on enter.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    pub session: Session,
    pub limit: Chips,
    /// The player's existing seat, when re-entering a board they sit at.
    pub seat: Option<SeatRecord>,
}

/// Sequences the request, sign and relay calls of the seat flows.
pub struct Orchestrator {
    board_id: String,
    provider: String,
    authority: Arc<dyn Authority>,
    signer: Arc<dyn Signer>,
}

impl Orchestrator {
    /// Create an orchestrator for one board
    ///
    /// # Arguments
    ///
    /// * `board_id` - Board to act on
    /// * `provider` - Wallet provider handle passed to the signer
    /// * `authority` - Game server
    /// * `signer` - Wallet signer
    pub fn new(
        board_id: impl Into<String>,
        provider: impl Into<String>,
        authority: Arc<dyn Authority>,
        signer: Arc<dyn Signer>,
    ) -> Self {
        Self {
            board_id: board_id.into(),
            provider: provider.into(),
            authority,
            signer,
        }
    }

    pub fn board_id(&self) -> &str {
        &self.board_id
    }

    /// Open a session on the board.
    ///
    /// A seat credential is only kept when the authority also returns the
    /// seat it belongs to.
    pub async fn enter(&self) -> ClientResult<Entry> {
        let response = self.authority.enter(&self.board_id).await?;
        let (seat_key, seat) = match (response.seat_key, response.seat) {
            (Some(key), Some(seat)) => (Some(key), Some(seat)),
            _ => (None, None),
        };
        log::info!(
            "Entered board {} (session {}, seated: {})",
            self.board_id,
            response.session_id,
            seat.is_some()
        );

        Ok(Entry {
            session: Session {
                session_id: response.session_id,
                board_id: self.board_id.clone(),
                seat_key,
                player_id: seat.as_ref().map(|seat| seat.player_id.clone()),
            },
            limit: response.board.limit,
            seat,
        })
    }

    /// Keep the board session alive.
    pub async fn ping(&self) -> ClientResult<()> {
        self.authority.ping().await
    }

    /// Fetch the private hole cards behind a seat credential.
    pub async fn hands(&self, seat_key: &str) -> ClientResult<Option<[Card; 2]>> {
        self.authority.hands(&self.board_id, seat_key).await
    }

    /// Request a stake. Passing the held credential tops up that seat.
    pub async fn request_stake(&self, amount: Chips, seat_key: Option<&str>) -> FlowResult<StakeTicket> {
        if amount == 0 {
            return Err(RuleError::InvalidAmount("0".to_string()).into());
        }
        let ticket = self.authority.stake(&self.board_id, amount, seat_key).await?;
        log::info!("Stake of {} requested on board {}", amount, self.board_id);
        Ok(ticket)
    }

    /// Request a wager. The balance check runs before anything is sent.
    pub async fn request_bet(&self, seat_key: &str, amount: Chips, balance: Chips) -> FlowResult<BetTicket> {
        validate_wager(amount, balance)?;
        let ticket = self.authority.bet(&self.board_id, seat_key, amount).await?;
        log::info!("Bet of {} accepted on board {}", amount, self.board_id);
        Ok(ticket)
    }

    /// Request to leave the seat.
    pub async fn request_redeem(&self, seat_key: &str) -> FlowResult<RedeemTicket> {
        let ticket = self.authority.redeem(&self.board_id, seat_key).await?;
        log::info!("Redeem requested on board {}", self.board_id);
        Ok(ticket)
    }

    /// Sign `tx` and relay it.
    pub async fn sign_and_relay(&self, tx: &str) -> FlowResult<RelayReceipt> {
        let signed = self.signer.sign(tx, &self.provider).await?;
        let receipt = self.authority.relay(&signed).await?;
        log::info!("Transaction sent: {}", receipt.signature);
        Ok(receipt)
    }
}
