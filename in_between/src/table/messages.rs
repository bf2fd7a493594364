//! Table actor message and view types.

use std::fmt;

use crate::{
    game::{
        entities::{Card, Chips, Hands, PlayerId, Turn, format_amount},
        layout::Point,
        rules::{ActionSet, BetKind},
    },
    seat::FlowError,
};

/// Commands the player can send to a TableActor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableCommand {
    /// Stake chips into a seat (or top up the held one)
    Stake { amount: Chips },

    /// Wager an explicit amount; zero folds
    Bet { amount: Chips },

    /// Wager an amount typed into the custom input
    Custom { input: String },

    /// Pick one of the currently offered actions
    Act(BetKind),

    /// Leave the seat and withdraw its chips
    Redeem,
}

/// Transient, non-blocking messages for the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Refused locally; nothing was sent
    Rejected(String),

    /// A request to the authority failed
    Failed(String),

    /// The player declined to sign
    Cancelled,

    /// Stake accepted by the authority, awaiting confirmation
    StakeRequested { amount: Chips },

    /// Bet accepted by the authority
    BetPlaced { amount: Chips },

    /// Seat released
    Redeemed,

    /// A signed transaction was relayed
    Sent { signature: String },
}

impl Notice {
    /// Notice for a failed flow.
    pub fn from_error(error: &FlowError) -> Self {
        if error.is_local() {
            Notice::Rejected(error.client_message())
        } else if error.is_cancelled() {
            Notice::Cancelled
        } else {
            Notice::Failed(error.client_message())
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Rejected(msg) | Notice::Failed(msg) => write!(f, "{msg}"),
            Notice::Cancelled => write!(f, "You cancelled the transaction."),
            Notice::StakeRequested { amount } => {
                write!(f, "Staking {} chips, waiting for confirmation", format_amount(*amount))
            }
            Notice::BetPlaced { amount } if *amount == 0 => write!(f, "Folded"),
            Notice::BetPlaced { amount } => write!(f, "Bet {} chips", format_amount(*amount)),
            Notice::Redeemed => write!(f, "Left the table"),
            Notice::Sent { signature } => write!(f, "Transaction sent: {signature}"),
        }
    }
}

/// One seat as presented to the player.
#[derive(Debug, Clone, PartialEq)]
pub struct SeatSummary {
    pub player_id: PlayerId,
    pub is_local: bool,
    pub chips: Chips,
    /// Anchor on the table; `None` when the table has no room left.
    pub position: Option<Point>,
    pub bet: Option<Chips>,
    pub revealed: Option<Hands>,
    /// Seconds left if this seat is on turn.
    pub countdown: Option<u64>,
}

/// Everything the player sees, derived from the mirror after each event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableView {
    pub board_id: String,
    pub limit: Chips,
    pub pot: Chips,
    /// Deck from bottom to top; drawn cards show their face.
    pub deck: Vec<Option<Card>>,
    /// Seats in layout order.
    pub seats: Vec<SeatSummary>,
    pub turn: Option<Turn>,
    /// Whether the join affordance is shown.
    pub joinable: bool,
    /// The local player's private ranks.
    pub hands: Option<Hands>,
    /// The local player's balance, when seated.
    pub balance: Option<Chips>,
    /// Actions offered on the local player's turn.
    pub actions: Option<ActionSet>,
    /// Seconds left in the local player's turn.
    pub countdown: Option<u64>,
}

impl TableView {
    pub fn seat(&self, player_id: &str) -> Option<&SeatSummary> {
        self.seats.iter().find(|seat| seat.player_id == player_id)
    }

    pub fn seat_ids(&self) -> Vec<&str> {
        self.seats.iter().map(|seat| seat.player_id.as_str()).collect()
    }
}
