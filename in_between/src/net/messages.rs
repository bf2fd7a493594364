use serde::Deserialize;
use std::fmt;

use super::errors::ClientResult;
use crate::game::entities::{Card, Chips, PlayerId, Turn, deserialize_amount};

/// Discriminants carried in the `code` field of every event.
pub const CODE_ERROR: i64 = 0;
pub const CODE_SYNC: i64 = 1;
pub const CODE_BET: i64 = 2;
pub const CODE_OPEN: i64 = 3;

/// Topic a board's events are published on.
pub fn state_topic(board_id: &str) -> String {
    format!("state_{board_id}")
}

/// A seat as it appears in a snapshot.
///
/// Only the viewer's own seat ever carries `hands`, and even then only as a
/// marker that a hand is live; the ranks themselves come from the private
/// hands fetch.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeatState {
    pub player_id: PlayerId,
    #[serde(deserialize_with = "deserialize_amount")]
    pub chips: Chips,
    #[serde(default)]
    pub hands: Option<[Card; 2]>,
}

impl SeatState {
    pub fn holds_hand(&self) -> bool {
        self.hands.is_some()
    }
}

/// Full authoritative board state.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub seats: Vec<SeatState>,
    pub deck_count: usize,
    #[serde(deserialize_with = "deserialize_amount")]
    pub pot: Chips,
    #[serde(default)]
    pub turn: Option<PlayerId>,
    #[serde(default)]
    pub turn_expire_at: Option<i64>,
}

impl Snapshot {
    /// The active turn, if any. A turn without an expiry is treated as
    /// already expired.
    pub fn active_turn(&self) -> Option<Turn> {
        self.turn.as_ref().map(|player_id| Turn {
            player_id: player_id.clone(),
            expire_at: self.turn_expire_at.unwrap_or(0),
        })
    }
}

/// A seat placed (or declined) a wager.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WagerDelta {
    pub player_id: PlayerId,
    #[serde(deserialize_with = "deserialize_amount")]
    pub bet: Chips,
    #[serde(default)]
    pub hands: Option<[Card; 2]>,
}

/// The round's card was drawn.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RevealDelta {
    #[serde(default)]
    pub player_id: Option<PlayerId>,
    pub card: Card,
}

/// One event from a board's state topic.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GameEvent {
    Snapshot(Snapshot),
    Wager(WagerDelta),
    Reveal(RevealDelta),
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Snapshot(snapshot) => write!(
                f,
                "snapshot: {} seats, {} cards, pot {}",
                snapshot.seats.len(),
                snapshot.deck_count,
                snapshot.pot
            ),
            Self::Wager(delta) => write!(f, "{} wagered {}", delta.player_id, delta.bet),
            Self::Reveal(delta) => write!(f, "revealed {}", delta.card),
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    code: i64,
}

impl GameEvent {
    /// Decode one raw message.
    ///
    /// Returns `Ok(None)` for error events and for discriminants this client
    /// does not know, so newer servers can add event kinds freely.
    pub fn decode(bytes: &[u8]) -> ClientResult<Option<Self>> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        let Envelope { code } = Envelope::deserialize(&value)?;
        let event = match code {
            CODE_SYNC => Self::Snapshot(Snapshot::deserialize(&value)?),
            CODE_BET => Self::Wager(WagerDelta::deserialize(&value)?),
            CODE_OPEN => Self::Reveal(RevealDelta::deserialize(&value)?),
            _ => return Ok(None),
        };
        Ok(Some(event))
    }
}
