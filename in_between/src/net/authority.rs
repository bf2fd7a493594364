//! Trait definitions for the external collaborators.
//!
//! The engine only ever talks to these traits, so tests drive it with
//! in-memory implementations and the binary plugs in HTTP, websocket and
//! signer-process implementations.

use async_trait::async_trait;
use futures_util::Stream;
use serde::Deserialize;
use std::pin::Pin;

use super::errors::ClientResult;
use crate::game::entities::{Card, Chips, PlayerId, deserialize_amount};

/// Ordered raw messages from one subscription.
pub type EventStream = Pin<Box<dyn Stream<Item = ClientResult<Vec<u8>>> + Send>>;

/// Settlement status of a seat on the authority side.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    /// Stake transaction not yet confirmed
    Unready,
    /// Stake confirmed
    Ready,
    /// In a round
    Playing,
    /// Round settling
    Settling,
}

/// The caller's existing seat, as returned on enter.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeatRecord {
    pub player_id: PlayerId,
    #[serde(deserialize_with = "deserialize_amount")]
    pub chips: Chips,
    #[serde(default)]
    pub hands: Option<[Card; 2]>,
    #[serde(default)]
    pub status: Option<SeatStatus>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct BoardInfo {
    #[serde(deserialize_with = "deserialize_amount")]
    pub limit: Chips,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnterResponse {
    pub session_id: String,
    #[serde(default)]
    pub seat_key: Option<String>,
    #[serde(default)]
    pub seat: Option<SeatRecord>,
    pub board: BoardInfo,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct HandsResponse {
    #[serde(default)]
    pub hands: Option<[Card; 2]>,
}

/// Unsigned stake transaction plus the credential for the new seat.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StakeTicket {
    pub tx: String,
    pub seat_key: String,
    pub player_id: PlayerId,
}

/// Bets settle off-chain unless the authority hands back a transaction.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct BetTicket {
    #[serde(default)]
    pub tx: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct RedeemTicket {
    pub tx: String,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct RelayReceipt {
    pub signature: String,
}

/// Boards per page of the lobby listing.
pub const BOARDS_PER_PAGE: u64 = 20;

/// One open board in the lobby listing.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoardSummary {
    pub id: String,
    #[serde(default)]
    pub address: Option<String>,
    /// Chips in the board's pool
    #[serde(deserialize_with = "deserialize_amount")]
    pub chips: Chips,
    #[serde(deserialize_with = "deserialize_amount")]
    pub limit: Chips,
    pub players: u32,
    #[serde(default)]
    pub created_at: Option<i64>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct BoardPage {
    #[serde(default)]
    pub boards: Vec<BoardSummary>,
    #[serde(default)]
    pub total: u64,
}

impl BoardPage {
    pub fn pages(&self) -> u64 {
        self.total.div_ceil(BOARDS_PER_PAGE)
    }
}

/// Lobby listing filter. Zero leaves a filter off.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BoardQuery {
    /// 1-based page number
    pub page: u32,
    pub min_players: u32,
    pub limit: Chips,
}

impl Default for BoardQuery {
    fn default() -> Self {
        Self {
            page: 1,
            min_players: 0,
            limit: 0,
        }
    }
}

/// The authoritative game server.
#[async_trait]
pub trait Authority: Send + Sync {
    /// Open a session on a board
    async fn enter(&self, board_id: &str) -> ClientResult<EnterResponse>;

    /// Fetch the private hole cards for a seat
    async fn hands(&self, board_id: &str, seat_key: &str) -> ClientResult<Option<[Card; 2]>>;

    /// Request a stake (or top-up when `seat_key` is held)
    async fn stake(
        &self,
        board_id: &str,
        amount: Chips,
        seat_key: Option<&str>,
    ) -> ClientResult<StakeTicket>;

    /// Submit a wager; zero folds
    async fn bet(&self, board_id: &str, seat_key: &str, amount: Chips) -> ClientResult<BetTicket>;

    /// Request to leave the seat and withdraw its chips
    async fn redeem(&self, board_id: &str, seat_key: &str) -> ClientResult<RedeemTicket>;

    /// Relay a signed transaction, returning its signature
    async fn relay(&self, signed_tx: &str) -> ClientResult<RelayReceipt>;

    /// Keep the session alive
    async fn ping(&self) -> ClientResult<()>;

    /// List open boards
    async fn boards(&self, query: &BoardQuery) -> ClientResult<BoardPage>;
}

/// Wallet-side transaction signing.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Sign `tx` with the wallet behind `provider`. Rejection means the user
    /// cancelled.
    async fn sign(&self, tx: &str, provider: &str) -> ClientResult<String>;
}

/// Pub/sub transport delivering a board's events in order.
#[async_trait]
pub trait Subscriber: Send + Sync {
    async fn subscribe(&self, topic: &str, consumer: &str) -> ClientResult<EventStream>;
}
