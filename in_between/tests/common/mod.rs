//! Shared fakes for the integration tests.
#![allow(dead_code)]

use std::{
    sync::{
        Arc, Mutex, OnceLock,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use in_between::{
    game::{Card, Chips},
    net::authority::{
        Authority, BetTicket, BoardInfo, BoardPage, BoardQuery, EnterResponse, EventStream,
        RedeemTicket, RelayReceipt, SeatRecord, Signer, StakeTicket, Subscriber,
    },
    net::errors::{ClientError, ClientResult},
    seat::Orchestrator,
    table::{Notice, SystemClock, TableActor, TableConfig, TableHandle, TableView},
};
use serde_json::json;
use tokio::{
    sync::{Notify, mpsc},
    task::JoinHandle,
};

pub const LIMIT: Chips = 1_000_000_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Enter,
    Hands(String),
    Stake { amount: Chips, seat_key: Option<String> },
    Bet { seat_key: String, amount: Chips },
    Redeem(String),
    Relay(String),
    Ping,
    Boards(BoardQuery),
}

/// Scriptable authority that records every call.
pub struct MockAuthority {
    pub entry: EnterResponse,
    pub hands: Mutex<Option<[Card; 2]>>,
    /// When set, hands fetches wait for a permit before answering.
    pub hands_gate: Option<Arc<Notify>>,
    /// When set, stake requests wait for a permit before answering.
    pub stake_gate: Option<Arc<Notify>>,
    pub fail_stake: AtomicBool,
    pub fail_bet: AtomicBool,
    pub bet_tx: Mutex<Option<String>>,
    pub calls: Mutex<Vec<Call>>,
}

impl MockAuthority {
    pub fn spectator() -> Self {
        Self::with_entry(EnterResponse {
            session_id: "session-1".to_string(),
            seat_key: None,
            seat: None,
            board: BoardInfo { limit: LIMIT },
        })
    }

    /// Entry for a player already seated as `me` with `chips` and a live hand.
    pub fn seated(chips: Chips) -> Self {
        Self::with_entry(EnterResponse {
            session_id: "session-1".to_string(),
            seat_key: Some("key-1".to_string()),
            seat: Some(SeatRecord {
                player_id: "me".to_string(),
                chips,
                hands: Some([Card(0), Card(0)]),
                status: None,
            }),
            board: BoardInfo { limit: LIMIT },
        })
    }

    pub fn with_entry(entry: EnterResponse) -> Self {
        Self {
            entry,
            hands: Mutex::new(Some([Card(2), Card(11)])),
            hands_gate: None,
            stake_gate: None,
            fail_stake: AtomicBool::new(false),
            fail_bet: AtomicBool::new(false),
            bet_tx: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than keep-alive pings, in order.
    pub fn requests(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| *call != Call::Ping)
            .collect()
    }

    pub fn pings(&self) -> usize {
        self.calls().iter().filter(|call| **call == Call::Ping).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Authority for MockAuthority {
    async fn enter(&self, _board_id: &str) -> ClientResult<EnterResponse> {
        self.record(Call::Enter);
        Ok(self.entry.clone())
    }

    async fn hands(&self, _board_id: &str, seat_key: &str) -> ClientResult<Option<[Card; 2]>> {
        self.record(Call::Hands(seat_key.to_string()));
        if let Some(gate) = &self.hands_gate {
            gate.notified().await;
        }
        Ok(*self.hands.lock().unwrap())
    }

    async fn stake(
        &self,
        _board_id: &str,
        amount: Chips,
        seat_key: Option<&str>,
    ) -> ClientResult<StakeTicket> {
        self.record(Call::Stake {
            amount,
            seat_key: seat_key.map(str::to_string),
        });
        if let Some(gate) = &self.stake_gate {
            gate.notified().await;
        }
        if self.fail_stake.load(Ordering::SeqCst) {
            return Err(ClientError::Rejected {
                code: 500,
                message: "Stake refused".to_string(),
            });
        }
        Ok(StakeTicket {
            tx: "stake-tx".to_string(),
            seat_key: "key-new".to_string(),
            player_id: "me-new".to_string(),
        })
    }

    async fn bet(&self, _board_id: &str, seat_key: &str, amount: Chips) -> ClientResult<BetTicket> {
        self.record(Call::Bet {
            seat_key: seat_key.to_string(),
            amount,
        });
        if self.fail_bet.load(Ordering::SeqCst) {
            return Err(ClientError::Rejected {
                code: 500,
                message: "Bet refused".to_string(),
            });
        }
        Ok(BetTicket {
            tx: self.bet_tx.lock().unwrap().clone(),
        })
    }

    async fn redeem(&self, _board_id: &str, seat_key: &str) -> ClientResult<RedeemTicket> {
        self.record(Call::Redeem(seat_key.to_string()));
        Ok(RedeemTicket {
            tx: "redeem-tx".to_string(),
        })
    }

    async fn relay(&self, signed_tx: &str) -> ClientResult<RelayReceipt> {
        self.record(Call::Relay(signed_tx.to_string()));
        Ok(RelayReceipt {
            signature: format!("sig:{signed_tx}"),
        })
    }

    async fn ping(&self) -> ClientResult<()> {
        self.record(Call::Ping);
        Ok(())
    }

    async fn boards(&self, query: &BoardQuery) -> ClientResult<BoardPage> {
        self.record(Call::Boards(*query));
        Ok(BoardPage::default())
    }
}

#[derive(Default)]
pub struct MockSigner {
    pub reject: AtomicBool,
}

#[async_trait]
impl Signer for MockSigner {
    async fn sign(&self, tx: &str, _provider: &str) -> ClientResult<String> {
        if self.reject.load(Ordering::SeqCst) {
            return Err(ClientError::SigningCancelled("user rejected".to_string()));
        }
        Ok(format!("signed:{tx}"))
    }
}

/// Subscriber handing out one pre-built stream.
pub struct MockSubscriber {
    pub stream: Mutex<Option<EventStream>>,
    pub topics: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl Subscriber for MockSubscriber {
    async fn subscribe(&self, topic: &str, consumer: &str) -> ClientResult<EventStream> {
        self.topics
            .lock()
            .unwrap()
            .push((topic.to_string(), consumer.to_string()));
        self.stream
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| ClientError::Subscription("already subscribed".to_string()))
    }
}

pub type EventSender = mpsc::UnboundedSender<ClientResult<Vec<u8>>>;

/// An event stream fed from a channel.
pub fn event_channel() -> (EventSender, EventStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    let stream = futures_util::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|item| (item, rx))
    });
    (tx, Box::pin(stream))
}

pub fn test_config() -> TableConfig {
    TableConfig {
        hands_retry_delay: Duration::from_millis(10),
        tick_interval: Duration::from_millis(50),
        ping_interval: Duration::from_millis(50),
        ..Default::default()
    }
}

pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Expiry shared by every turn in a test binary, so repeated snapshots
/// describe the same turn.
pub fn turn_expiry() -> i64 {
    static EXPIRY: OnceLock<i64> = OnceLock::new();
    *EXPIRY.get_or_init(|| now_ms() + 60_000)
}

/// Raw sync event. Each seat is `(player_id, chips, holds_hand)`.
pub fn sync(seats: &[(&str, Chips, bool)], turn: Option<&str>) -> Vec<u8> {
    sync_expiring(seats, turn, turn_expiry())
}

/// Raw sync event whose turn ends at `expire_at`.
pub fn sync_expiring(seats: &[(&str, Chips, bool)], turn: Option<&str>, expire_at: i64) -> Vec<u8> {
    let seats: Vec<_> = seats
        .iter()
        .map(|(id, chips, live)| {
            if *live {
                json!({"playerId": id, "chips": chips.to_string(), "hands": [0, 0]})
            } else {
                json!({"playerId": id, "chips": chips.to_string()})
            }
        })
        .collect();
    let mut event = json!({
        "code": 1,
        "seats": seats,
        "deckCount": 40,
        "pot": (10 * LIMIT).to_string(),
    });
    if let Some(turn) = turn {
        event["turn"] = json!(turn);
        event["turnExpireAt"] = json!(expire_at);
    }
    serde_json::to_vec(&event).unwrap()
}

pub fn wager(player_id: &str, bet: Chips, hands: [u8; 2]) -> Vec<u8> {
    serde_json::to_vec(&json!({"code": 2, "playerId": player_id, "bet": bet.to_string(), "hands": hands}))
        .unwrap()
}

/// A running table wired to the fakes.
pub struct Harness {
    pub handle: TableHandle,
    pub notices: mpsc::Receiver<Notice>,
    pub events: EventSender,
    pub authority: Arc<MockAuthority>,
    pub signer: Arc<MockSigner>,
    pub task: JoinHandle<ClientResult<()>>,
}

impl Harness {
    pub async fn start(authority: MockAuthority) -> Self {
        let authority = Arc::new(authority);
        let signer = Arc::new(MockSigner::default());
        let orchestrator = Arc::new(Orchestrator::new(
            "board-1",
            "wallet",
            authority.clone(),
            signer.clone(),
        ));
        let entry = orchestrator.enter().await.unwrap();
        let (actor, handle, notices) =
            TableActor::new(orchestrator, entry, Arc::new(SystemClock), test_config());
        let (events, stream) = event_channel();
        let task = tokio::spawn(actor.run(stream));

        Self {
            handle,
            notices,
            events,
            authority,
            signer,
            task,
        }
    }

    pub fn push(&self, raw: Vec<u8>) {
        self.events.send(Ok(raw)).unwrap();
    }

    pub async fn wait_for(&self, pred: impl FnMut(&TableView) -> bool) -> TableView {
        let mut view = self.handle.subscribe();
        tokio::time::timeout(Duration::from_secs(5), view.wait_for(pred))
            .await
            .expect("timed out waiting for view")
            .expect("table closed")
            .clone()
    }

    pub async fn next_notice(&mut self) -> Notice {
        tokio::time::timeout(Duration::from_secs(5), self.notices.recv())
            .await
            .expect("timed out waiting for notice")
            .expect("notice channel closed")
    }
}
