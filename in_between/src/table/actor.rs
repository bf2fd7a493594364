//! Table actor: owns the reconciler and serializes everything that touches it.
//!
//! Board events, player commands and the results of spawned work all arrive
//! on channels and are handled one at a time, in arrival order. Network and
//! signing calls run in their own tasks and report back through the
//! internal channel, so a slow authority never holds up the event stream.

use std::{sync::Arc, time::Duration};

use futures_util::StreamExt;
use tokio::{
    sync::{mpsc, watch},
    time::{Instant, interval, interval_at},
};

use super::{
    config::TableConfig,
    countdown::Clock,
    messages::{Notice, TableCommand, TableView},
    reconcile::{Effect, HandsStamp, PendingBet, Reconciler},
};
use crate::{
    game::{
        entities::{Card, Chips, PlayerId},
        rules::{BetAmount, BetKind, parse_amount},
    },
    net::{
        authority::{EventStream, RelayReceipt, Subscriber},
        errors::{ClientError, ClientResult},
        messages::{GameEvent, state_topic},
    },
    seat::{Entry, FlowError, Orchestrator},
};

/// Capacity of the channel spawned tasks report back on
const INTERNAL_CAPACITY: usize = 100;

/// Handle for driving a running table
#[derive(Clone)]
pub struct TableHandle {
    sender: mpsc::Sender<TableCommand>,
    view: watch::Receiver<TableView>,
}

impl TableHandle {
    /// Send a command to the table
    pub async fn send(&self, command: TableCommand) -> Result<(), String> {
        self.sender
            .send(command)
            .await
            .map_err(|_| "Table is closed".to_string())
    }

    /// Latest view of the table
    pub fn view(&self) -> TableView {
        self.view.borrow().clone()
    }

    /// Follow view updates
    pub fn subscribe(&self) -> watch::Receiver<TableView> {
        self.view.clone()
    }
}

/// Results of spawned work, fed back into the actor.
#[derive(Debug)]
enum Internal {
    Hands {
        stamp: HandsStamp,
        result: ClientResult<Option<[Card; 2]>>,
    },
    RetryActions {
        turn: u64,
        attempt: u8,
    },
    TurnExpired {
        turn: u64,
    },
    Staked {
        seat_key: String,
        player_id: PlayerId,
        amount: Chips,
    },
    StakeFailed(FlowError),
    BetFailed {
        turn: Option<u64>,
        error: FlowError,
    },
    Redeemed,
    Notice(Notice),
}

/// Actor mirroring one board for one player
pub struct TableActor {
    reconciler: Reconciler,
    orchestrator: Arc<Orchestrator>,
    clock: Arc<dyn Clock>,
    config: TableConfig,

    /// Player commands
    inbox: mpsc::Receiver<TableCommand>,

    /// Results of spawned work
    internal_tx: mpsc::Sender<Internal>,
    internal_rx: mpsc::Receiver<Internal>,

    notices: mpsc::Sender<Notice>,
    view: watch::Sender<TableView>,

    /// Effects produced before the runtime loop started
    pending: Vec<Effect>,
}

impl TableActor {
    /// Create a new table actor
    ///
    /// # Arguments
    ///
    /// * `orchestrator` - Flows against the board's authority
    /// * `entry` - Result of entering the board
    /// * `clock` - Wall clock for countdowns
    /// * `config` - Table configuration
    ///
    /// # Returns
    ///
    /// * `(TableActor, TableHandle, Receiver<Notice>)` - Actor, handle for
    ///   sending commands, and the player notice feed
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        entry: Entry,
        clock: Arc<dyn Clock>,
        config: TableConfig,
    ) -> (Self, TableHandle, mpsc::Receiver<Notice>) {
        let (sender, inbox) = mpsc::channel(config.command_capacity);
        let (internal_tx, internal_rx) = mpsc::channel(INTERNAL_CAPACITY);
        let (notices, notice_rx) = mpsc::channel(config.notice_capacity);

        let mut reconciler =
            Reconciler::new(entry.session, entry.limit, Arc::clone(&clock), config.clone());
        let pending = match &entry.seat {
            Some(seat) => reconciler.enter_seat(seat),
            None => Vec::new(),
        };
        let (view, view_rx) = watch::channel(reconciler.view());

        let actor = Self {
            reconciler,
            orchestrator,
            clock,
            config,
            inbox,
            internal_tx,
            internal_rx,
            notices,
            view,
            pending,
        };
        let handle = TableHandle {
            sender,
            view: view_rx,
        };

        (actor, handle, notice_rx)
    }

    /// Run the actor until every handle is dropped or the event stream fails.
    pub async fn run(mut self, mut events: EventStream) -> ClientResult<()> {
        let board_id = self.orchestrator.board_id().to_string();
        log::info!("Board {board_id} view starting");

        let pending = std::mem::take(&mut self.pending);
        self.execute(pending);
        self.publish();

        // Countdowns tick on their own; this only refreshes the published view.
        let mut refresh = interval(self.config.tick_interval);
        let ping_every = self.config.ping_interval;
        let mut keep_alive = interval_at(Instant::now() + ping_every, ping_every);

        let result = loop {
            tokio::select! {
                event = events.next() => match event {
                    Some(Ok(raw)) => self.handle_event(&raw),
                    Some(Err(e)) => break Err(e),
                    None => break Err(ClientError::Subscription("event stream ended".to_string())),
                },

                Some(internal) = self.internal_rx.recv() => self.handle_internal(internal),

                command = self.inbox.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break Ok(()),
                },

                _ = refresh.tick() => {}

                _ = keep_alive.tick() => self.start_ping(),
            }
            self.publish();
        };

        match &result {
            Ok(()) => log::info!("Board {board_id} view closed"),
            Err(e) => log::error!("Board {board_id} view stopped: {e}"),
        }
        result
    }

    fn handle_event(&mut self, raw: &[u8]) {
        match GameEvent::decode(raw) {
            Ok(Some(event)) => {
                log::debug!("Board {}: {}", self.orchestrator.board_id(), event);
                let effects = self.reconciler.apply(&event);
                self.execute(effects);
            }
            Ok(None) => log::debug!("Board {}: skipping event", self.orchestrator.board_id()),
            Err(e) => log::warn!(
                "Board {}: dropping malformed event: {}",
                self.orchestrator.board_id(),
                e
            ),
        }
    }

    fn handle_internal(&mut self, internal: Internal) {
        match internal {
            Internal::Hands { stamp, result } => match result {
                Ok(cards) => {
                    let effects = self.reconciler.apply_hands(&stamp, cards);
                    self.execute(effects);
                }
                Err(e) => log::warn!("Hands fetch for {} failed: {}", stamp.player_id, e),
            },
            Internal::RetryActions { turn, attempt } => {
                let effects = self.reconciler.retry_actions(turn, attempt);
                self.execute(effects);
            }
            Internal::TurnExpired { turn } => self.reconciler.expire_turn(turn),
            Internal::Staked {
                seat_key,
                player_id,
                amount,
            } => {
                let effects = self.reconciler.seat_claimed(seat_key, player_id);
                self.execute(effects);
                self.notify(Notice::StakeRequested { amount });
            }
            Internal::StakeFailed(error) => self.notify(Notice::from_error(&error)),
            Internal::BetFailed { turn, error } => {
                let effects = self.reconciler.restore_actions(turn);
                self.execute(effects);
                self.notify(Notice::from_error(&error));
            }
            Internal::Redeemed => {
                self.reconciler.seat_released();
                self.notify(Notice::Redeemed);
            }
            Internal::Notice(notice) => self.notify(notice),
        }
    }

    fn handle_command(&mut self, command: TableCommand) {
        match command {
            TableCommand::Stake { amount } => self.start_stake(amount),
            TableCommand::Bet { amount } => self.start_bet(amount),
            TableCommand::Custom { input } => match parse_amount(&input) {
                Ok(amount) => self.start_bet(amount),
                Err(e) => self.notify(Notice::from_error(&FlowError::from(e))),
            },
            TableCommand::Act(kind) => self.start_action(kind),
            TableCommand::Redeem => self.start_redeem(),
        }
    }

    fn start_action(&mut self, kind: BetKind) {
        let amount = self
            .reconciler
            .actions()
            .and_then(|actions| actions.find(kind))
            .map(|action| action.amount);
        match amount {
            Some(BetAmount::Fixed(amount)) => self.start_bet(amount),
            Some(BetAmount::Custom) => {
                self.notify(Notice::Rejected("Enter a custom amount".to_string()));
            }
            None => self.notify(Notice::Rejected("That action is not available now".to_string())),
        }
    }

    fn start_stake(&mut self, amount: Chips) {
        let seat_key = self.reconciler.session().seat_key.clone();

        let orchestrator = Arc::clone(&self.orchestrator);
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let ticket = match orchestrator.request_stake(amount, seat_key.as_deref()).await {
                Ok(ticket) => ticket,
                Err(error) => {
                    let _ = tx.send(Internal::StakeFailed(error)).await;
                    return;
                }
            };
            let _ = tx
                .send(Internal::Staked {
                    seat_key: ticket.seat_key.clone(),
                    player_id: ticket.player_id.clone(),
                    amount,
                })
                .await;
            let _ = tx.send(relay_outcome(orchestrator.sign_and_relay(&ticket.tx).await)).await;
        });
    }

    fn start_bet(&mut self, amount: Chips) {
        let pending = match self.reconciler.begin_bet(amount) {
            Ok(pending) => pending,
            Err(error) => {
                self.notify(Notice::from_error(&error));
                return;
            }
        };

        let orchestrator = Arc::clone(&self.orchestrator);
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(place_bet(&orchestrator, pending).await).await;
        });
    }

    fn start_redeem(&mut self) {
        let Some(seat_key) = self.reconciler.session().seat_key.clone() else {
            self.notify(Notice::Rejected(ClientError::NotSeated.client_message()));
            return;
        };

        let orchestrator = Arc::clone(&self.orchestrator);
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let ticket = match orchestrator.request_redeem(&seat_key).await {
                Ok(ticket) => ticket,
                Err(error) => {
                    let _ = tx.send(Internal::Notice(Notice::from_error(&error))).await;
                    return;
                }
            };
            let _ = tx.send(Internal::Redeemed).await;
            let _ = tx.send(relay_outcome(orchestrator.sign_and_relay(&ticket.tx).await)).await;
        });
    }

    fn start_ping(&self) {
        let orchestrator = Arc::clone(&self.orchestrator);
        tokio::spawn(async move {
            if let Err(e) = orchestrator.ping().await {
                log::warn!("Keep-alive for board {} failed: {}", orchestrator.board_id(), e);
            }
        });
    }

    fn execute(&self, effects: Vec<Effect>) {
        for effect in effects {
            let tx = self.internal_tx.clone();
            match effect {
                Effect::FetchHands(stamp) => {
                    let orchestrator = Arc::clone(&self.orchestrator);
                    tokio::spawn(async move {
                        let result = orchestrator.hands(&stamp.seat_key).await;
                        let _ = tx.send(Internal::Hands { stamp, result }).await;
                    });
                }
                Effect::RetryActions { turn, attempt } => {
                    let delay = self.config.hands_retry_delay;
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = tx.send(Internal::RetryActions { turn, attempt }).await;
                    });
                }
                Effect::ExpireTurn { turn, expire_at } => {
                    let millis = expire_at.saturating_sub(self.clock.now_ms()).max(0);
                    let delay = Duration::from_millis(u64::try_from(millis).unwrap_or(0));
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = tx.send(Internal::TurnExpired { turn }).await;
                    });
                }
            }
        }
    }

    fn notify(&self, notice: Notice) {
        log::debug!("Board {}: {}", self.orchestrator.board_id(), notice);
        match self.notices.try_send(notice) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                log::warn!("Notice channel full, dropping notice");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }

    fn publish(&self) {
        let next = self.reconciler.view();
        self.view.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}

async fn place_bet(orchestrator: &Orchestrator, pending: PendingBet) -> Internal {
    let ticket = match orchestrator
        .request_bet(&pending.seat_key, pending.amount, pending.balance)
        .await
    {
        Ok(ticket) => ticket,
        Err(error) => {
            return Internal::BetFailed {
                turn: pending.turn,
                error,
            };
        }
    };

    let Some(unsigned) = ticket.tx else {
        return Internal::Notice(Notice::BetPlaced {
            amount: pending.amount,
        });
    };
    match orchestrator.sign_and_relay(&unsigned).await {
        Ok(receipt) => Internal::Notice(Notice::Sent {
            signature: receipt.signature,
        }),
        Err(error) if error.is_cancelled() => Internal::BetFailed {
            turn: pending.turn,
            error,
        },
        Err(error) => Internal::Notice(Notice::from_error(&error)),
    }
}

fn relay_outcome(outcome: Result<RelayReceipt, FlowError>) -> Internal {
    match outcome {
        Ok(receipt) => Internal::Notice(Notice::Sent {
            signature: receipt.signature,
        }),
        Err(error) => Internal::Notice(Notice::from_error(&error)),
    }
}

/// A table ready to run, with its handle and event stream.
pub struct OpenTable {
    pub actor: TableActor,
    pub handle: TableHandle,
    pub notices: mpsc::Receiver<Notice>,
    pub events: EventStream,
}

/// Enter a board and subscribe to its state topic.
///
/// The subscription's consumer is named after the session, so each view of
/// the board reads its own copy of the stream.
pub async fn open_table(
    orchestrator: Arc<Orchestrator>,
    subscriber: &dyn Subscriber,
    clock: Arc<dyn Clock>,
    config: TableConfig,
) -> ClientResult<OpenTable> {
    let entry = orchestrator.enter().await?;
    let events = subscriber
        .subscribe(&state_topic(orchestrator.board_id()), &entry.session.session_id)
        .await?;
    let (actor, handle, notices) = TableActor::new(orchestrator, entry, clock, config);

    Ok(OpenTable {
        actor,
        handle,
        notices,
        events,
    })
}
