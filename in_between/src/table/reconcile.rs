//! Folds authoritative events into the board mirror.
//!
//! The reconciler never performs I/O. Whatever has to happen outside of it
//! (a private hands fetch, a delayed re-check of the action panel) comes back
//! as an [`Effect`] for the caller to run; results are fed back in through
//! [`Reconciler::apply_hands`], [`Reconciler::retry_actions`] and
//! [`Reconciler::expire_turn`].

use std::sync::Arc;

use super::{
    config::TableConfig,
    countdown::{Clock, Countdown},
    messages::{SeatSummary, TableView},
    mirror::BoardMirror,
};
use crate::{
    game::{
        entities::{Card, Chips, Hands, PlayerId, Turn, normalize_hands},
        rules::{ActionSet, RuleError, derive_actions, validate_wager},
    },
    net::{
        authority::SeatRecord,
        errors::ClientError,
        messages::{GameEvent, RevealDelta, Snapshot, WagerDelta},
    },
    seat::{FlowResult, Session},
};

/// Identifies the seat state a private hands fetch was issued for.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HandsStamp {
    pub seat_key: String,
    pub player_id: PlayerId,
    /// Generation of the local seat when the fetch was issued.
    pub generation: u64,
    /// Mirror version the fetch was issued at.
    pub version: u64,
}

/// Work the reconciler asks its owner to perform.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Effect {
    /// Fetch the local player's private hands.
    FetchHands(HandsStamp),
    /// Re-check for private hands on turn `turn` after the retry delay.
    RetryActions { turn: u64, attempt: u8 },
    /// Withdraw the controls of turn `turn` once the clock reaches `expire_at`.
    ExpireTurn { turn: u64, expire_at: i64 },
}

/// A wager that passed local validation and is ready to be sent.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PendingBet {
    pub seat_key: String,
    pub amount: Chips,
    pub balance: Chips,
    /// Turn the wager was placed on, if placed from the action panel.
    pub turn: Option<u64>,
}

/// The local player's turn controls.
struct TurnPanel {
    countdown: Countdown,
    actions: Option<ActionSet>,
    /// Serial of the local turn the panel is showing.
    turn: Option<u64>,
    awaiting_hands: bool,
    retries_exhausted: bool,
    /// A wager for this turn is in flight or done.
    submitted: bool,
    /// The turn's deadline passed.
    expired: bool,
}

impl TurnPanel {
    fn tear_down(&mut self) {
        self.countdown.clear();
        self.actions = None;
        self.turn = None;
        self.awaiting_hands = false;
        self.retries_exhausted = false;
        self.submitted = false;
        self.expired = false;
    }
}

pub struct Reconciler {
    session: Session,
    limit: Chips,
    mirror: BoardMirror,
    panel: TurnPanel,
    config: TableConfig,
    /// Bumped on every snapshot and on enter.
    version: u64,
    /// Version at which the local hand was last cleared. Fetches issued at
    /// or before it are stale.
    hands_epoch: u64,
    /// Version of the fetch whose result is currently shown.
    hands_version: u64,
    turn_serial: u64,
    joinable: bool,
}

impl Reconciler {
    pub fn new(session: Session, limit: Chips, clock: Arc<dyn Clock>, config: TableConfig) -> Self {
        let joinable = session.seat_key.is_none();
        Self {
            session,
            limit,
            mirror: BoardMirror::new(Arc::clone(&clock), config.tick_interval),
            panel: TurnPanel {
                countdown: Countdown::new(clock, config.tick_interval),
                actions: None,
                turn: None,
                awaiting_hands: false,
                retries_exhausted: false,
                submitted: false,
                expired: false,
            },
            config,
            version: 0,
            hands_epoch: 0,
            hands_version: 0,
            turn_serial: 0,
            joinable,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn mirror(&self) -> &BoardMirror {
        &self.mirror
    }

    pub fn limit(&self) -> Chips {
        self.limit
    }

    pub fn joinable(&self) -> bool {
        self.joinable
    }

    /// Chips of the local seat, when it is on the board.
    pub fn balance(&self) -> Option<Chips> {
        let id = self.session.player_id.as_deref()?;
        self.mirror.seat(id).map(|seat| seat.chips)
    }

    /// The local player's private ranks.
    pub fn local_hands(&self) -> Option<Hands> {
        let id = self.session.player_id.as_deref()?;
        self.mirror.seat(id).and_then(|seat| seat.hands)
    }

    pub fn actions(&self) -> Option<&ActionSet> {
        self.panel.actions.as_ref()
    }

    pub fn is_local_turn(&self) -> bool {
        self.panel.turn.is_some()
    }

    /// Place the seat returned on enter before any snapshot arrives.
    pub fn enter_seat(&mut self, seat: &SeatRecord) -> Vec<Effect> {
        if !self.session.is_local(&seat.player_id) {
            log::warn!("Ignoring entry seat {} that is not ours", seat.player_id);
            return Vec::new();
        }
        self.version += 1;
        self.joinable = false;

        let view = self.mirror.upsert(&seat.player_id, seat.chips);
        view.chips = seat.chips;
        view.holds_hand = seat.hands.is_some();
        self.sync_local_hands()
    }

    pub fn apply(&mut self, event: &GameEvent) -> Vec<Effect> {
        match event {
            GameEvent::Snapshot(snapshot) => self.apply_snapshot(snapshot),
            GameEvent::Wager(delta) => self.apply_wager(delta),
            GameEvent::Reveal(delta) => {
                self.apply_reveal(delta);
                Vec::new()
            }
        }
    }

    /// Make the mirror equal to `snapshot`.
    ///
    /// Seats keep their layout order across snapshots; new seats append.
    /// Applying the same snapshot twice changes nothing.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) -> Vec<Effect> {
        self.version += 1;
        let local = self.session.player_id.clone();
        let had_local = local.as_deref().is_some_and(|id| self.mirror.contains(id));

        let removed = self
            .mirror
            .retain(|id| snapshot.seats.iter().any(|seat| seat.player_id == id));
        if !removed.is_empty() {
            log::debug!("Seats left board {}: {:?}", self.session.board_id, removed);
        }

        for seat in &snapshot.seats {
            let view = self.mirror.upsert(&seat.player_id, seat.chips);
            view.chips = seat.chips;
            view.holds_hand = seat.holds_hand();
            view.bet = None;
            view.revealed = None;
        }

        let mut effects = Vec::new();
        match local.as_deref() {
            Some(id) if self.mirror.contains(id) => {
                self.joinable = false;
                effects.extend(self.sync_local_hands());
            }
            Some(id) if had_local => {
                log::info!("Seat {} is no longer on board {}", id, self.session.board_id);
                self.panel.tear_down();
                self.hands_epoch = self.version;
                self.joinable = true;
            }
            _ => {}
        }

        self.mirror.resize_deck(snapshot.deck_count);
        self.mirror.set_pot(snapshot.pot);
        effects.extend(self.sync_turn(snapshot.active_turn()));
        effects
    }

    /// Show a seat's wager. Deltas for seats the mirror does not hold are
    /// dropped whole.
    pub fn apply_wager(&mut self, delta: &WagerDelta) -> Vec<Effect> {
        if !self.mirror.contains(&delta.player_id) {
            log::warn!("Ignoring wager from unknown seat {}", delta.player_id);
            return Vec::new();
        }
        let local = self.session.is_local(&delta.player_id);

        for seat in self.mirror.seats_mut() {
            if seat.player_id != delta.player_id {
                seat.bet = None;
                continue;
            }
            seat.countdown.clear();
            if delta.bet > 0 {
                seat.bet = Some(delta.bet);
                seat.revealed = if local {
                    None
                } else {
                    delta.hands.and_then(normalize_hands)
                };
            } else {
                seat.bet = None;
                seat.revealed = None;
            }
        }

        if local && self.panel.turn.is_some() {
            self.close_panel();
        }
        Vec::new()
    }

    pub fn apply_reveal(&mut self, delta: &RevealDelta) {
        if !self.mirror.reveal_top(delta.card) {
            log::warn!("Revealed {} on an empty deck", delta.card);
        }
    }

    /// Apply the result of a private hands fetch.
    ///
    /// The result is dropped unless the seat it was issued for is still the
    /// local seat, still holds a hand, and nothing newer has been shown or
    /// cleared since.
    pub fn apply_hands(&mut self, stamp: &HandsStamp, cards: Option<[Card; 2]>) -> Vec<Effect> {
        let current = self.session.is_local(&stamp.player_id)
            && stamp.version > self.hands_epoch
            && stamp.version >= self.hands_version
            && self
                .mirror
                .seat(&stamp.player_id)
                .is_some_and(|seat| seat.generation == stamp.generation && seat.holds_hand);
        if !current {
            log::debug!(
                "Dropping stale hands for {} (generation {}, version {})",
                stamp.player_id,
                stamp.generation,
                stamp.version
            );
            return Vec::new();
        }

        let Some(hands) = cards.and_then(normalize_hands) else {
            return Vec::new();
        };
        if let Some(seat) = self.mirror.seat_mut(&stamp.player_id) {
            seat.hands = Some(hands);
        }
        self.hands_version = stamp.version;
        self.refresh_actions()
    }

    /// Re-check the action panel after a retry delay.
    pub fn retry_actions(&mut self, turn: u64, attempt: u8) -> Vec<Effect> {
        if self.panel.turn != Some(turn) || !self.panel.awaiting_hands {
            return Vec::new();
        }
        if self.local_hands().is_some() {
            self.panel.awaiting_hands = false;
            return self.refresh_actions();
        }
        if attempt < self.config.hands_retry_attempts {
            return vec![Effect::RetryActions {
                turn,
                attempt: attempt + 1,
            }];
        }

        log::warn!("No private hands after {attempt} checks; showing no actions");
        self.panel.awaiting_hands = false;
        self.panel.retries_exhausted = true;
        Vec::new()
    }

    /// Validate a wager and hide the action panel while it is in flight.
    pub fn begin_bet(&mut self, amount: Chips) -> FlowResult<PendingBet> {
        let seat_key = self.session.seat_key.clone().ok_or(ClientError::NotSeated)?;
        let balance = self.balance().ok_or(ClientError::NotSeated)?;
        if self.panel.expired {
            return Err(RuleError::TurnExpired.into());
        }
        validate_wager(amount, balance)?;

        if self.panel.turn.is_some() {
            self.panel.actions = None;
            self.panel.awaiting_hands = false;
            self.panel.submitted = true;
        }
        Ok(PendingBet {
            seat_key,
            amount,
            balance,
            turn: self.panel.turn,
        })
    }

    /// Offer the actions again after a wager failed, if its turn is still on.
    pub fn restore_actions(&mut self, turn: Option<u64>) -> Vec<Effect> {
        if turn.is_none() || self.panel.turn != turn || self.panel.expired {
            return Vec::new();
        }
        self.panel.submitted = false;
        self.refresh_actions()
    }

    /// The deadline of turn `turn` passed.
    ///
    /// The panel stays closed until the next turn starts, whatever the
    /// outcome of a wager still in flight.
    pub fn expire_turn(&mut self, turn: u64) {
        if self.panel.turn != Some(turn) || self.panel.expired {
            return;
        }
        log::debug!("Turn {turn} expired");
        self.close_panel();
        self.panel.expired = true;
    }

    /// The authority accepted a stake for this seat.
    pub fn seat_claimed(&mut self, seat_key: String, player_id: PlayerId) -> Vec<Effect> {
        self.session.seat_key = Some(seat_key);
        self.session.player_id = Some(player_id);
        self.joinable = false;
        self.sync_local_hands()
    }

    /// The seat was redeemed; drop everything local.
    pub fn seat_released(&mut self) {
        if let Some(id) = self.session.player_id.take() {
            self.mirror.remove(&id);
        }
        self.session.seat_key = None;
        self.panel.tear_down();
        self.hands_epoch = self.version;
        self.joinable = true;
    }

    pub fn view(&self) -> TableView {
        let local = self.session.player_id.as_deref();
        let positions = self.mirror.positions(local, &self.config.geometry);
        let seats = positions
            .into_iter()
            .filter_map(|(player_id, position)| {
                let seat = self.mirror.seat(&player_id)?;
                Some(SeatSummary {
                    is_local: local == Some(player_id.as_str()),
                    chips: seat.chips,
                    position,
                    bet: seat.bet,
                    revealed: seat.revealed,
                    countdown: seat.countdown.remaining(),
                    player_id,
                })
            })
            .collect();

        TableView {
            board_id: self.session.board_id.clone(),
            limit: self.limit,
            pot: self.mirror.pot(),
            deck: self.mirror.deck().iter().map(|card| card.face).collect(),
            seats,
            turn: self.mirror.turn().cloned(),
            joinable: self.joinable,
            hands: self.local_hands(),
            balance: self.balance(),
            actions: self.panel.actions.clone(),
            countdown: self.panel.countdown.remaining(),
        }
    }

    fn sync_local_hands(&mut self) -> Vec<Effect> {
        let Some(player_id) = self.session.player_id.clone() else {
            return Vec::new();
        };
        let version = self.version;
        let Some(seat) = self.mirror.seat_mut(&player_id) else {
            return Vec::new();
        };

        if !seat.holds_hand {
            if seat.hands.take().is_some() {
                log::debug!("Hand over for {player_id}");
            }
            self.hands_epoch = version;
            return Vec::new();
        }

        match &self.session.seat_key {
            Some(seat_key) => vec![Effect::FetchHands(HandsStamp {
                seat_key: seat_key.clone(),
                generation: seat.generation,
                player_id,
                version,
            })],
            None => {
                log::warn!("Seat {player_id} holds a hand but no seat key is known");
                Vec::new()
            }
        }
    }

    fn sync_turn(&mut self, turn: Option<Turn>) -> Vec<Effect> {
        let changed = self.mirror.turn() != turn.as_ref();
        self.mirror.set_turn(turn.clone());

        for seat in self.mirror.seats_mut() {
            match &turn {
                Some(turn) if turn.player_id == seat.player_id => {
                    if changed {
                        seat.countdown.clear();
                    }
                    seat.countdown.start(turn.expire_at);
                }
                _ => seat.countdown.clear(),
            }
        }

        let local_turn = turn.filter(|turn| {
            self.session.is_local(&turn.player_id) && self.mirror.contains(&turn.player_id)
        });
        let Some(turn) = local_turn else {
            if self.panel.turn.is_some() {
                self.panel.tear_down();
            }
            return Vec::new();
        };

        let mut effects = Vec::new();
        if changed || self.panel.turn.is_none() {
            self.panel.tear_down();
            self.turn_serial += 1;
            self.panel.turn = Some(self.turn_serial);
            log::debug!("Turn {} is ours", self.turn_serial);
            effects.push(Effect::ExpireTurn {
                turn: self.turn_serial,
                expire_at: turn.expire_at,
            });
        }
        if !self.panel.submitted {
            self.panel.countdown.start(turn.expire_at);
        }
        effects.extend(self.refresh_actions());
        effects
    }

    /// Recompute the offered actions for the current local turn.
    fn refresh_actions(&mut self) -> Vec<Effect> {
        let Some(turn) = self.panel.turn else {
            return Vec::new();
        };
        if self.panel.submitted {
            return Vec::new();
        }

        match self.local_hands() {
            Some(hands) => {
                let balance = self.balance().unwrap_or(0);
                self.panel.actions = Some(derive_actions(hands, self.limit, balance, self.mirror.pot()));
                self.panel.awaiting_hands = false;
                Vec::new()
            }
            None if self.panel.awaiting_hands || self.panel.retries_exhausted => Vec::new(),
            None if self.config.hands_retry_attempts == 0 => {
                self.panel.retries_exhausted = true;
                Vec::new()
            }
            None => {
                self.panel.awaiting_hands = true;
                vec![Effect::RetryActions { turn, attempt: 1 }]
            }
        }
    }

    fn close_panel(&mut self) {
        self.panel.countdown.clear();
        self.panel.actions = None;
        self.panel.awaiting_hands = false;
        self.panel.submitted = true;
    }
}
