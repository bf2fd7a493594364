//! The local mirror of a board: seats in layout order, the deck, the pot
//! and the active turn.

use std::{sync::Arc, time::Duration};

use super::countdown::{Clock, Countdown};
use crate::game::{
    entities::{Card, Chips, Hands, PlayerId, Turn},
    layout::{MAX_SEATS, Point, TableGeometry},
};

/// One seat as the client currently shows it.
#[derive(Debug)]
pub struct SeatView {
    pub player_id: PlayerId,
    pub chips: Chips,
    /// Stamp assigned when the seat entered the mirror. A seat that leaves
    /// and comes back gets a new one.
    pub generation: u64,
    /// Whether the last snapshot reported a live hand for this seat.
    pub holds_hand: bool,
    /// Private ranks; only ever set on the local player's seat.
    pub hands: Option<Hands>,
    /// Ranks shown by the most recent wager on this seat.
    pub revealed: Option<Hands>,
    /// Wager currently displayed next to the seat.
    pub bet: Option<Chips>,
    pub countdown: Countdown,
}

/// A card in the visual deck; `face` is set once the card is drawn.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DeckCard {
    pub face: Option<Card>,
}

/// Authoritative local state of one board.
pub struct BoardMirror {
    seats: Vec<SeatView>,
    deck: Vec<DeckCard>,
    pot: Chips,
    turn: Option<Turn>,
    next_generation: u64,
    clock: Arc<dyn Clock>,
    tick: Duration,
}

impl BoardMirror {
    pub fn new(clock: Arc<dyn Clock>, tick: Duration) -> Self {
        Self {
            seats: Vec::new(),
            deck: Vec::new(),
            pot: 0,
            turn: None,
            next_generation: 1,
            clock,
            tick,
        }
    }

    pub fn seats(&self) -> &[SeatView] {
        &self.seats
    }

    pub fn seats_mut(&mut self) -> impl Iterator<Item = &mut SeatView> {
        self.seats.iter_mut()
    }

    pub fn seat(&self, player_id: &str) -> Option<&SeatView> {
        self.seats.iter().find(|seat| seat.player_id == player_id)
    }

    pub fn seat_mut(&mut self, player_id: &str) -> Option<&mut SeatView> {
        self.seats.iter_mut().find(|seat| seat.player_id == player_id)
    }

    pub fn contains(&self, player_id: &str) -> bool {
        self.seat(player_id).is_some()
    }

    pub fn seat_ids(&self) -> Vec<&str> {
        self.seats.iter().map(|seat| seat.player_id.as_str()).collect()
    }

    /// Insert a seat at the end of the layout order, or return the existing
    /// one untouched.
    pub fn upsert(&mut self, player_id: &str, chips: Chips) -> &mut SeatView {
        let idx = match self.seats.iter().position(|seat| seat.player_id == player_id) {
            Some(idx) => idx,
            None => {
                let generation = self.next_generation;
                self.next_generation += 1;
                self.seats.push(SeatView {
                    player_id: player_id.to_string(),
                    chips,
                    generation,
                    holds_hand: false,
                    hands: None,
                    revealed: None,
                    bet: None,
                    countdown: Countdown::new(Arc::clone(&self.clock), self.tick),
                });
                self.seats.len() - 1
            }
        };
        &mut self.seats[idx]
    }

    /// Remove a seat; its countdown stops when the view is dropped.
    pub fn remove(&mut self, player_id: &str) -> Option<SeatView> {
        let idx = self.seats.iter().position(|seat| seat.player_id == player_id)?;
        Some(self.seats.remove(idx))
    }

    /// Keep only the seats `keep` accepts, preserving their order.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) -> Vec<PlayerId> {
        let mut removed = Vec::new();
        self.seats.retain_mut(|seat| {
            let kept = keep(&seat.player_id);
            if !kept {
                seat.countdown.clear();
                removed.push(seat.player_id.clone());
            }
            kept
        });
        removed
    }

    pub fn deck(&self) -> &[DeckCard] {
        &self.deck
    }

    /// Grow or shrink the deck from the top only.
    pub fn resize_deck(&mut self, count: usize) {
        if self.deck.len() > count {
            self.deck.truncate(count);
        } else {
            self.deck.resize(count, DeckCard::default());
        }
    }

    /// Show `card` on the top of the deck. Returns false on an empty deck.
    pub fn reveal_top(&mut self, card: Card) -> bool {
        match self.deck.last_mut() {
            Some(top) => {
                top.face = Some(card);
                true
            }
            None => false,
        }
    }

    pub fn pot(&self) -> Chips {
        self.pot
    }

    pub fn set_pot(&mut self, pot: Chips) {
        self.pot = pot;
    }

    pub fn turn(&self) -> Option<&Turn> {
        self.turn.as_ref()
    }

    pub fn set_turn(&mut self, turn: Option<Turn>) {
        self.turn = turn;
    }

    /// Seats in layout order: the local player first, everyone else in the
    /// order they joined.
    pub fn layout_order(&self, local: Option<&str>) -> Vec<&SeatView> {
        let mine = local.and_then(|id| self.seat(id));
        mine.into_iter()
            .chain(self.seats.iter().filter(|seat| Some(seat.player_id.as_str()) != local))
            .collect()
    }

    /// Anchor for every seat in layout order. Anchor 0 stays reserved for
    /// the local player even while they are not seated; seats past the
    /// table's capacity get no anchor.
    pub fn positions(&self, local: Option<&str>, geometry: &TableGeometry) -> Vec<(PlayerId, Option<Point>)> {
        let seated = local.is_some_and(|id| self.contains(id));
        let others = self.seats.len() - usize::from(seated);
        let anchors = geometry.seat_positions((others + 1).min(MAX_SEATS));

        self.layout_order(local)
            .into_iter()
            .enumerate()
            .map(|(idx, seat)| {
                let slot = if seated { idx } else { idx + 1 };
                (seat.player_id.clone(), anchors.get(slot).copied())
            })
            .collect()
    }
}
