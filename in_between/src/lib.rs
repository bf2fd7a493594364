//! # In Between
//!
//! Client engine for the in-between card game: every seat holds two private
//! cards and wagers on whether the next card drawn falls strictly between
//! them.
//!
//! The board itself lives on an authoritative server. This library keeps a
//! local mirror of it in step with the server's event stream, derives what
//! the local player may do from that mirror, and sequences the signed
//! stake, bet and redeem flows.
//!
//! ## Core Modules
//!
//! - [`game`]: Cards, amounts, legal wagering actions and seat layout
//! - [`net`]: Wire events and the authority, signer and transport interfaces
//! - [`seat`]: Enter, stake, bet and redeem flows
//! - [`table`]: The board mirror, its reconciler and the table actor
//!
//! ## Example
//!
//! ```
//! use in_between::game::{derive_actions, BetKind};
//!
//! // A seven and a king leave room to bet
//! let actions = derive_actions([7, 13], 1_000_000_000, 5_000_000_000, 3_000_000_000);
//! assert!(actions.contains(BetKind::Limit(1)));
//! assert!(actions.contains(BetKind::Fold));
//! ```

/// Cards, amounts, rules and layout.
pub mod game;
pub use game::{
    ActionSet, BetAction, BetAmount, BetKind, Card, Chips, Hands, PlayerId, RuleError, Turn,
    derive_actions, format_amount, parse_amount, seat_positions, validate_wager,
};

/// Wire events and external collaborators.
pub mod net;
pub use net::{
    authority::{Authority, BoardPage, BoardQuery, BoardSummary, EventStream, Signer, Subscriber},
    errors::{ClientError, ClientResult},
    messages::GameEvent,
};

/// Seat membership flows.
pub mod seat;
pub use seat::{Entry, FlowError, FlowResult, Orchestrator, Session};

/// Board mirror and table actor.
pub mod table;
pub use table::{
    Notice, OpenTable, TableActor, TableCommand, TableConfig, TableHandle, TableView, open_table,
};
