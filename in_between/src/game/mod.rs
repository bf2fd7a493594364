//! Game entities and the pure rules the table view is derived from.
//!
//! - [`entities`]: cards, amounts, turns
//! - [`rules`]: legal wagering actions for a pair of private ranks
//! - [`layout`]: seat anchors around the table

pub mod entities;
pub mod layout;
pub mod rules;

pub use entities::{Card, Chips, Hands, PlayerId, Turn, format_amount};
pub use layout::{Point, TableGeometry, seat_positions};
pub use rules::{
    ActionSet, BetAction, BetAmount, BetKind, RuleError, RuleResult, derive_actions, parse_amount,
    validate_wager,
};
