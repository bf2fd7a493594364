//! Wagering rules derived from the gap between two private ranks.
//!
//! The wider the gap, the more ranks can fall strictly between the two cards,
//! so the legal actions open up as the gap grows.

use super::entities::{Chips, DECIMAL_PLACES, DECIMALS, Hands, MAX_RANK, MIN_RANK, format_amount};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Largest possible gap, an ace and a king.
pub const MAX_GAP: u8 = MAX_RANK - MIN_RANK;

/// Number of fixed limit multiples offered.
pub const LIMIT_MULTIPLES: u8 = 3;

/// Errors from local wager validation, raised before any network call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("Chips not enough: balance {balance}, requested {requested}")]
    InsufficientBalance { balance: Chips, requested: Chips },

    #[error("Invalid amount '{0}'")]
    InvalidAmount(String),

    #[error("Your turn has ended")]
    TurnExpired,
}

pub type RuleResult<T> = Result<T, RuleError>;

/// What a wager button resolves to.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum BetAmount {
    Fixed(Chips),
    /// The player types the amount.
    Custom,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum BetKind {
    /// A multiple of the table limit.
    Limit(u8),
    Custom,
    AllIn,
    Fold,
}

/// One legal action on the local player's turn.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct BetAction {
    pub kind: BetKind,
    pub label: String,
    pub amount: BetAmount,
}

impl BetAction {
    fn limit(multiple: u8, limit: Chips) -> Self {
        let amount = limit.saturating_mul(Chips::from(multiple));
        Self {
            kind: BetKind::Limit(multiple),
            label: format!("{} Chips", format_amount(amount)),
            amount: BetAmount::Fixed(amount),
        }
    }

    fn custom() -> Self {
        Self {
            kind: BetKind::Custom,
            label: "Custom".to_string(),
            amount: BetAmount::Custom,
        }
    }

    fn all_in(balance: Chips) -> Self {
        Self {
            kind: BetKind::AllIn,
            label: "All In".to_string(),
            amount: BetAmount::Fixed(balance),
        }
    }

    fn fold() -> Self {
        Self {
            kind: BetKind::Fold,
            label: "Fold".to_string(),
            amount: BetAmount::Fixed(0),
        }
    }
}

impl fmt::Display for BetAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// The actions offered for one turn, in display order.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ActionSet(pub Vec<BetAction>);

impl ActionSet {
    pub fn actions(&self) -> &[BetAction] {
        &self.0
    }

    pub fn find(&self, kind: BetKind) -> Option<&BetAction> {
        self.0.iter().find(|action| action.kind == kind)
    }

    pub fn contains(&self, kind: BetKind) -> bool {
        self.find(kind).is_some()
    }

    /// Fixed amounts in display order, skipping the custom entry.
    pub fn fixed_amounts(&self) -> Vec<Chips> {
        self.0
            .iter()
            .filter_map(|action| match action.amount {
                BetAmount::Fixed(amount) => Some(amount),
                BetAmount::Custom => None,
            })
            .collect()
    }
}

/// Distance between the two ranks, independent of order.
pub fn gap(hands: Hands) -> u8 {
    hands[0].abs_diff(hands[1])
}

/// Derive the legal actions for a turn.
///
/// A gap of one or less leaves no rank strictly between the cards, so only
/// folding is allowed. All-in is reserved for the widest gap and only while
/// the balance covers the pot.
pub fn derive_actions(hands: Hands, limit: Chips, balance: Chips, pot: Chips) -> ActionSet {
    let diff = gap(hands);
    let mut actions = Vec::new();

    if diff > 1 {
        for multiple in 1..=LIMIT_MULTIPLES {
            actions.push(BetAction::limit(multiple, limit));
        }
        actions.push(BetAction::custom());
        if diff == MAX_GAP && balance >= pot {
            actions.push(BetAction::all_in(balance));
        }
    }
    actions.push(BetAction::fold());

    ActionSet(actions)
}

/// Reject a wager the balance cannot cover.
pub fn validate_wager(amount: Chips, balance: Chips) -> RuleResult<()> {
    if amount > balance {
        return Err(RuleError::InsufficientBalance {
            balance,
            requested: amount,
        });
    }
    Ok(())
}

/// Parse a typed chip amount such as `"2"` or `"0.25"` into minor units.
pub fn parse_amount(input: &str) -> RuleResult<Chips> {
    let trimmed = input.trim();
    let invalid = || RuleError::InvalidAmount(trimmed.to_string());

    let (whole, frac) = match trimmed.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (trimmed, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if frac.len() > DECIMAL_PLACES
        || !whole.chars().all(|c| c.is_ascii_digit())
        || !frac.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }

    let whole: Chips = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let frac: Chips = if frac.is_empty() {
        0
    } else {
        let padded = format!("{frac:0<width$}", width = DECIMAL_PLACES);
        padded.parse().map_err(|_| invalid())?
    };

    whole
        .checked_mul(DECIMALS)
        .and_then(|minor| minor.checked_add(frac))
        .ok_or_else(invalid)
}
