use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;

/// Token amounts in minor units.
pub type Chips = u64;

/// Minor units per displayed chip.
pub const DECIMALS: Chips = 1_000_000_000;

/// Number of fractional digits in [`DECIMALS`].
pub const DECIMAL_PLACES: usize = 9;

/// Lowest and highest card rank.
pub const MIN_RANK: u8 = 1;
pub const MAX_RANK: u8 = 13;

/// Opaque player identity assigned by the authority.
pub type PlayerId = String;

/// A pair of private hole-card ranks, sorted ascending.
pub type Hands = [u8; 2];

/// A card identifier as it travels over the wire.
///
/// Identifiers run 1..=52, thirteen per suit, so the rank is
/// `((id - 1) % 13) + 1`. Identifiers in 1..=13 are therefore already ranks.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Card(pub u8);

impl Card {
    /// Rank in 1..=13, or `None` for identifiers outside 1..=52.
    pub fn rank(self) -> Option<u8> {
        match self.0 {
            1..=52 => Some((self.0 - 1) % 13 + 1),
            _ => None,
        }
    }

    /// Suit index in 0..=3.
    pub fn suit_index(self) -> Option<u8> {
        match self.0 {
            1..=52 => Some((self.0 - 1) / 13),
            _ => None,
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.rank() {
            Some(rank) => write!(f, "{}", rank_label(rank)),
            None => write!(f, "??"),
        }
    }
}

/// Face label for a rank.
pub fn rank_label(rank: u8) -> String {
    match rank {
        1 => "A".to_string(),
        11 => "J".to_string(),
        12 => "Q".to_string(),
        13 => "K".to_string(),
        r => r.to_string(),
    }
}

/// Convert two wire card identifiers into sorted ranks.
///
/// Returns `None` if either identifier is not a card.
pub fn normalize_hands(cards: [Card; 2]) -> Option<Hands> {
    let mut hands = [cards[0].rank()?, cards[1].rank()?];
    hands.sort_unstable();
    Some(hands)
}

/// Whose turn it is and when it runs out.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Turn {
    pub player_id: PlayerId,
    /// Unix timestamp in milliseconds.
    pub expire_at: i64,
}

/// Render minor units as a displayed chip amount, e.g. `1500000000` as `1.5`.
pub fn format_amount(amount: Chips) -> String {
    let whole = amount / DECIMALS;
    let frac = amount % DECIMALS;
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{frac:0width$}", width = DECIMAL_PLACES);
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

/// Deserialize an amount sent either as a decimal string or a JSON number.
///
/// The authority encodes big integers as strings.
pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<Chips, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid amount '{text}'"))),
        Raw::Number(n) => Ok(n),
    }
}
