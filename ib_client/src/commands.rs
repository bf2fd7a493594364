use in_between::{
    game::{BetKind, Chips, parse_amount},
    table::TableCommand,
};
use std::fmt;

/// A line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Forwarded to the table actor
    Table(TableCommand),
    /// Print the command list
    Help,
    /// Leave the client
    Quit,
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Command needs an amount but none was given.
    MissingAmount(&'static str),
    /// Amount is not a valid chip amount.
    InvalidAmount(String),
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAmount(cmd) => {
                write!(f, "'{}' requires an amount (e.g., '{} 2.5')", cmd, cmd)
            }
            Self::InvalidAmount(value) => write!(
                f,
                "Invalid amount '{}'. Must be a positive number with at most 9 decimals",
                value
            ),
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{}'. Type 'help' to see available commands",
                cmd
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Help text listing every command.
pub const COMMANDS_HELP: &str = "\
Commands:
  stake <amount>    Take a seat with <amount> chips, or top up your seat
  bet <amount>      Bet <amount> chips on your turn (0 folds)
  custom <amount>   Bet a custom amount on your turn
  fold              Fold this turn
  allin             Bet your whole balance (widest gap only)
  redeem            Leave your seat and withdraw its chips
  help              Show this list
  quit              Leave the table view";

/// Parse a command string into an [`Input`].
///
/// # Arguments
///
/// * `input` - The raw command string from user input
///
/// # Returns
///
/// * `Ok(Input)` - Successfully parsed command
/// * `Err(ParseError)` - Parse error with descriptive message
///
/// # Examples
///
/// ```
/// use ib_client::commands::{Input, parse_command};
/// use in_between::{game::BetKind, table::TableCommand};
///
/// assert_eq!(parse_command("fold"), Ok(Input::Table(TableCommand::Act(BetKind::Fold))));
/// assert_eq!(parse_command("stake 2"), Ok(Input::Table(TableCommand::Stake { amount: 2_000_000_000 })));
/// assert_eq!(parse_command("quit"), Ok(Input::Quit));
/// ```
pub fn parse_command(input: &str) -> Result<Input, ParseError> {
    let trimmed = input.trim();

    match trimmed {
        "fold" => return Ok(Input::Table(TableCommand::Act(BetKind::Fold))),
        "allin" | "all-in" => return Ok(Input::Table(TableCommand::Act(BetKind::AllIn))),
        "redeem" | "leave" => return Ok(Input::Table(TableCommand::Redeem)),
        "help" | "?" => return Ok(Input::Help),
        "quit" | "exit" => return Ok(Input::Quit),
        _ => {}
    }

    let parts: Vec<&str> = trimmed.split_ascii_whitespace().collect();
    match parts.first() {
        Some(&"stake") => {
            let amount = parse_amount_arg("stake", &parts)?;
            Ok(Input::Table(TableCommand::Stake { amount }))
        }
        Some(&"bet") => {
            let amount = parse_amount_arg("bet", &parts)?;
            Ok(Input::Table(TableCommand::Bet { amount }))
        }
        // The actor validates custom input itself, so it is passed through as typed.
        Some(&"custom") => match parts.get(1) {
            Some(value) => Ok(Input::Table(TableCommand::Custom {
                input: value.to_string(),
            })),
            None => Err(ParseError::MissingAmount("custom")),
        },
        _ => Err(ParseError::UnrecognizedCommand(trimmed.to_string())),
    }
}

/// Parse the amount argument of "stake AMOUNT" or "bet AMOUNT"
fn parse_amount_arg(cmd: &'static str, parts: &[&str]) -> Result<Chips, ParseError> {
    let value = parts.get(1).ok_or(ParseError::MissingAmount(cmd))?;
    parse_amount(value).map_err(|_| ParseError::InvalidAmount(value.to_string()))
}
