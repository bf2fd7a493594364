//! Plain-text rendering of the table view.

use in_between::{
    game::{Card, format_amount, rules::BetAmount},
    net::authority::BoardPage,
    table::{Notice, SeatSummary, TableView},
};
use std::fmt;

/// Adapter rendering a [`TableView`] as a text block.
pub struct ViewDisplay<'a>(pub &'a TableView);

impl fmt::Display for ViewDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.0;

        writeln!(f, "{}", "═".repeat(80))?;
        writeln!(f, "IN BETWEEN  board {}", view.board_id)?;
        writeln!(f, "{}", "═".repeat(80))?;

        writeln!(f, "Limit: {}  Pot: {}", format_amount(view.limit), format_amount(view.pot))?;
        writeln!(f, "Deck:  {}", format_deck(&view.deck))?;

        writeln!(f, "{}", "─".repeat(80))?;

        if view.seats.is_empty() {
            writeln!(f, "No players at table")?;
        } else {
            writeln!(f, "Seats:")?;
            for seat in &view.seats {
                write_seat(f, seat)?;
            }
        }

        writeln!(f, "{}", "─".repeat(80))?;

        match view.balance {
            Some(balance) => writeln!(f, "Balance: {}", format_amount(balance))?,
            None if view.joinable => writeln!(f, "Not seated. Type 'stake <amount>' to join")?,
            None => writeln!(f, "Joining...")?,
        }

        if let Some(hands) = view.hands {
            writeln!(f, "Your cards: {}", format_hands(hands))?;
        }

        if let Some(actions) = &view.actions {
            let labels: Vec<String> = actions
                .actions()
                .iter()
                .map(|action| match action.amount {
                    BetAmount::Custom => format!("{} (custom <amount>)", action.label),
                    BetAmount::Fixed(amount) => format!("{} (bet {})", action.label, format_amount(amount)),
                })
                .collect();
            let countdown = view
                .countdown
                .map(|secs| format!(" [{}s]", secs))
                .unwrap_or_default();
            writeln!(f, "Your turn{}: {}", countdown, labels.join(", "))?;
        }

        writeln!(f, "{}", "═".repeat(80))
    }
}

fn write_seat(f: &mut fmt::Formatter<'_>, seat: &SeatSummary) -> fmt::Result {
    let marker = if seat.is_local { " (you)" } else { "" };
    let position = match seat.position {
        Some(point) => format!("@({:.0}, {:.0})", point.x, point.y),
        None => "@(-)".to_string(),
    };

    write!(
        f,
        "  {}{} {} - {} chips",
        seat.player_id,
        marker,
        position,
        format_amount(seat.chips)
    )?;

    match seat.bet {
        Some(0) => write!(f, " - folded")?,
        Some(bet) => write!(f, " - bet {}", format_amount(bet))?,
        None => {}
    }

    if let Some(revealed) = seat.revealed {
        write!(f, " [{}]", format_hands(revealed))?;
    }

    if let Some(secs) = seat.countdown {
        write!(f, " → {}s", secs)?;
    }

    writeln!(f)
}

fn format_hands(hands: [u8; 2]) -> String {
    format!(
        "{} {}",
        in_between::game::entities::rank_label(hands[0]),
        in_between::game::entities::rank_label(hands[1])
    )
}

/// Face-down cards as `#`, drawn cards by face, bottom first.
fn format_deck(deck: &[Option<Card>]) -> String {
    if deck.is_empty() {
        return "empty".to_string();
    }
    let hidden = deck.iter().filter(|card| card.is_none()).count();
    let drawn: Vec<String> = deck.iter().flatten().map(Card::to_string).collect();
    if drawn.is_empty() {
        format!("{} face down", hidden)
    } else {
        format!("{} face down, drawn: {}", hidden, drawn.join(" "))
    }
}

/// Adapter rendering one page of the board listing.
pub struct BoardsDisplay<'a> {
    pub page: &'a BoardPage,
    pub number: u32,
}

impl fmt::Display for BoardsDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.page.boards.is_empty() {
            return writeln!(f, "No open boards");
        }
        writeln!(f, "{:<24} {:>12} {:>14} {:>8}", "BOARD", "LIMIT", "POOL", "PLAYERS")?;
        for board in &self.page.boards {
            writeln!(
                f,
                "{:<24} {:>12} {:>14} {:>8}",
                board.id,
                format_amount(board.limit),
                format_amount(board.chips),
                board.players
            )?;
        }
        writeln!(f, "Page {} / {}", self.number, self.page.pages().max(1))
    }
}

/// Clear the screen and print the view
pub fn display_table_view(view: &TableView) {
    print!("\x1B[2J\x1B[1;1H");
    println!("{}", ViewDisplay(view));
    println!("Commands: stake, bet, custom, fold, allin, redeem, help, quit");
}

/// Print a transient notice
pub fn display_notice(notice: &Notice) {
    match notice {
        Notice::Rejected(_) | Notice::Failed(_) => println!("! {}", notice),
        _ => println!("* {}", notice),
    }
}
