//! Seat anchors around the table.
//!
//! Anchor 0 always belongs to the local player at the bottom of the table.
//! The remaining anchors spread the other players from the right edge, over
//! the top, to the left edge; from six opponents on, the last two sit on the
//! lower corners either side of the local player.

use serde::{Deserialize, Serialize};

/// Design resolution the anchors are computed for.
pub const DESIGN_WIDTH: f64 = 3840.0;
pub const DESIGN_HEIGHT: f64 = 2160.0;

/// Distance kept between an anchor and the table edge.
const EDGE_GAP: f64 = 200.0;

/// Seats a table can lay out, the local player included.
pub const MAX_SEATS: usize = 10;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Table dimensions the anchors scale with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TableGeometry {
    pub width: f64,
    pub height: f64,
}

impl Default for TableGeometry {
    fn default() -> Self {
        Self {
            width: DESIGN_WIDTH,
            height: DESIGN_HEIGHT,
        }
    }
}

impl TableGeometry {
    /// Anchor of the local player's seat.
    pub fn home(&self) -> Point {
        Point::new(self.width / 2.0 - EDGE_GAP, self.height - 100.0)
    }

    /// Anchors for `n` seats, `n` in `1..=MAX_SEATS`. Any other `n` yields
    /// no anchors.
    pub fn seat_positions(&self, n: usize) -> Vec<Point> {
        if n == 0 || n > MAX_SEATS {
            return Vec::new();
        }
        let mut positions = Vec::with_capacity(n);
        positions.push(self.home());
        positions.extend(self.others(n - 1));
        positions
    }

    fn others(&self, count: usize) -> Vec<Point> {
        let (w, h, g) = (self.width, self.height, EDGE_GAP);
        let right = Point::new(w - g, h / 2.0);
        let left = Point::new(g, h / 2.0);
        let top = |x: f64| Point::new(x, g / 2.0);
        let upper = |x: f64| Point::new(x, h / 4.0);
        let lower = |x: f64| Point::new(x, h - h / 4.0);

        match count {
            0 => vec![],
            1 => vec![Point::new(w / 2.0, g)],
            2 => vec![right, left],
            3 => vec![right, top(w / 2.0), left],
            4 => vec![right, top(w - w / 3.0), top(w / 3.0), left],
            5 => vec![right, top(w - w / 4.0), top(w / 2.0), top(w / 4.0), left],
            6 => vec![
                right,
                top(w - w / 3.0),
                top(w / 3.0),
                left,
                lower(w / 4.0),
                lower(w - w / 4.0),
            ],
            7 => vec![
                right,
                top(w - w / 4.0),
                top(w / 2.0),
                top(w / 4.0),
                left,
                lower(w / 4.0),
                lower(w - w / 4.0),
            ],
            8 => vec![
                right,
                upper(w - w / 6.0),
                top(w - w / 3.0),
                top(w / 3.0),
                upper(w / 6.0),
                left,
                lower(w / 4.0),
                lower(w - w / 4.0),
            ],
            _ => vec![
                right,
                upper(w - w / 6.0),
                top(w - w / 3.0),
                top(w / 2.0),
                top(w / 3.0),
                upper(w / 6.0),
                left,
                lower(w / 4.0),
                lower(w - w / 4.0),
            ],
        }
    }
}

/// Anchors for `n` seats at the design resolution.
pub fn seat_positions(n: usize) -> Vec<Point> {
    TableGeometry::default().seat_positions(n)
}
