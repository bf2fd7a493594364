//! Client-side mirror of a single board.
//!
//! This module implements:
//! - BoardMirror: seats in layout order, the deck, the pot and the turn
//! - Reconciler: folds snapshots and deltas into the mirror
//! - Countdown: per-seat turn timers on their own tick tasks
//! - TableActor: serializes events, commands and flow results
//!
//! ## Architecture
//!
//! The actor runs in its own Tokio task and owns the reconciler. Board
//! events, player commands and results of spawned requests all arrive on
//! channels, so the mirror only ever changes inside the actor. Every change
//! is published as a [`TableView`] on a watch channel.
//!
//! ## Example
//!
//! ```ignore
//! use in_between::table::{open_table, TableCommand, TableConfig, SystemClock};
//! use std::sync::Arc;
//!
//! let table = open_table(orchestrator, &subscriber, Arc::new(SystemClock), TableConfig::default()).await?;
//! tokio::spawn(table.actor.run(table.events));
//! table.handle.send(TableCommand::Stake { amount: 2_000_000_000 }).await?;
//! ```

pub mod actor;
pub mod config;
pub mod countdown;
pub mod messages;
pub mod mirror;
pub mod reconcile;

pub use actor::{OpenTable, TableActor, TableHandle, open_table};
pub use config::TableConfig;
pub use countdown::{Clock, Countdown, SystemClock, TokioClock};
pub use messages::{Notice, SeatSummary, TableCommand, TableView};
pub use mirror::{BoardMirror, SeatView};
pub use reconcile::{Effect, HandsStamp, Reconciler};
