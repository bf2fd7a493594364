//! Collaborator implementations and terminal front end for the in-between
//! table client.
//!
//! This library provides the HTTP authority client, the WebSocket event
//! transport, the external signer, command parsing, the prompt loop and text
//! rendering used by the ib_client binary.

pub mod api_client;
pub mod commands;
pub mod console;
pub mod config;
pub mod display;
pub mod logging;
pub mod signer;
pub mod subscription;
