//! Server-authoritative engine for a two-player 10×10 grid combat game.
//!
//! The crate tracks matchmaking, ship placement, turn order and shot
//! resolution for many concurrent matches, and tells the transport which
//! connected clients each state change must reach. The [`Router`] is the
//! entry point: feed it parsed commands with a sender identity and deliver
//! the notifications it returns.

mod board;
mod bot;
mod common;
mod config;
mod game;
mod identity;
mod logging;
mod protocol;
mod router;
mod server;
mod session;
mod ship;

pub use board::*;
pub use bot::*;
pub use common::*;
pub use config::*;
pub use game::*;
pub use identity::*;
pub use logging::init_logging;
pub use protocol::*;
pub use router::*;
pub use server::*;
pub use session::*;
pub use ship::*;
