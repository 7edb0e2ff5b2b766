//! Common types: id aliases, attack status and the engine error taxonomy.

use serde::{Deserialize, Serialize};

/// Persistent player identity id.
pub type IdentityId = u64;
/// Matchmaking session id.
pub type SessionId = u64;
/// Live match id.
pub type MatchId = u64;
/// Per-match opaque player slot id, visible on the wire.
pub type Seat = u32;

/// Outcome of one attack as reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackStatus {
    /// No ship at the target cell.
    Miss,
    /// A ship segment was struck but the ship survives.
    Shot,
    /// The struck ship has every segment hit.
    Killed,
}

/// Errors returned by registry and engine operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Wrong secret for an existing display name.
    AuthFailure,
    /// Session id is not known to the registry.
    SessionNotFound,
    /// Session already holds two members.
    SessionFull,
    /// A ship's cells fall outside the board, or its length does not
    /// match its kind.
    InvalidPlacement,
    /// The requesting seat does not hold the turn.
    NotYourTurn,
    /// The match has already concluded.
    MatchFinished,
    /// Match id is not known to the registry.
    MatchNotFound,
    /// The seat does not belong to either player of the match.
    SeatNotFound,
    /// The match is not in the phase the operation requires.
    WrongPhase,
    /// A ship-state cell had no owning ship; indicates a corrupted board.
    UnknownShipHit,
}

impl core::fmt::Display for GameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            GameError::AuthFailure => write!(f, "wrong password for existing player"),
            GameError::SessionNotFound => write!(f, "session not found"),
            GameError::SessionFull => write!(f, "session already has two players"),
            GameError::InvalidPlacement => write!(f, "ship placement is invalid"),
            GameError::NotYourTurn => write!(f, "not this seat's turn"),
            GameError::MatchFinished => write!(f, "match is already finished"),
            GameError::MatchNotFound => write!(f, "match not found"),
            GameError::SeatNotFound => write!(f, "seat does not belong to this match"),
            GameError::WrongPhase => write!(f, "match is not in the required phase"),
            GameError::UnknownShipHit => write!(f, "no ship found at a ship-state cell"),
        }
    }
}

impl std::error::Error for GameError {}
