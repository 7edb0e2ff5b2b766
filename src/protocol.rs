//! Wire contract: inbound commands, outbound responses and recipient sets.
//!
//! Commands and responses are closed tagged unions carried as JSON with a
//! `type` tag and a `data` payload. Coordinates are 0–9; seats are the
//! per-match opaque ids, not identity ids.

use serde::{Deserialize, Serialize};

use crate::common::{AttackStatus, IdentityId, MatchId, Seat, SessionId};
use crate::ship::Ship;

/// A parsed command delivered by the transport together with the sender's
/// connection identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Log in or register a display name.
    Register { name: String, secret: String },
    /// Open a matchmaking session with the sender as sole member.
    CreateSession,
    /// Open a session immediately paired with the scripted opponent.
    CreateSessionWithBot,
    /// Join an existing session as the second member.
    #[serde(rename_all = "camelCase")]
    JoinSession { session_id: SessionId },
    /// Submit a fleet for one seat of a match in the placing phase.
    #[serde(rename_all = "camelCase")]
    PlaceShips {
        match_id: MatchId,
        seat: Seat,
        ships: Vec<Ship>,
    },
    /// Attack a cell on the opponent's board.
    #[serde(rename_all = "camelCase")]
    Attack {
        match_id: MatchId,
        seat: Seat,
        x: u8,
        y: u8,
    },
    /// Attack a uniformly sampled untargeted cell.
    #[serde(rename_all = "camelCase")]
    RandomAttack { match_id: MatchId, seat: Seat },
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub wins: u32,
}

/// One lobby member as listed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMemberInfo {
    pub name: String,
    pub id: IdentityId,
}

/// One joinable session in the lobby listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub session_id: SessionId,
    pub members: Vec<SessionMemberInfo>,
}

/// Responses emitted by the router for the transport to deliver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Registration outcome, sender only.
    #[serde(rename_all = "camelCase")]
    Registered {
        name: String,
        id: IdentityId,
        error: bool,
        error_text: String,
    },
    /// Win table, broadcast to everyone connected.
    Leaderboard(Vec<LeaderboardEntry>),
    /// Joinable sessions, broadcast to everyone connected.
    SessionList(Vec<SessionInfo>),
    /// A session filled and produced a match; carries the recipient's seat.
    #[serde(rename_all = "camelCase")]
    MatchCreated { match_id: MatchId, seat: Seat },
    /// Both fleets are in. Carries only the recipient's own ships, and the
    /// recipient's seat in `turn_seat`; the active seat follows in a
    /// separate `turn_changed`.
    #[serde(rename_all = "camelCase")]
    MatchStarted { ships: Vec<Ship>, turn_seat: Seat },
    /// The named seat now holds the turn.
    #[serde(rename_all = "camelCase")]
    TurnChanged { turn_seat: Seat },
    /// One resolved cell of an attack.
    #[serde(rename_all = "camelCase")]
    AttackResult {
        x: u8,
        y: u8,
        attacker_seat: Seat,
        status: AttackStatus,
    },
    /// The match concluded; no turn notification follows.
    #[serde(rename_all = "camelCase")]
    MatchFinished { winner_seat: Seat },
    /// Generic protocol-level error, sender only.
    #[serde(rename_all = "camelCase")]
    Error { error_text: String },
}

/// Who a response is addressed to. The transport resolves identity ids to
/// live connections; ids without a connection (the bot's) are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipients {
    /// Only the connection the triggering command arrived on.
    Sender,
    /// Every connection authenticated as one of these identities.
    Identities(Vec<IdentityId>),
    /// Every connection, authenticated or not.
    All,
}

/// A response paired with its recipient set, in delivery order.
#[derive(Debug, Clone)]
pub struct Outbound {
    pub to: Recipients,
    pub message: ServerMessage,
}

impl Outbound {
    pub fn to_sender(message: ServerMessage) -> Self {
        Self {
            to: Recipients::Sender,
            message,
        }
    }

    pub fn to_players(a: IdentityId, b: IdentityId, message: ServerMessage) -> Self {
        Self {
            to: Recipients::Identities(vec![a, b]),
            message,
        }
    }

    pub fn to_all(message: ServerMessage) -> Self {
        Self {
            to: Recipients::All,
            message,
        }
    }
}
