//! Session registry: matchmaking rooms holding one or two identities.

use std::collections::BTreeMap;

use log::info;

use crate::common::{GameError, IdentityId, MatchId, SessionId};

/// A member of a session. The name is copied in at join time so lobby
/// listings never need the identity registry's lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMember {
    pub id: IdentityId,
    pub name: String,
}

/// A matchmaking room. Never holds more than two members; once full it is
/// linked to exactly one match and excluded from the lobby listing.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub members: Vec<SessionMember>,
    pub match_id: Option<MatchId>,
}

impl Session {
    pub fn is_full(&self) -> bool {
        self.members.len() == 2
    }
}

/// Owned store of every session, keyed by id. Ids are allocated in
/// ascending order, so key order is creation order.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: BTreeMap<SessionId, Session>,
    next_id: SessionId,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new session with a single member.
    pub fn create(&mut self, member: SessionMember) -> SessionId {
        let id = self.next_id;
        self.next_id += 1;
        info!("session {} created by {:?}", id, member.name);
        self.sessions.insert(
            id,
            Session {
                id,
                members: vec![member],
                match_id: None,
            },
        );
        id
    }

    /// Add a second member. The caller must create a match and link it when
    /// the returned session is full.
    pub fn join(&mut self, id: SessionId, member: SessionMember) -> Result<&Session, GameError> {
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(GameError::SessionNotFound)?;
        if session.is_full() {
            return Err(GameError::SessionFull);
        }
        info!("session {}: {:?} joined", id, member.name);
        session.members.push(member);
        Ok(session)
    }

    /// Record the match a full session produced.
    pub fn link_match(&mut self, id: SessionId, match_id: MatchId) {
        if let Some(session) = self.sessions.get_mut(&id) {
            session.match_id = Some(match_id);
        }
    }

    /// The matchmaking lobby: sessions still waiting for a second member,
    /// in creation order.
    pub fn available(&self) -> Vec<&Session> {
        self.sessions
            .values()
            .filter(|s| s.members.len() == 1)
            .collect()
    }
}
