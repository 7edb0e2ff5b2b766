//! Identity registry: display names, login-or-register, win counters.

use log::info;

use crate::common::{GameError, IdentityId};

/// A registered player identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: IdentityId,
    pub name: String,
    pub wins: u32,
}

#[derive(Debug)]
struct Record {
    identity: Identity,
    secret: String,
}

/// Owned store of every identity, in registration order.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    records: Vec<Record>,
    next_id: IdentityId,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh identity id without registering anything. Used for
    /// bot seats, whose wins are never tracked; `increment_wins` on such an
    /// id is a silent no-op.
    pub fn mint_id(&mut self) -> IdentityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Log in or register under `name`. Returns the identity and whether it
    /// was newly created. An existing name with a non-matching secret fails
    /// with `AuthFailure` and changes nothing.
    pub fn register(&mut self, name: &str, secret: &str) -> Result<(Identity, bool), GameError> {
        if let Some(rec) = self.records.iter().find(|r| r.identity.name == name) {
            if rec.secret != secret {
                return Err(GameError::AuthFailure);
            }
            return Ok((rec.identity.clone(), false));
        }
        let identity = Identity {
            id: self.mint_id(),
            name: name.to_string(),
            wins: 0,
        };
        info!("registered new player {:?} (id {})", name, identity.id);
        self.records.push(Record {
            identity: identity.clone(),
            secret: secret.to_string(),
        });
        Ok((identity, true))
    }

    pub fn find(&self, id: IdentityId) -> Option<&Identity> {
        self.records
            .iter()
            .map(|r| &r.identity)
            .find(|i| i.id == id)
    }

    /// Credit a win. Unknown ids (the bot's, or a stale one) are ignored.
    pub fn increment_wins(&mut self, id: IdentityId) {
        if let Some(rec) = self.records.iter_mut().find(|r| r.identity.id == id) {
            rec.identity.wins += 1;
            info!(
                "player {:?} now has {} wins",
                rec.identity.name, rec.identity.wins
            );
        }
    }

    /// Identities sorted by wins descending; ties keep registration order.
    pub fn leaderboard(&self) -> Vec<Identity> {
        let mut all: Vec<Identity> = self.records.iter().map(|r| r.identity.clone()).collect();
        all.sort_by(|a, b| b.wins.cmp(&a.wins));
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_then_login() {
        let mut reg = IdentityRegistry::new();
        let (first, is_new) = reg.register("ada", "pw").unwrap();
        assert!(is_new);
        let (again, is_new) = reg.register("ada", "pw").unwrap();
        assert!(!is_new);
        assert_eq!(first.id, again.id);
        assert_eq!(reg.register("ada", "wrong"), Err(GameError::AuthFailure));
    }

    #[test]
    fn leaderboard_is_stable_on_ties() {
        let mut reg = IdentityRegistry::new();
        let (a, _) = reg.register("a", "x").unwrap();
        let (b, _) = reg.register("b", "x").unwrap();
        let (c, _) = reg.register("c", "x").unwrap();
        reg.increment_wins(b.id);
        let board = reg.leaderboard();
        assert_eq!(
            board.iter().map(|i| i.id).collect::<Vec<_>>(),
            vec![b.id, a.id, c.id]
        );
        // unknown id is a no-op
        reg.increment_wins(9999);
        assert_eq!(reg.leaderboard().len(), 3);
    }
}
