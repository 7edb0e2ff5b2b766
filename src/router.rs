//! Message router: maps inbound commands to registry/engine operations and
//! collects the outbound notifications each one produces.
//!
//! The router owns the three registries and a seeded RNG; it has no
//! transport knowledge. Each dispatch returns the ordered responses to
//! deliver plus any deferred bot move the host must schedule. Within one
//! command the side-effect order is significant and preserved: the
//! identity store is updated before the leaderboard broadcast is computed,
//! attack cell reports precede the turn or finish notification.

use std::sync::Mutex;

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::common::{GameError, IdentityId, MatchId, Seat};
use crate::config::BOARD_SIZE;
use crate::game::{AttackOutcome, Game, MatchRegistry};
use crate::identity::IdentityRegistry;
use crate::protocol::{
    ClientCommand, LeaderboardEntry, Outbound, Recipients, ServerMessage, SessionInfo,
    SessionMemberInfo,
};
use crate::session::{SessionMember, SessionRegistry};
use crate::{bot, ship::Ship};

/// Display name the scripted opponent shows in session listings.
pub const BOT_NAME: &str = "Bot";

/// A deferred bot move. The host schedules it after the thinking delay and
/// feeds it back through [`Router::bot_move`], which re-validates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotTurn {
    pub match_id: MatchId,
    pub seat: Seat,
}

/// Result of dispatching one command.
#[derive(Debug, Default)]
pub struct Dispatch {
    /// The sender authenticated as this identity during the command.
    pub authenticated: Option<IdentityId>,
    /// Responses in delivery order.
    pub messages: Vec<Outbound>,
    /// Bot moves to schedule once this dispatch is delivered.
    pub bot_turns: Vec<BotTurn>,
}

/// Stateless dispatch over constructor-provided stores. The identity and
/// session registries each sit behind their own lock; matches are locked
/// individually so resolution in one match never blocks another.
pub struct Router {
    identities: Mutex<IdentityRegistry>,
    sessions: Mutex<SessionRegistry>,
    matches: MatchRegistry,
    rng: Mutex<SmallRng>,
}

impl Router {
    pub fn new() -> Self {
        let mut seed_rng = rand::rng();
        Self::with_rng(SmallRng::from_rng(&mut seed_rng))
    }

    /// Fixed seed for reproducible seats, first turns and bot behavior.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        Self {
            identities: Mutex::new(IdentityRegistry::new()),
            sessions: Mutex::new(SessionRegistry::new()),
            matches: MatchRegistry::new(),
            rng: Mutex::new(rng),
        }
    }

    /// Route one command from a connection. `sender` is the identity the
    /// connection has authenticated as, if any.
    pub fn dispatch(&self, sender: Option<IdentityId>, cmd: ClientCommand) -> Dispatch {
        match cmd {
            ClientCommand::Register { name, secret } => self.register(&name, &secret),
            ClientCommand::CreateSession => self.create_session(sender),
            ClientCommand::CreateSessionWithBot => self.create_session_with_bot(sender),
            ClientCommand::JoinSession { session_id } => self.join_session(sender, session_id),
            ClientCommand::PlaceShips {
                match_id,
                seat,
                ships,
            } => self.place_ships(match_id, seat, ships),
            ClientCommand::Attack {
                match_id,
                seat,
                x,
                y,
            } => self.attack(match_id, seat, Some((x, y))),
            ClientCommand::RandomAttack { match_id, seat } => self.attack(match_id, seat, None),
        }
    }

    /// Fire a previously scheduled bot move. The world may have changed
    /// while the bot was "thinking": the match may be gone or finished, or
    /// the turn may no longer be the bot's. All of those are silent no-ops.
    pub fn bot_move(&self, turn: BotTurn) -> Dispatch {
        let Some(game) = self.matches.get(turn.match_id) else {
            debug!("bot move for vanished match {}", turn.match_id);
            return Dispatch::default();
        };
        {
            let game = game.lock().unwrap();
            if !game.is_bot_turn() || game.turn_seat() != turn.seat {
                debug!("stale bot move for match {}", turn.match_id);
                return Dispatch::default();
            }
        }
        info!("bot moves in match {}", turn.match_id);
        self.attack(turn.match_id, turn.seat, None)
    }

    fn register(&self, name: &str, secret: &str) -> Dispatch {
        let mut out = Dispatch::default();
        if name.is_empty() || secret.is_empty() {
            out.messages.push(Outbound::to_sender(ServerMessage::Registered {
                name: name.to_string(),
                id: 0,
                error: true,
                error_text: "name and secret are required".to_string(),
            }));
            return out;
        }
        let result = self.identities.lock().unwrap().register(name, secret);
        match result {
            Ok((identity, is_new)) => {
                info!(
                    "{} {:?} (id {})",
                    if is_new { "registered" } else { "logged in" },
                    identity.name,
                    identity.id
                );
                out.authenticated = Some(identity.id);
                out.messages.push(Outbound::to_sender(ServerMessage::Registered {
                    name: identity.name,
                    id: identity.id,
                    error: false,
                    error_text: String::new(),
                }));
                // store updated above, so the broadcast sees the new entry
                out.messages.push(Outbound::to_all(self.leaderboard_message()));
                out.messages.push(Outbound::to_all(self.session_list_message()));
            }
            Err(err) => {
                warn!("registration failed for {:?}: {}", name, err);
                out.messages.push(Outbound::to_sender(ServerMessage::Registered {
                    name: name.to_string(),
                    id: 0,
                    error: true,
                    error_text: err.to_string(),
                }));
            }
        }
        out
    }

    fn create_session(&self, sender: Option<IdentityId>) -> Dispatch {
        let mut out = Dispatch::default();
        let Some(member) = self.member_of(sender) else {
            warn!("create_session from unauthenticated connection");
            return out;
        };
        self.sessions.lock().unwrap().create(member);
        out.messages.push(Outbound::to_all(self.session_list_message()));
        out
    }

    fn join_session(&self, sender: Option<IdentityId>, session_id: u64) -> Dispatch {
        let mut out = Dispatch::default();
        let Some(member) = self.member_of(sender) else {
            warn!("join_session from unauthenticated connection");
            return out;
        };

        let joined = {
            let mut sessions = self.sessions.lock().unwrap();
            match sessions.join(session_id, member) {
                Ok(session) => {
                    let a = session.members[0].clone();
                    let b = session.members[1].clone();
                    Ok((a, b))
                }
                Err(err) => Err(err),
            }
        };

        match joined {
            Ok((a, b)) => {
                let (match_id, game) = {
                    let mut rng = self.rng.lock().unwrap();
                    self.matches.create(a.id, b.id, &mut rng)
                };
                self.sessions.lock().unwrap().link_match(session_id, match_id);

                let game = game.lock().unwrap();
                for member in [&a, &b] {
                    if let Some(seat) = game.seat_of(member.id) {
                        out.messages.push(Outbound {
                            to: Recipients::Identities(vec![member.id]),
                            message: ServerMessage::MatchCreated { match_id, seat },
                        });
                    }
                }
                drop(game);
                out.messages.push(Outbound::to_all(self.session_list_message()));
            }
            Err(err) => {
                warn!("join_session {} failed: {}", session_id, err);
                out.messages.push(Outbound::to_sender(ServerMessage::Error {
                    error_text: err.to_string(),
                }));
            }
        }
        out
    }

    fn create_session_with_bot(&self, sender: Option<IdentityId>) -> Dispatch {
        let mut out = Dispatch::default();
        let Some(member) = self.member_of(sender) else {
            warn!("create_session_with_bot from unauthenticated connection");
            return out;
        };
        let human_id = member.id;

        // the bot's identity is minted but never registered, so a bot win
        // never lands on the leaderboard
        let bot_id = self.identities.lock().unwrap().mint_id();
        let bot_member = SessionMember {
            id: bot_id,
            name: BOT_NAME.to_string(),
        };

        let session_id = {
            let mut sessions = self.sessions.lock().unwrap();
            let id = sessions.create(member);
            if sessions.join(id, bot_member).is_err() {
                // freshly created with one member, join cannot fail
                return out;
            }
            id
        };

        let (match_id, game) = {
            let mut rng = self.rng.lock().unwrap();
            self.matches.create(human_id, bot_id, &mut rng)
        };
        self.sessions.lock().unwrap().link_match(session_id, match_id);

        {
            let mut game = game.lock().unwrap();
            let bot_seat = game.seat_of(bot_id).unwrap_or_default();
            game.set_bot_seat(bot_seat);
            let placed = {
                let mut rng = self.rng.lock().unwrap();
                let fleet = bot::random_fleet(&mut rng);
                game.place_ships(bot_seat, fleet, &mut rng)
            };
            if let Err(err) = placed {
                warn!("bot fleet rejected in match {}: {}", match_id, err);
            }
            if let Some(seat) = game.seat_of(human_id) {
                out.messages.push(Outbound {
                    to: Recipients::Identities(vec![human_id]),
                    message: ServerMessage::MatchCreated { match_id, seat },
                });
            }
        }
        out.messages.push(Outbound::to_all(self.session_list_message()));
        out
    }

    fn place_ships(&self, match_id: MatchId, seat: Seat, ships: Vec<Ship>) -> Dispatch {
        let mut out = Dispatch::default();
        let Some(game) = self.matches.get(match_id) else {
            debug!("place_ships for unknown match {}", match_id);
            return out;
        };
        let mut game = game.lock().unwrap();
        let placed = {
            let mut rng = self.rng.lock().unwrap();
            game.place_ships(seat, ships, &mut rng)
        };
        match placed {
            Ok(Some(start)) => {
                for (identity, player_seat) in game.players() {
                    let ships = game
                        .board_of_seat(player_seat)
                        .map(|b| b.ships().to_vec())
                        .unwrap_or_default();
                    out.messages.push(Outbound {
                        to: Recipients::Identities(vec![identity]),
                        message: ServerMessage::MatchStarted {
                            ships,
                            turn_seat: player_seat,
                        },
                    });
                }
                let [(a, _), (b, _)] = game.players();
                out.messages.push(Outbound::to_players(
                    a,
                    b,
                    ServerMessage::TurnChanged {
                        turn_seat: start.turn_seat,
                    },
                ));
                if game.is_bot_turn() {
                    out.bot_turns.push(BotTurn {
                        match_id,
                        seat: start.turn_seat,
                    });
                }
            }
            Ok(None) => {}
            Err(GameError::InvalidPlacement) => {
                out.messages.push(Outbound::to_sender(ServerMessage::Error {
                    error_text: GameError::InvalidPlacement.to_string(),
                }));
            }
            Err(err) => {
                // duplicate or late placement, benign race
                debug!("place_ships ignored for match {}: {}", match_id, err);
            }
        }
        out
    }

    /// Shared attack path. `target` is `None` for random attacks.
    fn attack(&self, match_id: MatchId, seat: Seat, target: Option<(u8, u8)>) -> Dispatch {
        let mut out = Dispatch::default();
        if let Some((x, y)) = target {
            if x >= BOARD_SIZE || y >= BOARD_SIZE {
                out.messages.push(Outbound::to_sender(ServerMessage::Error {
                    error_text: format!("coordinates ({}, {}) out of range", x, y),
                }));
                return out;
            }
        }
        let Some(game) = self.matches.get(match_id) else {
            debug!("attack on unknown match {}", match_id);
            return out;
        };

        // finish bookkeeping happens after the match lock is released
        let mut finish: Option<(IdentityId, Seat)> = None;
        {
            let mut game = game.lock().unwrap();
            let resolved = match target {
                Some((x, y)) => game.attack(seat, x, y),
                None => {
                    let mut rng = self.rng.lock().unwrap();
                    game.random_attack(seat, &mut rng)
                }
            };
            match resolved {
                Ok(outcome) => {
                    finish = outcome.winner;
                    self.push_attack_messages(&game, &outcome, &mut out);
                    if game.is_bot_turn() {
                        out.bot_turns.push(BotTurn {
                            match_id,
                            seat: game.turn_seat(),
                        });
                    }
                }
                Err(err) => {
                    // late or duplicate messages are benign races
                    debug!("attack ignored for match {}: {}", match_id, err);
                }
            }
        }

        if let Some((winner_id, _)) = finish {
            let mut identities = self.identities.lock().unwrap();
            identities.increment_wins(winner_id);
            drop(identities);
            out.messages.push(Outbound::to_all(self.leaderboard_message()));
            self.matches.remove(match_id);
        }
        out
    }

    fn push_attack_messages(&self, game: &Game, outcome: &AttackOutcome, out: &mut Dispatch) {
        let [(a, _), (b, _)] = game.players();
        for report in &outcome.reports {
            out.messages.push(Outbound::to_players(
                a,
                b,
                ServerMessage::AttackResult {
                    x: report.x,
                    y: report.y,
                    attacker_seat: outcome.attacker_seat,
                    status: report.status,
                },
            ));
        }
        if let Some((_, winner_seat)) = outcome.winner {
            out.messages.push(Outbound::to_players(
                a,
                b,
                ServerMessage::MatchFinished { winner_seat },
            ));
        } else if let Some(turn_seat) = outcome.turn {
            out.messages.push(Outbound::to_players(
                a,
                b,
                ServerMessage::TurnChanged { turn_seat },
            ));
        }
    }

    fn member_of(&self, sender: Option<IdentityId>) -> Option<SessionMember> {
        let id = sender?;
        let identities = self.identities.lock().unwrap();
        identities.find(id).map(|identity| SessionMember {
            id,
            name: identity.name.clone(),
        })
    }

    fn leaderboard_message(&self) -> ServerMessage {
        let identities = self.identities.lock().unwrap();
        ServerMessage::Leaderboard(
            identities
                .leaderboard()
                .into_iter()
                .map(|i| LeaderboardEntry {
                    name: i.name,
                    wins: i.wins,
                })
                .collect(),
        )
    }

    fn session_list_message(&self) -> ServerMessage {
        let sessions = self.sessions.lock().unwrap();
        ServerMessage::SessionList(
            sessions
                .available()
                .into_iter()
                .map(|s| SessionInfo {
                    session_id: s.id,
                    members: s
                        .members
                        .iter()
                        .map(|m| SessionMemberInfo {
                            name: m.name.clone(),
                            id: m.id,
                        })
                        .collect(),
                })
                .collect(),
        )
    }

    /// Number of live matches, for diagnostics and tests.
    pub fn live_matches(&self) -> usize {
        self.matches.len()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
