//! Live match state and the attack-resolution engine.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::{debug, info};
use rand::Rng;

use crate::board::{Board, CellState};
use crate::common::{AttackStatus, GameError, IdentityId, MatchId, Seat};
use crate::config::SEAT_SPACE;
use crate::ship::Ship;

/// Lifecycle phase of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for both fleets.
    Placing,
    /// Turns are being played.
    Active,
    /// A winner has been recorded.
    Finished,
}

#[derive(Debug)]
struct PlayerSlot {
    identity: IdentityId,
    seat: Seat,
    board: Board,
}

/// One attack notification: a cell and its resolved status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShotReport {
    pub x: u8,
    pub y: u8,
    pub status: AttackStatus,
}

/// Everything one resolved attack produced, in delivery order: cell
/// reports first, then the turn change or finish.
#[derive(Debug, Clone)]
pub struct AttackOutcome {
    pub attacker_seat: Seat,
    pub reports: Vec<ShotReport>,
    /// New active seat, present only when the turn switched.
    pub turn: Option<Seat>,
    /// Winning identity and seat, present when this attack ended the match.
    pub winner: Option<(IdentityId, Seat)>,
}

/// Emitted when the second fleet arrives and the turn phase begins.
#[derive(Debug, Clone, Copy)]
pub struct MatchStart {
    pub turn_seat: Seat,
}

/// One in-progress match: two boards, whose turn it is, finished flag.
#[derive(Debug)]
pub struct Game {
    id: MatchId,
    slots: [PlayerSlot; 2],
    turn_seat: Seat,
    phase: Phase,
    winner: Option<IdentityId>,
    bot_seat: Option<Seat>,
}

impl Game {
    /// Create a match between two identities with two empty boards. Seats
    /// are random 20-bit integers, distinct within the match.
    pub fn new<R: Rng>(id: MatchId, a: IdentityId, b: IdentityId, rng: &mut R) -> Self {
        let seat_a = rng.random_range(0..SEAT_SPACE);
        let seat_b = loop {
            let s = rng.random_range(0..SEAT_SPACE);
            if s != seat_a {
                break s;
            }
        };
        Self {
            id,
            slots: [
                PlayerSlot {
                    identity: a,
                    seat: seat_a,
                    board: Board::new(),
                },
                PlayerSlot {
                    identity: b,
                    seat: seat_b,
                    board: Board::new(),
                },
            ],
            turn_seat: seat_a,
            phase: Phase::Placing,
            winner: None,
            bot_seat: None,
        }
    }

    pub fn id(&self) -> MatchId {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn turn_seat(&self) -> Seat {
        self.turn_seat
    }

    pub fn winner(&self) -> Option<IdentityId> {
        self.winner
    }

    /// `(identity, seat)` for both players, slot order.
    pub fn players(&self) -> [(IdentityId, Seat); 2] {
        [
            (self.slots[0].identity, self.slots[0].seat),
            (self.slots[1].identity, self.slots[1].seat),
        ]
    }

    pub fn seat_of(&self, identity: IdentityId) -> Option<Seat> {
        self.slots
            .iter()
            .find(|s| s.identity == identity)
            .map(|s| s.seat)
    }

    /// Mark one seat as driven by the scripted opponent.
    pub fn set_bot_seat(&mut self, seat: Seat) {
        self.bot_seat = Some(seat);
    }

    pub fn bot_seat(&self) -> Option<Seat> {
        self.bot_seat
    }

    /// The bot should be scheduled to move.
    pub fn is_bot_turn(&self) -> bool {
        self.phase == Phase::Active && self.bot_seat == Some(self.turn_seat)
    }

    pub fn board_of_seat(&self, seat: Seat) -> Result<&Board, GameError> {
        Ok(&self.slots[self.slot_index(seat)?].board)
    }

    fn slot_index(&self, seat: Seat) -> Result<usize, GameError> {
        self.slots
            .iter()
            .position(|s| s.seat == seat)
            .ok_or(GameError::SeatNotFound)
    }

    /// Ingest a fleet for `seat`. When this makes both boards ready the
    /// match goes active with a uniformly random first seat.
    pub fn place_ships<R: Rng>(
        &mut self,
        seat: Seat,
        ships: Vec<Ship>,
        rng: &mut R,
    ) -> Result<Option<MatchStart>, GameError> {
        if self.phase != Phase::Placing {
            return Err(GameError::WrongPhase);
        }
        let idx = self.slot_index(seat)?;
        self.slots[idx].board.place_ships(ships)?;
        debug!(
            "match {}: seat {} placed {} ships",
            self.id,
            seat,
            self.slots[idx].board.ships().len()
        );

        if self.slots.iter().all(|s| s.board.is_ready()) {
            self.phase = Phase::Active;
            self.turn_seat = if rng.random() {
                self.slots[0].seat
            } else {
                self.slots[1].seat
            };
            info!("match {}: started, first seat {}", self.id, self.turn_seat);
            return Ok(Some(MatchStart {
                turn_seat: self.turn_seat,
            }));
        }
        Ok(None)
    }

    /// Resolve an attack by `seat` on the opponent's board.
    ///
    /// A hit or kill keeps the turn; a miss on an empty cell switches it.
    /// Re-targeting an already-resolved cell is an idempotent miss that
    /// changes nothing and keeps the turn.
    pub fn attack(&mut self, seat: Seat, x: u8, y: u8) -> Result<AttackOutcome, GameError> {
        match self.phase {
            Phase::Finished => return Err(GameError::MatchFinished),
            Phase::Placing => return Err(GameError::WrongPhase),
            Phase::Active => {}
        }
        let attacker_idx = self.slot_index(seat)?;
        if self.turn_seat != seat {
            return Err(GameError::NotYourTurn);
        }
        let defender_idx = 1 - attacker_idx;
        let match_id = self.id;
        let defender = &mut self.slots[defender_idx];

        let mut reports = Vec::new();
        let mut switch_turn = false;
        match defender.board.cell(x, y) {
            CellState::Ship => {
                defender.board.mark(x, y, CellState::Hit);
                // a rasterized ship cell always belongs to a ship
                let ship_idx = defender
                    .board
                    .ship_index_at(x, y)
                    .ok_or(GameError::UnknownShipHit)?;
                defender.board.ship_mut(ship_idx).register_hit(x, y);
                if defender.board.ships()[ship_idx].is_destroyed() {
                    debug!("match {}: ship destroyed at ({}, {})", match_id, x, y);
                    reports.push(ShotReport {
                        x,
                        y,
                        status: AttackStatus::Killed,
                    });
                    for p in defender.board.mark_around_ship(ship_idx) {
                        reports.push(ShotReport {
                            x: p.x,
                            y: p.y,
                            status: AttackStatus::Miss,
                        });
                    }
                } else {
                    reports.push(ShotReport {
                        x,
                        y,
                        status: AttackStatus::Shot,
                    });
                }
            }
            CellState::Empty => {
                defender.board.mark(x, y, CellState::Miss);
                reports.push(ShotReport {
                    x,
                    y,
                    status: AttackStatus::Miss,
                });
                switch_turn = true;
            }
            CellState::Hit | CellState::Miss => {
                // already-resolved cell carries no new information
                reports.push(ShotReport {
                    x,
                    y,
                    status: AttackStatus::Miss,
                });
            }
        }

        let mut outcome = AttackOutcome {
            attacker_seat: seat,
            reports,
            turn: None,
            winner: None,
        };

        if self.slots[defender_idx].board.all_ships_destroyed() {
            self.phase = Phase::Finished;
            let winner_id = self.slots[attacker_idx].identity;
            self.winner = Some(winner_id);
            info!("match {}: finished, winner seat {}", self.id, seat);
            outcome.winner = Some((winner_id, seat));
            return Ok(outcome);
        }

        if switch_turn {
            self.turn_seat = self.slots[defender_idx].seat;
            outcome.turn = Some(self.turn_seat);
        }
        Ok(outcome)
    }

    /// Attack a uniformly sampled untargeted cell of the opponent's board.
    pub fn random_attack<R: Rng>(
        &mut self,
        seat: Seat,
        rng: &mut R,
    ) -> Result<AttackOutcome, GameError> {
        match self.phase {
            Phase::Finished => return Err(GameError::MatchFinished),
            Phase::Placing => return Err(GameError::WrongPhase),
            Phase::Active => {}
        }
        let attacker_idx = self.slot_index(seat)?;
        if self.turn_seat != seat {
            return Err(GameError::NotYourTurn);
        }
        let target = self.slots[1 - attacker_idx].board.random_target(rng);
        self.attack(seat, target.x, target.y)
    }
}

/// Owned store of live matches. Each match sits behind its own lock so
/// matches stay independent; the registry's own lock only guards the map.
#[derive(Debug, Default)]
pub struct MatchRegistry {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    games: HashMap<MatchId, Arc<Mutex<Game>>>,
    next_id: MatchId,
}

impl MatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a match between two identities and return its handle.
    pub fn create<R: Rng>(
        &self,
        a: IdentityId,
        b: IdentityId,
        rng: &mut R,
    ) -> (MatchId, Arc<Mutex<Game>>) {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id;
        inner.next_id += 1;
        let game = Arc::new(Mutex::new(Game::new(id, a, b, rng)));
        inner.games.insert(id, Arc::clone(&game));
        info!("match {} created ({} vs {})", id, a, b);
        (id, game)
    }

    pub fn get(&self, id: MatchId) -> Option<Arc<Mutex<Game>>> {
        self.inner.lock().unwrap().games.get(&id).cloned()
    }

    /// Drop a concluded match. No post-game state is retained.
    pub fn remove(&self, id: MatchId) {
        self.inner.lock().unwrap().games.remove(&id);
        info!("match {} removed", id);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
