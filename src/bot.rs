//! Scripted opponent: randomized fleet placement.
//!
//! The bot's moves are plain `random_attack` resolutions; only its
//! placement needs dedicated logic, since no external client validates it.

use log::warn;
use rand::Rng;

use crate::config::{BOARD_SIZE, FLEET, PLACEMENT_ATTEMPTS};
use crate::ship::{Point, Ship};

/// Place the standard fleet by randomized trial placement: sample an
/// origin and orientation, accept when the ship's cells and their
/// 8-neighborhoods touch no already-placed ship. A ship that cannot be
/// placed within the attempt budget is skipped; the match proceeds with a
/// smaller fleet.
pub fn random_fleet<R: Rng>(rng: &mut R) -> Vec<Ship> {
    let mut occupied = [[false; BOARD_SIZE as usize]; BOARD_SIZE as usize];
    let mut ships = Vec::new();

    for kind in FLEET {
        let len = kind.length();
        let mut placed = false;
        for _ in 0..PLACEMENT_ATTEMPTS {
            let horizontal: bool = rng.random();
            let (max_x, max_y) = if horizontal {
                (BOARD_SIZE - len, BOARD_SIZE - 1)
            } else {
                (BOARD_SIZE - 1, BOARD_SIZE - len)
            };
            let origin = Point {
                x: rng.random_range(0..=max_x),
                y: rng.random_range(0..=max_y),
            };
            let ship = Ship::new(kind, origin, horizontal);
            if ship.cells().all(|p| clear_around(&occupied, p)) {
                for p in ship.cells() {
                    occupied[p.y as usize][p.x as usize] = true;
                }
                ships.push(ship);
                placed = true;
                break;
            }
        }
        if !placed {
            warn!(
                "bot failed to place a {:?} ship within {} attempts",
                kind, PLACEMENT_ATTEMPTS
            );
        }
    }
    ships
}

/// No placed ship occupies `p` or any of its 8 neighbors.
fn clear_around(occupied: &[[bool; BOARD_SIZE as usize]; BOARD_SIZE as usize], p: Point) -> bool {
    for dy in -1i16..=1 {
        for dx in -1i16..=1 {
            let nx = p.x as i16 + dx;
            let ny = p.y as i16 + dy;
            if (0..BOARD_SIZE as i16).contains(&nx)
                && (0..BOARD_SIZE as i16).contains(&ny)
                && occupied[ny as usize][nx as usize]
            {
                return false;
            }
        }
    }
    true
}
