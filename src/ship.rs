//! Ship definitions: kind, placement geometry and per-segment hit tracking.

use serde::{Deserialize, Serialize};

/// Size class of a ship. Determines its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShipKind {
    Small,
    Medium,
    Large,
    Huge,
}

impl ShipKind {
    /// Number of cells a ship of this kind occupies.
    pub const fn length(self) -> u8 {
        match self {
            ShipKind::Small => 1,
            ShipKind::Medium => 2,
            ShipKind::Large => 3,
            ShipKind::Huge => 4,
        }
    }
}

/// A cell coordinate, x across and y down, both 0–9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: u8,
    pub y: u8,
}

/// A ship on the board. Shape is immutable once placed; only the hit
/// mask mutates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ship {
    pub position: Point,
    pub horizontal: bool,
    pub kind: ShipKind,
    pub length: u8,
    /// One flag per segment, indexed from the origin.
    #[serde(skip)]
    hits: Vec<bool>,
}

impl Ship {
    pub fn new(kind: ShipKind, position: Point, horizontal: bool) -> Self {
        let length = kind.length();
        Self {
            position,
            horizontal,
            kind,
            length,
            hits: vec![false; length as usize],
        }
    }

    /// The ship's declared length matches its kind. Client-submitted
    /// ships carry both fields and may disagree.
    pub fn shape_consistent(&self) -> bool {
        self.length == self.kind.length()
    }

    /// Coordinate of segment `i`, counted from the origin.
    pub fn segment(&self, i: u8) -> Point {
        if self.horizontal {
            Point {
                x: self.position.x.wrapping_add(i),
                y: self.position.y,
            }
        } else {
            Point {
                x: self.position.x,
                y: self.position.y.wrapping_add(i),
            }
        }
    }

    /// Iterate the cells this ship occupies.
    pub fn cells(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.length).map(|i| self.segment(i))
    }

    /// Whether the ship occupies `(x, y)`.
    pub fn occupies(&self, x: u8, y: u8) -> bool {
        self.cells().any(|p| p.x == x && p.y == y)
    }

    /// Reset the hit mask to all-unhit. Applied when client-submitted
    /// ships are ingested, since the wire format does not carry hits.
    pub fn reset_hits(&mut self) {
        self.hits = vec![false; self.length as usize];
    }

    /// Record a hit on the segment at `(x, y)`. Returns `false` when the
    /// ship does not occupy that cell.
    pub fn register_hit(&mut self, x: u8, y: u8) -> bool {
        for i in 0..self.length {
            let p = self.segment(i);
            if p.x == x && p.y == y {
                self.hits[i as usize] = true;
                return true;
            }
        }
        false
    }

    /// A ship is destroyed once every segment has been hit.
    pub fn is_destroyed(&self) -> bool {
        self.hits.iter().all(|&h| h)
    }
}
