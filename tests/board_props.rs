use flotilla::{random_fleet, Board, CellState, Point, Ship, ShipKind, BOARD_SIZE};
use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn kind_strategy() -> impl Strategy<Value = ShipKind> {
    prop_oneof![
        Just(ShipKind::Small),
        Just(ShipKind::Medium),
        Just(ShipKind::Large),
        Just(ShipKind::Huge),
    ]
}

/// Any ship whose cells all fit on the board.
fn ship_strategy() -> impl Strategy<Value = Ship> {
    (kind_strategy(), any::<bool>()).prop_flat_map(|(kind, horizontal)| {
        let len = kind.length();
        let (max_x, max_y) = if horizontal {
            (BOARD_SIZE - len, BOARD_SIZE - 1)
        } else {
            (BOARD_SIZE - 1, BOARD_SIZE - len)
        };
        (0..=max_x, 0..=max_y)
            .prop_map(move |(x, y)| Ship::new(kind, Point { x, y }, horizontal))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The rasterized cells are exactly the union of the ships' cells.
    #[test]
    fn placement_matches_ship_union(ships in prop::collection::vec(ship_strategy(), 1..=10)) {
        let mut board = Board::new();
        board.place_ships(ships.clone()).unwrap();

        let mut covered = [[false; BOARD_SIZE as usize]; BOARD_SIZE as usize];
        for ship in &ships {
            for p in ship.cells() {
                covered[p.y as usize][p.x as usize] = true;
            }
        }
        for y in 0..BOARD_SIZE {
            for x in 0..BOARD_SIZE {
                prop_assert_eq!(
                    board.cell(x, y) == CellState::Ship,
                    covered[y as usize][x as usize]
                );
            }
        }
    }

    /// Random targeting only ever picks cells not yet resolved.
    #[test]
    fn random_target_avoids_resolved_cells(seed in any::<u64>(), shots in 0usize..150) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut board = Board::new();
        board.place_ships(random_fleet(&mut rng)).unwrap();

        for _ in 0..shots {
            let x = rng.random_range(0..BOARD_SIZE);
            let y = rng.random_range(0..BOARD_SIZE);
            match board.cell(x, y) {
                CellState::Ship => board.mark(x, y, CellState::Hit),
                CellState::Empty => board.mark(x, y, CellState::Miss),
                _ => {}
            }
        }

        let target = board.random_target(&mut rng);
        prop_assert!(matches!(
            board.cell(target.x, target.y),
            CellState::Empty | CellState::Ship
        ));
    }

    /// With every cell resolved the fallback target is the origin.
    #[test]
    fn random_target_falls_back_to_origin(seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut board = Board::new();
        for y in 0..BOARD_SIZE {
            for x in 0..BOARD_SIZE {
                board.mark(x, y, CellState::Miss);
            }
        }
        prop_assert_eq!(board.random_target(&mut rng), Point { x: 0, y: 0 });
    }
}
