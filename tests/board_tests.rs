use flotilla::{Board, CellState, GameError, Point, Ship, ShipKind, BOARD_SIZE};

fn ship(kind: ShipKind, x: u8, y: u8, horizontal: bool) -> Ship {
    Ship::new(kind, Point { x, y }, horizontal)
}

#[test]
fn placement_rasterizes_exactly_the_ship_cells() {
    let mut board = Board::new();
    let ships = vec![
        ship(ShipKind::Huge, 0, 0, true),
        ship(ShipKind::Small, 9, 9, false),
        ship(ShipKind::Medium, 4, 5, false),
    ];
    board.place_ships(ships.clone()).unwrap();

    let mut expected = Vec::new();
    for s in &ships {
        expected.extend(s.cells().map(|p| (p.x, p.y)));
    }
    for y in 0..BOARD_SIZE {
        for x in 0..BOARD_SIZE {
            let should_be_ship = expected.contains(&(x, y));
            assert_eq!(
                board.cell(x, y) == CellState::Ship,
                should_be_ship,
                "cell ({}, {})",
                x,
                y
            );
        }
    }
}

#[test]
fn out_of_range_placement_leaves_board_unchanged() {
    let mut board = Board::new();
    board
        .place_ships(vec![ship(ShipKind::Small, 3, 3, true)])
        .unwrap();

    // horizontal huge at x=8 runs off the right edge
    let err = board
        .place_ships(vec![
            ship(ShipKind::Small, 0, 0, true),
            ship(ShipKind::Huge, 8, 2, true),
        ])
        .unwrap_err();
    assert_eq!(err, GameError::InvalidPlacement);

    assert_eq!(board.ships().len(), 1);
    assert_eq!(board.cell(3, 3), CellState::Ship);
    assert_eq!(board.cell(0, 0), CellState::Empty);
}

#[test]
fn length_must_match_kind() {
    let mut board = Board::new();
    let mut bad = ship(ShipKind::Large, 0, 0, true);
    bad.length = 2;
    assert_eq!(
        board.place_ships(vec![bad]).unwrap_err(),
        GameError::InvalidPlacement
    );
    assert!(!board.is_ready());
}

#[test]
fn placement_overwrites_previous_fleet() {
    let mut board = Board::new();
    board
        .place_ships(vec![ship(ShipKind::Huge, 0, 0, true)])
        .unwrap();
    board
        .place_ships(vec![ship(ShipKind::Small, 5, 5, true)])
        .unwrap();
    assert_eq!(board.ships().len(), 1);
    assert_eq!(board.cell(0, 0), CellState::Empty);
    assert_eq!(board.cell(5, 5), CellState::Ship);
}

#[test]
fn mark_around_ship_covers_every_segment_clamped() {
    let mut board = Board::new();
    // vertical large in the corner column
    board
        .place_ships(vec![ship(ShipKind::Large, 0, 0, false)])
        .unwrap();
    for y in 0..3 {
        board.mark(0, y, CellState::Hit);
    }
    let marked = board.mark_around_ship(0);

    // ring is the full column beside the ship plus the cell below,
    // clamped at the top-left corner
    let mut expected = vec![(1, 0), (1, 1), (1, 2), (0, 3), (1, 3)];
    expected.sort_unstable();
    let mut got: Vec<(u8, u8)> = marked.iter().map(|p| (p.x, p.y)).collect();
    got.sort_unstable();
    assert_eq!(got, expected);
    for (x, y) in expected {
        assert_eq!(board.cell(x, y), CellState::Miss);
    }
    // ship cells stay hit
    assert_eq!(board.cell(0, 0), CellState::Hit);
}

#[test]
fn mark_around_ship_skips_resolved_cells() {
    let mut board = Board::new();
    board
        .place_ships(vec![ship(ShipKind::Small, 5, 5, true)])
        .unwrap();
    board.mark(4, 5, CellState::Miss);
    board.mark(5, 5, CellState::Hit);
    let marked = board.mark_around_ship(0);
    assert_eq!(marked.len(), 7, "one neighbor was already a miss");
    assert!(!marked.contains(&Point { x: 4, y: 5 }));
}

#[test]
fn untargeted_excludes_hits_and_misses() {
    let mut board = Board::new();
    board
        .place_ships(vec![ship(ShipKind::Medium, 0, 0, true)])
        .unwrap();
    board.mark(0, 0, CellState::Hit);
    board.mark(9, 9, CellState::Miss);
    let cells = board.untargeted();
    assert_eq!(cells.len(), 98);
    assert!(!cells.contains(&Point { x: 0, y: 0 }));
    assert!(!cells.contains(&Point { x: 9, y: 9 }));
    assert!(cells.contains(&Point { x: 1, y: 0 }));
}
