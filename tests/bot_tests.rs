use flotilla::{
    BotTurn, ClientCommand, Dispatch, IdentityId, Point, Recipients, Router, Seat, ServerMessage,
    Ship, ShipKind, NUM_SHIPS,
};

fn register(router: &Router, name: &str) -> IdentityId {
    router
        .dispatch(
            None,
            ClientCommand::Register {
                name: name.to_string(),
                secret: "pw".to_string(),
            },
        )
        .authenticated
        .unwrap()
}

fn fleet() -> Vec<Ship> {
    let mut ships = vec![
        Ship::new(ShipKind::Huge, Point { x: 0, y: 0 }, true),
        Ship::new(ShipKind::Large, Point { x: 0, y: 2 }, true),
        Ship::new(ShipKind::Large, Point { x: 5, y: 2 }, true),
        Ship::new(ShipKind::Medium, Point { x: 0, y: 4 }, true),
        Ship::new(ShipKind::Medium, Point { x: 3, y: 4 }, true),
        Ship::new(ShipKind::Medium, Point { x: 6, y: 4 }, true),
    ];
    for i in 0..4u8 {
        ships.push(Ship::new(
            ShipKind::Small,
            Point { x: 2 * i, y: 6 },
            true,
        ));
    }
    ships
}

/// Create a bot match and return `(human id, match id, human seat, bot seat,
/// placement dispatch)`.
fn bot_match(router: &Router) -> (IdentityId, u64, Seat, Seat, Dispatch) {
    let human = register(router, "ada");
    let dispatch = router.dispatch(Some(human), ClientCommand::CreateSessionWithBot);

    let (match_id, human_seat) = dispatch
        .messages
        .iter()
        .find_map(|o| match &o.message {
            ServerMessage::MatchCreated { match_id, seat } => Some((*match_id, *seat)),
            _ => None,
        })
        .expect("bot session immediately yields a match");
    // a bot session never shows up in the lobby
    assert!(dispatch.messages.iter().any(|o| matches!(
        &o.message,
        ServerMessage::SessionList(list) if list.is_empty()
    )));
    assert!(dispatch.bot_turns.is_empty(), "match is still placing");

    let place = router.dispatch(
        Some(human),
        ClientCommand::PlaceShips {
            match_id,
            seat: human_seat,
            ships: fleet(),
        },
    );
    let bot_seat = place
        .messages
        .iter()
        .find_map(|o| match (&o.to, &o.message) {
            (Recipients::Identities(ids), ServerMessage::MatchStarted { turn_seat, .. })
                if ids != &vec![human] =>
            {
                Some(*turn_seat)
            }
            _ => None,
        })
        .expect("bot also gets a start notification");
    (human, match_id, human_seat, bot_seat, place)
}

#[test]
fn bot_session_starts_once_the_human_places() {
    let router = Router::with_seed(11);
    let (human, match_id, human_seat, bot_seat, place) = bot_match(&router);
    assert_ne!(human_seat, bot_seat);

    // the bot's fleet was placed at creation, so the human's placement
    // starts the match
    let mut own_ships = None;
    let mut turn = None;
    for outbound in &place.messages {
        match (&outbound.to, &outbound.message) {
            (Recipients::Identities(ids), ServerMessage::MatchStarted { ships, .. })
                if ids == &vec![human] =>
            {
                own_ships = Some(ships.clone());
            }
            (_, ServerMessage::TurnChanged { turn_seat }) => turn = Some(*turn_seat),
            _ => {}
        }
    }
    assert_eq!(own_ships.expect("human start notification").len(), NUM_SHIPS);
    let turn = turn.expect("start announces the turn");

    // a bot move is scheduled exactly when the bot holds the first turn
    if turn == bot_seat {
        assert_eq!(
            place.bot_turns,
            vec![BotTurn {
                match_id,
                seat: bot_seat
            }]
        );
    } else {
        assert!(place.bot_turns.is_empty());
    }
}

#[test]
fn bot_match_plays_to_completion() {
    let router = Router::with_seed(12);
    let (_, match_id, human_seat, _, place) = bot_match(&router);

    let mut pending = place.bot_turns;
    let mut finished = false;
    for _ in 0..1000 {
        let dispatch = match pending.pop() {
            Some(turn) => router.bot_move(turn),
            None => router.dispatch(
                None,
                ClientCommand::RandomAttack {
                    match_id,
                    seat: human_seat,
                },
            ),
        };
        pending.extend(dispatch.bot_turns);
        if dispatch
            .messages
            .iter()
            .any(|o| matches!(o.message, ServerMessage::MatchFinished { .. }))
        {
            finished = true;
            break;
        }
    }
    assert!(finished, "bot match should reach a conclusion");
    assert_eq!(router.live_matches(), 0);

    // a stale bot timer firing on the removed match is a silent no-op
    let dispatch = router.bot_move(BotTurn {
        match_id,
        seat: human_seat,
    });
    assert!(dispatch.messages.is_empty());
    assert!(dispatch.bot_turns.is_empty());
}

#[test]
fn bot_win_never_lands_on_the_leaderboard() {
    // drive many seeded bot matches; whenever the bot wins, the
    // leaderboard must only ever contain the human
    for seed in 0..4 {
        let router = Router::with_seed(100 + seed);
        let (_, match_id, human_seat, _, place) = bot_match(&router);
        let mut pending = place.bot_turns;
        let mut last_board = Vec::new();
        for _ in 0..1000 {
            let dispatch = match pending.pop() {
                Some(turn) => router.bot_move(turn),
                None => router.dispatch(
                    None,
                    ClientCommand::RandomAttack {
                        match_id,
                        seat: human_seat,
                    },
                ),
            };
            pending.extend(dispatch.bot_turns);
            let mut done = false;
            for outbound in &dispatch.messages {
                if let ServerMessage::Leaderboard(entries) = &outbound.message {
                    last_board = entries.clone();
                }
                if matches!(outbound.message, ServerMessage::MatchFinished { .. }) {
                    done = true;
                }
            }
            if done {
                break;
            }
        }
        assert_eq!(last_board.len(), 1, "seed {}", seed);
        assert_eq!(last_board[0].name, "ada");
    }
}

#[test]
fn stale_bot_move_with_wrong_seat_is_ignored() {
    let router = Router::with_seed(13);
    let (_, match_id, human_seat, bot_seat, place) = bot_match(&router);

    // whichever seat holds the turn, a directive for the other seat must
    // be rejected by the re-validation
    let wrong = if place.bot_turns.is_empty() {
        bot_seat
    } else {
        human_seat
    };
    let dispatch = router.bot_move(BotTurn {
        match_id,
        seat: wrong,
    });
    assert!(dispatch.messages.is_empty());
    assert!(dispatch.bot_turns.is_empty());
}
