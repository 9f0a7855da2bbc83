//! Tests for the reversi turn machine.

use strictly_reversi::{
    Board, GameInProgress, GameResult, GameSetup, Move, MoveError, Outcome, Phase, Player,
    Position, SetupError, Turn,
};

fn pos(row: usize, col: usize) -> Position {
    Position::new(row, col).unwrap()
}

fn board(rows: &[&str]) -> Board {
    Board::from_rows(rows).unwrap()
}

#[test]
fn test_typestate_lifecycle() {
    let game = match GameSetup::new().start() {
        GameResult::InProgress(g) => g,
        GameResult::Finished(_) => panic!("Opening cannot be finished"),
    };
    assert_eq!(game.to_move(), Player::Black);
    assert_eq!(game.phase(), Phase::AwaitingMove(Player::Black));

    let result = game
        .make_move(Move::new(Player::Black, pos(2, 3)))
        .expect("Valid move");

    let game = match result {
        GameResult::InProgress(g) => g,
        GameResult::Finished(_) => panic!("Game shouldn't finish after one move"),
    };

    assert_eq!(game.to_move(), Player::White);
    assert_eq!(game.last_move(), Some(Move::new(Player::Black, pos(2, 3))));
    assert_eq!(game.last_flips(), &[pos(3, 3)]);
}

#[test]
fn test_wrong_player_rejected() {
    let game = GameInProgress::standard();
    let result = game.make_move(Move::new(Player::White, pos(2, 4)));
    assert_eq!(result, Err(MoveError::WrongPlayer(Player::White)));
}

#[test]
fn test_illegal_cell_rejected() {
    let game = GameInProgress::standard();
    let result = game.make_move(Move::new(Player::Black, pos(3, 3)));
    assert!(matches!(result, Err(MoveError::IllegalMove { .. })));
}

#[test]
fn test_forced_pass_is_automatic() {
    // White cannot flank a corner piece, so it has no move at all.
    let setup = GameSetup::from_board(
        board(&[
            "BW......",
            "........",
            "........",
            "........",
            "........",
            "........",
            "........",
            "BW......",
        ]),
        Player::White,
    )
    .unwrap();

    let game = match setup.start() {
        GameResult::InProgress(g) => g,
        GameResult::Finished(_) => panic!("Black can still move"),
    };
    assert_eq!(game.to_move(), Player::Black);
    assert_eq!(game.consecutive_passes(), 1);
    assert_eq!(game.history(), &[Turn::Passed(Player::White)]);
    // The pass is already settled; callers only see whose move it is.
    assert_eq!(game.phase(), Phase::AwaitingMove(Player::Black));

    // White is skipped again after Black's first capture.
    let game = match game.make_move(Move::new(Player::Black, pos(0, 2))).unwrap() {
        GameResult::InProgress(g) => g,
        GameResult::Finished(_) => panic!("Black still has c8"),
    };
    assert_eq!(game.to_move(), Player::Black);
    assert_eq!(game.consecutive_passes(), 1);
    assert_eq!(game.history().last(), Some(&Turn::Passed(Player::White)));

    // Capturing the last white piece leaves nobody a move.
    let result = game.make_move(Move::new(Player::Black, pos(7, 2))).unwrap();
    match result {
        GameResult::Finished(game) => {
            assert_eq!(game.outcome(), Outcome::BlackWins);
            assert_eq!(game.tally().black, 6);
            assert_eq!(game.tally().white, 0);
        }
        GameResult::InProgress(_) => panic!("Game should be finished"),
    }
}

#[test]
fn test_both_sides_stuck_is_terminal() {
    let setup = GameSetup::from_board(
        board(&[
            "BB....WW",
            "........",
            "........",
            "........",
            "........",
            "........",
            "........",
            "........",
        ]),
        Player::Black,
    )
    .unwrap();
    let result = setup.start();
    assert_eq!(result.phase(), Phase::Terminal(Outcome::Draw));
    assert_eq!(result.consecutive_passes(), 2);
}

#[test]
fn test_setup_rejects_unreachable_boards() {
    assert_eq!(
        GameSetup::from_board(Board::empty(), Player::Black).unwrap_err(),
        SetupError::TooFewPieces(0)
    );

    let sparse = board(&[
        "B......W", "........", "........", "........", "........", "........", "........",
        "........",
    ]);
    assert_eq!(
        GameSetup::from_board(sparse, Player::Black).unwrap_err(),
        SetupError::TooFewPieces(2)
    );
}

#[test]
fn test_replay_and_outcome_matches_tally() {
    // Deterministic full game: always take the first legal move.
    let mut game = GameInProgress::standard();
    let finished = loop {
        let action = Move::new(game.to_move(), game.valid_moves()[0]);
        match game.make_move(action).unwrap() {
            GameResult::InProgress(g) => game = g,
            GameResult::Finished(f) => break f,
        }
    };

    let tally = finished.tally();
    let expected = match tally.black.cmp(&tally.white) {
        std::cmp::Ordering::Greater => Outcome::BlackWins,
        std::cmp::Ordering::Less => Outcome::WhiteWins,
        std::cmp::Ordering::Equal => Outcome::Draw,
    };
    assert_eq!(finished.outcome(), expected);

    let placed: Vec<Position> = finished
        .history()
        .iter()
        .filter_map(Turn::placement)
        .map(|m| m.position)
        .collect();
    assert!(placed.len() <= 60);

    let replayed = GameInProgress::replay(&placed).unwrap();
    assert_eq!(replayed, GameResult::Finished(finished));
}

#[test]
fn test_restart() {
    let setup = GameSetup::from_board(
        board(&[
            "BBBBBBBB", "BBBBBBBB", "BBBBBBBB", "BBBBBBBB", "WWWWWWWW", "WWWWWWWW",
            "WWWWWWWW", "WWWWWWWW",
        ]),
        Player::Black,
    )
    .unwrap();
    if let GameResult::Finished(game) = setup.start() {
        assert!(game.outcome().is_draw());
        let fresh = game.restart();
        assert_eq!(*fresh.board(), Board::new());
    } else {
        panic!("Full board must be finished");
    }
}
