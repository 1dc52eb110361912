//! Whole-game scenarios through the public API.

use chess_rules::config::DrawRules;
use chess_rules::engine::{
    Board, CastlingRights, ChessError, Color, DrawReason, GameStatus, MoveOutcome, Piece,
    PieceKind, Position, QueryFault, Setup, Square,
};

fn sq(name: &str) -> Square {
    Square::from_algebraic(name).unwrap()
}

fn play(pos: &mut Position, from: &str, to: &str) -> MoveOutcome {
    pos.commit_move(sq(from), sq(to))
        .unwrap_or_else(|e| panic!("{from}-{to}: {e}"))
}

fn dests(pos: &Position, from: &str) -> Vec<Square> {
    pos.legal_destinations(sq(from)).unwrap()
}

fn setup(pieces: &[(&str, char)]) -> Setup {
    pieces.iter().fold(Setup::new(), |s, &(name, ch)| {
        let color = if ch.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        s.with(sq(name), Piece::new(PieceKind::from_char(ch).unwrap(), color))
    })
}

// =====================================================================
// Queries
// =====================================================================

#[test]
fn queries_never_mutate_the_position() {
    let pos = Position::new();
    let before = pos.clone();
    for square in Square::all() {
        let first = pos.legal_destinations(square);
        let second = pos.legal_destinations(square);
        assert_eq!(first, second, "{square}");
        assert_eq!(pos, before, "{square}");
    }
}

#[test]
fn starting_pawns_mirror() {
    let white = Position::new();
    let black = Setup::from_board(Board::starting())
        .side_to_move(Color::Black)
        .castling(CastlingRights::ALL)
        .build()
        .unwrap();
    for file in 0..8u8 {
        assert_eq!(
            white.legal_destinations(Square::new(file, 1)).unwrap(),
            vec![Square::new(file, 2), Square::new(file, 3)]
        );
        assert_eq!(
            black.legal_destinations(Square::new(file, 6)).unwrap(),
            vec![Square::new(file, 4), Square::new(file, 5)]
        );
    }
}

// =====================================================================
// Turns
// =====================================================================

#[test]
fn turns_alternate() {
    let mut pos = Position::new();
    let err = pos.commit_move(sq("e7"), sq("e5")).unwrap_err();
    assert_eq!(
        err,
        ChessError::InvalidQuery {
            square: sq("e7"),
            fault: QueryFault::WrongTurn
        }
    );
    play(&mut pos, "e2", "e4");
    play(&mut pos, "e7", "e5");
    assert_eq!(pos.side_to_move(), Color::White);
    assert_eq!(pos.ply_count(), 2);
}

#[test]
fn empty_origin_is_rejected() {
    let mut pos = Position::new();
    let err = pos.commit_move(sq("e4"), sq("e5")).unwrap_err();
    assert_eq!(
        err,
        ChessError::InvalidQuery {
            square: sq("e4"),
            fault: QueryFault::EmptySquare
        }
    );
}

// =====================================================================
// Check safety
// =====================================================================

#[test]
fn pinned_bishop_stays_on_the_file_line() {
    // The bishop on e2 shields its king from the rook on e8 and has no
    // move along the e-file, so it may not move at all.
    let pos = setup(&[("e1", 'K'), ("e2", 'B'), ("e8", 'r'), ("a8", 'k')])
        .build()
        .unwrap();
    assert!(dests(&pos, "e2").is_empty());
}

#[test]
fn check_must_be_answered() {
    let pos = setup(&[("e1", 'K'), ("a4", 'R'), ("e8", 'r'), ("h8", 'k')])
        .build()
        .unwrap();
    assert_eq!(pos.status(), GameStatus::Check);
    // The rook may only block on the e-file.
    assert_eq!(dests(&pos, "a4"), vec![sq("e4")]);
}

// =====================================================================
// Castling
// =====================================================================

#[test]
fn castling_right_is_lost_for_good() {
    let mut pos = Position::new();
    for (from, to) in [
        ("g1", "f3"),
        ("b8", "c6"),
        ("e2", "e3"),
        ("c6", "b8"),
        ("f1", "e2"),
        ("b8", "c6"),
    ] {
        play(&mut pos, from, to);
    }
    assert!(dests(&pos, "e1").contains(&sq("g1")));

    play(&mut pos, "h1", "g1");
    play(&mut pos, "c6", "b8");
    play(&mut pos, "g1", "h1");
    play(&mut pos, "b8", "c6");
    assert!(!dests(&pos, "e1").contains(&sq("g1")));
    assert!(!pos.castling_rights().can_castle(Color::White, true));
    assert!(pos.castling_rights().can_castle(Color::White, false));
}

#[test]
fn castling_through_check_is_illegal() {
    let pos = setup(&[("e1", 'K'), ("h1", 'R'), ("f8", 'r'), ("a8", 'k')])
        .castling(CastlingRights(CastlingRights::WHITE_KINGSIDE))
        .build()
        .unwrap();
    assert!(!dests(&pos, "e1").contains(&sq("g1")));
}

// =====================================================================
// En passant
// =====================================================================

#[test]
fn en_passant_window() {
    let mut pos = Position::new();
    play(&mut pos, "e2", "e4");
    play(&mut pos, "h7", "h6");
    play(&mut pos, "e4", "e5");
    play(&mut pos, "f7", "f5");
    assert!(dests(&pos, "e5").contains(&sq("f6")));

    play(&mut pos, "a2", "a3");
    play(&mut pos, "a7", "a6");
    assert!(!dests(&pos, "e5").contains(&sq("f6")));
}

#[test]
fn black_captures_en_passant() {
    let mut pos = Position::new();
    play(&mut pos, "a2", "a3");
    play(&mut pos, "d7", "d5");
    play(&mut pos, "a3", "a4");
    play(&mut pos, "d5", "d4");
    play(&mut pos, "c2", "c4");
    assert!(pos.en_passant().allows(Color::Black, 2));
    play(&mut pos, "d4", "c3");
    assert!(pos.board().is_empty(sq("c4")));
    assert_eq!(pos.board().count(Piece::new(PieceKind::Pawn, Color::White)), 7);
}

// =====================================================================
// Endings
// =====================================================================

#[test]
fn fools_mate() {
    let mut pos = Position::new();
    play(&mut pos, "f2", "f4");
    play(&mut pos, "e7", "e6");
    play(&mut pos, "g2", "g4");
    let outcome = play(&mut pos, "d8", "h4");
    assert_eq!(
        outcome,
        MoveOutcome::Played {
            status: GameStatus::Checkmate {
                mated: Color::White
            }
        }
    );
    assert!(pos.legal_moves().is_empty());
}

#[test]
fn lone_king_stalemate() {
    let mut pos = setup(&[("h8", 'k'), ("f7", 'K'), ("g5", 'Q')])
        .build()
        .unwrap();
    let outcome = play(&mut pos, "g5", "g6");
    assert_eq!(outcome.status(), Some(GameStatus::Stalemate));
    assert!(!pos.is_in_check());
}

#[test]
fn fifty_move_draw_on_the_hundredth_ply() {
    let rules = DrawRules {
        repetition_count: usize::MAX,
        ..DrawRules::default()
    };
    let mut pos = setup(&[("e1", 'K'), ("g1", 'N'), ("e8", 'k'), ("g8", 'n')])
        .rules(rules)
        .build()
        .unwrap();
    let shuffle = [("g1", "f3"), ("g8", "f6"), ("f3", "g1"), ("f6", "g8")];
    for ply in 0..100 {
        assert_eq!(pos.status(), GameStatus::Active, "ply {ply}");
        let (from, to) = shuffle[ply % 4];
        play(&mut pos, from, to);
    }
    assert_eq!(
        pos.status(),
        GameStatus::Draw {
            reason: DrawReason::FiftyMoveRule
        }
    );
}

#[test]
fn repetition_ignores_castling_rights() {
    let mut pos = setup(&[("e1", 'K'), ("h1", 'R'), ("e8", 'k')])
        .castling(CastlingRights(CastlingRights::WHITE_KINGSIDE))
        .build()
        .unwrap();
    let start = pos.board().clone();
    for (from, to) in [("e1", "f1"), ("e8", "d8"), ("f1", "e1"), ("d8", "e8")] {
        play(&mut pos, from, to);
    }
    assert_eq!(pos.board(), &start);
    assert_eq!(pos.castling_rights(), CastlingRights::NONE);
    assert_eq!(pos.repetitions(), 2);

    for (from, to) in [("e1", "f1"), ("e8", "d8"), ("f1", "e1"), ("d8", "e8")] {
        play(&mut pos, from, to);
    }
    assert_eq!(
        pos.status(),
        GameStatus::Draw {
            reason: DrawReason::ThreefoldRepetition
        }
    );
}

#[test]
fn capture_resets_the_draw_window() {
    let mut pos = setup(&[("e1", 'K'), ("a1", 'R'), ("e8", 'k'), ("a8", 'r')])
        .build()
        .unwrap();
    play(&mut pos, "e1", "d2");
    play(&mut pos, "e8", "d7");
    assert_eq!(pos.history().len(), 2);
    play(&mut pos, "a1", "a8");
    assert!(pos.history().is_empty());
}
