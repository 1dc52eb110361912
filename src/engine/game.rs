//! Game session wrapping `Position`.
//!
//! `Game` adds identity and a move log on top of the rules engine, and is
//! what a front end holds between turns. Restarting after the endgame
//! prompt goes through [`Game::new_game`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::DrawRules;
use crate::engine::movegen;
use crate::engine::position::Position;
use crate::engine::tally::CapturedTally;
use crate::engine::types::{ChessError, Color, GameStatus, MoveOutcome, Piece, PieceKind, Square};

// =========================================================================
// MoveRecord
// =========================================================================

/// One completed ply in the game log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MoveRecord {
    pub from: Square,
    pub to: Square,
    /// The piece that moved, before any promotion.
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub promotion: Option<PieceKind>,
    /// Status for the side to move after this ply.
    pub status_after: GameStatus,
}

/// A move waiting for its promotion choice.
#[derive(Clone, Copy, Debug)]
struct PendingRecord {
    from: Square,
    to: Square,
    piece: Piece,
    captured: Option<Piece>,
}

// =========================================================================
// Game
// =========================================================================

/// A complete chess game with a move log and session metadata.
#[derive(Clone, Debug)]
pub struct Game {
    position: Position,
    moves: Vec<MoveRecord>,
    pending: Option<PendingRecord>,

    // Metadata
    pub id: String,
    pub white_player: String,
    pub black_player: String,
    pub created_at: DateTime<Utc>,
}

/// Serializable view of a game for hosts and renderers.
#[derive(Serialize)]
pub struct GameSnapshot<'a> {
    pub id: &'a str,
    pub created_at: DateTime<Utc>,
    pub side_to_move: Color,
    pub status: GameStatus,
    pub ply_count: u32,
    pub pending_promotion: Option<Square>,
    pub board: [[String; 8]; 8],
    pub captured: CapturedTally,
    pub moves: &'a [MoveRecord],
}

impl Game {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// Create a new game from the standard starting position.
    pub fn new() -> Self {
        Self::with_rules(DrawRules::default())
    }

    /// Create a new game with custom draw thresholds.
    pub fn with_rules(rules: DrawRules) -> Self {
        Self::from_position(Position::with_rules(rules))
    }

    /// Wrap an existing position, e.g. one built with `Setup`.
    pub fn from_position(position: Position) -> Self {
        Self {
            position,
            moves: Vec::new(),
            pending: None,
            id: Uuid::new_v4().to_string(),
            white_player: "Player".into(),
            black_player: "Player".into(),
            created_at: Utc::now(),
        }
    }

    /// Discard this game and start over from the standard setup, keeping
    /// the players and draw rules.
    pub fn new_game(&mut self) {
        let mut fresh = Self::with_rules(self.position.rules());
        fresh.white_player = std::mem::take(&mut self.white_player);
        fresh.black_player = std::mem::take(&mut self.black_player);
        *self = fresh;
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn status(&self) -> GameStatus {
        self.position.status()
    }

    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move()
    }

    /// Completed plies, oldest first.
    pub fn move_history(&self) -> &[MoveRecord] {
        &self.moves
    }

    pub fn is_game_over(&self) -> bool {
        self.status().is_game_over()
    }

    pub fn legal_destinations(&self, from: Square) -> Result<Vec<Square>, ChessError> {
        self.position.legal_destinations(from)
    }

    /// Pieces each side has lost so far.
    pub fn captured(&self) -> CapturedTally {
        CapturedTally::from_board(self.position.board())
    }

    // -----------------------------------------------------------------
    // Moves
    // -----------------------------------------------------------------

    /// Play a move. See [`Position::commit_move`].
    pub fn commit_move(&mut self, from: Square, to: Square) -> Result<MoveOutcome, ChessError> {
        let board = self.position.board();
        let piece = board.piece_at(from);
        let captured = movegen::captured_by(board, from, to).map(|(_, p)| p);

        let outcome = self.position.commit_move(from, to)?;
        let Some(piece) = piece else {
            return Ok(outcome);
        };
        match outcome {
            MoveOutcome::Played { status } => self.moves.push(MoveRecord {
                from,
                to,
                piece,
                captured,
                promotion: None,
                status_after: status,
            }),
            MoveOutcome::PromotionRequired { .. } => {
                self.pending = Some(PendingRecord {
                    from,
                    to,
                    piece,
                    captured,
                })
            }
        }
        Ok(outcome)
    }

    /// Complete a pending promotion. See [`Position::resolve_promotion`].
    pub fn resolve_promotion(
        &mut self,
        square: Square,
        kind: PieceKind,
    ) -> Result<GameStatus, ChessError> {
        let status = self.position.resolve_promotion(square, kind)?;
        if let Some(p) = self.pending.take() {
            self.moves.push(MoveRecord {
                from: p.from,
                to: p.to,
                piece: p.piece,
                captured: p.captured,
                promotion: Some(kind),
                status_after: status,
            });
        }
        Ok(status)
    }

    // -----------------------------------------------------------------
    // Rendering views
    // -----------------------------------------------------------------

    /// Generate an 8×8 board array (row-major, rank 8 first → rank 1 last).
    /// Empty squares are empty strings. Pieces are like "wP", "bK", etc.
    pub fn board_array(&self) -> [[String; 8]; 8] {
        let mut board = std::array::from_fn(|_| std::array::from_fn(|_| String::new()));
        for (sq, piece) in self.position.board().pieces() {
            let c = match piece.color {
                Color::White => 'w',
                Color::Black => 'b',
            };
            let p = piece.kind.to_char(Color::White);
            board[7 - sq.rank() as usize][sq.file() as usize] = format!("{c}{p}");
        }
        board
    }

    pub fn snapshot(&self) -> GameSnapshot<'_> {
        GameSnapshot {
            id: &self.id,
            created_at: self.created_at,
            side_to_move: self.side_to_move(),
            status: self.status(),
            ply_count: self.position.ply_count(),
            pending_promotion: self.position.pending_promotion(),
            board: self.board_array(),
            captured: self.captured(),
            moves: &self.moves,
        }
    }

    /// The snapshot as JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.snapshot())
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::DrawReason;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn play(g: &mut Game, from: &str, to: &str) {
        g.commit_move(sq(from), sq(to)).unwrap();
    }

    // -----------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------

    #[test]
    fn new_game_is_active() {
        let g = Game::new();
        assert_eq!(g.status(), GameStatus::Active);
        assert!(!g.is_game_over());
        assert_eq!(g.side_to_move(), Color::White);
        assert!(g.move_history().is_empty());
        assert_eq!(g.id.len(), 36);
    }

    #[test]
    fn new_game_resets_state() {
        let mut g = Game::new();
        g.white_player = "Ana".into();
        let old_id = g.id.clone();
        play(&mut g, "e2", "e4");
        g.new_game();
        assert_eq!(g.move_history().len(), 0);
        assert_eq!(g.position(), &Position::new());
        assert_eq!(g.white_player, "Ana");
        assert_ne!(g.id, old_id);
    }

    #[test]
    fn new_game_keeps_draw_rules() {
        let rules = crate::config::DrawRules {
            fifty_move_plies: 10,
            repetition_count: 5,
        };
        let mut g = Game::with_rules(rules);
        play(&mut g, "g1", "f3");
        g.new_game();
        assert_eq!(g.position().rules(), rules);
        assert_eq!(g.position(), &Position::with_rules(rules));
    }

    // -----------------------------------------------------------------
    // Making moves
    // -----------------------------------------------------------------

    #[test]
    fn moves_are_logged() {
        let mut g = Game::new();
        play(&mut g, "e2", "e4");
        play(&mut g, "d7", "d5");
        play(&mut g, "e4", "d5");
        let log = g.move_history();
        assert_eq!(log.len(), 3);
        assert_eq!(log[2].from, sq("e4"));
        assert_eq!(log[2].piece, Piece::new(PieceKind::Pawn, Color::White));
        assert_eq!(
            log[2].captured,
            Some(Piece::new(PieceKind::Pawn, Color::Black))
        );
        assert_eq!(g.captured().total(Color::Black), 1);
    }

    #[test]
    fn illegal_move_is_not_logged() {
        let mut g = Game::new();
        assert!(g.commit_move(sq("e2"), sq("e5")).is_err());
        assert!(g.move_history().is_empty());
    }

    #[test]
    fn promotion_is_logged_once_resolved() {
        let mut g = Game::new();
        for (from, to) in [
            ("h2", "h4"),
            ("g7", "g5"),
            ("h4", "g5"),
            ("g8", "f6"),
            ("g5", "g6"),
            ("f8", "g7"),
            ("g6", "h7"),
            ("f6", "g8"),
        ] {
            play(&mut g, from, to);
        }
        let outcome = g.commit_move(sq("h7"), sq("g8")).unwrap();
        assert!(matches!(outcome, MoveOutcome::PromotionRequired { .. }));
        assert_eq!(g.move_history().len(), 8);

        g.resolve_promotion(sq("g8"), PieceKind::Knight).unwrap();
        let last = g.move_history().last().unwrap();
        assert_eq!(last.to, sq("g8"));
        assert_eq!(last.promotion, Some(PieceKind::Knight));
        assert_eq!(last.piece.kind, PieceKind::Pawn);
        assert_eq!(last.captured.map(|p| p.kind), Some(PieceKind::Knight));
        assert_eq!(g.side_to_move(), Color::Black);
    }

    #[test]
    fn move_on_finished_game_errors() {
        // 1. f3 e5 2. g4 Qh4#
        let mut g = Game::new();
        play(&mut g, "f2", "f3");
        play(&mut g, "e7", "e5");
        play(&mut g, "g2", "g4");
        play(&mut g, "d8", "h4");
        assert_eq!(
            g.status(),
            GameStatus::Checkmate {
                mated: Color::White
            }
        );
        assert!(g.is_game_over());
        assert_eq!(
            g.commit_move(sq("e2"), sq("e4")).unwrap_err(),
            ChessError::GameOver(g.status())
        );
    }

    // -----------------------------------------------------------------
    // Status detection
    // -----------------------------------------------------------------

    #[test]
    fn scholars_mate() {
        // 1. e4 e5 2. Bc4 Nc6 3. Qh5 Nf6 4. Qxf7#
        let mut g = Game::new();
        play(&mut g, "e2", "e4");
        play(&mut g, "e7", "e5");
        play(&mut g, "f1", "c4");
        play(&mut g, "b8", "c6");
        play(&mut g, "d1", "h5");
        play(&mut g, "g8", "f6");
        play(&mut g, "h5", "f7");
        assert_eq!(
            g.status(),
            GameStatus::Checkmate {
                mated: Color::Black
            }
        );
        assert_eq!(
            g.move_history().last().unwrap().status_after,
            g.status()
        );
    }

    #[test]
    fn threefold_repetition() {
        let mut g = Game::new();
        // After these 8 plies the starting board has occurred three times.
        for _ in 0..2 {
            play(&mut g, "g1", "f3");
            play(&mut g, "g8", "f6");
            play(&mut g, "f3", "g1");
            play(&mut g, "f6", "g8");
        }
        assert_eq!(
            g.status(),
            GameStatus::Draw {
                reason: DrawReason::ThreefoldRepetition
            }
        );
    }

    #[test]
    fn check_is_advisory() {
        let mut g = Game::new();
        play(&mut g, "e2", "e4");
        play(&mut g, "f7", "f6");
        play(&mut g, "d1", "h5");
        assert_eq!(g.status(), GameStatus::Check);
        assert!(!g.is_game_over());
        let dests = g.legal_destinations(sq("g7")).unwrap();
        assert_eq!(dests, vec![sq("g6")]);
    }

    // -----------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------

    #[test]
    fn board_array_starting_position() {
        let g = Game::new();
        let board = g.board_array();
        // Rank 8 = row 0: rook on a8.
        assert_eq!(board[0][0], "bR");
        // Rank 1 = row 7: king on e1.
        assert_eq!(board[7][4], "wK");
        // Rank 5 = row 3: empty.
        assert_eq!(board[3][0], "");
    }

    #[test]
    fn json_snapshot() {
        let mut g = Game::new();
        play(&mut g, "e2", "e4");
        let value: serde_json::Value = serde_json::from_str(&g.to_json().unwrap()).unwrap();
        assert_eq!(value["side_to_move"], "black");
        assert_eq!(value["status"]["status"], "active");
        assert_eq!(value["ply_count"], 1);
        assert_eq!(value["board"][4][4], "wP");
        assert_eq!(value["moves"][0]["piece"]["kind"], "pawn");
    }
}
