//! Full game state and the operations that mutate it.
//!
//! `Position` owns the board, turn, castling rights, en-passant window,
//! board history and any pending promotion. The only mutators are
//! [`Position::commit_move`] and [`Position::resolve_promotion`]; both
//! validate first and apply their effects only once nothing can fail.

use tracing::{debug, info};

use crate::config::DrawRules;
use crate::engine::attacks;
use crate::engine::board::Board;
use crate::engine::movegen;
use crate::engine::types::{
    CastlingRights, ChessError, Color, DrawReason, EnPassant, GameStatus, MoveOutcome, Piece,
    PieceKind, QueryFault, Square,
};

// =========================================================================
// Position
// =========================================================================

/// A chess position plus the bookkeeping needed to judge the game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    board: Board,
    side_to_move: Color,
    castling_rights: CastlingRights,
    en_passant: EnPassant,
    ply_count: u32,
    /// Boards seen before each reversible ply since the last pawn move or
    /// capture, oldest first.
    history: Vec<Board>,
    pending_promotion: Option<Square>,
    status: GameStatus,
    rules: DrawRules,
}

impl Position {
    /// The standard starting position.
    pub fn new() -> Self {
        Self::with_rules(DrawRules::default())
    }

    /// The standard starting position with custom draw thresholds.
    pub fn with_rules(rules: DrawRules) -> Self {
        Position {
            board: Board::starting(),
            side_to_move: Color::White,
            castling_rights: CastlingRights::ALL,
            en_passant: EnPassant::NONE,
            ply_count: 0,
            history: Vec::new(),
            pending_promotion: None,
            status: GameStatus::Active,
            rules,
        }
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    pub fn en_passant(&self) -> EnPassant {
        self.en_passant
    }

    /// Completed plies since this position was set up.
    pub fn ply_count(&self) -> u32 {
        self.ply_count
    }

    pub fn history(&self) -> &[Board] {
        &self.history
    }

    /// Square of a pawn waiting for [`Position::resolve_promotion`].
    pub fn pending_promotion(&self) -> Option<Square> {
        self.pending_promotion
    }

    /// Status computed after the last completed ply.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn rules(&self) -> DrawRules {
        self.rules
    }

    /// Whether the side to move is in check.
    pub fn is_in_check(&self) -> bool {
        attacks::is_in_check(&self.board, self.side_to_move)
    }

    /// How many times the current board has occurred, counting itself.
    pub fn repetitions(&self) -> usize {
        1 + self.history.iter().filter(|b| **b == self.board).count()
    }

    /// Legal destinations for the piece on `from`. See
    /// [`movegen::legal_destinations`].
    pub fn legal_destinations(&self, from: Square) -> Result<Vec<Square>, ChessError> {
        movegen::legal_destinations(self, from)
    }

    /// Every legal (origin, destination) pair for the side to move.
    pub fn legal_moves(&self) -> Vec<(Square, Square)> {
        movegen::legal_moves(self)
    }

    // -----------------------------------------------------------------
    // Commit
    // -----------------------------------------------------------------

    /// Play `from -> to` for the side to move.
    ///
    /// Returns `PromotionRequired` when a pawn reaches the last rank; the
    /// turn is then held until [`Position::resolve_promotion`] is called.
    /// On error the position is untouched.
    pub fn commit_move(&mut self, from: Square, to: Square) -> Result<MoveOutcome, ChessError> {
        if let Some(pending) = self.pending_promotion {
            return Err(ChessError::PromotionPending(pending));
        }
        if self.status.is_game_over() {
            return Err(ChessError::GameOver(self.status));
        }
        let dests = movegen::legal_destinations(self, from)?;
        if !dests.contains(&to) {
            return Err(ChessError::IllegalMove { from, to });
        }
        let Some(piece) = self.board.piece_at(from) else {
            return Err(ChessError::InvalidQuery {
                square: from,
                fault: QueryFault::EmptySquare,
            });
        };

        // ---- History ----
        let capture = movegen::captured_by(&self.board, from, to);
        if piece.kind == PieceKind::Pawn || capture.is_some() {
            self.history.clear();
        } else {
            self.history.push(self.board.clone());
        }

        // ---- Placement ----
        movegen::apply_to_board(&mut self.board, from, to);
        debug!(%from, %to, %piece, captured = ?capture.map(|(_, p)| p), "move committed");

        // ---- Castling rights ----
        let before = self.castling_rights;
        self.castling_rights.0 &= CASTLING_MASK[mask_index(from)] & CASTLING_MASK[mask_index(to)];
        if self.castling_rights != before {
            debug!(rights = %self.castling_rights, "castling rights updated");
        }

        // ---- En passant ----
        self.en_passant.clear();
        if piece.kind == PieceKind::Pawn && from.delta(to).rank.abs() == 2 {
            let enemy_pawn = Piece::new(PieceKind::Pawn, !piece.color);
            let adjacent = [-1i8, 1].into_iter().any(|df| {
                Square::try_new(to.file() as i8 + df, to.rank() as i8)
                    .is_some_and(|sq| self.board.piece_at(sq) == Some(enemy_pawn))
            });
            if adjacent {
                let capturer = !piece.color;
                self.en_passant.set(capturer, to.file());
                debug!(file = to.file(), %capturer, "en passant window opened");
            }
        }

        // ---- Promotion ----
        if piece.kind == PieceKind::Pawn && to.rank() == piece.color.promotion_rank() {
            self.pending_promotion = Some(to);
            debug!(square = %to, "promotion pending");
            return Ok(MoveOutcome::PromotionRequired {
                square: to,
                color: piece.color,
            });
        }

        let status = self.finish_ply();
        Ok(MoveOutcome::Played { status })
    }

    /// Replace the pending pawn on `square` with a `kind` piece and complete
    /// the ply.
    pub fn resolve_promotion(
        &mut self,
        square: Square,
        kind: PieceKind,
    ) -> Result<GameStatus, ChessError> {
        let Some(pending) = self.pending_promotion else {
            return Err(ChessError::InvalidPromotionChoice(
                "no promotion is pending".into(),
            ));
        };
        if pending != square {
            return Err(ChessError::InvalidPromotionChoice(format!(
                "promotion is pending on {pending}, not {square}"
            )));
        }
        if !kind.is_promotion_target() {
            return Err(ChessError::InvalidPromotionChoice(format!(
                "cannot promote to {kind}"
            )));
        }
        let pawn = Piece::new(PieceKind::Pawn, self.side_to_move);
        if self.board.piece_at(square) != Some(pawn) {
            return Err(ChessError::InvalidPromotionChoice(format!(
                "no {pawn} on {square}"
            )));
        }

        self.board.put(square, Piece::new(kind, self.side_to_move));
        self.pending_promotion = None;
        debug!(%square, %kind, "promotion resolved");
        Ok(self.finish_ply())
    }

    // -----------------------------------------------------------------
    // Terminal-state detection
    // -----------------------------------------------------------------

    fn finish_ply(&mut self) -> GameStatus {
        self.side_to_move = !self.side_to_move;
        self.ply_count += 1;
        self.status = self.detect_status();

        #[cfg(debug_assertions)]
        self.board.assert_consistent();

        if self.status.is_game_over() {
            info!(status = %self.status, ply = self.ply_count, "game over");
        }
        self.status
    }

    /// Status for the side to move. Mate and stalemate take precedence over
    /// the draw rules, fifty-move over repetition.
    fn detect_status(&self) -> GameStatus {
        let us = self.side_to_move;
        let in_check = attacks::is_in_check(&self.board, us);

        if !movegen::has_legal_move(self, us) {
            return if in_check {
                GameStatus::Checkmate { mated: us }
            } else {
                GameStatus::Stalemate
            };
        }
        if self.history.len() >= self.rules.fifty_move_plies {
            return GameStatus::Draw {
                reason: DrawReason::FiftyMoveRule,
            };
        }
        if self.repetitions() >= self.rules.repetition_count {
            return GameStatus::Draw {
                reason: DrawReason::ThreefoldRepetition,
            };
        }
        if in_check {
            GameStatus::Check
        } else {
            GameStatus::Active
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Castling-rights mask
// ---------------------------------------------------------------------------

const fn mask_index(sq: Square) -> usize {
    sq.rank() as usize * 8 + sq.file() as usize
}

/// Rights surviving a move that touches a square, indexed `rank * 8 + file`.
/// King and rook home squares drop the rights they guard.
#[rustfmt::skip]
const CASTLING_MASK: [u8; 64] = {
    let mut mask = [0b1111u8; 64];
    mask[0]  = 0b1111 & !CastlingRights::WHITE_QUEENSIDE;
    mask[4]  = 0b1111 & !(CastlingRights::WHITE_KINGSIDE | CastlingRights::WHITE_QUEENSIDE);
    mask[7]  = 0b1111 & !CastlingRights::WHITE_KINGSIDE;
    mask[56] = 0b1111 & !CastlingRights::BLACK_QUEENSIDE;
    mask[60] = 0b1111 & !(CastlingRights::BLACK_KINGSIDE | CastlingRights::BLACK_QUEENSIDE);
    mask[63] = 0b1111 & !CastlingRights::BLACK_KINGSIDE;
    mask
};

// =========================================================================
// Setup
// =========================================================================

/// Builder for arbitrary positions.
///
/// ```
/// use chess_rules::engine::{Color, Piece, PieceKind, Setup, Square};
///
/// let sq = |s: &str| Square::from_algebraic(s).unwrap();
/// let pos = Setup::new()
///     .with(sq("e1"), Piece::new(PieceKind::King, Color::White))
///     .with(sq("e8"), Piece::new(PieceKind::King, Color::Black))
///     .side_to_move(Color::Black)
///     .build()
///     .unwrap();
/// assert_eq!(pos.side_to_move(), Color::Black);
/// ```
#[derive(Clone, Debug)]
pub struct Setup {
    board: Board,
    side_to_move: Color,
    castling_rights: CastlingRights,
    rules: DrawRules,
}

impl Setup {
    /// An empty board, white to move, no castling rights.
    pub fn new() -> Self {
        Setup {
            board: Board::empty(),
            side_to_move: Color::White,
            castling_rights: CastlingRights::NONE,
            rules: DrawRules::default(),
        }
    }

    /// Start from an existing placement.
    pub fn from_board(board: Board) -> Self {
        Setup {
            board,
            ..Setup::new()
        }
    }

    pub fn with(mut self, sq: Square, piece: Piece) -> Self {
        self.board.put(sq, piece);
        self
    }

    pub fn side_to_move(mut self, color: Color) -> Self {
        self.side_to_move = color;
        self
    }

    pub fn castling(mut self, rights: CastlingRights) -> Self {
        self.castling_rights = rights;
        self
    }

    pub fn rules(mut self, rules: DrawRules) -> Self {
        self.rules = rules;
        self
    }

    /// Validate and produce a `Position` with its status already computed.
    pub fn build(self) -> Result<Position, ChessError> {
        let board = self.board;

        for color in Color::BOTH {
            let kings = board.count(Piece::new(PieceKind::King, color));
            if kings != 1 {
                return Err(ChessError::InvalidSetup(format!(
                    "{color} has {kings} kings"
                )));
            }
        }

        if let Some((sq, _)) = board
            .pieces()
            .find(|(sq, p)| p.kind == PieceKind::Pawn && (sq.rank() == 0 || sq.rank() == 7))
        {
            return Err(ChessError::InvalidSetup(format!("pawn on back rank at {sq}")));
        }

        if attacks::is_in_check(&board, !self.side_to_move) {
            return Err(ChessError::InvalidSetup(format!(
                "{} is in check but not to move",
                !self.side_to_move
            )));
        }

        for color in Color::BOTH {
            for kingside in [true, false] {
                if !self.castling_rights.can_castle(color, kingside) {
                    continue;
                }
                let rank = color.back_rank();
                let rook_file = if kingside { 7 } else { 0 };
                let king_home = board.piece_at(Square::new(4, rank))
                    == Some(Piece::new(PieceKind::King, color));
                let rook_home = board.piece_at(Square::new(rook_file, rank))
                    == Some(Piece::new(PieceKind::Rook, color));
                if !(king_home && rook_home) {
                    let side = if kingside { "king side" } else { "queen side" };
                    return Err(ChessError::InvalidSetup(format!(
                        "{color} cannot hold castling rights: {side}"
                    )));
                }
            }
        }

        let mut pos = Position {
            board,
            side_to_move: self.side_to_move,
            castling_rights: self.castling_rights,
            en_passant: EnPassant::NONE,
            ply_count: 0,
            history: Vec::new(),
            pending_promotion: None,
            status: GameStatus::Active,
            rules: self.rules,
        };
        pos.status = pos.detect_status();
        Ok(pos)
    }
}

impl Default for Setup {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
