//! Legal destination generation.
//!
//! Pipeline, per piece:
//!   1. Walk the piece's catalog geometry and keep the candidates its kind
//!      admits (captures, pushes, ray walks, castling).
//!   2. Filter: play the candidate on a scratch copy of the board and drop it
//!      if the mover's own king is left attacked.
//!
//! Nothing here mutates the `Position`; the only writes go to scratch boards.

use tracing::trace;

use crate::engine::attacks;
use crate::engine::board::Board;
use crate::engine::catalog::{
    self, KING_CASTLE_KINGSIDE, KING_CASTLE_QUEENSIDE, PAWN_DOUBLE_PUSH, PAWN_PUSH,
};
use crate::engine::position::Position;
use crate::engine::types::{
    CastlingRights, ChessError, Color, Offset, Piece, PieceKind, QueryFault, Square,
};

// =========================================================================
// Public API
// =========================================================================

/// Legal destinations for the piece on `from`, as absolute squares sorted by
/// (rank, file).
///
/// `from` must hold a piece of the side to move; anything else is an
/// `InvalidQuery`. While a promotion is pending no piece may be queried.
pub fn legal_destinations(pos: &Position, from: Square) -> Result<Vec<Square>, ChessError> {
    if let Some(pending) = pos.pending_promotion() {
        return Err(ChessError::PromotionPending(pending));
    }
    let piece = pos
        .board()
        .piece_at(from)
        .ok_or(ChessError::InvalidQuery {
            square: from,
            fault: QueryFault::EmptySquare,
        })?;
    if piece.color != pos.side_to_move() {
        return Err(ChessError::InvalidQuery {
            square: from,
            fault: QueryFault::WrongTurn,
        });
    }
    let dests = destinations_for(pos, from, piece);
    trace!(%from, %piece, count = dests.len(), "legal destinations");
    Ok(dests)
}

/// Every legal (origin, destination) pair for the side to move.
///
/// Empty while a promotion is pending.
pub fn legal_moves(pos: &Position) -> Vec<(Square, Square)> {
    if pos.pending_promotion().is_some() {
        return Vec::new();
    }
    let us = pos.side_to_move();
    pos.board()
        .pieces_of(us)
        .flat_map(|(from, piece)| {
            destinations_for(pos, from, piece)
                .into_iter()
                .map(move |to| (from, to))
        })
        .collect()
}

/// Whether `color` has at least one legal move. Stops at the first one found.
pub fn has_legal_move(pos: &Position, color: Color) -> bool {
    pos.board()
        .pieces_of(color)
        .any(|(from, piece)| !destinations_for(pos, from, piece).is_empty())
}

/// The piece a move from `from` to `to` would capture, and where it stands.
///
/// Covers en passant, where the victim is not on `to`.
pub fn captured_by(board: &Board, from: Square, to: Square) -> Option<(Square, Piece)> {
    if is_en_passant(board, from, to) {
        let victim = Square::new(to.file(), from.rank());
        return board.piece_at(victim).map(|p| (victim, p));
    }
    board.piece_at(to).map(|p| (to, p))
}

/// A pawn moving diagonally onto an empty square.
pub fn is_en_passant(board: &Board, from: Square, to: Square) -> bool {
    matches!(board.piece_at(from), Some(p) if p.kind == PieceKind::Pawn)
        && from.file() != to.file()
        && board.is_empty(to)
}

/// A king moving two files.
pub fn is_castling(board: &Board, from: Square, to: Square) -> bool {
    matches!(board.piece_at(from), Some(p) if p.kind == PieceKind::King)
        && from.delta(to).file.abs() == 2
}

// =========================================================================
// Board effects (shared by simulation and commit)
// =========================================================================

/// Apply the placement effects of a move: en-passant removal, the move
/// itself, and the rook hop when castling. Returns the captured piece.
///
/// Promotion is not applied here; the pawn lands as a pawn.
pub(crate) fn apply_to_board(board: &mut Board, from: Square, to: Square) -> Option<Piece> {
    let castling = is_castling(board, from, to);
    let captured = if is_en_passant(board, from, to) {
        board.take(Square::new(to.file(), from.rank()))
    } else {
        None
    };
    let captured = board.relocate(from, to).or(captured);
    if castling {
        let (rook_from, rook_to) = castling_rook_squares(from, to);
        board.relocate(rook_from, rook_to);
    }
    captured
}

/// Rook origin and destination for a castling king move.
pub(crate) fn castling_rook_squares(king_from: Square, king_to: Square) -> (Square, Square) {
    let kingside = king_to.file() > king_from.file();
    let rook_file = if kingside { 7 } else { 0 };
    let pass_file = (king_from.file() + king_to.file()) / 2;
    (
        Square::new(rook_file, king_from.rank()),
        Square::new(pass_file, king_from.rank()),
    )
}

// =========================================================================
// Generation (internal)
// =========================================================================

/// Legal destinations for `piece` on `from`, skipping the caller checks.
pub(crate) fn destinations_for(pos: &Position, from: Square, piece: Piece) -> Vec<Square> {
    let mut candidates = Vec::with_capacity(28);
    match piece.kind {
        PieceKind::Pawn => pawn_candidates(pos, from, piece.color, &mut candidates),
        PieceKind::Knight => step_candidates(
            pos.board(),
            from,
            piece.color,
            catalog::geometry(PieceKind::Knight, piece.color),
            &mut candidates,
        ),
        PieceKind::King => {
            step_candidates(
                pos.board(),
                from,
                piece.color,
                catalog::king_steps(),
                &mut candidates,
            );
            castling_candidates(pos, from, piece.color, &mut candidates);
        }
        PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => {
            slider_candidates(pos.board(), from, piece, &mut candidates)
        }
    }

    candidates.retain(|&to| leaves_king_safe(pos.board(), from, to, piece.color));
    candidates.sort_unstable();
    candidates
}

/// Play `from -> to` on a scratch board and test the mover's king.
fn leaves_king_safe(board: &Board, from: Square, to: Square, color: Color) -> bool {
    let mut scratch = board.clone();
    apply_to_board(&mut scratch, from, to);
    !attacks::is_in_check(&scratch, color)
}

// -------------------------------------------------------------------------
// Pawns
// -------------------------------------------------------------------------

fn pawn_candidates(pos: &Position, from: Square, us: Color, out: &mut Vec<Square>) {
    let board = pos.board();
    let geometry = catalog::geometry(PieceKind::Pawn, us);

    // Diagonals: captures only, either of a piece or en passant.
    for off in catalog::pawn_captures(us) {
        let Some(to) = from.offset(*off) else {
            continue;
        };
        match board.color_at(to) {
            Some(c) if c != us => out.push(to),
            Some(_) => {}
            None => {
                if en_passant_available(pos, from, to, us) {
                    out.push(to);
                }
            }
        }
    }

    // Pushes: single onto an empty square; double from the home rank through
    // an empty square onto an empty square.
    let Some(single) = from.offset(geometry[PAWN_PUSH]) else {
        return;
    };
    if !board.is_empty(single) {
        return;
    }
    out.push(single);

    if from.rank() == us.pawn_rank()
        && let Some(double) = from.offset(geometry[PAWN_DOUBLE_PUSH])
        && board.is_empty(double)
    {
        out.push(double);
    }
}

/// Is the diagonal `from -> to` an en-passant capture allowed this ply?
fn en_passant_available(pos: &Position, from: Square, to: Square, us: Color) -> bool {
    if from.rank() != us.en_passant_rank() || !pos.en_passant().allows(us, to.file()) {
        return false;
    }
    let victim = Square::new(to.file(), from.rank());
    pos.board().piece_at(victim) == Some(Piece::new(PieceKind::Pawn, !us))
}

// -------------------------------------------------------------------------
// Knights and king steps
// -------------------------------------------------------------------------

fn step_candidates(
    board: &Board,
    from: Square,
    us: Color,
    offsets: &[Offset],
    out: &mut Vec<Square>,
) {
    for off in offsets {
        if let Some(to) = from.offset(*off)
            && board.color_at(to) != Some(us)
        {
            out.push(to);
        }
    }
}

// -------------------------------------------------------------------------
// Castling
// -------------------------------------------------------------------------

fn castling_candidates(pos: &Position, from: Square, us: Color, out: &mut Vec<Square>) {
    let board = pos.board();
    let king_geometry = catalog::geometry(PieceKind::King, us);

    for (index, kingside) in [(KING_CASTLE_KINGSIDE, true), (KING_CASTLE_QUEENSIDE, false)] {
        if !pos.castling_rights().has(CastlingRights::flag(us, kingside)) {
            continue;
        }
        let Some(to) = from.offset(king_geometry[index]) else {
            continue;
        };
        let (rook_from, pass) = castling_rook_squares(from, to);
        if board.piece_at(rook_from) != Some(Piece::new(PieceKind::Rook, us)) {
            continue;
        }

        // Every square strictly between king and rook must be empty.
        let (lo, hi) = if from.file() < rook_from.file() {
            (from.file() + 1, rook_from.file())
        } else {
            (rook_from.file() + 1, from.file())
        };
        if !(lo..hi).all(|file| board.is_empty(Square::new(file, from.rank()))) {
            continue;
        }

        // The king may not start in, pass through, or land on an attacked square.
        if [from, pass, to]
            .iter()
            .all(|&sq| attacks::is_square_safe(board, sq, us))
        {
            out.push(to);
        }
    }
}

// -------------------------------------------------------------------------
// Sliders
// -------------------------------------------------------------------------

fn slider_candidates(board: &Board, from: Square, piece: Piece, out: &mut Vec<Square>) {
    for ray in catalog::rays_of(piece.kind) {
        for off in ray {
            let Some(to) = from.offset(*off) else {
                break;
            };
            match board.color_at(to) {
                None => out.push(to),
                Some(c) => {
                    if c != piece.color {
                        out.push(to);
                    }
                    break;
                }
            }
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
