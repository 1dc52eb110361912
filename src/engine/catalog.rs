//! Piece geometry catalog.
//!
//! For every piece identity this module exposes a fixed, ordered list of
//! relative offsets describing where the piece could go on an empty,
//! unbounded board. Sliding pieces list their offsets ray by ray, seven per
//! ray at increasing distance, so a ray starts at every index divisible by
//! [`RAY_LEN`]. All tables are built at compile time.

use crate::engine::types::{Color, Offset, PieceKind};

/// Offsets per sliding ray (1..=7 squares).
pub const RAY_LEN: usize = 7;

/// Index of the two castling pseudo-offsets in the king's geometry.
pub const KING_CASTLE_KINGSIDE: usize = 8;
pub const KING_CASTLE_QUEENSIDE: usize = 9;

// Pawn offsets in catalog order: the two diagonal captures, then the single
// and double pushes.
pub const PAWN_CAPTURE_WEST: usize = 0;
pub const PAWN_CAPTURE_EAST: usize = 1;
pub const PAWN_PUSH: usize = 2;
pub const PAWN_DOUBLE_PUSH: usize = 3;

// =========================================================================
// Direction tables
// =========================================================================

pub const ROOK_DIRS: [Offset; 4] = [
    Offset::new(0, 1),
    Offset::new(1, 0),
    Offset::new(0, -1),
    Offset::new(-1, 0),
];

pub const BISHOP_DIRS: [Offset; 4] = [
    Offset::new(1, 1),
    Offset::new(1, -1),
    Offset::new(-1, -1),
    Offset::new(-1, 1),
];

/// Rook directions first, then bishop directions.
pub const QUEEN_DIRS: [Offset; 8] = [
    ROOK_DIRS[0],
    ROOK_DIRS[1],
    ROOK_DIRS[2],
    ROOK_DIRS[3],
    BISHOP_DIRS[0],
    BISHOP_DIRS[1],
    BISHOP_DIRS[2],
    BISHOP_DIRS[3],
];

pub const KNIGHT_JUMPS: [Offset; 8] = [
    Offset::new(1, 2),
    Offset::new(2, 1),
    Offset::new(2, -1),
    Offset::new(1, -2),
    Offset::new(-1, -2),
    Offset::new(-2, -1),
    Offset::new(-2, 1),
    Offset::new(-1, 2),
];

static KING_STEPS: [Offset; 10] = [
    Offset::new(0, 1),
    Offset::new(1, 1),
    Offset::new(1, 0),
    Offset::new(1, -1),
    Offset::new(0, -1),
    Offset::new(-1, -1),
    Offset::new(-1, 0),
    Offset::new(-1, 1),
    // Castling pseudo-offsets, interpreted by move generation.
    Offset::new(2, 0),
    Offset::new(-2, 0),
];

static WHITE_PAWN: [Offset; 4] = pawn(Color::White);
static BLACK_PAWN: [Offset; 4] = pawn(Color::Black);

static ROOK_RAYS: [Offset; 4 * RAY_LEN] = rays(ROOK_DIRS);
static BISHOP_RAYS: [Offset; 4 * RAY_LEN] = rays(BISHOP_DIRS);
static QUEEN_RAYS: [Offset; 8 * RAY_LEN] = rays(QUEEN_DIRS);

const fn pawn(color: Color) -> [Offset; 4] {
    let fwd = color.forward();
    [
        Offset::new(-1, fwd),
        Offset::new(1, fwd),
        Offset::new(0, fwd),
        Offset::new(0, 2 * fwd),
    ]
}

/// Expand unit directions into concatenated rays of `RAY_LEN` offsets.
const fn rays<const D: usize, const N: usize>(dirs: [Offset; D]) -> [Offset; N] {
    assert!(N == D * RAY_LEN);
    let mut out = [Offset::new(0, 0); N];
    let mut d = 0;
    while d < D {
        let mut step = 0;
        while step < RAY_LEN {
            out[d * RAY_LEN + step] = dirs[d].scaled(step as i8 + 1);
            step += 1;
        }
        d += 1;
    }
    out
}

// =========================================================================
// Public API
// =========================================================================

/// The ordered move template for a piece identity.
pub fn geometry(kind: PieceKind, color: Color) -> &'static [Offset] {
    match kind {
        PieceKind::Pawn => match color {
            Color::White => &WHITE_PAWN,
            Color::Black => &BLACK_PAWN,
        },
        PieceKind::Knight => &KNIGHT_JUMPS,
        PieceKind::Bishop => &BISHOP_RAYS,
        PieceKind::Rook => &ROOK_RAYS,
        PieceKind::Queen => &QUEEN_RAYS,
        PieceKind::King => &KING_STEPS,
    }
}

/// Slider geometry split into its rays, each ordered outward.
///
/// Empty for non-sliding kinds.
pub fn rays_of(kind: PieceKind) -> std::slice::ChunksExact<'static, Offset> {
    let table: &'static [Offset] = if kind.is_slider() {
        geometry(kind, Color::White)
    } else {
        &[]
    };
    table.chunks_exact(RAY_LEN)
}

/// The two diagonal capture offsets of a pawn of `color`.
#[inline]
pub fn pawn_captures(color: Color) -> &'static [Offset] {
    &geometry(PieceKind::Pawn, color)[PAWN_CAPTURE_WEST..=PAWN_CAPTURE_EAST]
}

/// The eight single-square king steps, without the castling pseudo-offsets.
#[inline]
pub fn king_steps() -> &'static [Offset] {
    &KING_STEPS[..KING_CASTLE_KINGSIDE]
}

/// Whether a unit direction is orthogonal (rook-like) rather than diagonal.
#[inline]
pub fn is_orthogonal(dir: Offset) -> bool {
    dir.file == 0 || dir.rank == 0
}

// =========================================================================
// Tests
// =========================================================================
