//! Captured-piece tally, derived from a board snapshot.

use serde::{Deserialize, Serialize};

use crate::engine::board::Board;
use crate::engine::types::{Color, Piece};

/// Pieces missing from the board per identity: starting count minus the
/// count still present, never below zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedTally {
    missing: [u8; 12],
}

impl CapturedTally {
    pub fn from_board(board: &Board) -> Self {
        let mut missing = [0u8; 12];
        for piece in Piece::ALL {
            missing[piece.index()] = piece.kind.starting_count().saturating_sub(board.count(piece));
        }
        CapturedTally { missing }
    }

    /// Missing pieces of one identity.
    pub fn get(&self, piece: Piece) -> u8 {
        self.missing[piece.index()]
    }

    /// All pieces `color` has lost.
    pub fn total(&self, color: Color) -> u32 {
        Piece::ALL
            .iter()
            .filter(|p| p.color == color)
            .map(|p| self.get(*p) as u32)
            .sum()
    }

    /// Non-zero entries, white first.
    pub fn entries(&self) -> impl Iterator<Item = (Piece, u8)> + '_ {
        Piece::ALL
            .into_iter()
            .map(|p| (p, self.get(p)))
            .filter(|(_, n)| *n > 0)
    }
}
