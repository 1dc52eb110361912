//! Chess rules engine: legal move generation, move commitment with castling,
//! en passant and promotion, and detection of check, checkmate, stalemate
//! and the fifty-move and repetition draws.

pub mod config;
pub mod engine;
