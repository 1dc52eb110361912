pub mod attacks;
pub mod board;
pub mod catalog;
pub mod game;
pub mod movegen;
pub mod position;
pub mod tally;
pub mod types;

pub use board::Board;
pub use game::{Game, MoveRecord};
pub use movegen::{legal_destinations, legal_moves};
pub use position::{Position, Setup};
pub use tally::CapturedTally;
pub use types::*;
