pub mod board;
pub mod game;
pub mod movegen;
pub mod pgn;
pub mod san;
pub mod types;

pub use board::{Position, START_FEN};
pub use game::{HistoryEntry, Session};
pub use movegen::{in_check, legal_moves, legal_moves_from};
pub use pgn::{ImportOutcome, import_movetext, to_pgn};
pub use san::move_to_san;
pub use types::*;
