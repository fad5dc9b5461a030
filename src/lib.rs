//! Chess rules engine.
//!
//! The crate maintains a board position, enumerates legal moves, applies
//! moves while preserving chess invariants (check, castling, en passant,
//! promotion, move counters), detects checkmate and stalemate, and speaks
//! FEN plus a best-effort move notation for import/export.
//!
//! The primary entry point is [`engine::game::Session`], which owns a live
//! [`engine::board::Position`] together with a linear undo history and a
//! redo stack. Rendering layers consume the engine through
//! [`view::SessionView`] snapshots; the engine itself performs no I/O.

pub mod config;
pub mod engine;
pub mod view;

pub use config::SessionConfig;
pub use engine::board::Position;
pub use engine::game::Session;
pub use engine::types::*;
