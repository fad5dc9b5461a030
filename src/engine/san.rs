//! Move notation generation.
//!
//! The grammar is deliberately minimal:
//! `<piece letter><x if capture><destination><=P if promoted><+ if check>`.
//! Pawns print no letter, castling prints as a king move (`Kg1`), there is
//! no disambiguation between same-kind pieces and no distinct mate symbol.
//! The check suffix is found by applying the move to a throwaway copy.

use crate::engine::board::Position;
use crate::engine::movegen;
use crate::engine::types::{Move, PieceType};

/// Render a move as notation against the position it is about to be played
/// in.
pub fn move_to_san(pos: &Position, mv: &Move) -> String {
    let Some(piece) = pos.piece_at(mv.from) else {
        // Not reachable for generated moves; fall back to coordinate text.
        return mv.to_string();
    };

    let mut san = String::with_capacity(8);

    if piece.kind != PieceType::Pawn {
        san.push(piece.kind.letter());
    }

    if mv.flags.is_capture() || pos.piece_at(mv.to).is_some() {
        san.push('x');
    }

    san.push_str(&mv.to.to_algebraic());

    if let Some(promo) = mv.promotion {
        san.push('=');
        san.push(promo.letter());
    }

    // Probe the resulting position: a '+' marks the opponent left in check.
    let mut copy = pos.clone();
    copy.apply_move(mv);
    if movegen::in_check(&copy, copy.side_to_move) {
        san.push('+');
    }

    san
}

// =========================================================================
// Tests
// =========================================================================
