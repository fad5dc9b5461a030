//! Move generation.
//!
//! Pipeline:
//!   1. Generate pseudo-legal moves per piece (movement pattern and
//!      occupancy only, ignoring self-check).
//!   2. Filter: apply each candidate to a throwaway copy and keep it iff the
//!      mover's king is not left in check.
//!
//! Castling is generated from the king's `has_moved` gate, the castling
//! right, and emptiness between king and rook. Neither the king's current
//! check status nor the transit squares are tested: only the destination
//! square's safety is enforced, by the legality filter. A known
//! simplification of the standard castling rule.

use crate::engine::board::Position;
use crate::engine::types::{CastleSide, Color, Move, MoveFlags, PieceType, Square};

const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const KING_DELTAS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const BISHOP_DIRS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const ROOK_DIRS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const QUEEN_DIRS: [(i8, i8); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

// =========================================================================
// Public API
// =========================================================================

/// Generate all legal moves for the side to move.
pub fn legal_moves(pos: &Position) -> Vec<Move> {
    let mut moves = Vec::with_capacity(64);
    for from in pos.occupied_squares(pos.side_to_move) {
        moves.extend(legal_moves_from(pos, from));
    }
    moves
}

/// Generate all legal moves originating from a specific square.
///
/// Empty squares and squares held by the opponent yield no moves; legality
/// is always relative to the side to move.
pub fn legal_moves_from(pos: &Position, from: Square) -> Vec<Move> {
    let us = pos.side_to_move;
    match pos.piece_at(from) {
        Some(p) if p.color == us => {}
        _ => return Vec::new(),
    }

    pseudo_moves_from(pos, from)
        .into_iter()
        .filter(|mv| {
            // Clone-and-discard: the live position is never mutated here.
            let mut copy = pos.clone();
            copy.apply_move(mv);
            !in_check(&copy, us)
        })
        .collect()
}

/// Is `color`'s king attacked in this position?
///
/// Re-runs pseudo-move generation for the opposing side and checks whether
/// any candidate targets the king square. A position without a king for
/// `color` is reported as not in check rather than treated as an error.
pub fn in_check(pos: &Position, color: Color) -> bool {
    let Some(king_sq) = pos.king_square(color) else {
        return false;
    };
    pseudo_moves(pos, !color).iter().any(|mv| mv.to == king_sq)
}

/// All pseudo-legal moves for every piece of a color.
pub fn pseudo_moves(pos: &Position, color: Color) -> Vec<Move> {
    let mut moves = Vec::with_capacity(64);
    for from in pos.occupied_squares(color) {
        moves.extend(pseudo_moves_from(pos, from));
    }
    moves
}

/// Pseudo-legal moves for the piece on `from` (empty square → none).
pub fn pseudo_moves_from(pos: &Position, from: Square) -> Vec<Move> {
    let Some(piece) = pos.piece_at(from) else {
        return Vec::new();
    };

    let mut moves = Vec::new();
    match piece.kind {
        PieceType::Pawn => pawn_moves(pos, from, piece.color, &mut moves),
        PieceType::Knight => step_moves(pos, from, piece.color, &KNIGHT_DELTAS, &mut moves),
        PieceType::Bishop => slide_moves(pos, from, piece.color, &BISHOP_DIRS, &mut moves),
        PieceType::Rook => slide_moves(pos, from, piece.color, &ROOK_DIRS, &mut moves),
        PieceType::Queen => slide_moves(pos, from, piece.color, &QUEEN_DIRS, &mut moves),
        PieceType::King => {
            step_moves(pos, from, piece.color, &KING_DELTAS, &mut moves);
            if !piece.has_moved {
                castle_moves(pos, from, piece.color, &mut moves);
            }
        }
    }
    moves
}

// =========================================================================
// Pawn moves
// =========================================================================

fn pawn_moves(pos: &Position, from: Square, color: Color, moves: &mut Vec<Move>) {
    let (forward, home_rank, promo_rank): (i8, u8, u8) = match color {
        Color::White => (1, 1, 7),
        Color::Black => (-1, 6, 0),
    };

    // --- Pushes ---
    if let Some(one) = from.offset(forward, 0)
        && pos.piece_at(one).is_none()
    {
        if one.rank() == promo_rank {
            // Underpromotion is not generated; the promotion defaults to a
            // queen and callers may substitute before applying.
            moves.push(Move::with_promotion(from, one, PieceType::Queen, MoveFlags::NONE));
        } else {
            moves.push(Move::new(from, one));
        }

        if from.rank() == home_rank
            && let Some(two) = from.offset(forward * 2, 0)
            && pos.piece_at(two).is_none()
        {
            moves.push(Move::with_flags(from, two, MoveFlags::DOUBLE_PUSH));
        }
    }

    // --- Diagonal captures & en passant ---
    for df in [-1i8, 1] {
        let Some(to) = from.offset(forward, df) else {
            continue;
        };
        if let Some(target) = pos.piece_at(to)
            && target.color != color
        {
            if to.rank() == promo_rank {
                moves.push(Move::with_promotion(
                    from,
                    to,
                    PieceType::Queen,
                    MoveFlags::CAPTURE,
                ));
            } else {
                moves.push(Move::with_flags(from, to, MoveFlags::CAPTURE));
            }
        }
        if pos.en_passant == Some(to) {
            moves.push(Move::with_flags(
                from,
                to,
                MoveFlags::CAPTURE | MoveFlags::EN_PASSANT,
            ));
        }
    }
}

// =========================================================================
// Knight & king steps
// =========================================================================

fn step_moves(
    pos: &Position,
    from: Square,
    color: Color,
    deltas: &[(i8, i8)],
    moves: &mut Vec<Move>,
) {
    for &(dr, df) in deltas {
        let Some(to) = from.offset(dr, df) else {
            continue;
        };
        match pos.piece_at(to) {
            None => moves.push(Move::new(from, to)),
            Some(target) if target.color != color => {
                moves.push(Move::with_flags(from, to, MoveFlags::CAPTURE));
            }
            Some(_) => {}
        }
    }
}

// =========================================================================
// Sliders (bishop, rook, queen)
// =========================================================================

fn slide_moves(
    pos: &Position,
    from: Square,
    color: Color,
    dirs: &[(i8, i8)],
    moves: &mut Vec<Move>,
) {
    for &(dr, df) in dirs {
        let mut current = from;
        while let Some(to) = current.offset(dr, df) {
            match pos.piece_at(to) {
                None => {
                    moves.push(Move::new(from, to));
                    current = to;
                }
                Some(target) => {
                    if target.color != color {
                        moves.push(Move::with_flags(from, to, MoveFlags::CAPTURE));
                    }
                    break;
                }
            }
        }
    }
}

// =========================================================================
// Castling
// =========================================================================

/// Castling candidates for an unmoved king.
///
/// Gates: the right is still held and the home-rank squares strictly between
/// king and rook are empty. The king lands two files toward the rook. No
/// attack tests happen here; the legality filter later rejects the move only
/// if the *destination* is unsafe.
fn castle_moves(pos: &Position, from: Square, color: Color, moves: &mut Vec<Move>) {
    let rank = match color {
        Color::White => 0,
        Color::Black => 7,
    };

    if pos.castling_rights.can_castle(color, CastleSide::Kingside) {
        let f_sq = Square::from_file_rank(5, rank);
        let g_sq = Square::from_file_rank(6, rank);
        if pos.piece_at(f_sq).is_none() && pos.piece_at(g_sq).is_none() {
            moves.push(Move::castling(from, g_sq, CastleSide::Kingside));
        }
    }

    if pos.castling_rights.can_castle(color, CastleSide::Queenside) {
        let b_sq = Square::from_file_rank(1, rank);
        let c_sq = Square::from_file_rank(2, rank);
        let d_sq = Square::from_file_rank(3, rank);
        if pos.piece_at(b_sq).is_none()
            && pos.piece_at(c_sq).is_none()
            && pos.piece_at(d_sq).is_none()
        {
            moves.push(Move::castling(from, c_sq, CastleSide::Queenside));
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
