//! Board position representation and move application.
//!
//! `Position` stores piece placement as an 8×8 grid of optional pieces,
//! plus side to move, castling rights, en-passant square and move counters.
//! Each piece carries a `has_moved` flag used as the king's castling gate;
//! FEN decoding resets the flag, so snapshot reloads rely on the castling
//! rights field for revocation history.

use crate::engine::types::{
    CastleSide, CastlingRights, ChessError, Color, Move, Piece, PieceType, Square,
};

/// The standard starting position.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A complete chess position.
///
/// The grid is indexed `board[rank][file]` with rank 0 = rank 1 (White's
/// back rank), matching [`Square`]'s a1 = 0 mapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    /// Piece placement.
    pub board: [[Option<Piece>; 8]; 8],

    /// Whose turn it is.
    pub side_to_move: Color,

    /// Castling availability (K/Q/k/q).
    pub castling_rights: CastlingRights,

    /// En-passant target square (the square *behind* the double-pushed pawn).
    pub en_passant: Option<Square>,

    /// Half-move clock (reset on pawn move or capture; tracked but never
    /// consulted for draw termination).
    pub halfmove_clock: u16,

    /// Full-move number (starts at 1, incremented after Black moves).
    pub fullmove_number: u16,
}

// ---------------------------------------------------------------------------
// Construction & queries
// ---------------------------------------------------------------------------

impl Position {
    /// Create an empty board with no pieces.
    pub fn empty() -> Self {
        Position {
            board: [[None; 8]; 8],
            side_to_move: Color::White,
            castling_rights: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Standard starting position.
    pub fn starting() -> Self {
        Self::from_fen(START_FEN).expect("starting FEN is always valid")
    }

    /// What piece (if any) is on a given square?
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.board[sq.rank() as usize][sq.file() as usize]
    }

    /// Place (or clear) a square.
    #[inline]
    pub fn set_piece(&mut self, sq: Square, piece: Option<Piece>) {
        self.board[sq.rank() as usize][sq.file() as usize] = piece;
    }

    /// Remove and return the piece on a square.
    #[inline]
    pub fn take_piece(&mut self, sq: Square) -> Option<Piece> {
        self.board[sq.rank() as usize][sq.file() as usize].take()
    }

    /// Find the king square for the given color.
    ///
    /// King-less positions are representable (the check oracle treats them
    /// as "not in check"), so this returns an `Option` rather than failing.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        for rank in 0..8u8 {
            for file in 0..8u8 {
                let sq = Square::from_file_rank(file, rank);
                if let Some(p) = self.piece_at(sq)
                    && p.kind == PieceType::King
                    && p.color == color
                {
                    return Some(sq);
                }
            }
        }
        None
    }

    /// All squares occupied by pieces of a color, scanning from rank 8
    /// downward. The scan order is observable through the notation importer
    /// ("first matching candidate wins"), so it stays fixed.
    pub fn occupied_squares(&self, color: Color) -> Vec<Square> {
        let mut squares = Vec::with_capacity(16);
        for rank in (0..8u8).rev() {
            for file in 0..8u8 {
                let sq = Square::from_file_rank(file, rank);
                if let Some(p) = self.piece_at(sq)
                    && p.color == color
                {
                    squares.push(sq);
                }
            }
        }
        squares
    }

    // -----------------------------------------------------------------------
    // Move application
    // -----------------------------------------------------------------------

    /// Apply a move to the position, mutating it in place.
    ///
    /// The caller is responsible for supplying a generated move; legality
    /// (self-check) is the legality filter's concern. Handles the special
    /// board edits for en passant, castling and promotion, and updates every
    /// derived field: castling rights, en-passant target, both counters and
    /// the side to move.
    pub fn apply_move(&mut self, mv: &Move) {
        let us = self.side_to_move;
        let Some(mut piece) = self.take_piece(mv.from) else {
            debug_assert!(false, "apply_move: no piece on {}", mv.from);
            return;
        };
        let moving_kind = piece.kind;
        let captured = self.piece_at(mv.to);

        // En passant: the victim sits one rank behind the destination along
        // the mover's direction.
        if mv.flags.is_en_passant() {
            let forward: i8 = match piece.color {
                Color::White => 1,
                Color::Black => -1,
            };
            if let Some(victim) = mv.to.offset(-forward, 0) {
                self.set_piece(victim, None);
            }
        }

        if let Some(promo) = mv.promotion {
            piece.kind = promo;
        }
        piece.has_moved = true;
        self.set_piece(mv.to, Some(piece));

        // Castling: bring the rook across as well.
        if let Some(side) = mv.castle {
            let (rook_from, rook_to) = castling_rook_squares(us, side);
            if let Some(mut rook) = self.take_piece(rook_from) {
                rook.has_moved = true;
                self.set_piece(rook_to, Some(rook));
            }
        }

        // Moving a king or rook off its home square, or capturing a rook on
        // one, permanently revokes the matching right.
        self.castling_rights.0 &= CASTLING_MASK[mv.from.0 as usize];
        self.castling_rights.0 &= CASTLING_MASK[mv.to.0 as usize];

        // The en-passant target only survives a fresh double push.
        self.en_passant = if mv.flags.is_double_push() {
            let forward: i8 = match us {
                Color::White => 1,
                Color::Black => -1,
            };
            mv.from.offset(forward, 0)
        } else {
            None
        };

        if moving_kind == PieceType::Pawn || mv.flags.is_capture() || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        if us == Color::Black {
            self.fullmove_number += 1;
        }

        self.side_to_move = !us;
    }

    // -----------------------------------------------------------------------
    // Board display (8×8 text grid)
    // -----------------------------------------------------------------------

    /// Render the board as an 8-line string (rank 8 at top), for debugging.
    pub fn board_string(&self) -> String {
        let mut s = String::with_capacity(200);
        for rank in (0..8u8).rev() {
            s.push((b'1' + rank) as char);
            s.push(' ');
            for file in 0..8u8 {
                let sq = Square::from_file_rank(file, rank);
                let ch = match self.piece_at(sq) {
                    Some(p) => p.to_char(),
                    None => '.',
                };
                s.push(ch);
                if file < 7 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h");
        s
    }
}

// ---------------------------------------------------------------------------
// Castling helpers (free functions)
// ---------------------------------------------------------------------------

/// Home and post-castle squares for the rook of a castling move.
pub fn castling_rook_squares(color: Color, side: CastleSide) -> (Square, Square) {
    let rank = match color {
        Color::White => 0,
        Color::Black => 7,
    };
    match side {
        CastleSide::Kingside => (
            Square::from_file_rank(7, rank),
            Square::from_file_rank(5, rank),
        ),
        CastleSide::Queenside => (
            Square::from_file_rank(0, rank),
            Square::from_file_rank(3, rank),
        ),
    }
}

/// Mask table indexed by square index. When a move touches a square, AND the
/// castling rights with this mask. E.g. if a rook on a1 moves (or is
/// captured), remove White-queenside; the king's home square removes both of
/// that side's rights.
const CASTLING_MASK: [u8; 64] = {
    let mut mask = [0b1111u8; 64];
    mask[0] = 0b1111 & !CastlingRights::WHITE_QUEENSIDE; // a1
    mask[4] = 0b1111 & !(CastlingRights::WHITE_KINGSIDE | CastlingRights::WHITE_QUEENSIDE); // e1
    mask[7] = 0b1111 & !CastlingRights::WHITE_KINGSIDE; // h1
    mask[56] = 0b1111 & !CastlingRights::BLACK_QUEENSIDE; // a8
    mask[60] = 0b1111 & !(CastlingRights::BLACK_KINGSIDE | CastlingRights::BLACK_QUEENSIDE); // e8
    mask[63] = 0b1111 & !CastlingRights::BLACK_KINGSIDE; // h8
    mask
};

// ---------------------------------------------------------------------------
// FEN parsing & generation
// ---------------------------------------------------------------------------

impl Position {
    /// Parse a FEN string into a `Position`.
    ///
    /// Validates the structure of all 6 fields (piece placement, side to
    /// move, castling, en passant, halfmove clock, fullmove number). The
    /// codec assumes well-formed placement from trusted callers and does not
    /// enforce chess-level invariants such as king counts. Every decoded
    /// piece starts with `has_moved == false`.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(ChessError::InvalidFen(format!(
                "expected 6 fields, got {}",
                fields.len()
            )));
        }

        let mut pos = Position::empty();

        // ----- Field 1: Piece placement -----
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(ChessError::InvalidFen(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx as u8; // FEN starts from rank 8
            let mut file: u8 = 0;
            for ch in rank_str.chars() {
                if file > 7 {
                    return Err(ChessError::InvalidFen(format!(
                        "too many squares in rank {}",
                        rank + 1
                    )));
                }
                if let Some(digit) = ch.to_digit(10) {
                    if !(1..=8).contains(&digit) {
                        return Err(ChessError::InvalidFen(format!(
                            "invalid empty count '{ch}' in rank {}",
                            rank + 1
                        )));
                    }
                    file += digit as u8;
                } else if let Some((color, kind)) = PieceType::from_char(ch) {
                    let sq = Square::from_file_rank(file, rank);
                    pos.set_piece(sq, Some(Piece::new(kind, color)));
                    file += 1;
                } else {
                    return Err(ChessError::InvalidFen(format!(
                        "invalid character '{ch}' in piece placement"
                    )));
                }
            }
            if file != 8 {
                return Err(ChessError::InvalidFen(format!(
                    "rank {} has {} squares instead of 8",
                    rank + 1,
                    file
                )));
            }
        }

        // ----- Field 2: Side to move -----
        let mut side_chars = fields[1].chars();
        pos.side_to_move = match (side_chars.next().and_then(Color::from_fen_char), side_chars.next()) {
            (Some(color), None) => color,
            _ => {
                return Err(ChessError::InvalidFen(format!(
                    "invalid side to move: '{}'",
                    fields[1]
                )));
            }
        };

        // ----- Field 3: Castling availability -----
        pos.castling_rights = CastlingRights::from_fen(fields[2]).ok_or_else(|| {
            ChessError::InvalidFen(format!("invalid castling string: '{}'", fields[2]))
        })?;

        // ----- Field 4: En passant target square -----
        if fields[3] != "-" {
            let ep_sq = Square::from_algebraic(fields[3]).ok_or_else(|| {
                ChessError::InvalidFen(format!("invalid en passant square: '{}'", fields[3]))
            })?;
            // The target sits behind a double-pushed pawn: rank 3 or rank 6.
            let rank = ep_sq.rank();
            if rank != 2 && rank != 5 {
                return Err(ChessError::InvalidFen(format!(
                    "en passant square {} is not on rank 3 or 6",
                    fields[3]
                )));
            }
            pos.en_passant = Some(ep_sq);
        }

        // ----- Field 5: Halfmove clock -----
        pos.halfmove_clock = fields[4].parse::<u16>().map_err(|_| {
            ChessError::InvalidFen(format!("invalid halfmove clock: '{}'", fields[4]))
        })?;

        // ----- Field 6: Fullmove number -----
        pos.fullmove_number = fields[5].parse::<u16>().map_err(|_| {
            ChessError::InvalidFen(format!("invalid fullmove number: '{}'", fields[5]))
        })?;
        if pos.fullmove_number == 0 {
            return Err(ChessError::InvalidFen(
                "fullmove number must be >= 1".to_string(),
            ));
        }

        Ok(pos)
    }

    /// Export the position as a FEN string.
    ///
    /// Per-piece `has_moved` flags are not part of the format and are
    /// dropped; decoding the result normalizes them to false.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(80);

        // ----- Field 1: Piece placement -----
        for rank in (0..8u8).rev() {
            let mut empty_count = 0u8;
            for file in 0..8u8 {
                let sq = Square::from_file_rank(file, rank);
                match self.piece_at(sq) {
                    Some(piece) => {
                        if empty_count > 0 {
                            fen.push((b'0' + empty_count) as char);
                            empty_count = 0;
                        }
                        fen.push(piece.to_char());
                    }
                    None => {
                        empty_count += 1;
                    }
                }
            }
            if empty_count > 0 {
                fen.push((b'0' + empty_count) as char);
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        // ----- Field 2: Side to move -----
        fen.push(' ');
        fen.push(self.side_to_move.to_fen_char());

        // ----- Field 3: Castling -----
        fen.push(' ');
        fen.push_str(&self.castling_rights.to_fen());

        // ----- Field 4: En passant -----
        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&sq.to_algebraic()),
            None => fen.push('-'),
        }

        // ----- Field 5: Halfmove clock -----
        fen.push(' ');
        fen.push_str(&self.halfmove_clock.to_string());

        // ----- Field 6: Fullmove number -----
        fen.push(' ');
        fen.push_str(&self.fullmove_number.to_string());

        fen
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.board_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
