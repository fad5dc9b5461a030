//! Serializable view models for rendering collaborators.
//!
//! The engine's types stay serde-free; UI layers consume snapshots built
//! here, with squares and pieces rendered as plain strings.

use serde::Serialize;

use crate::engine::game::Session;
use crate::engine::movegen;
use crate::engine::types::{Color, PieceType, Square};

/// From/to squares of the last applied move, for highlighting.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastMove {
    pub from: String,
    pub to: String,
}

/// A full snapshot of a session for rendering.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: String,
    pub fen: String,
    /// 8×8 grid, rank 8 first. Empty squares are `None`; pieces are coded
    /// like "wP" / "bK".
    pub board: Vec<Vec<Option<String>>>,
    pub side_to_move: String,
    pub status: String,
    pub game_over: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub check: bool,
    pub can_undo: bool,
    pub can_redo: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_move: Option<LastMove>,
    /// Legal destinations for the selected square, for move hints.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
    pub move_history: Vec<String>,
    pub created_at: String,
}

impl SessionView {
    /// Build a snapshot of the session's current state.
    pub fn from_session(session: &Session) -> Self {
        let position = session.position();

        let board = (0..8u8)
            .rev()
            .map(|rank| {
                (0..8u8)
                    .map(|file| {
                        position
                            .piece_at(Square::from_file_rank(file, rank))
                            .map(|p| format!("{}{}", p.color.to_fen_char(), p.kind.letter()))
                    })
                    .collect()
            })
            .collect();

        let hints = session
            .selected_square()
            .map(|sq| {
                session
                    .legal_destinations(sq)
                    .iter()
                    .map(|d| d.to_algebraic())
                    .collect()
            })
            .unwrap_or_default();

        SessionView {
            id: session.id.clone(),
            fen: session.to_fen(),
            board,
            side_to_move: match position.side_to_move {
                Color::White => "white".to_string(),
                Color::Black => "black".to_string(),
            },
            status: session.state().to_string(),
            game_over: session.is_game_over(),
            message: session.status_message(),
            check: movegen::in_check(position, position.side_to_move),
            can_undo: session.can_undo(),
            can_redo: session.can_redo(),
            last_move: session.last_move().map(|(from, to)| LastMove {
                from: from.to_algebraic(),
                to: to.to_algebraic(),
            }),
            hints,
            move_history: session.notation_history(),
            created_at: session.created_at.to_rfc3339(),
        }
    }
}

/// Promotion choices a UI may offer (the engine defaults to the first).
pub const PROMOTION_CHOICES: [PieceType; 4] = [
    PieceType::Queen,
    PieceType::Rook,
    PieceType::Bishop,
    PieceType::Knight,
];

// =========================================================================
// Tests
// =========================================================================
