//! Stateful game session wrapping a Position.
//!
//! `Session` owns the live position, a linear undo history of pre-move FEN
//! snapshots, and a redo stack of snapshots captured at undo time. Castling,
//! en passant and promotion all collapse to "restore the string" on undo.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::engine::board::{Position, START_FEN};
use crate::engine::movegen;
use crate::engine::san;
use crate::engine::types::{ChessError, Color, GameState, Move, PieceType, Square};

// =========================================================================
// HistoryEntry
// =========================================================================

/// A recorded move in the session history.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    /// The move that was played.
    pub mv: Move,
    /// Notation for the move (computed before it was applied).
    pub san: String,
    /// FEN snapshot of the position immediately *before* the move.
    pub fen_before: String,
}

// =========================================================================
// Session
// =========================================================================

/// A complete chess game session with history, redo, and state tracking.
#[derive(Clone, Debug)]
pub struct Session {
    // Core state
    position: Position,
    history: Vec<HistoryEntry>,
    redo_stack: Vec<String>,
    state: GameState,
    winner: Option<Color>,
    selected: Option<Square>,

    // Metadata
    pub id: String,
    pub white_player: String,
    pub black_player: String,
    pub created_at: DateTime<Utc>,
    starting_fen: String,
}

impl Session {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// Create a new session from the standard starting position.
    pub fn new() -> Self {
        let config = SessionConfig::default();
        Session {
            position: Position::starting(),
            history: Vec::new(),
            redo_stack: Vec::new(),
            state: GameState::Ongoing,
            winner: None,
            selected: None,
            id: Uuid::new_v4().to_string(),
            white_player: config.white_player,
            black_player: config.black_player,
            created_at: Utc::now(),
            starting_fen: START_FEN.to_string(),
        }
    }

    /// Create a session from explicit options.
    pub fn with_config(config: SessionConfig) -> Result<Self, ChessError> {
        let position = Position::from_fen(&config.starting_fen)?;
        let mut session = Session {
            position,
            history: Vec::new(),
            redo_stack: Vec::new(),
            state: GameState::Ongoing,
            winner: None,
            selected: None,
            id: Uuid::new_v4().to_string(),
            white_player: config.white_player,
            black_player: config.black_player,
            created_at: Utc::now(),
            starting_fen: config.starting_fen,
        };
        session.refresh_state();
        Ok(session)
    }

    /// Create a session from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        Self::with_config(SessionConfig {
            starting_fen: fen.to_string(),
            ..SessionConfig::default()
        })
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    /// Current board position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Current session state.
    pub fn state(&self) -> GameState {
        self.state
    }

    /// The winner, for Checkmate and Resigned endings.
    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    /// Side to move.
    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move
    }

    /// Completed move history.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Notation strings of the moves played, in order.
    pub fn notation_history(&self) -> Vec<String> {
        self.history.iter().map(|e| e.san.clone()).collect()
    }

    /// Current position as FEN.
    pub fn to_fen(&self) -> String {
        self.position.to_fen()
    }

    /// The FEN the session started from.
    pub fn starting_fen(&self) -> &str {
        &self.starting_fen
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// From/to squares of the last applied move (for highlighting).
    pub fn last_move(&self) -> Option<(Square, Square)> {
        self.history.last().map(|e| (e.mv.from, e.mv.to))
    }

    /// Whether the game has ended.
    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }

    /// Human-readable terminal message, `None` while the game is ongoing.
    pub fn status_message(&self) -> Option<String> {
        match self.state {
            GameState::Ongoing => None,
            GameState::Checkmate => {
                let loser = self.position.side_to_move;
                Some(format!("{loser} is checkmated — {} wins", !loser))
            }
            GameState::Stalemate => Some("Stalemate (draw)".to_string()),
            GameState::Resigned => {
                let winner = self.winner.unwrap_or(Color::White);
                Some(format!("{} resigned — {winner} wins", !winner))
            }
        }
    }

    // -----------------------------------------------------------------
    // Selection & legal-move queries
    // -----------------------------------------------------------------

    /// Legal moves from a square, for the side to move only.
    pub fn selected_moves(&self, sq: Square) -> Vec<Move> {
        movegen::legal_moves_from(&self.position, sq)
    }

    /// Legal destination squares from a square (for move hints).
    pub fn legal_destinations(&self, sq: Square) -> Vec<Square> {
        self.selected_moves(sq).iter().map(|m| m.to).collect()
    }

    /// Select a square holding one of the side-to-move's pieces, returning
    /// its legal destinations. Selecting anything else clears the selection.
    pub fn select_square(&mut self, sq: Square) -> Vec<Square> {
        let own_piece = self
            .position
            .piece_at(sq)
            .is_some_and(|p| p.color == self.position.side_to_move);
        self.selected = own_piece.then_some(sq);
        self.legal_destinations(sq)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_square(&self) -> Option<Square> {
        self.selected
    }

    // -----------------------------------------------------------------
    // Making moves
    // -----------------------------------------------------------------

    /// Attempt to play from/to with an optional promotion choice.
    ///
    /// The pair must name a legal move for the side to move; otherwise an
    /// `IllegalMove` error is returned and the session is unchanged. The
    /// promotion choice only takes effect when the matched move is a
    /// promotion (the generator defaults to a queen). Returns the notation
    /// of the applied move.
    pub fn attempt_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceType>,
    ) -> Result<String, ChessError> {
        if self.state.is_game_over() {
            return Err(ChessError::GameOver(self.state.to_string()));
        }

        let legal = movegen::legal_moves_from(&self.position, from);
        let Some(template) = legal.iter().find(|m| m.to == to) else {
            return Err(ChessError::IllegalMove {
                from: from.to_algebraic(),
                to: to.to_algebraic(),
            });
        };

        let mut chosen = *template;
        if chosen.promotion.is_some() && promotion.is_some() {
            chosen.promotion = promotion;
        }
        Ok(self.apply(chosen))
    }

    /// Same as [`Session::attempt_move`] but with algebraic square names
    /// (e.g. `"e2"`, `"e4"`) and a promotion letter.
    pub fn attempt_move_text(
        &mut self,
        from: &str,
        to: &str,
        promotion: Option<&str>,
    ) -> Result<String, ChessError> {
        let from_sq = Square::from_algebraic(from)
            .ok_or_else(|| ChessError::InvalidSquare(from.to_string()))?;
        let to_sq =
            Square::from_algebraic(to).ok_or_else(|| ChessError::InvalidSquare(to.to_string()))?;
        let promo = promotion.and_then(parse_promotion_choice);
        self.attempt_move(from_sq, to_sq, promo)
    }

    /// Play a generated move. Convenience wrapper that routes through the
    /// same from/to lookup as [`Session::attempt_move`].
    pub fn make_move(&mut self, mv: Move) -> Result<String, ChessError> {
        self.attempt_move(mv.from, mv.to, mv.promotion)
    }

    /// Apply a validated legal move: record history, mutate the position,
    /// drop the redo stack, re-evaluate the terminal state.
    fn apply(&mut self, mv: Move) -> String {
        let san = san::move_to_san(&self.position, &mv);
        let fen_before = self.position.to_fen();

        self.position.apply_move(&mv);
        self.history.push(HistoryEntry {
            mv,
            san: san.clone(),
            fen_before,
        });
        self.redo_stack.clear();
        self.selected = None;
        self.refresh_state();
        san
    }

    // -----------------------------------------------------------------
    // Undo / redo (snapshot based)
    // -----------------------------------------------------------------

    /// Undo the last move. Returns false (and does nothing) when there is
    /// no history.
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.history.pop() else {
            return false;
        };
        match Position::from_fen(&entry.fen_before) {
            Ok(previous) => {
                self.redo_stack.push(self.position.to_fen());
                self.position = previous;
                self.selected = None;
                self.refresh_state();
                true
            }
            Err(_) => {
                // Snapshots are engine-written and always decode; leave the
                // session untouched if one somehow does not.
                self.history.push(entry);
                false
            }
        }
    }

    /// Redo the most recently undone move. Returns false (and does nothing)
    /// when the redo stack is empty.
    pub fn redo(&mut self) -> bool {
        let Some(fen) = self.redo_stack.pop() else {
            return false;
        };
        match Position::from_fen(&fen) {
            Ok(next) => {
                self.position = next;
                self.selected = None;
                self.refresh_state();
                true
            }
            Err(_) => {
                self.redo_stack.push(fen);
                false
            }
        }
    }

    // -----------------------------------------------------------------
    // Resign & reset
    // -----------------------------------------------------------------

    /// Resign on behalf of the side to move. The board is left untouched;
    /// the opponent is recorded as the winner.
    pub fn resign(&mut self) {
        if self.state.is_game_over() {
            return;
        }
        self.winner = Some(!self.position.side_to_move);
        self.state = GameState::Resigned;
        tracing::debug!(session = %self.id, "resignation by {}", self.position.side_to_move);
    }

    /// Start a new game, optionally from a given FEN (standard start when
    /// omitted). History, redo stack and selection are cleared. A malformed
    /// FEN leaves the session exactly as it was.
    pub fn new_game(&mut self, fen: Option<&str>) -> Result<(), ChessError> {
        let fen = fen.unwrap_or(START_FEN);
        let position = Position::from_fen(fen)?;
        self.position = position;
        self.history.clear();
        self.redo_stack.clear();
        self.selected = None;
        self.winner = None;
        self.starting_fen = fen.to_string();
        self.refresh_state();
        tracing::debug!(session = %self.id, "new game from {fen}");
        Ok(())
    }

    // -----------------------------------------------------------------
    // State detection
    // -----------------------------------------------------------------

    /// Re-derive the session state from the position: no legal moves means
    /// Checkmate when in check, Stalemate otherwise.
    fn refresh_state(&mut self) {
        let legal = movegen::legal_moves(&self.position);
        if legal.is_empty() {
            if movegen::in_check(&self.position, self.position.side_to_move) {
                self.winner = Some(!self.position.side_to_move);
                self.state = GameState::Checkmate;
            } else {
                self.winner = None;
                self.state = GameState::Stalemate;
            }
        } else {
            self.winner = None;
            self.state = GameState::Ongoing;
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a promotion choice letter ("q", "r", "b", "n") to a piece kind.
fn parse_promotion_choice(s: &str) -> Option<PieceType> {
    match s.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('q') => Some(PieceType::Queen),
        Some('r') => Some(PieceType::Rook),
        Some('b') => Some(PieceType::Bishop),
        Some('n') => Some(PieceType::Knight),
        _ => None,
    }
}

// =========================================================================
// Tests
// =========================================================================
