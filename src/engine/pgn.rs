//! Movetext export and best-effort notation import.
//!
//! Export produces a PGN-style header block followed by numbered move
//! pairs. Import is a token matcher, not a parser: it strips annotations
//! and move numbers, then replays each remaining token against the legal
//! moves of the side to move, stopping quietly at the first token it cannot
//! match. Partial replays are an explicit outcome, not an error.

use crate::engine::game::Session;
use crate::engine::movegen;
use crate::engine::san;
use crate::engine::types::{Color, GameState};

// =========================================================================
// Export
// =========================================================================

/// Export a session as a PGN-style string: a header block with
/// event/date/result placeholders, then the numbered movetext.
pub fn to_pgn(session: &Session) -> String {
    let mut pgn = String::with_capacity(512);

    let date = session.created_at.format("%Y.%m.%d").to_string();
    let result = result_string(session);

    pgn.push_str("[Event \"Ultimate Chess\"]\n");
    pgn.push_str("[Site \"Local\"]\n");
    pgn.push_str(&format!("[Date \"{date}\"]\n"));
    pgn.push_str("[Round \"-\"]\n");
    pgn.push_str(&format!("[White \"{}\"]\n", session.white_player));
    pgn.push_str(&format!("[Black \"{}\"]\n", session.black_player));
    pgn.push_str(&format!("[Result \"{result}\"]\n"));
    pgn.push('\n');

    let history = session.notation_history();
    for (i, pair) in history.chunks(2).enumerate() {
        pgn.push_str(&format!("{}. ", i + 1));
        pgn.push_str(&pair[0]);
        if let Some(black) = pair.get(1) {
            pgn.push(' ');
            pgn.push_str(black);
        }
        pgn.push(' ');
    }

    pgn.push_str(result);
    pgn.push('\n');
    pgn
}

/// PGN result token for the session's current state.
fn result_string(session: &Session) -> &'static str {
    match session.state() {
        GameState::Checkmate | GameState::Resigned => match session.winner() {
            Some(Color::White) => "1-0",
            Some(Color::Black) => "0-1",
            None => "*",
        },
        GameState::Stalemate => "1/2-1/2",
        GameState::Ongoing => "*",
    }
}

// =========================================================================
// Import
// =========================================================================

/// Result of a best-effort notation import.
///
/// `unmatched_token` carries the first token that could not be mapped onto
/// a legal move; everything applied before it remains in effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportOutcome {
    pub applied: usize,
    pub unmatched_token: Option<String>,
}

/// Replay free-text notation into a session.
///
/// The session is reset to the standard starting position first. Brace and
/// parenthetical annotations and move-number prefixes are stripped, then
/// each whitespace token is matched against the legal moves of the side to
/// move: equality after removing check marks, or a suffix match in either
/// direction. Import stops at a result token, or at the first unmatched
/// token (logged, not raised).
pub fn import_movetext(session: &mut Session, text: &str) -> ImportOutcome {
    // The starting FEN is structurally valid, so the reset cannot fail.
    let _ = session.new_game(None);

    let cleaned = strip_move_numbers(&strip_annotations(text));
    let mut applied = 0usize;

    for token in cleaned.split_whitespace() {
        if token == "*" {
            continue;
        }
        if is_result_token(token) {
            break;
        }

        let legal = movegen::legal_moves(session.position());
        let found = legal
            .iter()
            .find(|mv| token_matches(&san::move_to_san(session.position(), mv), token))
            .copied();

        match found {
            Some(mv) => {
                if session.make_move(mv).is_err() {
                    break;
                }
                applied += 1;
            }
            None => {
                tracing::warn!("could not match notation token: {token}");
                return ImportOutcome {
                    applied,
                    unmatched_token: Some(token.to_string()),
                };
            }
        }
    }

    ImportOutcome {
        applied,
        unmatched_token: None,
    }
}

fn is_result_token(token: &str) -> bool {
    matches!(token, "1-0" | "0-1" | "1/2-1/2")
}

/// Compare notation with a token, ignoring check/mate marks and accepting a
/// suffix match in either direction (tolerates annotations the writer does
/// not produce, like departure files).
fn token_matches(san: &str, token: &str) -> bool {
    let s1: String = san.chars().filter(|&c| c != '+' && c != '#').collect();
    let s2: String = token.chars().filter(|&c| c != '+' && c != '#').collect();
    if s2.is_empty() {
        return false;
    }
    s1 == s2 || s1.ends_with(&s2) || s2.ends_with(&s1)
}

/// Drop `{...}` and `(...)` annotation runs.
fn strip_annotations(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut brace_depth = 0u32;
    let mut paren_depth = 0u32;
    for c in text.chars() {
        match c {
            '{' => brace_depth += 1,
            '}' => brace_depth = brace_depth.saturating_sub(1),
            '(' if brace_depth == 0 => paren_depth += 1,
            ')' if brace_depth == 0 => paren_depth = paren_depth.saturating_sub(1),
            _ if brace_depth == 0 && paren_depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

/// Drop move-number prefixes: any digit run immediately followed by a dot.
fn strip_move_numbers(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_ascii_digit() {
            let mut j = i;
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            if j < chars.len() && chars[j] == '.' {
                i = j + 1;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

// =========================================================================
// Tests
// =========================================================================
