//! Error types for the Hex engine

/// Errors reported by fallible engine operations.
///
/// Move legality is not an error: `BoardState::play` rejects illegal moves
/// by returning `false`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HexError {
    #[error("board size {0} is outside 1..=26")]
    InvalidSize(usize),

    #[error("no moves to undo")]
    NoHistory,

    #[error("illegal move: {0}")]
    InvalidMove(String),

    #[error("invalid config: {0}")]
    Config(String),
}
