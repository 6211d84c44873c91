use thiserror::Error;

/// Failures reported by the rules-engine adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PositionError {
    #[error("invalid FEN `{fen}`: {reason}")]
    InvalidFen { fen: String, reason: String },
    #[error("illegal move {0}")]
    IllegalMove(String),
    #[error("cannot parse move `{0}`")]
    BadMoveText(String),
    #[error("ambiguous move `{0}`")]
    AmbiguousMove(String),
    #[error("no move to undo")]
    EmptyStack,
}

/// Contract violations that abort a search call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("rules engine reported no legal moves for a live position: {fen}")]
    NoLegalMoves { fen: String },
    #[error(transparent)]
    Position(#[from] PositionError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
}
