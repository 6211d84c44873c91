// Depth-limited alpha-beta search over a cozy-chess rules engine
pub mod board;
pub mod config;
pub mod error;
pub mod perft;
pub mod search;
pub mod uci;

pub use board::{MoveGuard, Position};
pub use config::SearchConfig;
pub use error::{ConfigError, PositionError, SearchError};
pub use search::alphabeta::{Node, SearchResult, SearchStats, Searcher};
pub use search::tt::{CacheMode, TranspositionCache};
