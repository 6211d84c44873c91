use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::search::tt::CacheMode;

/// Tunables for one engine instance. Missing fields in a config file fall
/// back to the defaults below.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_depth: u32,
    /// Check extensions granted per iteration, shared by every path.
    pub check_extensions: u32,
    /// Centipawns charged to the side to move on a repeated position.
    pub repetition_penalty: i32,
    pub use_cache: bool,
    pub cache_mode: CacheMode,
    pub order_moves: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            check_extensions: 1,
            repetition_penalty: 20,
            use_cache: true,
            cache_mode: CacheMode::Bounded,
            order_moves: true,
        }
    }
}

impl SearchConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> { Ok(serde_json::from_str(text)?) }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = SearchConfig::from_json_str(r#"{ "max_depth": 6, "cache_mode": "unconditional" }"#).unwrap();
        assert_eq!(cfg, SearchConfig { max_depth: 6, cache_mode: CacheMode::Unconditional, ..SearchConfig::default() });
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = SearchConfig::from_json_str("{ max_depth: ").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = SearchConfig::from_json_file("/nonexistent/tactician.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
