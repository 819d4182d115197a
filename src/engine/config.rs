//! Engine configuration.

use crate::core::{Key, StepHistory};
use serde::{Deserialize, Serialize};

/// Tunables for an [`Engine`](crate::engine::Engine).
///
/// Every field has a default, so partial JSON documents are accepted:
///
/// ```rust
/// use fsmkit::engine::EngineConfig;
///
/// let config = EngineConfig::from_json(r#"{ "record_history": true }"#).unwrap();
///
/// assert!(config.record_history);
/// assert_eq!(config.history_limit, None);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Record every executed step in the engine's history
    pub record_history: bool,

    /// Keep at most this many steps; unbounded when `None`
    pub history_limit: Option<usize>,
}

impl EngineConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Enable history, optionally bounded.
    pub fn with_history(mut self, limit: Option<usize>) -> Self {
        self.record_history = true;
        self.history_limit = limit;
        self
    }

    pub(crate) fn new_history<K: Key, Sym: Key>(&self) -> StepHistory<K, Sym> {
        match self.history_limit {
            Some(limit) => StepHistory::bounded(limit),
            None => StepHistory::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_disables_history() {
        let config = EngineConfig::default();

        assert!(!config.record_history);
        assert_eq!(config.history_limit, None);
    }

    #[test]
    fn empty_json_yields_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();

        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn json_sets_limit() {
        let config =
            EngineConfig::from_json(r#"{ "record_history": true, "history_limit": 16 }"#).unwrap();

        assert!(config.record_history);
        assert_eq!(config.history_limit, Some(16));
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(EngineConfig::from_json("{ record_history: ").is_err());
    }

    #[test]
    fn with_history_enables_recording() {
        let config = EngineConfig::default().with_history(Some(8));
        let history = config.new_history::<String, char>();

        assert!(config.record_history);
        assert_eq!(history.limit(), Some(8));
    }
}
