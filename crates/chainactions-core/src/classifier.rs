//! The `ActionClassifier` trait — implemented by each chain-specific crate.

use crate::types::{Action, Chain};
use serde_json::Value;
use thiserror::Error;

/// Errors surfaced at the classification seams (bundle ingestion, dispatch).
///
/// The classifiers themselves never error: malformed data degrades to
/// defaults and every code path terminates in a valid action list.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Invalid transaction bundle: {reason}")]
    InvalidBundle { reason: String },

    #[error("Unsupported chain: {chain}")]
    UnsupportedChain { chain: String },

    #[error("{0}")]
    Other(String),
}

/// A chain-specific action classifier.
///
/// Each chain family (EVM, Solana) provides its own implementation.
/// Implementations must be `Send + Sync` for use from concurrent contexts,
/// and must be pure: no I/O, no shared mutable state.
pub trait ActionClassifier: Send + Sync {
    /// The chain this classifier handles.
    fn chain(&self) -> Chain;

    /// Classify a raw provider bundle into an ordered action list.
    ///
    /// Total over well-formed JSON: missing or malformed fields degrade to
    /// defaults rather than erroring. The empty list is the sole hard
    /// failure signal, returned when no acting account can be determined.
    fn classify(&self, raw: &Value) -> Vec<Action>;

    /// Convenience: classify from a JSON string. Parsing is the only
    /// fallible step.
    fn classify_str(&self, json: &str) -> Result<Vec<Action>, ClassifyError> {
        let raw: Value = serde_json::from_str(json).map_err(|e| ClassifyError::InvalidBundle {
            reason: format!("invalid JSON: {e}"),
        })?;
        Ok(self.classify(&raw))
    }
}
