//! The action normalizer — chain dispatch plus display post-processing.
//!
//! The single entry point exposed to collaborators: raw provider bundle +
//! chain tag in, ordered action list out. Deterministic and total — an
//! unsupported chain or an empty classifier result degrades to a single
//! primary `contract_call`, never an error.

use crate::classifier::ActionClassifier;
use crate::types::{Action, ActionKind, Chain};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Maximum number of actions surfaced to the renderer. Anything beyond is
/// collapsed into one trailing `overflow` action.
pub const MAX_DISPLAY_ACTIONS: usize = 5;

/// Dispatches raw bundles to the registered per-chain classifiers and
/// applies the uniform fallback/overflow policy to their output.
#[derive(Default)]
pub struct Normalizer {
    classifiers: HashMap<Chain, Arc<dyn ActionClassifier>>,
}

impl Normalizer {
    /// A normalizer with no classifiers registered. Every chain falls back
    /// until `register` is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a classifier under its own chain. Replaces any previous
    /// registration for that chain.
    pub fn register(&mut self, classifier: Arc<dyn ActionClassifier>) {
        self.classifiers.insert(classifier.chain(), classifier);
    }

    /// Classify `raw` for the given chain tag and post-process the result.
    ///
    /// Unknown tags and unregistered chains yield a single primary
    /// `contract_call` without invoking any classifier.
    pub fn normalize(&self, raw: &Value, chain_tag: &str) -> Vec<Action> {
        let classifier = Chain::from_tag(chain_tag).and_then(|chain| self.classifiers.get(&chain));
        let Some(classifier) = classifier else {
            tracing::debug!(chain = chain_tag, "unsupported chain, emitting fallback action");
            return vec![primary_fallback()];
        };
        finalize(classifier.classify(raw))
    }
}

/// Apply the fallback/primary/overflow policy to a classifier's raw output.
pub fn finalize(mut actions: Vec<Action>) -> Vec<Action> {
    if actions.is_empty() {
        return vec![primary_fallback()];
    }

    actions[0].primary = true;

    if actions.len() > MAX_DISPLAY_ACTIONS {
        let overflow_count = (actions.len() - MAX_DISPLAY_ACTIONS + 1) as u32;
        actions.truncate(MAX_DISPLAY_ACTIONS - 1);
        actions.push(Action {
            count: Some(overflow_count),
            note: Some(format!("and {overflow_count} more actions...")),
            ..Action::new(ActionKind::Overflow)
        });
    }

    actions
}

fn primary_fallback() -> Action {
    Action {
        primary: true,
        ..Action::contract_call()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_becomes_primary_fallback() {
        let actions = finalize(vec![]);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, ActionKind::ContractCall);
        assert!(actions[0].primary);
    }

    #[test]
    fn first_action_marked_primary() {
        let actions = finalize(vec![
            Action::new(ActionKind::Swap),
            Action::new(ActionKind::Approve),
        ]);
        assert!(actions[0].primary);
        assert!(!actions[1].primary);
    }

    #[test]
    fn overflow_law() {
        // 7 raw actions -> 4 kept + 1 overflow carrying count 3
        let raw: Vec<Action> = (0..7).map(|_| Action::new(ActionKind::Transfer)).collect();
        let actions = finalize(raw);
        assert_eq!(actions.len(), MAX_DISPLAY_ACTIONS);
        let last = actions.last().unwrap();
        assert_eq!(last.kind, ActionKind::Overflow);
        assert_eq!(last.count, Some(3));
        assert_eq!(last.note.as_deref(), Some("and 3 more actions..."));
    }

    #[test]
    fn exactly_max_actions_no_overflow() {
        let raw: Vec<Action> = (0..MAX_DISPLAY_ACTIONS)
            .map(|_| Action::new(ActionKind::Transfer))
            .collect();
        let actions = finalize(raw);
        assert_eq!(actions.len(), MAX_DISPLAY_ACTIONS);
        assert!(actions.iter().all(|a| a.kind != ActionKind::Overflow));
    }

    #[test]
    fn unknown_chain_returns_primary_fallback() {
        let normalizer = Normalizer::new();
        let actions = normalizer.normalize(&serde_json::json!({}), "ethereum");
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, ActionKind::ContractCall);
        assert!(actions[0].primary);
    }

    #[test]
    fn unregistered_chain_returns_primary_fallback() {
        let normalizer = Normalizer::new();
        let actions = normalizer.normalize(&serde_json::json!({}), "base");
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, ActionKind::ContractCall);
    }
}
