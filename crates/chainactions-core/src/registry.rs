//! Protocol registry — maps router/program addresses to display names.

use serde::{Deserialize, Serialize};

/// A known protocol entry point (EVM router or Solana program).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolLabel {
    /// Contract address (EVM, lowercased) or program id (Solana, base58).
    pub address: String,
    /// Display name (e.g. `"Uniswap V3"`, `"Jupiter"`).
    pub name: String,
    /// Source of this entry (e.g. `"bundled"`, `"user"`).
    pub source: String,
}

/// Trait for looking up protocol names by entry-point address.
///
/// Lookup is exact-string: EVM callers lowercase addresses on both sides,
/// Solana base58 ids are case-sensitive as-is.
pub trait ProtocolRegistry: Send + Sync {
    /// Look up the display name for an address.
    fn get(&self, address: &str) -> Option<String>;

    /// Total number of registered labels.
    fn len(&self) -> usize;

    /// Returns `true` if the registry is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ─── In-memory registry ───────────────────────────────────────────────────────

use std::collections::HashMap;
use std::sync::RwLock;

/// A simple in-memory registry backed by `HashMap`.
pub struct MemoryProtocolRegistry {
    by_address: RwLock<HashMap<String, ProtocolLabel>>,
}

impl MemoryProtocolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            by_address: RwLock::new(HashMap::new()),
        }
    }

    /// Register a label. Later registrations for the same address win.
    pub fn register(&self, label: ProtocolLabel) {
        let mut by_address = self.by_address.write().unwrap();
        by_address.insert(label.address.clone(), label);
    }

    /// Load labels from a JSON array string.
    /// Expected format: `[{ "address": "...", "name": "...", "source": "..." }, ...]`
    pub fn load_json(&self, json: &str) -> Result<usize, serde_json::Error> {
        let labels: Vec<ProtocolLabel> = serde_json::from_str(json)?;
        let count = labels.len();
        for label in labels {
            self.register(label);
        }
        Ok(count)
    }
}

impl Default for MemoryProtocolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolRegistry for MemoryProtocolRegistry {
    fn get(&self, address: &str) -> Option<String> {
        self.by_address
            .read()
            .unwrap()
            .get(address)
            .map(|label| label.name.clone())
    }

    fn len(&self) -> usize {
        self.by_address.read().unwrap().len()
    }
}
