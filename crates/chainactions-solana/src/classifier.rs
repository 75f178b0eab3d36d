//! `SolanaActionClassifier` — reconstruct user intent from pre/post balance
//! snapshots.
//!
//! Solana meta natively carries pre/post native and token balances, so no
//! inner-instruction parsing is needed: per-mint deltas for the signer plus
//! the fee-adjusted lamport delta are enough to classify swaps, transfers,
//! and NFT moves.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexSet;
use serde_json::Value;

use chainactions_core::delta::{most_negative, most_positive};
use chainactions_core::registry::{MemoryProtocolRegistry, ProtocolLabel, ProtocolRegistry};
use chainactions_core::types::{Action, ActionKind, Chain, TokenInfo, NATIVE_ADDRESS};
use chainactions_core::{ActionClassifier, DeltaMap};

use crate::balances::{account_keys, token_balances};

/// The validator vote program.
pub const VOTE_PROGRAM: &str = "Vote111111111111111111111111111111111111111";

/// Deltas at or below this magnitude are floating-point noise from repeated
/// ui-amount arithmetic and are excluded from classification.
pub const DUST_THRESHOLD: f64 = 1e-6;

/// Internal delta-map key for SOL. Externalized as the `"native"` sentinel.
const NATIVE_KEY: &str = "native_sol";

const LAMPORTS_PER_SOL: f64 = 1e9;

static NULL: Value = Value::Null;

/// Solana action classifier with a bundled program registry.
pub struct SolanaActionClassifier {
    registry: Arc<dyn ProtocolRegistry>,
}

impl SolanaActionClassifier {
    /// Create a classifier with the bundled well-known program table.
    pub fn new() -> Self {
        let reg = MemoryProtocolRegistry::new();
        Self::with_bundled_programs(&reg);
        Self::with_registry(Arc::new(reg))
    }

    /// Create a classifier with a custom registry (for testing or extension).
    pub fn with_registry(registry: Arc<dyn ProtocolRegistry>) -> Self {
        Self { registry }
    }

    /// Populate a `MemoryProtocolRegistry` with the bundled program ids.
    fn with_bundled_programs(reg: &MemoryProtocolRegistry) {
        let bundled: &[(&str, &str)] = &[
            ("JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4", "Jupiter"),
            ("JUP4Fb2cqiRUcaTHdrPC8h2gNsA2ETXiPDD33WcGuJB", "Jupiter"),
            ("675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8", "Raydium"),
            ("CAMMCzo5YL8w4VFF8KVHrK22GGUsp5VTaW7grrKgrWqK", "Raydium CLMM"),
            ("whirLbMiicVdio4qvUfM5KAg6Ct8VwpYzGff3uctyCc", "Orca Whirlpool"),
            ("9W959DqEETiGZocYWCQPaJ6sBmUzgfxXfqGeTEdp3aQP", "Orca"),
            ("MERLuDFBMmsHnsBPZw2sDQZHvXFMwp8EdjudcU2HKky", "Mercurial"),
            ("SSwpkEEcbUqx4vtoEByFjSkhKdCT862DNVb52nZg1UZ", "Saber"),
            ("PhoeNiXZ8ByJGLkxNfZRnkUfjvmuYqLR89jjFHGqdXY", "Phoenix"),
        ];
        for (address, name) in bundled {
            reg.register(ProtocolLabel {
                address: address.to_string(),
                name: name.to_string(),
                source: "bundled".to_string(),
            });
        }
    }

    /// First known program among account keys, then instruction program ids.
    fn identify_protocol(&self, keys: &[String], instructions: &[Value]) -> Option<String> {
        for key in keys {
            if let Some(name) = self.registry.get(key) {
                return Some(name);
            }
        }
        for ix in instructions {
            let program_id = ix.get("programId").and_then(Value::as_str).unwrap_or("");
            if let Some(name) = self.registry.get(program_id) {
                return Some(name);
            }
        }
        None
    }
}

impl Default for SolanaActionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn is_vote_transaction(keys: &[String], instructions: &[Value]) -> bool {
    keys.iter().any(|k| k == VOTE_PROGRAM)
        || instructions.iter().any(|ix| {
            ix.get("programId").and_then(Value::as_str) == Some(VOTE_PROGRAM)
        })
}

impl ActionClassifier for SolanaActionClassifier {
    fn chain(&self) -> Chain {
        Chain::Solana
    }

    fn classify(&self, raw: &Value) -> Vec<Action> {
        let message = raw
            .get("transaction")
            .and_then(|tx| tx.get("message"))
            .unwrap_or(&NULL);
        let keys = account_keys(message);

        let signer = keys.first().cloned().unwrap_or_default();
        if signer.is_empty() {
            tracing::debug!("no signer in account keys");
            return vec![];
        }

        let empty_ix = Vec::new();
        let instructions = message
            .get("instructions")
            .and_then(Value::as_array)
            .unwrap_or(&empty_ix);

        if is_vote_transaction(&keys, instructions) {
            return vec![Action {
                note: Some("Validator Vote".to_string()),
                from: Some(signer),
                ..Action::contract_call()
            }];
        }

        let protocol = self.identify_protocol(&keys, instructions);
        let meta = raw.get("meta").unwrap_or(&NULL);

        // Per-(account, mint) snapshots restricted to the signer. The union
        // keeps first-seen order so extremum tie-breaks are deterministic.
        let mut pre_map: HashMap<(usize, String), f64> = HashMap::new();
        let mut post_map: HashMap<(usize, String), f64> = HashMap::new();
        let mut mint_decimals: HashMap<String, u8> = HashMap::new();
        let mut snapshot_keys: IndexSet<(usize, String)> = IndexSet::new();

        for entry in token_balances(meta, "preTokenBalances") {
            if entry.resolve_owner(&keys) != signer {
                continue;
            }
            let idx = entry.account_index.unwrap_or(0);
            pre_map.insert((idx, entry.mint.clone()), entry.ui_amount);
            mint_decimals.insert(entry.mint.clone(), entry.decimals);
            snapshot_keys.insert((idx, entry.mint));
        }
        for entry in token_balances(meta, "postTokenBalances") {
            if entry.resolve_owner(&keys) != signer {
                continue;
            }
            let idx = entry.account_index.unwrap_or(0);
            post_map.insert((idx, entry.mint.clone()), entry.ui_amount);
            mint_decimals.insert(entry.mint.clone(), entry.decimals);
            snapshot_keys.insert((idx, entry.mint));
        }

        // An owner can hold a mint at several account indices; deltas sum
        let mut deltas: DeltaMap<f64> = DeltaMap::new();
        for key in &snapshot_keys {
            let pre = pre_map.get(key).copied().unwrap_or(0.0);
            let post = post_map.get(key).copied().unwrap_or(0.0);
            deltas.add(&key.1, post - pre);
        }

        // Native SOL delta for the signer (index 0), with the fee added back
        // so fee payment alone never reads as an outbound transfer.
        let fee = meta.get("fee").and_then(Value::as_f64).unwrap_or(0.0);
        let pre_sol = lamports_at(meta, "preBalances", 0);
        let post_sol = lamports_at(meta, "postBalances", 0);
        let sol_delta = match (pre_sol, post_sol) {
            (Some(pre), Some(post)) => (post - pre + fee) / LAMPORTS_PER_SOL,
            _ => 0.0,
        };

        // NFT pull-out: decimals 0 with a whole-unit move of exactly 1
        let mut nft_actions: Vec<Action> = Vec::new();
        let mut nft_mints: Vec<String> = Vec::new();
        for (mint, delta) in deltas.iter() {
            let decimals = mint_decimals.get(mint).copied().unwrap_or(0);
            if decimals == 0 && (delta.abs() - 1.0).abs() < 1e-9 {
                nft_mints.push(mint.to_string());
                let token = TokenInfo::new(mint, "1").with_symbol("NFT").with_decimals(0);
                nft_actions.push(Action {
                    token_in: (delta < 0.0).then(|| token.clone()),
                    token_out: (delta > 0.0).then(|| token.clone()),
                    from: (delta < 0.0).then(|| signer.clone()),
                    to: (delta > 0.0).then(|| signer.clone()),
                    protocol: protocol.clone(),
                    ..Action::new(ActionKind::NftTransfer)
                });
            }
        }
        for mint in &nft_mints {
            deltas.remove(mint);
        }

        if sol_delta.abs() > DUST_THRESHOLD {
            deltas.insert(NATIVE_KEY, sol_delta);
        }
        deltas.retain(|_, delta| delta.abs() > DUST_THRESHOLD);

        let (negative, positive) = deltas.split_signed();
        let mut actions: Vec<Action> = Vec::new();

        let decimals_for = |mint: &str| mint_decimals.get(mint).copied().unwrap_or(9);

        if !negative.is_empty() && !positive.is_empty() {
            if let (Some((in_mint, in_delta)), Some((out_mint, out_delta))) =
                (most_negative(&negative), most_positive(&positive))
            {
                actions.push(Action {
                    token_in: Some(
                        TokenInfo::new(externalize(in_mint), in_delta.abs().to_string())
                            .with_decimals(decimals_for(in_mint)),
                    ),
                    token_out: Some(
                        TokenInfo::new(externalize(out_mint), out_delta.to_string())
                            .with_decimals(decimals_for(out_mint)),
                    ),
                    protocol: protocol.clone(),
                    ..Action::new(ActionKind::Swap)
                });
            }
        } else if !negative.is_empty() {
            for (mint, delta) in &negative {
                actions.push(Action {
                    token_in: Some(
                        TokenInfo::new(externalize(mint), delta.abs().to_string())
                            .with_decimals(decimals_for(mint)),
                    ),
                    from: Some(signer.clone()),
                    protocol: protocol.clone(),
                    ..Action::new(ActionKind::Transfer)
                });
            }
        } else if !positive.is_empty() {
            for (mint, delta) in &positive {
                actions.push(Action {
                    token_out: Some(
                        TokenInfo::new(externalize(mint), delta.to_string())
                            .with_decimals(decimals_for(mint)),
                    ),
                    to: Some(signer.clone()),
                    protocol: protocol.clone(),
                    ..Action::new(ActionKind::Transfer)
                });
            }
        }

        actions.extend(nft_actions);

        if actions.is_empty() {
            actions.push(Action {
                protocol,
                ..Action::contract_call()
            });
        }

        actions
    }
}

fn lamports_at(meta: &Value, field: &str, index: usize) -> Option<f64> {
    meta.get(field)
        .and_then(Value::as_array)
        .filter(|balances| !balances.is_empty())
        .map(|balances| balances.get(index).and_then(Value::as_f64).unwrap_or(0.0))
}

fn externalize(key: &str) -> &str {
    if key == NATIVE_KEY {
        NATIVE_ADDRESS
    } else {
        key
    }
}
