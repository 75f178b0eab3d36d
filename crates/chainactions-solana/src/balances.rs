//! Extract account keys and token-balance snapshots from a raw Solana
//! transaction bundle.
//!
//! Providers ship account keys either as bare strings or as objects
//! carrying a `pubkey` field; both shapes are resolved once here so the
//! classifier never re-branches on them.

use serde_json::Value;

/// A pre- or post-transaction SPL token balance snapshot entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenBalanceEntry {
    /// Index into the transaction's account keys, if present.
    pub account_index: Option<usize>,
    /// Token mint address.
    pub mint: String,
    /// Explicit owner, when the provider includes one.
    pub owner: Option<String>,
    /// UI amount (decimal-adjusted). `null` coerces to zero.
    pub ui_amount: f64,
    /// Mint decimals as reported by this snapshot.
    pub decimals: u8,
}

impl TokenBalanceEntry {
    /// The owning account: the explicit `owner` field when present,
    /// otherwise the account key at `account_index`. Unresolvable entries
    /// yield the empty string and match no signer.
    pub fn resolve_owner(&self, account_keys: &[String]) -> String {
        if let Some(owner) = &self.owner {
            return owner.clone();
        }
        self.account_index
            .and_then(|idx| account_keys.get(idx))
            .cloned()
            .unwrap_or_default()
    }
}

/// Resolve `message.accountKeys` into plain pubkey strings, in order.
pub fn account_keys(message: &Value) -> Vec<String> {
    message
        .get("accountKeys")
        .and_then(Value::as_array)
        .map(|keys| keys.iter().map(resolve_key).collect())
        .unwrap_or_default()
}

/// One account-key entry: either `"pubkey..."` or `{"pubkey": "..."}`.
fn resolve_key(entry: &Value) -> String {
    match entry {
        Value::String(s) => s.clone(),
        Value::Object(obj) => obj
            .get("pubkey")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        _ => String::new(),
    }
}

/// Parse `meta.preTokenBalances` / `meta.postTokenBalances`.
pub fn token_balances(meta: &Value, field: &str) -> Vec<TokenBalanceEntry> {
    let Some(entries) = meta.get(field).and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .map(|entry| {
            let ui_token_amount = entry.get("uiTokenAmount");
            TokenBalanceEntry {
                account_index: entry
                    .get("accountIndex")
                    .and_then(Value::as_u64)
                    .map(|idx| idx as usize),
                mint: entry
                    .get("mint")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string(),
                owner: entry
                    .get("owner")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
                ui_amount: ui_token_amount
                    .and_then(|a| a.get("uiAmount"))
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0),
                decimals: ui_token_amount
                    .and_then(|a| a.get("decimals"))
                    .and_then(Value::as_u64)
                    .unwrap_or(0) as u8,
            }
        })
        .collect()
}
