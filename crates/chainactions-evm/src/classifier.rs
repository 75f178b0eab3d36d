//! `EvmActionClassifier` — reconstruct user intent from net balance deltas.
//!
//! Instead of pattern-matching swap event signatures, compute the acting
//! account's net ERC-20/native balance changes from Transfer events. This
//! handles aggregators, multi-hop swaps, WETH wrap/unwrap, and unknown
//! protocols uniformly.
//!
//! Classification order:
//! 1. Contract creation        → single deployment `contract_call`
//! 2. Net deltas after folding → one `swap`, or per-asset `transfer`s
//! 3. NFT movements            → appended `nft_transfer`s
//! 4. Approvals                → appended last
//! 5. Fallback                 → `contract_call` from the input selector

use std::collections::HashSet;
use std::sync::Arc;

use alloy_primitives::{I256, U256};
use serde_json::Value;

use chainactions_core::delta::{most_negative, most_positive};
use chainactions_core::registry::{MemoryProtocolRegistry, ProtocolLabel, ProtocolRegistry};
use chainactions_core::types::{Action, ActionKind, Chain, NftInfo, TokenInfo, NATIVE_ADDRESS};
use chainactions_core::{ActionClassifier, DeltaMap};

use crate::events::{decode_log, TokenEvent};

/// Internal delta-map key for the chain's base currency. Externalized as
/// the `"native"` sentinel on the way out.
const NATIVE_KEY: &str = "native_eth";

/// The canonical WETH contract on Base.
pub const BASE_WETH: &str = "0x4200000000000000000000000000000000000006";

/// `multicall(bytes[])` function selector.
pub const MULTICALL_SELECTOR: &str = "0xac9650d8";

static NULL: Value = Value::Null;

/// EVM action classifier with a bundled router registry.
///
/// # Usage
/// ```rust,no_run
/// use chainactions_evm::EvmActionClassifier;
/// use chainactions_core::ActionClassifier;
///
/// let classifier = EvmActionClassifier::new();
/// let bundle: serde_json::Value = serde_json::from_str("{...}").unwrap();
/// for action in classifier.classify(&bundle) {
///     println!("{action}");
/// }
/// ```
pub struct EvmActionClassifier {
    registry: Arc<dyn ProtocolRegistry>,
    /// Wrapped-native contracts whose movements fold into the native bucket.
    wrapped_native: HashSet<String>,
}

impl EvmActionClassifier {
    /// Create a classifier with the bundled Base router table and WETH set.
    pub fn new() -> Self {
        let reg = MemoryProtocolRegistry::new();
        Self::with_bundled_routers(&reg);
        Self::with_registry(Arc::new(reg))
    }

    /// Create a classifier with a custom registry (for testing or extension).
    pub fn with_registry(registry: Arc<dyn ProtocolRegistry>) -> Self {
        Self {
            registry,
            wrapped_native: HashSet::from([BASE_WETH.to_string()]),
        }
    }

    /// Populate a `MemoryProtocolRegistry` with the bundled well-known
    /// Base router addresses.
    fn with_bundled_routers(reg: &MemoryProtocolRegistry) {
        let bundled: &[(&str, &str)] = &[
            ("0x2626664c2603336e57b271c5c0b26f421741e481", "Uniswap V3"),
            ("0x3fc91a3afd70395cd496c647d5a6cc9d4b2b7fad", "Uniswap Universal Router"),
            ("0xcf77a3ba9a5ca399b7c97c74d54e5b1beb874e43", "Aerodrome"),
            ("0x111111125421ca6dc452d289314280a0f8842a65", "1inch"),
            ("0x1111111254eeb25477b68fb85ed929f73a960582", "1inch"),
        ];
        for (address, name) in bundled {
            reg.register(ProtocolLabel {
                address: address.to_string(),
                name: name.to_string(),
                source: "bundled".to_string(),
            });
        }
    }
}

impl Default for EvmActionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionClassifier for EvmActionClassifier {
    fn chain(&self) -> Chain {
        Chain::Base
    }

    fn classify(&self, raw: &Value) -> Vec<Action> {
        let tx = raw.get("transaction").unwrap_or(&NULL);
        let receipt = raw.get("receipt").unwrap_or(&NULL);

        let user = str_field(tx, "from")
            .or_else(|| str_field(receipt, "from"))
            .unwrap_or("")
            .to_lowercase();
        if user.is_empty() {
            tracing::debug!("no acting account on transaction or receipt");
            return vec![];
        }

        // Contract creation: no `to`, receipt carries the deployed address
        let contract_address = str_field(receipt, "contractAddress").unwrap_or("");
        let to_field = str_field(tx, "to").unwrap_or("");
        if !contract_address.is_empty() && to_field.is_empty() {
            return vec![Action {
                note: Some(format!("Contract Deployed: {contract_address}")),
                from: Some(user),
                to: Some(contract_address.to_string()),
                ..Action::contract_call()
            }];
        }

        let protocol = self.registry.get(&to_field.to_lowercase());

        // Net deltas per token contract: negative = user sent, positive = received
        let mut deltas: DeltaMap<I256> = DeltaMap::new();
        let mut weth_net_delta = I256::ZERO;
        let mut nft_actions: Vec<Action> = Vec::new();
        let mut approval_actions: Vec<Action> = Vec::new();

        let empty_logs = Vec::new();
        let logs = receipt
            .get("logs")
            .and_then(Value::as_array)
            .unwrap_or(&empty_logs);

        for log in logs {
            let Some(decoded) = decode_log(log) else {
                continue;
            };
            let contract = decoded.contract;

            match decoded.event {
                TokenEvent::Deposit { account, amount } => {
                    // user wrapped native currency: loses native
                    if self.wrapped_native.contains(&contract) && account == user {
                        weth_net_delta = weth_net_delta.saturating_sub(to_signed(amount));
                    }
                }
                TokenEvent::Withdrawal { account, amount } => {
                    // user unwrapped: gains native
                    if self.wrapped_native.contains(&contract) && account == user {
                        weth_net_delta = weth_net_delta.saturating_add(to_signed(amount));
                    }
                }
                TokenEvent::NftTransfer { from, to, token_id, amount } => {
                    if from == user || to == user {
                        nft_actions.push(nft_action(
                            &contract, &from, &to, &token_id, amount, &user, &protocol,
                        ));
                    }
                }
                TokenEvent::Erc20Transfer { from, to, amount } => {
                    let amount = to_signed(amount);
                    if from == user {
                        deltas.add(&contract, -amount);
                    }
                    if to == user {
                        deltas.add(&contract, amount);
                    }
                }
                TokenEvent::Approval { owner, spender } => {
                    if owner == user {
                        approval_actions.push(Action {
                            spender: Some(spender),
                            token_in: Some(TokenInfo::new(contract.clone(), "0")),
                            ..Action::new(ActionKind::Approve)
                        });
                    }
                }
            }
        }

        // Fold the raw value sent plus all wrapped-native movement into one
        // native bucket, so wrap/unwrap never shows up as its own swap leg.
        let value_sent = crate::events::hex_to_u256(str_field(tx, "value").unwrap_or("0x0"));
        let mut native_delta = weth_net_delta.saturating_sub(to_signed(value_sent));
        for weth in &self.wrapped_native {
            if let Some(leftover) = deltas.remove(weth) {
                native_delta = native_delta.saturating_add(leftover);
            }
        }
        if native_delta != I256::ZERO {
            deltas.insert(NATIVE_KEY, native_delta);
        }

        let (negative, positive) = deltas.split_signed();
        let mut actions: Vec<Action> = Vec::new();

        if !negative.is_empty() && !positive.is_empty() {
            // Swap: most negative delta = tokenIn, most positive = tokenOut
            if let (Some((in_key, in_delta)), Some((out_key, out_delta))) =
                (most_negative(&negative), most_positive(&positive))
            {
                actions.push(Action {
                    token_in: Some(TokenInfo::new(
                        externalize(in_key),
                        in_delta.unsigned_abs().to_string(),
                    )),
                    token_out: Some(TokenInfo::new(
                        externalize(out_key),
                        out_delta.to_string(),
                    )),
                    protocol: protocol.clone(),
                    ..Action::new(ActionKind::Swap)
                });
            }
        } else if !negative.is_empty() {
            // Outbound: one transfer per asset sent
            let recipient = [str_field(tx, "to"), str_field(receipt, "to")]
                .into_iter()
                .flatten()
                .find(|s| !s.is_empty())
                .unwrap_or("");
            for (address, delta) in &negative {
                actions.push(Action {
                    token_in: Some(TokenInfo::new(
                        externalize(address),
                        delta.unsigned_abs().to_string(),
                    )),
                    to: Some(recipient.to_string()),
                    from: Some(user.clone()),
                    protocol: protocol.clone(),
                    ..Action::new(ActionKind::Transfer)
                });
            }
        } else if !positive.is_empty() {
            // Inbound: one transfer per asset received
            for (address, delta) in &positive {
                actions.push(Action {
                    token_out: Some(TokenInfo::new(externalize(address), delta.to_string())),
                    to: Some(user.clone()),
                    protocol: protocol.clone(),
                    ..Action::new(ActionKind::Transfer)
                });
            }
        }

        actions.extend(nft_actions);
        actions.extend(approval_actions);

        if actions.is_empty() {
            actions.push(self.fallback_action(tx, &protocol));
        }

        actions
    }
}

impl EvmActionClassifier {
    /// Inspect the calldata selector when nothing else classified.
    fn fallback_action(&self, tx: &Value, protocol: &Option<String>) -> Action {
        let input = str_field(tx, "input").unwrap_or("0x");
        let selector = input.get(..10).unwrap_or(input);
        let to = str_field(tx, "to").map(str::to_string);

        if selector == MULTICALL_SELECTOR {
            // Each encoded sub-call is roughly 68 bytes
            let data_len = (input.len() - 10) / 2;
            let estimated_calls = std::cmp::max(1, data_len / 68);
            Action {
                note: Some(format!("Batch: ~{estimated_calls} calls")),
                to,
                protocol: protocol.clone(),
                ..Action::contract_call()
            }
        } else {
            Action {
                note: Some(format!("Function: {selector}")),
                to,
                ..Action::contract_call()
            }
        }
    }
}

fn nft_action(
    contract: &str,
    from: &str,
    to: &str,
    token_id: &str,
    amount: U256,
    user: &str,
    protocol: &Option<String>,
) -> Action {
    let token = TokenInfo::new(contract, amount.to_string())
        .with_symbol(format!("NFT #{token_id}"))
        .with_decimals(0);
    Action {
        nft: Some(NftInfo::with_token_id(token_id)),
        from: Some(from.to_string()),
        to: Some(to.to_string()),
        token_in: (from == user).then(|| token.clone()),
        token_out: (to == user).then(|| token.clone()),
        protocol: protocol.clone(),
        ..Action::new(ActionKind::NftTransfer)
    }
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// Clamp a raw `U256` amount into signed delta space. Amounts beyond
/// `I256::MAX` saturate rather than wrap.
fn to_signed(value: U256) -> I256 {
    I256::try_from(value).unwrap_or(I256::MAX)
}

fn externalize(key: &str) -> &str {
    if key == NATIVE_KEY {
        NATIVE_ADDRESS
    } else {
        key
    }
}
