//! Core types for the ChainActions classification model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The sentinel token address used for a chain's base currency.
pub const NATIVE_ADDRESS: &str = "native";

// ─── Chain ────────────────────────────────────────────────────────────────────

/// A supported chain family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    /// EVM ("Base") — account/log based.
    Base,
    /// Solana — slot/balance based.
    Solana,
}

impl Chain {
    /// Parse a chain tag as supplied by callers (e.g. `"base"`, `"solana"`).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "base" => Some(Self::Base),
            "solana" => Some(Self::Solana),
            _ => None,
        }
    }

    /// The canonical chain tag string.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Solana => "solana",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ─── ActionKind ───────────────────────────────────────────────────────────────

/// The kind of economic event a classified action represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Swap,
    Transfer,
    NftTransfer,
    Mint,
    Burn,
    Approve,
    ContractCall,
    Overflow,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Swap => "swap",
            Self::Transfer => "transfer",
            Self::NftTransfer => "NFT transfer",
            Self::Mint => "mint",
            Self::Burn => "burn",
            Self::Approve => "approve",
            Self::ContractCall => "contract call",
            Self::Overflow => "overflow",
        };
        f.write_str(label)
    }
}

// ─── TokenInfo ────────────────────────────────────────────────────────────────

/// One side of an asset movement: a contract/mint address (or the `"native"`
/// sentinel), a display symbol, and a raw decimal-string amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: String,
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_amount")]
    pub amount: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

fn default_symbol() -> String {
    "Unknown".to_string()
}

fn default_amount() -> String {
    "0".to_string()
}

fn default_decimals() -> u8 {
    18
}

impl TokenInfo {
    /// A token with the default symbol and 18 decimals (EVM convention).
    pub fn new(address: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            symbol: default_symbol(),
            amount: amount.into(),
            decimals: default_decimals(),
        }
    }

    /// The chain's base currency.
    pub fn native(amount: impl Into<String>) -> Self {
        Self::new(NATIVE_ADDRESS, amount)
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self
    }

    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    /// Returns `true` if this is the chain's base currency.
    pub fn is_native(&self) -> bool {
        self.address == NATIVE_ADDRESS
    }
}

// ─── NftInfo ──────────────────────────────────────────────────────────────────

/// NFT metadata attached to an `nft_transfer` action. Name and collection
/// are filled by downstream resolvers, not by the classifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
}

impl NftInfo {
    pub fn with_token_id(token_id: impl Into<String>) -> Self {
        Self {
            token_id: Some(token_id.into()),
            ..Self::default()
        }
    }
}

// ─── Action ───────────────────────────────────────────────────────────────────

/// One classified economic event within a transaction.
///
/// Actions are created fresh per classification call and are immutable by
/// the time they leave a classifier; only the normalizer flips `primary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    #[serde(default)]
    pub primary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_in: Option<TokenInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_out: Option<TokenInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nft: Option<NftInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Action {
    /// An action of the given kind with every optional field unset.
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            primary: false,
            token_in: None,
            token_out: None,
            protocol: None,
            nft: None,
            spender: None,
            to: None,
            from: None,
            count: None,
            note: None,
        }
    }

    /// The generic fallback action emitted when nothing more specific applies.
    pub fn contract_call() -> Self {
        Self::new(ActionKind::ContractCall)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        match (&self.token_in, &self.token_out) {
            (Some(t_in), Some(t_out)) => {
                write!(f, ": {} {} -> {} {}", t_in.amount, t_in.address, t_out.amount, t_out.address)?
            }
            (Some(t_in), None) => write!(f, ": -{} {}", t_in.amount, t_in.address)?,
            (None, Some(t_out)) => write!(f, ": +{} {}", t_out.amount, t_out.address)?,
            (None, None) => {}
        }
        if let Some(protocol) = &self.protocol {
            write!(f, " via {protocol}")?;
        }
        if let Some(note) = &self.note {
            write!(f, " ({note})")?;
        }
        Ok(())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
