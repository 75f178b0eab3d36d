//! chainactions-evm — EVM (Base) action classifier.
//!
//! Reconstructs user intent from net ERC-20/native balance deltas observed
//! in receipt logs, with no protocol-specific event decoding beyond the
//! generic token-transfer standards.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use chainactions_evm::EvmActionClassifier;
//! use chainactions_core::ActionClassifier;
//!
//! let classifier = EvmActionClassifier::new();
//! let bundle: serde_json::Value =
//!     serde_json::from_str(r#"{"transaction": {}, "receipt": {}}"#).unwrap();
//! for action in classifier.classify(&bundle) {
//!     println!("{action}");
//! }
//! ```

pub mod classifier;
pub mod events;

pub use classifier::{EvmActionClassifier, BASE_WETH, MULTICALL_SELECTOR};
