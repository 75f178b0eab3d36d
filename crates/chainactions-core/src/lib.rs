//! chainactions-core — foundation types and traits for the ChainActions
//! transaction classifier.
//!
//! This crate defines:
//! - [`Action`] / [`TokenInfo`] / [`NftInfo`] — the classified-event model
//! - [`ActionClassifier`] — the classifier trait every chain implements
//! - [`ProtocolRegistry`] — router/program address → display name lookup
//! - [`DeltaMap`] — insertion-ordered per-asset net-delta accumulation
//! - [`Normalizer`] — chain dispatch plus the fallback/overflow policy

pub mod classifier;
pub mod delta;
pub mod normalize;
pub mod registry;
pub mod types;

pub use classifier::{ActionClassifier, ClassifyError};
pub use delta::{DeltaMap, SaturatingAdd};
pub use normalize::{finalize, Normalizer, MAX_DISPLAY_ACTIONS};
pub use registry::{MemoryProtocolRegistry, ProtocolLabel, ProtocolRegistry};
pub use types::{Action, ActionKind, Chain, NftInfo, TokenInfo, NATIVE_ADDRESS};
