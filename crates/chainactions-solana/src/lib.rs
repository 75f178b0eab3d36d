//! chainactions-solana — Solana action classifier.
//!
//! Uses the pre/post native and token balances Solana meta provides to
//! compute per-mint net deltas for the signer. No inner-instruction
//! parsing.

pub mod balances;
pub mod classifier;

pub use classifier::{SolanaActionClassifier, DUST_THRESHOLD, VOTE_PROGRAM};
