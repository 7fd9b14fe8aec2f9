//! Common types module for the chain-parameter engine.
//!
//! This module defines the core data types shared by the fee policy, the
//! parameter cache, the chain adapters and the pending-transaction tracker.
//! Keeping them in one crate gives every component the same view of chains,
//! intents and the chain-specific parameter bundles.

/// Chain and chain-family identifiers.
pub mod chain;
/// Read-only coin model consumed from the wallet.
pub mod coin;
/// Event types published by the engine.
pub mod events;
/// Transfer and swap intents plus the cache fingerprint derived from them.
pub mod intent;
/// Network endpoint configuration types.
pub mod networks;
/// Chain-specific parameter bundles returned by the resolver.
pub mod params;
/// Broadcast transactions awaiting confirmation.
pub mod pending;
/// Log formatting and time helpers.
pub mod utils;

pub use chain::{Chain, ChainFamily, UnknownChain};
pub use coin::Coin;
pub use events::{CacheEvent, ChainParamsEvent, PendingEvent};
pub use intent::{Action, CacheKey, FeeMode, TransactionIntent, TransactionType};
pub use networks::{NetworkConfig, NetworksConfig};
pub use params::{ChainSpecificParams, IbcDenomTrace, SuiCoin, TronBlockInfo};
pub use pending::PendingTransaction;
pub use utils::{current_timestamp_nanos, truncate_id};

/// Re-exported so downstream crates agree on the big-integer type.
pub use alloy_primitives::U256;
