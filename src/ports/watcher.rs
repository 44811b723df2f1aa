//! Watcher Port Types
//!
//! The handoff unit between chain watchers and the scanner, and the error
//! type watchers report through.

use thiserror::Error;

use crate::domain::Chain;

/// Raw pool-creation candidate handed from a watcher to the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolCandidate {
    /// Chain the pool was created on
    pub chain: Chain,
    /// The non-wrapped-native token of the pair (EVM) or the pool address
    /// itself (Solana, enriched by pool address)
    pub token_address: String,
    /// Pool / pair address
    pub pair_address: String,
}

/// Errors that can occur in chain watchers
#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("subscription failed: {0}")]
    SubscriptionFailed(String),

    #[error("subscription stream ended")]
    StreamEnded,

    #[error("candidate channel closed")]
    ChannelClosed,
}
