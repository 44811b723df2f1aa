//! Solana chain adapter

pub mod duty_cycle;
pub mod watcher;

pub use duty_cycle::{DutyCycle, Offer, Phase};
pub use watcher::{probe_rpc, SolanaPoolWatcher, SolanaWatcherConfig, RAYDIUM_AMM_V4};
