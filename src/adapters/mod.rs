//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - DexScreener: market-data enrichment with response caching
//! - Risk: GoPlus / honeypot.is / bytecode-fallback assessor chain
//! - EVM: factory log watcher and contract-code lookup (Ethereum, BSC)
//! - Solana: Raydium account-change watcher with collect/drain batching

pub mod dexscreener;
pub mod evm;
pub mod risk;
pub mod solana;

pub use dexscreener::{DexScreenerClient, DexScreenerConfig};
pub use evm::{EvmChainSpec, EvmCodeProvider, EvmPairWatcher};
pub use risk::{ChainedRiskAssessor, GoPlusSource, HoneypotIsSource};
pub use solana::{SolanaPoolWatcher, SolanaWatcherConfig};
