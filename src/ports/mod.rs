//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - Market data enrichment (DexScreener)
//! - Honeypot/tax risk data sources and contract-code lookup
//! - Watcher-to-scanner candidate handoff

pub mod market_data;
pub mod mocks;
pub mod risk;
pub mod watcher;

pub use market_data::{MarketDataError, MarketDataPort};
pub use risk::{ContractCodeProvider, RiskDataSource, RiskError, RiskPort};
pub use watcher::{PoolCandidate, WatcherError};
