//! TokenScout - Multi-Chain Token Discovery Scanner
//!
//! Watches DEX factory events on Ethereum and BSC and Raydium pool activity
//! on Solana, enriches new pools with DexScreener market data, filters them
//! through a validation engine, and emits detections on an event channel.
//! An optional honeypot risk assessor runs fire-and-forget per detection.
//!
//! # Architecture
//!
//! Hexagonal layout:
//! - `domain`: chain model, token records, validation rules (no I/O)
//! - `ports`: trait boundaries for market data, risk and watcher plumbing
//! - `adapters`: DexScreener, GoPlus / honeypot.is, EVM and Solana watchers
//! - `application`: the `TokenScanner` pipeline orchestrator
//! - `config`: TOML configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::{ScannerEvent, TokenScanner};
pub use domain::{Chain, TokenRecord, ValidationCriteria};
