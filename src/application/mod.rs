//! Application Layer - Pipeline Orchestration
//!
//! Wires watchers, enrichment, validation and risk assessment into the
//! token discovery scanner.

pub mod scanner;

pub use scanner::{
    ScannerConfig, ScannerError, ScannerEvent, TokenScanner, DEFAULT_INDEXING_DELAY,
};
