//! EVM chain adapter (Ethereum, BSC)

pub mod chains;
pub mod watcher;

pub use chains::EvmChainSpec;
pub use watcher::{EvmCodeProvider, EvmPairWatcher};
