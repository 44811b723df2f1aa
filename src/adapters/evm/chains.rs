//! Per-chain EVM configuration table
//!
//! One generic watcher consumes these specs instead of maintaining parallel
//! per-chain code paths. Factory and wrapped-native defaults are the V2 DEXes
//! the scanner targets (Uniswap V2 on Ethereum, PancakeSwap V2 on BSC).

use ethers::types::Address;

use crate::domain::Chain;
use crate::ports::watcher::WatcherError;

/// Uniswap V2 factory
pub const UNISWAP_V2_FACTORY: &str = "0x5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f";
/// Wrapped ETH
pub const WETH_ADDRESS: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";
/// PancakeSwap V2 factory
pub const PANCAKESWAP_V2_FACTORY: &str = "0xcA143Ce32Fe78f1f7019d7d551a6402fC5350c73";
/// Wrapped BNB
pub const WBNB_ADDRESS: &str = "0xbb4CdB9CBd36B01bD1cBaEF60aF814a3f6F0Ee75";

/// Everything the generic EVM watcher needs to know about one chain
#[derive(Debug, Clone)]
pub struct EvmChainSpec {
    pub chain: Chain,
    /// WebSocket RPC endpoint
    pub ws_url: String,
    /// DEX factory emitting PairCreated
    pub factory: Address,
    /// Wrapped native asset; the other side of a new pair is the new token
    pub wrapped_native: Address,
}

fn parse_address(value: &str, what: &str) -> Result<Address, WatcherError> {
    value
        .parse()
        .map_err(|_| WatcherError::ConnectionFailed(format!("invalid {} address: {}", what, value)))
}

impl EvmChainSpec {
    /// Spec for a chain with optional factory / wrapped-native overrides
    pub fn new(
        chain: Chain,
        ws_url: String,
        factory_override: Option<&str>,
        wrapped_native_override: Option<&str>,
    ) -> Result<Self, WatcherError> {
        let (default_factory, default_wrapped) = match chain {
            Chain::Ethereum => (UNISWAP_V2_FACTORY, WETH_ADDRESS),
            Chain::Bsc => (PANCAKESWAP_V2_FACTORY, WBNB_ADDRESS),
            Chain::Solana => {
                return Err(WatcherError::ConnectionFailed(
                    "solana is not an EVM chain".to_string(),
                ))
            }
        };

        Ok(Self {
            chain,
            ws_url,
            factory: parse_address(factory_override.unwrap_or(default_factory), "factory")?,
            wrapped_native: parse_address(
                wrapped_native_override.unwrap_or(default_wrapped),
                "wrapped native",
            )?,
        })
    }
}
