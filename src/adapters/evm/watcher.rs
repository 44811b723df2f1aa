//! EVM Pair Watcher
//!
//! Subscribes to a factory contract's PairCreated log stream over a
//! persistent WebSocket connection, decodes the two token addresses and the
//! pair address, and hands the non-wrapped-native side to the scanner as a
//! candidate.
//!
//! There is no resubscribe/backoff here: a broken stream ends the watcher
//! task with an error the scanner surfaces to its consumer.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use ethers::providers::{Middleware, Provider, Ws};
use ethers::types::{Address, Filter, Log, H256};
use ethers::utils::keccak256;
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::domain::Chain;
use crate::ports::risk::{ContractCodeProvider, RiskError};
use crate::ports::watcher::{PoolCandidate, WatcherError};

use super::chains::EvmChainSpec;

/// Topic hash of `PairCreated(address,address,address,uint256)`
fn pair_created_topic() -> H256 {
    H256::from(keccak256(
        "PairCreated(address,address,address,uint256)".as_bytes(),
    ))
}

/// Decode a PairCreated log into (token0, token1, pair).
///
/// token0/token1 are indexed topics; the pair address is the first word of
/// the data section.
pub fn decode_pair_created(log: &Log) -> Option<(Address, Address, Address)> {
    if log.topics.len() < 3 || log.data.len() < 32 {
        return None;
    }
    let token0 = Address::from_slice(&log.topics[1].as_bytes()[12..]);
    let token1 = Address::from_slice(&log.topics[2].as_bytes()[12..]);
    let pair = Address::from_slice(&log.data[12..32]);
    Some((token0, token1, pair))
}

/// The "new" token of a pair is whichever side is not the wrapped native
/// asset. When neither side is, token0 is reported and the pair is logged
/// for inspection.
pub fn select_new_token(wrapped_native: Address, token0: Address, token1: Address) -> Address {
    if token0 == wrapped_native {
        token1
    } else {
        token0
    }
}

/// Watcher for one EVM chain's factory
pub struct EvmPairWatcher {
    spec: EvmChainSpec,
    provider: Arc<Provider<Ws>>,
}

impl EvmPairWatcher {
    /// Build a watcher over an already-connected provider
    pub fn new(spec: EvmChainSpec, provider: Arc<Provider<Ws>>) -> Self {
        Self { spec, provider }
    }

    /// Consume the log stream until it breaks, forwarding candidates.
    pub async fn run(self, candidates: mpsc::Sender<PoolCandidate>) -> Result<(), WatcherError> {
        let filter = Filter::new()
            .address(self.spec.factory)
            .topic0(pair_created_topic());

        let mut stream = self
            .provider
            .subscribe_logs(&filter)
            .await
            .map_err(|e| WatcherError::SubscriptionFailed(e.to_string()))?;

        info!(chain = %self.spec.chain, factory = ?self.spec.factory, "watching factory for new pairs");

        while let Some(log) = stream.next().await {
            let (token0, token1, pair) = match decode_pair_created(&log) {
                Some(decoded) => decoded,
                None => {
                    warn!(chain = %self.spec.chain, "undecodable PairCreated log");
                    continue;
                }
            };

            if token0 != self.spec.wrapped_native && token1 != self.spec.wrapped_native {
                debug!(chain = %self.spec.chain, ?token0, ?token1, "pair without wrapped native side");
            }
            let new_token = select_new_token(self.spec.wrapped_native, token0, token1);

            let candidate = PoolCandidate {
                chain: self.spec.chain,
                token_address: format!("{:?}", new_token),
                pair_address: format!("{:?}", pair),
            };
            debug!(chain = %self.spec.chain, token = %candidate.token_address, "pair created");

            if candidates.send(candidate).await.is_err() {
                return Err(WatcherError::ChannelClosed);
            }
        }

        Err(WatcherError::StreamEnded)
    }
}

/// Bytecode lookup for the risk assessor's local fallback.
///
/// Holds one WebSocket endpoint per chain and connects lazily on first use,
/// so the assessor can be wired up before any chain connection exists.
pub struct EvmCodeProvider {
    endpoints: HashMap<Chain, String>,
    providers: tokio::sync::RwLock<HashMap<Chain, Arc<Provider<Ws>>>>,
}

impl EvmCodeProvider {
    pub fn new(endpoints: HashMap<Chain, String>) -> Self {
        Self {
            endpoints,
            providers: tokio::sync::RwLock::new(HashMap::new()),
        }
    }

    async fn provider(&self, chain: Chain) -> Result<Arc<Provider<Ws>>, RiskError> {
        if let Some(provider) = self.providers.read().await.get(&chain) {
            return Ok(provider.clone());
        }

        let endpoint = self
            .endpoints
            .get(&chain)
            .ok_or(RiskError::UnsupportedChain(chain))?;
        let provider = Arc::new(
            Provider::<Ws>::connect(endpoint)
                .await
                .map_err(|e| RiskError::RpcError(e.to_string()))?,
        );
        self.providers
            .write()
            .await
            .insert(chain, provider.clone());
        Ok(provider)
    }
}

#[async_trait]
impl ContractCodeProvider for EvmCodeProvider {
    async fn get_code(&self, chain: Chain, address: &str) -> Result<Vec<u8>, RiskError> {
        let provider = self.provider(chain).await?;
        let address: Address = address
            .parse()
            .map_err(|_| RiskError::RpcError(format!("invalid address: {}", address)))?;

        let code = provider
            .get_code(address, None)
            .await
            .map_err(|e| RiskError::RpcError(e.to_string()))?;
        Ok(code.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::Bytes;

    fn addr(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    fn topic_for(address: Address) -> H256 {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(address.as_bytes());
        H256::from(word)
    }

    fn pair_created_log(token0: Address, token1: Address, pair: Address) -> Log {
        let mut data = vec![0u8; 64];
        data[12..32].copy_from_slice(pair.as_bytes());
        // second word: pair index, irrelevant to decoding
        data[63] = 1;
        Log {
            topics: vec![pair_created_topic(), topic_for(token0), topic_for(token1)],
            data: Bytes::from(data),
            ..Default::default()
        }
    }

    #[test]
    fn decodes_pair_created_log() {
        let log = pair_created_log(addr(0xAA), addr(0xBB), addr(0xCC));
        let (token0, token1, pair) = decode_pair_created(&log).unwrap();
        assert_eq!(token0, addr(0xAA));
        assert_eq!(token1, addr(0xBB));
        assert_eq!(pair, addr(0xCC));
    }

    #[test]
    fn rejects_log_with_missing_topics() {
        let mut log = pair_created_log(addr(1), addr(2), addr(3));
        log.topics.truncate(2);
        assert!(decode_pair_created(&log).is_none());

        let mut log = pair_created_log(addr(1), addr(2), addr(3));
        log.data = Bytes::from(vec![0u8; 16]);
        assert!(decode_pair_created(&log).is_none());
    }

    #[test]
    fn picks_the_non_wrapped_side() {
        let weth = addr(0xEE);
        assert_eq!(select_new_token(weth, weth, addr(2)), addr(2));
        assert_eq!(select_new_token(weth, addr(1), weth), addr(1));
        // Neither side wrapped: token0 wins
        assert_eq!(select_new_token(weth, addr(1), addr(2)), addr(1));
    }
}
