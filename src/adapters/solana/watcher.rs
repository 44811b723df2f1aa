//! Solana Pool Watcher
//!
//! Subscribes to account-change notifications for the Raydium AMM program
//! and feeds pool addresses through the collect/drain duty cycle into the
//! scanner's candidate channel.

use std::str::FromStr;
use std::time::Duration;

use futures::StreamExt;
use solana_client::nonblocking::pubsub_client::PubsubClient;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::domain::Chain;
use crate::ports::watcher::{PoolCandidate, WatcherError};

use super::duty_cycle::{DutyCycle, Offer, Phase};

/// Raydium AMM v4 program
pub const RAYDIUM_AMM_V4: &str = "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8";

/// Default collect phase length
pub const DEFAULT_COLLECT_DURATION: Duration = Duration::from_secs(2);
/// Default drain phase length
pub const DEFAULT_DRAIN_DURATION: Duration = Duration::from_secs(3);
/// Default duty-cycle queue bound
pub const DEFAULT_QUEUE_CAPACITY: usize = 512;

/// Configuration for the Solana watcher
#[derive(Debug, Clone)]
pub struct SolanaWatcherConfig {
    /// Primary JSON-RPC endpoint (connectivity probe)
    pub rpc_url: String,
    /// Fallback endpoint tried when the primary probe fails
    pub fallback_rpc_url: Option<String>,
    /// WebSocket endpoint for account subscriptions
    pub ws_url: String,
    /// AMM program to watch
    pub program_id: String,
    /// Collect phase length
    pub collect_duration: Duration,
    /// Drain phase length
    pub drain_duration: Duration,
    /// Duty-cycle queue bound
    pub queue_capacity: usize,
}

impl Default for SolanaWatcherConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            fallback_rpc_url: None,
            ws_url: "wss://api.mainnet-beta.solana.com".to_string(),
            program_id: RAYDIUM_AMM_V4.to_string(),
            collect_duration: DEFAULT_COLLECT_DURATION,
            drain_duration: DEFAULT_DRAIN_DURATION,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Probe RPC connectivity, falling back to the secondary endpoint.
///
/// Returns the endpoint that answered `getVersion`.
pub async fn probe_rpc(config: &SolanaWatcherConfig) -> Result<String, WatcherError> {
    let primary = RpcClient::new(config.rpc_url.clone());
    match primary.get_version().await {
        Ok(version) => {
            info!(url = %config.rpc_url, solana_core = %version.solana_core, "solana rpc reachable");
            return Ok(config.rpc_url.clone());
        }
        Err(e) => {
            warn!(url = %config.rpc_url, error = %e, "primary solana rpc probe failed");
        }
    }

    let fallback_url = config.fallback_rpc_url.as_ref().ok_or_else(|| {
        WatcherError::ConnectionFailed("primary solana rpc unreachable, no fallback".to_string())
    })?;

    let fallback = RpcClient::new(fallback_url.clone());
    let version = fallback
        .get_version()
        .await
        .map_err(|e| WatcherError::ConnectionFailed(format!("fallback rpc unreachable: {}", e)))?;
    info!(url = %fallback_url, solana_core = %version.solana_core, "using fallback solana rpc");
    Ok(fallback_url.clone())
}

/// Watcher for Raydium pool account changes
pub struct SolanaPoolWatcher {
    config: SolanaWatcherConfig,
}

impl SolanaPoolWatcher {
    pub fn new(config: SolanaWatcherConfig) -> Self {
        Self { config }
    }

    /// Consume account notifications until the stream breaks, forwarding
    /// batched candidates on each drain.
    pub async fn run(self, candidates: mpsc::Sender<PoolCandidate>) -> Result<(), WatcherError> {
        let program_id = Pubkey::from_str(&self.config.program_id).map_err(|e| {
            WatcherError::SubscriptionFailed(format!(
                "invalid program id {}: {}",
                self.config.program_id, e
            ))
        })?;

        let client = PubsubClient::new(&self.config.ws_url)
            .await
            .map_err(|e| WatcherError::ConnectionFailed(e.to_string()))?;

        let sub_config = RpcProgramAccountsConfig {
            account_config: RpcAccountInfoConfig {
                commitment: Some(CommitmentConfig::confirmed()),
                ..Default::default()
            },
            ..Default::default()
        };

        let (mut stream, _unsubscribe) = client
            .program_subscribe(&program_id, Some(sub_config))
            .await
            .map_err(|e| WatcherError::SubscriptionFailed(e.to_string()))?;

        info!(program = %self.config.program_id, "watching solana amm program");

        let mut cycle = DutyCycle::new(self.config.queue_capacity);
        let mut phase_timer = Box::pin(tokio::time::sleep(self.config.collect_duration));

        loop {
            tokio::select! {
                update = stream.next() => {
                    let update = match update {
                        Some(update) => update,
                        None => return Err(WatcherError::StreamEnded),
                    };
                    match cycle.offer(&update.value.pubkey) {
                        Offer::Queued => {
                            debug!(pool = %update.value.pubkey, "queued pool notification");
                        }
                        Offer::DuplicateDropped => {}
                        Offer::DrainingDropped => {
                            debug!(pool = %update.value.pubkey, "dropped notification during drain");
                        }
                        Offer::CapacityDropped => {
                            warn!(pool = %update.value.pubkey, "duty-cycle queue full, dropping");
                        }
                    }
                }
                _ = &mut phase_timer => {
                    match cycle.phase() {
                        Phase::Collecting => {
                            let batch = cycle.begin_drain();
                            if !batch.is_empty() {
                                debug!(count = batch.len(), "draining pool batch");
                            }
                            for pool in batch {
                                let candidate = PoolCandidate {
                                    chain: Chain::Solana,
                                    token_address: pool.clone(),
                                    pair_address: pool,
                                };
                                if candidates.send(candidate).await.is_err() {
                                    return Err(WatcherError::ChannelClosed);
                                }
                            }
                            phase_timer = Box::pin(tokio::time::sleep(self.config.drain_duration));
                        }
                        Phase::Draining => {
                            cycle.begin_collect();
                            phase_timer = Box::pin(tokio::time::sleep(self.config.collect_duration));
                        }
                    }
                }
            }
        }
    }
}
