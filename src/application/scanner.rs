//! Token Discovery Scanner
//!
//! The stateful coordinator tying chain watchers, market-data enrichment,
//! validation and risk assessment into one detection pipeline, exposed to
//! consumers as a single event channel.
//!
//! Candidates flow one way: watchers -> dispatch loop -> per-candidate task
//! -> (enrichment, validation, risk) -> emitted event. Per-candidate errors
//! are logged and absorbed; only initialization failures propagate.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use chrono::Utc;
use ethers::providers::{Provider, Ws};
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::adapters::evm::{EvmChainSpec, EvmPairWatcher};
use crate::adapters::solana::{probe_rpc, SolanaPoolWatcher, SolanaWatcherConfig};
use crate::domain::{
    is_fresh_enough, quick_validate, valid_solana_address, Chain, CriteriaUpdate, RiskAssessment,
    TokenRecord, ValidationCriteria,
};
use crate::ports::market_data::MarketDataPort;
use crate::ports::risk::RiskPort;
use crate::ports::watcher::PoolCandidate;

/// Delay before enriching an EVM candidate, giving the market-data provider
/// time to index the new pair
pub const DEFAULT_INDEXING_DELAY: Duration = Duration::from_secs(60);
/// Solana enrichment retry budget
pub const DEFAULT_SOLANA_ENRICH_ATTEMPTS: u32 = 10;
/// Backoff between Solana enrichment attempts
pub const DEFAULT_SOLANA_ENRICH_BACKOFF: Duration = Duration::from_secs(3);
/// Candidate channel capacity
pub const DEFAULT_CANDIDATE_CAPACITY: usize = 256;

/// Scanner errors (initialization and lifecycle only; per-candidate failures
/// never surface here)
#[derive(Debug, Error)]
pub enum ScannerError {
    #[error("scanner not initialized")]
    NotInitialized,

    #[error("initialization failed: {0}")]
    InitFailed(String),

    #[error("chain {0} is not configured")]
    ChainNotConfigured(Chain),
}

/// Events emitted to the consumer
#[derive(Debug, Clone)]
pub enum ScannerEvent {
    /// A unique token passed validation
    TokenDetected(TokenRecord),
    /// A fire-and-forget risk check resolved after its record was emitted
    RiskAssessed {
        chain: Chain,
        address: String,
        assessment: RiskAssessment,
    },
    /// Non-fatal chain- or provider-level failure
    WatcherError {
        chain: Option<Chain>,
        message: String,
    },
}

/// Scanner configuration
#[derive(Clone)]
pub struct ScannerConfig {
    /// EVM chains the scanner may watch
    pub evm_specs: Vec<EvmChainSpec>,
    /// Solana watcher configuration, if Solana is enabled
    pub solana: Option<SolanaWatcherConfig>,
    /// EVM indexing delay before enrichment
    pub indexing_delay: Duration,
    /// Solana enrichment retry budget
    pub solana_enrich_attempts: u32,
    /// Backoff between Solana enrichment attempts
    pub solana_enrich_backoff: Duration,
    /// Candidate channel capacity
    pub candidate_capacity: usize,
    /// Initial validation criteria
    pub criteria: ValidationCriteria,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            evm_specs: Vec::new(),
            solana: None,
            indexing_delay: DEFAULT_INDEXING_DELAY,
            solana_enrich_attempts: DEFAULT_SOLANA_ENRICH_ATTEMPTS,
            solana_enrich_backoff: DEFAULT_SOLANA_ENRICH_BACKOFF,
            candidate_capacity: DEFAULT_CANDIDATE_CAPACITY,
            criteria: ValidationCriteria::default(),
        }
    }
}

/// Shared pipeline state used by per-candidate tasks
struct Pipeline {
    config: ScannerConfig,
    market_data: Arc<dyn MarketDataPort>,
    risk: Arc<dyn RiskPort>,
    criteria: RwLock<ValidationCriteria>,
    /// Dedup set of processed (chain, address) keys. Grows for the process
    /// lifetime; deliberately not cleared on stop.
    seen: StdMutex<HashSet<String>>,
    /// Set by `stop_scanning`; suppresses emission from in-flight candidates
    stopped: AtomicBool,
    events: mpsc::UnboundedSender<ScannerEvent>,
}

impl Pipeline {
    /// Dedup key: chain-qualified lowercased address for EVM, bare mint for
    /// Solana (single chain, case-sensitive base58).
    fn dedup_key(chain: Chain, address: &str) -> String {
        if chain.is_evm() {
            format!("{}:{}", chain, address.to_ascii_lowercase())
        } else {
            address.to_string()
        }
    }

    /// Atomically check and mark an address as seen. The single lock around
    /// check-and-mark is what keeps two near-simultaneous events for the
    /// same address from both passing.
    fn mark_seen(&self, chain: Chain, address: &str) -> bool {
        self.seen
            .lock()
            .unwrap()
            .insert(Self::dedup_key(chain, address))
    }

    fn emit(&self, event: ScannerEvent) {
        if self.stopped.load(Ordering::SeqCst) {
            debug!("scanner stopped, suppressing event");
            return;
        }
        if self.events.send(event).is_err() {
            debug!("event receiver dropped");
        }
    }

    async fn process(self: Arc<Self>, candidate: PoolCandidate) {
        match candidate.chain {
            Chain::Ethereum | Chain::Bsc => self.process_evm(candidate).await,
            Chain::Solana => self.process_solana(candidate).await,
        }
    }

    async fn process_evm(self: Arc<Self>, candidate: PoolCandidate) {
        let chain = candidate.chain;
        let address = candidate.token_address.clone();

        if !self.mark_seen(chain, &address) {
            debug!(%chain, %address, "duplicate candidate dropped");
            return;
        }

        // Give the market-data provider time to index the new pair
        tokio::time::sleep(self.config.indexing_delay).await;

        let record = match self.market_data.fetch_token_data(chain, &address).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(%chain, %address, "no market data, dropping candidate");
                return;
            }
            Err(e) => {
                warn!(%chain, %address, error = %e, "enrichment failed, dropping candidate");
                return;
            }
        };

        let criteria = self.criteria.read().await.clone();

        if let Err(rejection) = quick_validate(&record, &criteria) {
            info!(%chain, %address, symbol = %record.symbol, %rejection, "candidate rejected");
            return;
        }
        if !is_fresh_enough(&record, &criteria) {
            info!(%chain, %address, age = %record.age, "candidate outside age window");
            return;
        }

        if criteria.enable_honeypot_detection {
            // Advisory: never blocks emission. The verdict arrives as a
            // separate event if and when it resolves.
            let pipeline = self.clone();
            let risk_chain = chain;
            let risk_address = address.clone();
            tokio::spawn(async move {
                let assessment = pipeline.risk.assess(risk_chain, &risk_address).await;
                pipeline.emit(ScannerEvent::RiskAssessed {
                    chain: risk_chain,
                    address: risk_address,
                    assessment,
                });
            });
        }

        let record = TokenRecord {
            criteria,
            detected_at: Utc::now(),
            ..record
        };

        info!(%chain, %address, symbol = %record.symbol, liquidity = record.liquidity_usd,
            "token detected");
        self.emit(ScannerEvent::TokenDetected(record));
    }

    async fn process_solana(self: Arc<Self>, candidate: PoolCandidate) {
        let address = candidate.token_address;

        // Only an address-shape check gates Solana emission; the quality
        // filters EVM chains go through are bypassed on purpose here.
        if !valid_solana_address(&address) {
            debug!(%address, "invalid solana address shape");
            return;
        }

        if !self.mark_seen(Chain::Solana, &address) {
            debug!(%address, "duplicate solana candidate dropped");
            return;
        }

        let mut record = None;
        for attempt in 1..=self.config.solana_enrich_attempts {
            match self.market_data.fetch_token_data(Chain::Solana, &address).await {
                Ok(Some(fetched)) if fetched.price_usd > 0.0 => {
                    record = Some(fetched);
                    break;
                }
                Ok(_) => {
                    debug!(%address, attempt, "no priced market data yet");
                }
                Err(e) => {
                    debug!(%address, attempt, error = %e, "solana enrichment attempt failed");
                }
            }
            if attempt < self.config.solana_enrich_attempts {
                tokio::time::sleep(self.config.solana_enrich_backoff).await;
            }
        }

        let record = match record.or_else(|| {
            self.market_data
                .cached(Chain::Solana, &address)
                .filter(|cached| cached.price_usd > 0.0)
        }) {
            Some(record) => record,
            None => {
                info!(%address, "solana enrichment exhausted, dropping candidate");
                return;
            }
        };

        // The uniqueness contract is keyed on the mint, not the pool: two
        // pools launching the same mint must emit once. The pool-address
        // mark above only guards concurrent processing of one pool.
        if record.address != address && !self.mark_seen(Chain::Solana, &record.address) {
            debug!(mint = %record.address, pool = %address, "mint already emitted, dropping pool");
            return;
        }

        let criteria = self.criteria.read().await.clone();
        let record = TokenRecord {
            criteria,
            detected_at: Utc::now(),
            ..record
        };

        info!(address = %record.address, symbol = %record.symbol, "solana token detected");
        self.emit(ScannerEvent::TokenDetected(record));
    }
}

/// Handle for one chain's live watcher task
struct WatcherHandle {
    task: JoinHandle<()>,
}

/// Multi-chain token discovery scanner
pub struct TokenScanner {
    pipeline: Arc<Pipeline>,
    candidates_tx: mpsc::Sender<PoolCandidate>,
    watchers: Arc<RwLock<HashMap<Chain, WatcherHandle>>>,
    evm_providers: Arc<RwLock<HashMap<Chain, Arc<Provider<Ws>>>>>,
    initialized: Arc<RwLock<bool>>,
    is_running: Arc<RwLock<bool>>,
    /// Keeps the dispatch loop alive for the scanner's lifetime
    _dispatch: Arc<JoinHandle<()>>,
}

impl TokenScanner {
    /// Create a scanner and the event receiver consumers read from.
    pub fn new(
        config: ScannerConfig,
        market_data: Arc<dyn MarketDataPort>,
        risk: Arc<dyn RiskPort>,
    ) -> (Self, mpsc::UnboundedReceiver<ScannerEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (candidates_tx, mut candidates_rx) =
            mpsc::channel::<PoolCandidate>(config.candidate_capacity);

        let pipeline = Arc::new(Pipeline {
            criteria: RwLock::new(config.criteria.clone()),
            config,
            market_data,
            risk,
            seen: StdMutex::new(HashSet::new()),
            stopped: AtomicBool::new(false),
            events: events_tx,
        });

        let dispatch_pipeline = pipeline.clone();
        let dispatch = tokio::spawn(async move {
            while let Some(candidate) = candidates_rx.recv().await {
                tokio::spawn(dispatch_pipeline.clone().process(candidate));
            }
        });

        let scanner = Self {
            pipeline,
            candidates_tx,
            watchers: Arc::new(RwLock::new(HashMap::new())),
            evm_providers: Arc::new(RwLock::new(HashMap::new())),
            initialized: Arc::new(RwLock::new(false)),
            is_running: Arc::new(RwLock::new(false)),
            _dispatch: Arc::new(dispatch),
        };
        (scanner, events_rx)
    }

    /// Establish chain connections. Nothing can run before this succeeds.
    pub async fn initialize(&self) -> Result<(), ScannerError> {
        for spec in &self.pipeline.config.evm_specs {
            let provider = Provider::<Ws>::connect(&spec.ws_url)
                .await
                .map_err(|e| {
                    ScannerError::InitFailed(format!("{} ws connect: {}", spec.chain, e))
                })?;
            self.evm_providers
                .write()
                .await
                .insert(spec.chain, Arc::new(provider));
            info!(chain = %spec.chain, "evm provider connected");
        }

        if let Some(solana) = &self.pipeline.config.solana {
            probe_rpc(solana)
                .await
                .map_err(|e| ScannerError::InitFailed(e.to_string()))?;
        }

        *self.initialized.write().await = true;
        info!("scanner initialized");
        Ok(())
    }

    /// Begin watching the given chains. No-op when already running; use
    /// `add_networks`/`remove_networks` to adjust the active set live.
    pub async fn start_scanning(&self, chains: &[Chain]) -> Result<(), ScannerError> {
        if *self.is_running.read().await {
            warn!("start_scanning called while already running");
            return Ok(());
        }
        if !*self.initialized.read().await {
            return Err(ScannerError::NotInitialized);
        }

        self.pipeline.stopped.store(false, Ordering::SeqCst);
        *self.is_running.write().await = true;
        self.add_networks(chains).await
    }

    /// Add chains to the active set. A chain already active is a no-op.
    /// A single chain's start failure is reported via the event channel and
    /// does not abort the others.
    pub async fn add_networks(&self, chains: &[Chain]) -> Result<(), ScannerError> {
        for &chain in chains {
            let mut watchers = self.watchers.write().await;
            if watchers.contains_key(&chain) {
                debug!(%chain, "chain already active");
                continue;
            }

            match self.spawn_watcher(chain).await {
                Ok(handle) => {
                    watchers.insert(chain, handle);
                    info!(%chain, "chain watcher started");
                }
                Err(e) => {
                    error!(%chain, error = %e, "failed to start chain watcher");
                    self.pipeline.emit(ScannerEvent::WatcherError {
                        chain: Some(chain),
                        message: e.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    async fn spawn_watcher(&self, chain: Chain) -> Result<WatcherHandle, ScannerError> {
        let candidates = self.candidates_tx.clone();
        let pipeline = self.pipeline.clone();

        let task = match chain {
            Chain::Ethereum | Chain::Bsc => {
                let spec = self
                    .pipeline
                    .config
                    .evm_specs
                    .iter()
                    .find(|s| s.chain == chain)
                    .cloned()
                    .ok_or(ScannerError::ChainNotConfigured(chain))?;
                let provider = self
                    .evm_providers
                    .read()
                    .await
                    .get(&chain)
                    .cloned()
                    .ok_or(ScannerError::NotInitialized)?;

                tokio::spawn(async move {
                    let watcher = EvmPairWatcher::new(spec, provider);
                    if let Err(e) = watcher.run(candidates).await {
                        pipeline.emit(ScannerEvent::WatcherError {
                            chain: Some(chain),
                            message: e.to_string(),
                        });
                    }
                })
            }
            Chain::Solana => {
                let config = self
                    .pipeline
                    .config
                    .solana
                    .clone()
                    .ok_or(ScannerError::ChainNotConfigured(chain))?;

                tokio::spawn(async move {
                    let watcher = SolanaPoolWatcher::new(config);
                    if let Err(e) = watcher.run(candidates).await {
                        pipeline.emit(ScannerEvent::WatcherError {
                            chain: Some(chain),
                            message: e.to_string(),
                        });
                    }
                })
            }
        };

        Ok(WatcherHandle { task })
    }

    /// Tear down watchers for the given chains, returning them to idle.
    pub async fn remove_networks(&self, chains: &[Chain]) {
        let mut watchers = self.watchers.write().await;
        for chain in chains {
            if let Some(handle) = watchers.remove(chain) {
                handle.task.abort();
                info!(%chain, "chain watcher stopped");
            }
        }
    }

    /// Stop all watchers and suppress emission from in-flight candidates.
    /// Safe to call repeatedly. The dedup set and market-data cache are
    /// deliberately left intact.
    pub async fn stop_scanning(&self) {
        self.pipeline.stopped.store(true, Ordering::SeqCst);
        *self.is_running.write().await = false;

        let mut watchers = self.watchers.write().await;
        for (chain, handle) in watchers.drain() {
            handle.task.abort();
            info!(%chain, "chain watcher stopped");
        }
    }

    pub async fn is_scanning(&self) -> bool {
        *self.is_running.read().await
    }

    /// Chains with a live watcher subscription
    pub async fn active_networks(&self) -> Vec<Chain> {
        self.watchers.read().await.keys().copied().collect()
    }

    /// Merge a partial criteria update. Applies to subsequent detections
    /// only; in-flight evaluations keep their snapshot.
    pub async fn update_criteria(&self, update: CriteriaUpdate) {
        let mut criteria = self.pipeline.criteria.write().await;
        criteria.apply(&update);
        info!(?criteria, "validation criteria updated");
    }

    /// Current criteria snapshot
    pub async fn criteria(&self) -> ValidationCriteria {
        self.pipeline.criteria.read().await.clone()
    }

    /// Sender feeding the scanner's candidate pipeline. Watchers hold clones
    /// of this; tests inject synthetic candidates through it.
    pub fn candidate_sender(&self) -> mpsc::Sender<PoolCandidate> {
        self.candidates_tx.clone()
    }
}
