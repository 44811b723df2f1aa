//! DexScreener Client
//!
//! `MarketDataPort` implementation over the DexScreener `latest/dex` API with
//! a 30-second in-process response cache. EVM chains are queried by token
//! address (multi-pair response); Solana is queried by pool address
//! (single-pair response).

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use tracing::{debug, warn};

use crate::domain::{age, Chain, TokenRecord, ValidationCriteria};
use crate::ports::market_data::{MarketDataError, MarketDataPort};

use super::types::{DexScreenerResponse, PairData};

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.dexscreener.com";
/// How long a cached record stays fresh
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);
/// Request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// DexScreener client configuration
#[derive(Debug, Clone)]
pub struct DexScreenerConfig {
    /// API base URL
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Cache freshness window
    pub cache_ttl: Duration,
}

impl Default for DexScreenerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

/// DexScreener market-data client with response caching
pub struct DexScreenerClient {
    config: DexScreenerConfig,
    http: Client,
    cache: Mutex<HashMap<(Chain, String), (TokenRecord, Instant)>>,
}

impl DexScreenerClient {
    /// Create a client with default configuration
    pub fn new() -> Result<Self, MarketDataError> {
        Self::with_config(DexScreenerConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: DexScreenerConfig) -> Result<Self, MarketDataError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MarketDataError::HttpError(e.to_string()))?;

        Ok(Self {
            config,
            http,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Chain-specific query URL
    fn query_url(&self, chain: Chain, address: &str) -> String {
        match chain {
            Chain::Ethereum | Chain::Bsc => {
                format!("{}/latest/dex/tokens/{}", self.config.base_url, address)
            }
            Chain::Solana => format!(
                "{}/latest/dex/pairs/solana/{}",
                self.config.base_url, address
            ),
        }
    }

    fn cache_get_fresh(&self, chain: Chain, address: &str) -> Option<TokenRecord> {
        let cache = self.cache.lock().unwrap();
        let (record, fetched_at) = cache.get(&(chain, address.to_string()))?;
        if fetched_at.elapsed() < self.config.cache_ttl {
            Some(record.clone())
        } else {
            None
        }
    }

    fn cache_put(&self, chain: Chain, address: &str, record: TokenRecord) {
        self.cache
            .lock()
            .unwrap()
            .insert((chain, address.to_string()), (record, Instant::now()));
    }

    /// Pick the pair to represent the token: highest USD liquidity on the
    /// queried chain.
    fn select_pair(chain: Chain, pairs: Vec<PairData>) -> Option<PairData> {
        pairs
            .into_iter()
            .filter(|p| p.chain_id == chain.dexscreener_slug())
            .max_by(|a, b| {
                a.liquidity_usd()
                    .partial_cmp(&b.liquidity_usd())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    /// Whether a pair-side address is the queried one. EVM addresses compare
    /// case-insensitively; Solana addresses are case-sensitive base58.
    fn addr_matches(chain: Chain, candidate: &str, queried: &str) -> bool {
        if chain.is_evm() {
            candidate.eq_ignore_ascii_case(queried)
        } else {
            candidate == queried
        }
    }

    /// Build an enriched record from a pair payload.
    ///
    /// The queried token can sit on either side of the pair; prefer the side
    /// that matches it so a quote-side listing does not come back describing
    /// the wrapped native. Solana queries by pool address, which matches
    /// neither side, so the base token is taken there.
    ///
    /// The criteria snapshot and detection timestamp are placeholders here;
    /// the scanner stamps both at emission time.
    fn record_from_pair(chain: Chain, pair: PairData, queried: &str, now_ms: i64) -> TokenRecord {
        let (age_str, age_seconds) = match pair.pair_created_at {
            Some(created_at) => age::age_from_created_at(created_at, now_ms),
            None => ("unknown".to_string(), 0),
        };

        let url = pair.url.clone().unwrap_or_else(|| {
            format!(
                "https://dexscreener.com/{}/{}",
                chain.dexscreener_slug(),
                pair.pair_address
            )
        });

        let base_matches = Self::addr_matches(chain, &pair.base_token.address, queried);
        let token = match &pair.quote_token {
            Some(quote) if !base_matches && Self::addr_matches(chain, &quote.address, queried) => {
                quote.clone()
            }
            _ => pair.base_token.clone(),
        };

        TokenRecord {
            chain,
            address: token.address,
            pair_address: pair.pair_address.clone(),
            symbol: token.symbol,
            name: token.name,
            price_usd: pair.price_usd(),
            liquidity_usd: pair.liquidity_usd(),
            volume_24h_usd: pair.volume_24h_usd(),
            age: age_str,
            age_seconds,
            url,
            detected_at: Utc::now(),
            criteria: ValidationCriteria::default(),
            risk: None,
        }
    }
}

#[async_trait]
impl MarketDataPort for DexScreenerClient {
    async fn fetch_token_data(
        &self,
        chain: Chain,
        address: &str,
    ) -> Result<Option<TokenRecord>, MarketDataError> {
        if let Some(record) = self.cache_get_fresh(chain, address) {
            debug!(%chain, address, "dexscreener cache hit");
            return Ok(Some(record));
        }

        let url = self.query_url(chain, address);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MarketDataError::Timeout
                } else {
                    MarketDataError::HttpError(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            warn!(%chain, address, status = %response.status(), "dexscreener non-success status");
            return Ok(None);
        }

        let parsed: DexScreenerResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(%chain, address, error = %e, "dexscreener response parse failed");
                return Ok(None);
            }
        };

        let pair = match Self::select_pair(chain, parsed.into_pairs()) {
            Some(pair) => pair,
            None => {
                debug!(%chain, address, "no pairs in dexscreener response");
                return Ok(None);
            }
        };

        let record = Self::record_from_pair(chain, pair, address, age::now_ms());
        self.cache_put(chain, address, record.clone());
        Ok(Some(record))
    }

    fn cached(&self, chain: Chain, address: &str) -> Option<TokenRecord> {
        // Stale entries are deliberately served here; this is the
        // best-effort fallback path, not the freshness-gated one.
        self.cache
            .lock()
            .unwrap()
            .get(&(chain, address.to_string()))
            .map(|(record, _)| record.clone())
    }
}
