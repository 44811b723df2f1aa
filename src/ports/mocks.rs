//! Hand-rolled mocks for port traits
//!
//! Deterministic, programmable implementations used by unit and integration
//! tests. Each mock records its calls so tests can assert on interaction
//! counts (e.g. that a cache hit made no fetch).

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{Chain, RiskAssessment, RiskSource, TokenRecord};
use super::market_data::{MarketDataError, MarketDataPort};
use super::risk::{ContractCodeProvider, RiskDataSource, RiskError, RiskPort};

fn key(chain: Chain, address: &str) -> (Chain, String) {
    (chain, address.to_string())
}

/// Mock market data port with programmable responses and call recording.
#[derive(Default)]
pub struct MockMarketData {
    records: Mutex<HashMap<(Chain, String), TokenRecord>>,
    /// Number of fetches that must fail (return None) before the programmed
    /// record is served, per key. Drives retry-loop tests.
    fail_first: Mutex<HashMap<(Chain, String), usize>>,
    cache: Mutex<HashMap<(Chain, String), TokenRecord>>,
    calls: Mutex<HashMap<(Chain, String), usize>>,
    total_calls: AtomicUsize,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Program a record to be returned for a chain + address
    pub fn with_record(self, chain: Chain, address: &str, record: TokenRecord) -> Self {
        self.records.lock().unwrap().insert(key(chain, address), record);
        self
    }

    /// Program a record that only resolves after `attempts` failed fetches
    pub fn with_record_after_attempts(
        self,
        chain: Chain,
        address: &str,
        record: TokenRecord,
        attempts: usize,
    ) -> Self {
        self.records.lock().unwrap().insert(key(chain, address), record);
        self.fail_first.lock().unwrap().insert(key(chain, address), attempts);
        self
    }

    /// Seed the fallback cache for a chain + address
    pub fn with_cached(self, chain: Chain, address: &str, record: TokenRecord) -> Self {
        self.cache.lock().unwrap().insert(key(chain, address), record);
        self
    }

    /// Fetch calls recorded for a chain + address
    pub fn fetch_calls(&self, chain: Chain, address: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(&key(chain, address))
            .copied()
            .unwrap_or(0)
    }

    /// Total fetch calls across all keys
    pub fn total_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataPort for MockMarketData {
    async fn fetch_token_data(
        &self,
        chain: Chain,
        address: &str,
    ) -> Result<Option<TokenRecord>, MarketDataError> {
        let k = key(chain, address);
        *self.calls.lock().unwrap().entry(k.clone()).or_insert(0) += 1;
        self.total_calls.fetch_add(1, Ordering::SeqCst);

        {
            let mut fail_first = self.fail_first.lock().unwrap();
            if let Some(remaining) = fail_first.get_mut(&k) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Ok(None);
                }
            }
        }

        Ok(self.records.lock().unwrap().get(&k).cloned())
    }

    fn cached(&self, chain: Chain, address: &str) -> Option<TokenRecord> {
        self.cache.lock().unwrap().get(&key(chain, address)).cloned()
    }
}

/// Mock risk port returning a programmed verdict.
pub struct MockRisk {
    assessment: Mutex<RiskAssessment>,
    calls: Mutex<Vec<(Chain, String)>>,
}

impl Default for MockRisk {
    fn default() -> Self {
        Self {
            assessment: Mutex::new(RiskAssessment::safe(RiskSource::Primary)),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl MockRisk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assessment(self, assessment: RiskAssessment) -> Self {
        *self.assessment.lock().unwrap() = assessment;
        self
    }

    /// Addresses this mock was asked to assess
    pub fn assessed(&self) -> Vec<(Chain, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RiskPort for MockRisk {
    async fn assess(&self, chain: Chain, address: &str) -> RiskAssessment {
        self.calls.lock().unwrap().push((chain, address.to_string()));
        self.assessment.lock().unwrap().clone()
    }
}

/// Mock risk data source that either succeeds with a verdict or fails.
pub struct MockRiskSource {
    tag: RiskSource,
    result: Option<RiskAssessment>,
    calls: AtomicUsize,
}

impl MockRiskSource {
    /// Source that succeeds with the given verdict
    pub fn succeeding(tag: RiskSource, assessment: RiskAssessment) -> Self {
        Self {
            tag,
            result: Some(assessment),
            calls: AtomicUsize::new(0),
        }
    }

    /// Source that always fails
    pub fn failing(tag: RiskSource) -> Self {
        Self {
            tag,
            result: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RiskDataSource for MockRiskSource {
    fn source(&self) -> RiskSource {
        self.tag
    }

    async fn try_assess(&self, _chain: Chain, _address: &str) -> Result<RiskAssessment, RiskError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.result {
            Some(assessment) => Ok(assessment.clone()),
            None => Err(RiskError::BadStatus(503)),
        }
    }
}

/// Mock contract-code provider with per-address bytecode.
#[derive(Default)]
pub struct MockCodeProvider {
    code: Mutex<HashMap<(Chain, String), Vec<u8>>>,
    fail: bool,
}

impl MockCodeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider whose lookups always error
    pub fn failing() -> Self {
        Self {
            code: Mutex::new(HashMap::new()),
            fail: true,
        }
    }

    pub fn with_code(self, chain: Chain, address: &str, code: Vec<u8>) -> Self {
        self.code.lock().unwrap().insert(key(chain, address), code);
        self
    }
}

#[async_trait]
impl ContractCodeProvider for MockCodeProvider {
    async fn get_code(&self, chain: Chain, address: &str) -> Result<Vec<u8>, RiskError> {
        if self.fail {
            return Err(RiskError::RpcError("mock rpc failure".to_string()));
        }
        Ok(self
            .code
            .lock()
            .unwrap()
            .get(&key(chain, address))
            .cloned()
            .unwrap_or_default())
    }
}

/// Shared helper: a plausible enriched record for tests.
pub fn test_record(chain: Chain, address: &str) -> TokenRecord {
    use crate::domain::ValidationCriteria;
    use chrono::Utc;

    TokenRecord {
        chain,
        address: address.to_string(),
        pair_address: format!("{}-pair", address),
        symbol: "NEW".to_string(),
        name: "New Token".to_string(),
        price_usd: 0.001,
        liquidity_usd: 5_000.0,
        volume_24h_usd: 100.0,
        age: "2m 0s".to_string(),
        age_seconds: 120,
        url: format!("https://dexscreener.com/{}/{}", chain, address),
        detected_at: Utc::now(),
        criteria: ValidationCriteria::default(),
        risk: None,
    }
}
