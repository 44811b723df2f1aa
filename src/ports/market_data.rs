//! Market Data Port
//!
//! Trait abstraction over the third-party pair/token aggregation API that
//! turns a chain + address into an enriched token record.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Chain, TokenRecord};

/// Market data error type
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("HTTP client error: {0}")]
    HttpError(String),

    #[error("Request timed out")]
    Timeout,
}

/// Port for token enrichment via a market-data provider.
///
/// Implementations must not panic and must not surface provider-shaped
/// garbage as errors: an empty, malformed or non-2xx response is `Ok(None)`.
/// `Err` is reserved for transport-level failures worth logging upstream.
#[async_trait]
pub trait MarketDataPort: Send + Sync {
    /// Fetch an enriched token record for a chain + address.
    ///
    /// For EVM chains `address` is the token contract address; for Solana it
    /// is the pool (pair) address, matching the provider's endpoint shapes.
    async fn fetch_token_data(
        &self,
        chain: Chain,
        address: &str,
    ) -> Result<Option<TokenRecord>, MarketDataError>;

    /// Last successfully fetched record for a chain + address, fresh or
    /// stale. Used as a fallback when re-enrichment fails.
    fn cached(&self, chain: Chain, address: &str) -> Option<TokenRecord>;
}
