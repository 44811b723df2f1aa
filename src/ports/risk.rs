//! Risk Ports
//!
//! Trait abstractions for honeypot/tax risk assessment: the consumer-facing
//! assessor, the individual fallback data sources it chains, and the
//! contract-code lookup backing the local heuristic.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Chain, RiskAssessment, RiskSource};

/// Errors from individual risk data sources
#[derive(Debug, Error)]
pub enum RiskError {
    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Provider returned status {0}")]
    BadStatus(u16),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Chain {0} not supported by this source")]
    UnsupportedChain(Chain),

    #[error("RPC error: {0}")]
    RpcError(String),
}

/// Port for the chained risk assessor consumed by the scanner.
///
/// Infallible by contract: any provider failure degrades internally to a
/// fallback verdict with the error string set.
#[async_trait]
pub trait RiskPort: Send + Sync {
    async fn assess(&self, chain: Chain, address: &str) -> RiskAssessment;
}

/// One honeypot/tax data provider in the fallback chain.
#[async_trait]
pub trait RiskDataSource: Send + Sync {
    /// Tag identifying this provider in emitted verdicts
    fn source(&self) -> RiskSource;

    /// Attempt an assessment; errors make the assessor fall through to the
    /// next source.
    async fn try_assess(&self, chain: Chain, address: &str) -> Result<RiskAssessment, RiskError>;
}

/// Contract bytecode lookup for the local fallback heuristic.
#[async_trait]
pub trait ContractCodeProvider: Send + Sync {
    /// Deployed bytecode at an address; empty when no contract exists there.
    async fn get_code(&self, chain: Chain, address: &str) -> Result<Vec<u8>, RiskError>;
}
