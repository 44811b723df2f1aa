//! Chained Risk Assessor
//!
//! `RiskPort` implementation that walks a strict fallback chain: primary
//! security API, then the honeypot-specific API, then a local bytecode
//! heuristic. Never fails: any unexpected breakage degrades to the optimistic
//! local fallback with the error recorded.
//!
//! Solana tokens are exempt from assessment entirely and return a
//! not-assessed verdict immediately.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::{Chain, RiskAssessment, RiskSource};
use crate::ports::risk::{ContractCodeProvider, RiskDataSource, RiskPort};

/// Walks risk data sources in order, falling back to bytecode presence.
pub struct ChainedRiskAssessor {
    sources: Vec<Arc<dyn RiskDataSource>>,
    code_provider: Arc<dyn ContractCodeProvider>,
}

impl ChainedRiskAssessor {
    /// Assessor with an explicit source chain (first entry tried first)
    pub fn new(
        sources: Vec<Arc<dyn RiskDataSource>>,
        code_provider: Arc<dyn ContractCodeProvider>,
    ) -> Self {
        Self {
            sources,
            code_provider,
        }
    }

    async fn local_fallback(&self, chain: Chain, address: &str) -> RiskAssessment {
        match self.code_provider.get_code(chain, address).await {
            Ok(code) if code.is_empty() => {
                RiskAssessment::max_risk(RiskSource::LocalFallback, "no contract code")
            }
            Ok(_) => RiskAssessment::safe(RiskSource::LocalFallback),
            Err(e) => {
                // Even the heuristic failed; stay optimistic but say why
                warn!(%chain, address, error = %e, "bytecode lookup failed");
                let mut verdict = RiskAssessment::safe(RiskSource::LocalFallback);
                verdict.error = Some(e.to_string());
                verdict
            }
        }
    }
}

#[async_trait]
impl RiskPort for ChainedRiskAssessor {
    async fn assess(&self, chain: Chain, address: &str) -> RiskAssessment {
        if !chain.is_evm() {
            return RiskAssessment::not_assessed();
        }

        for source in &self.sources {
            match source.try_assess(chain, address).await {
                Ok(verdict) => {
                    debug!(%chain, address, source = ?source.source(), "risk verdict obtained");
                    return verdict;
                }
                Err(e) => {
                    debug!(%chain, address, source = ?source.source(), error = %e,
                        "risk source failed, trying next");
                }
            }
        }

        self.local_fallback(chain, address).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mocks::{MockCodeProvider, MockRiskSource};

    const ADDR: &str = "0x1234000000000000000000000000000000000001";

    fn secondary_verdict() -> RiskAssessment {
        RiskAssessment {
            is_risky: false,
            buy_tax_pct: 1.0,
            sell_tax_pct: 2.0,
            buyable: true,
            sellable: true,
            error: None,
            source: RiskSource::Secondary,
        }
    }

    #[tokio::test]
    async fn primary_success_stops_the_chain() {
        let primary = Arc::new(MockRiskSource::succeeding(
            RiskSource::Primary,
            RiskAssessment::safe(RiskSource::Primary),
        ));
        let secondary = Arc::new(MockRiskSource::succeeding(
            RiskSource::Secondary,
            secondary_verdict(),
        ));
        let sources: Vec<Arc<dyn RiskDataSource>> = vec![primary.clone(), secondary.clone()];
        let assessor = ChainedRiskAssessor::new(sources, Arc::new(MockCodeProvider::new()));

        let verdict = assessor.assess(Chain::Ethereum, ADDR).await;
        assert_eq!(verdict.source, RiskSource::Primary);
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn primary_failure_falls_through_to_secondary() {
        let primary = Arc::new(MockRiskSource::failing(RiskSource::Primary));
        let secondary = Arc::new(MockRiskSource::succeeding(
            RiskSource::Secondary,
            secondary_verdict(),
        ));
        let sources: Vec<Arc<dyn RiskDataSource>> = vec![primary.clone(), secondary.clone()];
        let assessor = ChainedRiskAssessor::new(sources, Arc::new(MockCodeProvider::new()));

        let verdict = assessor.assess(Chain::Bsc, ADDR).await;
        assert_eq!(verdict.source, RiskSource::Secondary);
        assert_eq!(verdict.sell_tax_pct, 2.0);
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn all_sources_failing_uses_bytecode_heuristic() {
        let sources: Vec<Arc<dyn RiskDataSource>> = vec![
            Arc::new(MockRiskSource::failing(RiskSource::Primary)),
            Arc::new(MockRiskSource::failing(RiskSource::Secondary)),
        ];

        // No bytecode at the address: maximally risky
        let assessor = ChainedRiskAssessor::new(sources.clone(), Arc::new(MockCodeProvider::new()));
        let verdict = assessor.assess(Chain::Ethereum, ADDR).await;
        assert_eq!(verdict.source, RiskSource::LocalFallback);
        assert!(verdict.is_risky);
        assert_eq!(verdict.buy_tax_pct, 100.0);
        assert_eq!(verdict.error.as_deref(), Some("no contract code"));

        // Bytecode present: optimistic
        let assessor = ChainedRiskAssessor::new(
            sources,
            Arc::new(MockCodeProvider::new().with_code(Chain::Ethereum, ADDR, vec![0x60, 0x80])),
        );
        let verdict = assessor.assess(Chain::Ethereum, ADDR).await;
        assert_eq!(verdict.source, RiskSource::LocalFallback);
        assert!(!verdict.is_risky);
        assert!(verdict.error.is_none());
    }

    #[tokio::test]
    async fn code_lookup_failure_degrades_optimistically() {
        let assessor = ChainedRiskAssessor::new(
            vec![Arc::new(MockRiskSource::failing(RiskSource::Primary))],
            Arc::new(MockCodeProvider::failing()),
        );

        let verdict = assessor.assess(Chain::Ethereum, ADDR).await;
        assert_eq!(verdict.source, RiskSource::LocalFallback);
        assert!(!verdict.is_risky);
        assert!(verdict.error.is_some());
    }

    #[tokio::test]
    async fn solana_is_exempt() {
        let primary = Arc::new(MockRiskSource::succeeding(
            RiskSource::Primary,
            RiskAssessment::safe(RiskSource::Primary),
        ));
        let sources: Vec<Arc<dyn RiskDataSource>> = vec![primary.clone()];
        let assessor = ChainedRiskAssessor::new(sources, Arc::new(MockCodeProvider::new()));

        let verdict = assessor
            .assess(Chain::Solana, "Mint111111111111111111111111111111111111111")
            .await;
        assert_eq!(verdict.source, RiskSource::NotAssessed);
        assert_eq!(primary.calls(), 0);
    }
}
