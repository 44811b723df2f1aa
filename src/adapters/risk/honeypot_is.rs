//! honeypot.is Source
//!
//! Secondary risk provider: a honeypot-specific simulation API queried by
//! address + chain id. Taxes come back as percentages.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::domain::{Chain, RiskAssessment, RiskSource};
use crate::ports::risk::{RiskDataSource, RiskError};

/// Default honeypot.is API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.honeypot.is";

/// honeypot.is data source
pub struct HoneypotIsSource {
    base_url: String,
    http: Client,
}

impl HoneypotIsSource {
    pub fn new(timeout: Duration) -> Result<Self, RiskError> {
        Self::with_base_url(DEFAULT_BASE_URL.to_string(), timeout)
    }

    pub fn with_base_url(base_url: String, timeout: Duration) -> Result<Self, RiskError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RiskError::HttpError(e.to_string()))?;
        Ok(Self { base_url, http })
    }

    pub(crate) fn parse_response(body: &Value) -> Result<RiskAssessment, RiskError> {
        let honeypot_result = body
            .get("honeypotResult")
            .ok_or_else(|| RiskError::MalformedResponse("missing honeypotResult".to_string()))?;
        let is_honeypot = honeypot_result
            .get("isHoneypot")
            .and_then(Value::as_bool)
            .ok_or_else(|| RiskError::MalformedResponse("missing isHoneypot".to_string()))?;

        let simulation = body.get("simulationResult");
        let tax = |key: &str| -> f64 {
            simulation
                .and_then(|s| s.get(key))
                .and_then(Value::as_f64)
                .unwrap_or(0.0)
        };
        let simulation_ok = body
            .get("simulationSuccess")
            .and_then(Value::as_bool)
            .unwrap_or(true);

        Ok(RiskAssessment {
            is_risky: is_honeypot || !simulation_ok,
            buy_tax_pct: tax("buyTax"),
            sell_tax_pct: tax("sellTax"),
            buyable: simulation_ok,
            sellable: simulation_ok && !is_honeypot,
            error: None,
            source: RiskSource::Secondary,
        })
    }
}

#[async_trait]
impl RiskDataSource for HoneypotIsSource {
    fn source(&self) -> RiskSource {
        RiskSource::Secondary
    }

    async fn try_assess(&self, chain: Chain, address: &str) -> Result<RiskAssessment, RiskError> {
        let chain_id = chain
            .evm_chain_id()
            .ok_or(RiskError::UnsupportedChain(chain))?;

        let url = format!(
            "{}/v2/IsHoneypot?address={}&chainID={}",
            self.base_url, address, chain_id
        );

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| RiskError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RiskError::BadStatus(response.status().as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RiskError::MalformedResponse(e.to_string()))?;

        Self::parse_response(&body)
    }
}
