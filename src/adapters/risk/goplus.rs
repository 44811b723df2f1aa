//! GoPlus Token Security Source
//!
//! Primary risk provider. Queries the GoPlus token_security endpoint by
//! numeric chain id and contract address; taxes come back as fractional
//! strings ("0.05" = 5%).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::domain::{Chain, RiskAssessment, RiskSource};
use crate::ports::risk::{RiskDataSource, RiskError};

/// Default GoPlus API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.gopluslabs.io";

/// Sell tax at or above this percent is treated as a honeypot in practice
const PUNITIVE_SELL_TAX_PCT: f64 = 50.0;

/// GoPlus token-security data source
pub struct GoPlusSource {
    base_url: String,
    http: Client,
}

impl GoPlusSource {
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

    /// Parse the per-address security payload into a verdict.
    pub(crate) fn parse_response(body: &Value, address: &str) -> Result<RiskAssessment, RiskError> {
        if body.get("code").and_then(Value::as_i64) != Some(1) {
            return Err(RiskError::MalformedResponse(format!(
                "unexpected code: {:?}",
                body.get("code")
            )));
        }

        let entry = body
            .get("result")
            .and_then(|r| r.get(address.to_ascii_lowercase()))
            .ok_or_else(|| {
                RiskError::MalformedResponse(format!("no result entry for {}", address))
            })?;

        let flag = |key: &str| entry.get(key).and_then(Value::as_str) == Some("1");
        let tax_pct = |key: &str| -> f64 {
            entry
                .get(key)
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<f64>().ok())
                .map(|fraction| fraction * 100.0)
                .unwrap_or(0.0)
        };

        let buy_tax_pct = tax_pct("buy_tax");
        let sell_tax_pct = tax_pct("sell_tax");
        let is_honeypot = flag("is_honeypot");
        let cannot_buy = flag("cannot_buy");
        let cannot_sell = flag("cannot_sell_all");

        Ok(RiskAssessment {
            is_risky: is_honeypot || cannot_buy || cannot_sell
                || sell_tax_pct >= PUNITIVE_SELL_TAX_PCT,
            buy_tax_pct,
            sell_tax_pct,
            buyable: !cannot_buy,
            sellable: !cannot_sell && !is_honeypot,
            error: None,
            source: RiskSource::Primary,
        })
    }
}

#[async_trait]
impl RiskDataSource for GoPlusSource {
    fn source(&self) -> RiskSource {
        RiskSource::Primary
    }

    async fn try_assess(&self, chain: Chain, address: &str) -> Result<RiskAssessment, RiskError> {
        let chain_id = chain
            .evm_chain_id()
            .ok_or(RiskError::UnsupportedChain(chain))?;

        let url = format!(
            "{}/api/v1/token_security/{}?contract_addresses={}",
            self.base_url, chain_id, address
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

        Self::parse_response(&body, address)
    }
}
