//! Core Token Types
//!
//! Shared types for the detection pipeline: supported chains, the enriched
//! token record emitted to consumers, and the honeypot risk verdict.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::ValidationCriteria;

/// Supported blockchains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Ethereum,
    Bsc,
    Solana,
}

impl Chain {
    /// Whether this chain uses the EVM execution model
    pub fn is_evm(&self) -> bool {
        matches!(self, Chain::Ethereum | Chain::Bsc)
    }

    /// Numeric EVM chain id (None for Solana)
    pub fn evm_chain_id(&self) -> Option<u64> {
        match self {
            Chain::Ethereum => Some(1),
            Chain::Bsc => Some(56),
            Chain::Solana => None,
        }
    }

    /// Chain slug used by the DexScreener API
    pub fn dexscreener_slug(&self) -> &'static str {
        match self {
            Chain::Ethereum => "ethereum",
            Chain::Bsc => "bsc",
            Chain::Solana => "solana",
        }
    }

    /// All supported chains
    pub fn all() -> [Chain; 3] {
        [Chain::Ethereum, Chain::Bsc, Chain::Solana]
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chain::Ethereum => write!(f, "ethereum"),
            Chain::Bsc => write!(f, "bsc"),
            Chain::Solana => write!(f, "solana"),
        }
    }
}

impl FromStr for Chain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "eth" | "ethereum" => Ok(Chain::Ethereum),
            "bsc" | "bnb" => Ok(Chain::Bsc),
            "sol" | "solana" => Ok(Chain::Solana),
            other => Err(format!("unknown chain: {}", other)),
        }
    }
}

/// Which risk data provider produced a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskSource {
    /// Primary token-security API (GoPlus)
    Primary,
    /// Secondary honeypot-specific API (honeypot.is)
    Secondary,
    /// Local bytecode heuristic
    LocalFallback,
    /// Chain exempt from assessment (Solana)
    NotAssessed,
}

/// Honeypot / tax verdict for a token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Whether the token looks like a honeypot or carries punitive taxes
    pub is_risky: bool,
    /// Buy tax percent (0-100)
    pub buy_tax_pct: f64,
    /// Sell tax percent (0-100)
    pub sell_tax_pct: f64,
    /// Whether buying appears possible
    pub buyable: bool,
    /// Whether selling appears possible
    pub sellable: bool,
    /// Error encountered while assessing, if any
    pub error: Option<String>,
    /// Provider that produced this verdict
    pub source: RiskSource,
}

impl RiskAssessment {
    /// Optimistic verdict: tradeable, no taxes
    pub fn safe(source: RiskSource) -> Self {
        Self {
            is_risky: false,
            buy_tax_pct: 0.0,
            sell_tax_pct: 0.0,
            buyable: true,
            sellable: true,
            error: None,
            source,
        }
    }

    /// Maximally risky verdict: 100% taxes, not tradeable
    pub fn max_risk(source: RiskSource, error: impl Into<String>) -> Self {
        Self {
            is_risky: true,
            buy_tax_pct: 100.0,
            sell_tax_pct: 100.0,
            buyable: false,
            sellable: false,
            error: Some(error.into()),
            source,
        }
    }

    /// Verdict for chains exempt from assessment
    pub fn not_assessed() -> Self {
        Self::safe(RiskSource::NotAssessed)
    }
}

/// Enriched, decision-ready token record
///
/// Created once per unique (chain, address) pair and never mutated after
/// emission. A late honeypot verdict arrives as a separate event rather than
/// by mutating the emitted record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Chain the pool was created on
    pub chain: Chain,
    /// Token contract / mint address
    pub address: String,
    /// Trading pair (pool) address
    pub pair_address: String,
    /// Token symbol
    pub symbol: String,
    /// Token name
    pub name: String,
    /// Price in USD
    pub price_usd: f64,
    /// Liquidity in USD
    pub liquidity_usd: f64,
    /// 24-hour volume in USD
    pub volume_24h_usd: f64,
    /// Human-readable pool age, e.g. "2d 3h 14m 9s"
    pub age: String,
    /// Pool age in seconds
    pub age_seconds: u64,
    /// DexScreener page for the pair
    pub url: String,
    /// When the scanner emitted this record
    pub detected_at: DateTime<Utc>,
    /// Criteria snapshot this record was validated against
    pub criteria: ValidationCriteria,
    /// Honeypot verdict, if one had already resolved at emission time
    pub risk: Option<RiskAssessment>,
}
