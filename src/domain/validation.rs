//! Validation Engine
//!
//! Decides whether an enriched token record should be surfaced to consumers.
//! Two stages: a fast synchronous stage (blacklists, symbol/name heuristics,
//! length bounds) and an age-window stage applied to EVM chains only.
//!
//! Solana records deliberately bypass the quality filters entirely; only an
//! address-shape check gates emission there. That asymmetry is a product
//! decision inherited from the original scanner, not an oversight; see the
//! tests at the bottom of this file before "fixing" it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::token::{Chain, TokenRecord};

/// Default age ceiling applied when no explicit window is configured (7 days)
pub const DEFAULT_MAX_AGE_SECS: u64 = 604_800;

/// Symbol length bounds
const SYMBOL_MIN_LEN: usize = 1;
const SYMBOL_MAX_LEN: usize = 50;
/// Name length bounds
const NAME_MIN_LEN: usize = 1;
const NAME_MAX_LEN: usize = 100;

/// Minimum plausible length for a Solana mint address
const SOLANA_ADDRESS_MIN_LEN: usize = 32;

/// Stablecoin / major-token addresses excluded per chain
const ETH_STABLECOIN_ADDRESSES: &[&str] = &[
    "0xdac17f958d2ee523a2206206994597c13d831ec7", // USDT
    "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", // USDC
    "0x6b175474e89094c44da98b954eedeac495271d0f", // DAI
    "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", // WETH
];

const BSC_STABLECOIN_ADDRESSES: &[&str] = &[
    "0x55d398326f99059ff775485246999027b3197955", // USDT
    "0xe9e7cea3dedca5984780bafc599bd69add087d56", // BUSD
    "0x8ac76a51cc950d9822d68b83fe1ad97b32cd580d", // USDC
    "0xbb4cdb9cbd36b01bd1cbaef60af814a3f6f0ee75", // WBNB
];

const SOL_STABLECOIN_ADDRESSES: &[&str] = &[
    "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", // USDC
    "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB", // USDT
    "So11111111111111111111111111111111111111112",  // wSOL
];

/// Symbols never worth sniping (majors and stables)
const EXCLUDED_SYMBOLS: &[&str] = &[
    "usdt", "usdc", "busd", "dai", "tusd", "frax", "weth", "wbtc", "wbnb",
    "sol", "eth", "btc", "bnb",
];

/// Name/symbol patterns typical of throwaway or scam deployments
const SUSPICIOUS_PATTERNS: &[&str] = &[
    "test", "fake", "scam", "rug", "honeypot", "clone", "demo", "copy", "beta",
];

/// Per-consumer validation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationCriteria {
    /// Minimum pool liquidity in USD
    pub min_liquidity_usd: f64,
    /// Minimum 24-hour volume in USD
    pub min_volume_24h_usd: f64,
    /// Maximum pool age in seconds for `meets_threshold`
    pub max_age_secs: Option<u64>,
    /// Whether a priced market-data record is required by `meets_threshold`
    pub require_market_data: bool,
    /// Whether to fire the honeypot risk assessor on detection
    pub enable_honeypot_detection: bool,
    /// Whether to reject stablecoin / major-token addresses
    pub exclude_stablecoins: bool,
    /// Minimum pool age in seconds (EVM chains only)
    pub min_token_age_secs: Option<u64>,
    /// Maximum pool age in seconds for the emission age window
    pub max_token_age_secs: Option<u64>,
}

impl Default for ValidationCriteria {
    fn default() -> Self {
        Self {
            min_liquidity_usd: 1_000.0,
            min_volume_24h_usd: 100.0,
            max_age_secs: None,
            require_market_data: true,
            enable_honeypot_detection: false,
            exclude_stablecoins: true,
            min_token_age_secs: None,
            max_token_age_secs: None,
        }
    }
}

/// Partial criteria update merged into the live criteria
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CriteriaUpdate {
    pub min_liquidity_usd: Option<f64>,
    pub min_volume_24h_usd: Option<f64>,
    pub max_age_secs: Option<u64>,
    pub require_market_data: Option<bool>,
    pub enable_honeypot_detection: Option<bool>,
    pub exclude_stablecoins: Option<bool>,
    pub min_token_age_secs: Option<u64>,
    pub max_token_age_secs: Option<u64>,
}

impl ValidationCriteria {
    /// Merge set fields of an update into this criteria object.
    ///
    /// Applies to subsequent detections only; in-flight evaluations keep the
    /// snapshot they started with.
    pub fn apply(&mut self, update: &CriteriaUpdate) {
        if let Some(v) = update.min_liquidity_usd {
            self.min_liquidity_usd = v;
        }
        if let Some(v) = update.min_volume_24h_usd {
            self.min_volume_24h_usd = v;
        }
        if let Some(v) = update.max_age_secs {
            self.max_age_secs = Some(v);
        }
        if let Some(v) = update.require_market_data {
            self.require_market_data = v;
        }
        if let Some(v) = update.enable_honeypot_detection {
            self.enable_honeypot_detection = v;
        }
        if let Some(v) = update.exclude_stablecoins {
            self.exclude_stablecoins = v;
        }
        if let Some(v) = update.min_token_age_secs {
            self.min_token_age_secs = Some(v);
        }
        if let Some(v) = update.max_token_age_secs {
            self.max_token_age_secs = Some(v);
        }
    }
}

/// Why a record was rejected by the fast validation stage
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("address is a stablecoin or major token")]
    StablecoinAddress,
    #[error("symbol '{0}' is an excluded major/stable symbol")]
    ExcludedSymbol(String),
    #[error("{field} '{value}' matches suspicious pattern '{pattern}'")]
    SuspiciousPattern {
        field: &'static str,
        value: String,
        pattern: &'static str,
    },
    #[error("symbol length {0} outside [{SYMBOL_MIN_LEN},{SYMBOL_MAX_LEN}]")]
    SymbolLength(usize),
    #[error("name length {0} outside [{NAME_MIN_LEN},{NAME_MAX_LEN}]")]
    NameLength(usize),
}

/// Stablecoin blacklist for a chain
fn stablecoin_addresses(chain: Chain) -> &'static [&'static str] {
    match chain {
        Chain::Ethereum => ETH_STABLECOIN_ADDRESSES,
        Chain::Bsc => BSC_STABLECOIN_ADDRESSES,
        Chain::Solana => SOL_STABLECOIN_ADDRESSES,
    }
}

/// Whether the address matches the chain's stablecoin blacklist.
/// EVM addresses compare case-insensitively; Solana addresses are
/// case-sensitive base58.
fn is_blacklisted_address(chain: Chain, address: &str) -> bool {
    if chain.is_evm() {
        let lowered = address.to_ascii_lowercase();
        stablecoin_addresses(chain).contains(&lowered.as_str())
    } else {
        stablecoin_addresses(chain).contains(&address)
    }
}

/// Suspicious-pattern match: exact, or prefix with total length within 3
/// characters of the pattern length.
fn matches_suspicious_pattern(value: &str) -> Option<&'static str> {
    let lowered = value.to_ascii_lowercase();
    for pattern in SUSPICIOUS_PATTERNS {
        if lowered == *pattern {
            return Some(pattern);
        }
        if lowered.starts_with(pattern) && lowered.len() <= pattern.len() + 3 {
            return Some(pattern);
        }
    }
    None
}

/// Fast synchronous validation stage.
///
/// First failing check short-circuits with its reason.
pub fn quick_validate(record: &TokenRecord, criteria: &ValidationCriteria) -> Result<(), Rejection> {
    if criteria.exclude_stablecoins && is_blacklisted_address(record.chain, &record.address) {
        return Err(Rejection::StablecoinAddress);
    }

    let symbol_lower = record.symbol.to_ascii_lowercase();
    if EXCLUDED_SYMBOLS.contains(&symbol_lower.as_str()) {
        return Err(Rejection::ExcludedSymbol(record.symbol.clone()));
    }

    if let Some(pattern) = matches_suspicious_pattern(&record.symbol) {
        return Err(Rejection::SuspiciousPattern {
            field: "symbol",
            value: record.symbol.clone(),
            pattern,
        });
    }
    if let Some(pattern) = matches_suspicious_pattern(&record.name) {
        return Err(Rejection::SuspiciousPattern {
            field: "name",
            value: record.name.clone(),
            pattern,
        });
    }

    let symbol_len = record.symbol.chars().count();
    if !(SYMBOL_MIN_LEN..=SYMBOL_MAX_LEN).contains(&symbol_len) {
        return Err(Rejection::SymbolLength(symbol_len));
    }
    let name_len = record.name.chars().count();
    if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&name_len) {
        return Err(Rejection::NameLength(name_len));
    }

    Ok(())
}

/// Age-window stage.
///
/// Solana pools are sniped immediately and are exempt from the minimum bound.
/// With neither bound configured, a 7-day ceiling guards against stale pools.
pub fn is_fresh_enough(record: &TokenRecord, criteria: &ValidationCriteria) -> bool {
    if record.chain != Chain::Solana {
        if let Some(min_age) = criteria.min_token_age_secs {
            if record.age_seconds < min_age {
                return false;
            }
        }
    }

    if let Some(max_age) = criteria.max_token_age_secs {
        if record.age_seconds > max_age {
            return false;
        }
    }

    if criteria.min_token_age_secs.is_none()
        && criteria.max_token_age_secs.is_none()
        && record.age_seconds > DEFAULT_MAX_AGE_SECS
    {
        return false;
    }

    true
}

/// Consumer-facing threshold check used by downstream trading logic.
pub fn meets_threshold(record: &TokenRecord, criteria: &ValidationCriteria) -> bool {
    if record.liquidity_usd < criteria.min_liquidity_usd {
        return false;
    }
    if record.volume_24h_usd < criteria.min_volume_24h_usd {
        return false;
    }
    if let Some(max_age) = criteria.max_age_secs {
        if record.age_seconds > max_age {
            return false;
        }
    }
    if criteria.require_market_data && record.price_usd <= 0.0 {
        return false;
    }
    true
}

/// Minimal shape check gating Solana emission.
pub fn valid_solana_address(address: &str) -> bool {
    if address.is_empty() || address.len() < SOLANA_ADDRESS_MIN_LEN {
        return false;
    }
    bs58::decode(address).into_vec().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(chain: Chain, symbol: &str, name: &str) -> TokenRecord {
        TokenRecord {
            chain,
            address: "0x1111111111111111111111111111111111111111".to_string(),
            pair_address: "0x2222222222222222222222222222222222222222".to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
            price_usd: 0.001,
            liquidity_usd: 5_000.0,
            volume_24h_usd: 1_000.0,
            age: "2m 0s".to_string(),
            age_seconds: 120,
            url: "https://dexscreener.com/ethereum/0x2222".to_string(),
            detected_at: Utc::now(),
            criteria: ValidationCriteria::default(),
            risk: None,
        }
    }

    #[test]
    fn accepts_ordinary_token() {
        let r = record(Chain::Ethereum, "PEPE2", "Pepe Two");
        assert!(quick_validate(&r, &ValidationCriteria::default()).is_ok());
    }

    #[test]
    fn rejects_blacklisted_stablecoin_address() {
        let mut r = record(Chain::Ethereum, "XYZ", "Some Token");
        // USDT, deliberately mixed-case to prove the compare is case-insensitive
        r.address = "0xdAC17F958D2ee523a2206206994597C13D831ec7".to_string();
        assert_eq!(
            quick_validate(&r, &ValidationCriteria::default()),
            Err(Rejection::StablecoinAddress)
        );

        // With exclusion explicitly off the address passes
        let criteria = ValidationCriteria {
            exclude_stablecoins: false,
            ..Default::default()
        };
        assert!(quick_validate(&r, &criteria).is_ok());
    }

    #[test]
    fn rejects_excluded_symbol_case_insensitively() {
        let r = record(Chain::Bsc, "uSdC", "Definitely Not A Stable");
        assert!(matches!(
            quick_validate(&r, &ValidationCriteria::default()),
            Err(Rejection::ExcludedSymbol(_))
        ));
    }

    #[test]
    fn rejects_suspicious_symbol_exact_and_near_prefix() {
        let r = record(Chain::Ethereum, "test", "Great Token");
        assert!(matches!(
            quick_validate(&r, &ValidationCriteria::default()),
            Err(Rejection::SuspiciousPattern { field: "symbol", .. })
        ));

        // Prefix within 3 chars of the pattern length: "rugme" (5) vs "rug" (3)
        let r = record(Chain::Ethereum, "rugme", "Great Token");
        assert!(quick_validate(&r, &ValidationCriteria::default()).is_err());

        // Prefix but too long to count as a near-match: "testament" (9)
        let r = record(Chain::Ethereum, "testament", "Great Token");
        assert!(quick_validate(&r, &ValidationCriteria::default()).is_ok());
    }

    #[test]
    fn rejects_suspicious_name() {
        let r = record(Chain::Bsc, "GOODCOIN", "honeypot");
        assert!(matches!(
            quick_validate(&r, &ValidationCriteria::default()),
            Err(Rejection::SuspiciousPattern { field: "name", .. })
        ));
    }

    #[test]
    fn symbol_length_boundaries() {
        let criteria = ValidationCriteria::default();

        let r = record(Chain::Ethereum, "", "Valid Name");
        assert_eq!(quick_validate(&r, &criteria), Err(Rejection::SymbolLength(0)));

        let r = record(Chain::Ethereum, &"Z".repeat(51), "Valid Name");
        assert_eq!(quick_validate(&r, &criteria), Err(Rejection::SymbolLength(51)));

        let r = record(Chain::Ethereum, "Z", "Valid Name");
        assert!(quick_validate(&r, &criteria).is_ok());

        let r = record(Chain::Ethereum, &"Z".repeat(50), "Valid Name");
        assert!(quick_validate(&r, &criteria).is_ok());
    }

    #[test]
    fn name_length_boundaries() {
        let criteria = ValidationCriteria::default();

        let r = record(Chain::Ethereum, "OK", "");
        assert_eq!(quick_validate(&r, &criteria), Err(Rejection::NameLength(0)));

        let r = record(Chain::Ethereum, "OK", &"N".repeat(101));
        assert_eq!(quick_validate(&r, &criteria), Err(Rejection::NameLength(101)));

        let r = record(Chain::Ethereum, "OK", &"N".repeat(100));
        assert!(quick_validate(&r, &criteria).is_ok());
    }

    #[test]
    fn age_window_enforced_for_evm() {
        let criteria = ValidationCriteria {
            min_token_age_secs: Some(30),
            max_token_age_secs: Some(604_800),
            ..Default::default()
        };

        let mut r = record(Chain::Ethereum, "NEW", "New Token");
        r.age_seconds = 29;
        assert!(!is_fresh_enough(&r, &criteria));

        r.age_seconds = 30;
        assert!(is_fresh_enough(&r, &criteria));

        r.age_seconds = 604_801;
        assert!(!is_fresh_enough(&r, &criteria));
    }

    #[test]
    fn solana_exempt_from_minimum_age() {
        let criteria = ValidationCriteria {
            min_token_age_secs: Some(30),
            max_token_age_secs: Some(604_800),
            ..Default::default()
        };

        let mut r = record(Chain::Solana, "NEW", "New Token");
        r.age_seconds = 0;
        assert!(is_fresh_enough(&r, &criteria));

        // The maximum still applies
        r.age_seconds = 604_801;
        assert!(!is_fresh_enough(&r, &criteria));
    }

    #[test]
    fn default_seven_day_ceiling_when_no_window_set() {
        let criteria = ValidationCriteria::default();

        let mut r = record(Chain::Bsc, "OLD", "Old Token");
        r.age_seconds = DEFAULT_MAX_AGE_SECS;
        assert!(is_fresh_enough(&r, &criteria));

        r.age_seconds = DEFAULT_MAX_AGE_SECS + 1;
        assert!(!is_fresh_enough(&r, &criteria));
    }

    #[test]
    fn meets_threshold_checks_liquidity_volume_age_price() {
        let criteria = ValidationCriteria {
            min_liquidity_usd: 1_000.0,
            min_volume_24h_usd: 500.0,
            max_age_secs: Some(3_600),
            require_market_data: true,
            ..Default::default()
        };

        let mut r = record(Chain::Ethereum, "OK", "Ok Token");
        r.liquidity_usd = 5_000.0;
        r.volume_24h_usd = 1_000.0;
        r.age_seconds = 120;
        assert!(meets_threshold(&r, &criteria));

        r.liquidity_usd = 999.0;
        assert!(!meets_threshold(&r, &criteria));
        r.liquidity_usd = 5_000.0;

        r.volume_24h_usd = 499.0;
        assert!(!meets_threshold(&r, &criteria));
        r.volume_24h_usd = 1_000.0;

        r.age_seconds = 3_601;
        assert!(!meets_threshold(&r, &criteria));
        r.age_seconds = 120;

        r.price_usd = 0.0;
        assert!(!meets_threshold(&r, &criteria));
    }

    #[test]
    fn solana_address_shape() {
        assert!(valid_solana_address(
            "So11111111111111111111111111111111111111112"
        ));
        assert!(!valid_solana_address(""));
        assert!(!valid_solana_address("tooShort111111111111")); // length 20
        assert!(!valid_solana_address(&"0".repeat(40))); // '0' is not base58
    }

    #[test]
    fn criteria_update_merges_only_set_fields() {
        let mut criteria = ValidationCriteria::default();
        let update = CriteriaUpdate {
            min_liquidity_usd: Some(9_000.0),
            enable_honeypot_detection: Some(true),
            ..Default::default()
        };
        criteria.apply(&update);

        assert_eq!(criteria.min_liquidity_usd, 9_000.0);
        assert!(criteria.enable_honeypot_detection);
        // Untouched fields keep their defaults
        assert_eq!(criteria.min_volume_24h_usd, 100.0);
        assert!(criteria.exclude_stablecoins);
    }
}
