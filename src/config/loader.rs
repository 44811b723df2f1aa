//! TOML configuration loading and validation

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::adapters::dexscreener::DexScreenerConfig;
use crate::adapters::evm::EvmChainSpec;
use crate::adapters::solana::{SolanaWatcherConfig, RAYDIUM_AMM_V4};
use crate::application::ScannerConfig;
use crate::domain::{Chain, CriteriaUpdate, ValidationCriteria};

/// Config file searched in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "tokenscout.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration, one section per subsystem
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub scanner: ScannerSection,
    /// Partial criteria overrides merged onto the defaults
    pub criteria: CriteriaUpdate,
    pub dexscreener: DexScreenerSection,
    pub risk: RiskSection,
    pub chains: ChainsSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScannerSection {
    /// Chains watched by default (CLI --chains overrides)
    pub chains: Vec<String>,
    /// Seconds to wait before enriching an EVM candidate
    pub indexing_delay_secs: u64,
    /// Solana enrichment retry budget
    pub solana_enrich_attempts: u32,
    /// Seconds between Solana enrichment attempts
    pub solana_enrich_backoff_secs: u64,
    /// Candidate channel capacity
    pub candidate_capacity: usize,
}

impl Default for ScannerSection {
    fn default() -> Self {
        Self {
            // Only solana has usable built-in endpoints; EVM chains need a
            // configured ws_url before they can be enabled
            chains: vec!["solana".to_string()],
            indexing_delay_secs: 60,
            solana_enrich_attempts: 10,
            solana_enrich_backoff_secs: 3,
            candidate_capacity: 256,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DexScreenerSection {
    pub base_url: String,
    pub timeout_secs: u64,
    pub cache_ttl_secs: u64,
}

impl Default for DexScreenerSection {
    fn default() -> Self {
        let defaults = DexScreenerConfig::default();
        Self {
            base_url: defaults.base_url,
            timeout_secs: defaults.timeout.as_secs(),
            cache_ttl_secs: defaults.cache_ttl.as_secs(),
        }
    }
}

impl DexScreenerSection {
    pub fn to_client_config(&self) -> DexScreenerConfig {
        DexScreenerConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RiskSection {
    /// Per-request timeout for security providers
    pub timeout_secs: u64,
    /// Override for the GoPlus base URL
    pub goplus_base_url: Option<String>,
    /// Override for the honeypot.is base URL
    pub honeypot_base_url: Option<String>,
}

impl Default for RiskSection {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            goplus_base_url: None,
            honeypot_base_url: None,
        }
    }
}

impl RiskSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChainsSection {
    pub ethereum: Option<EvmChainSection>,
    pub bsc: Option<EvmChainSection>,
    pub solana: Option<SolanaChainSection>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvmChainSection {
    /// WebSocket RPC endpoint
    pub ws_url: String,
    /// DEX factory override
    #[serde(default)]
    pub factory: Option<String>,
    /// Wrapped-native override
    #[serde(default)]
    pub wrapped_native: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolanaChainSection {
    pub rpc_url: String,
    pub fallback_rpc_url: Option<String>,
    pub ws_url: String,
    pub program_id: String,
    pub collect_ms: u64,
    pub drain_ms: u64,
    pub queue_capacity: usize,
}

impl Default for SolanaChainSection {
    fn default() -> Self {
        let defaults = SolanaWatcherConfig::default();
        Self {
            rpc_url: defaults.rpc_url,
            fallback_rpc_url: None,
            ws_url: defaults.ws_url,
            program_id: RAYDIUM_AMM_V4.to_string(),
            collect_ms: defaults.collect_duration.as_millis() as u64,
            drain_ms: defaults.drain_duration.as_millis() as u64,
            queue_capacity: defaults.queue_capacity,
        }
    }
}

impl SolanaChainSection {
    pub fn to_watcher_config(&self) -> SolanaWatcherConfig {
        SolanaWatcherConfig {
            rpc_url: self.rpc_url.clone(),
            fallback_rpc_url: self.fallback_rpc_url.clone(),
            ws_url: self.ws_url.clone(),
            program_id: self.program_id.clone(),
            collect_duration: Duration::from_millis(self.collect_ms),
            drain_duration: Duration::from_millis(self.drain_ms),
            queue_capacity: self.queue_capacity,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    /// Default tracing filter, overridable with RUST_LOG
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist; otherwise `tokenscout.toml` in the
    /// working directory is used when present, and built-in defaults when
    /// not. Endpoint environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                info!(path = %path.display(), "loading config file");
                let raw = std::fs::read_to_string(path)?;
                toml::from_str(&raw)?
            }
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    info!(path = DEFAULT_CONFIG_FILE, "loading config file");
                    let raw = std::fs::read_to_string(default)?;
                    toml::from_str(&raw)?
                } else {
                    debug!("no config file, using built-in defaults");
                    Config::default()
                }
            }
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Endpoint overrides from the environment (set via .env or the shell):
    /// ETH_WS_URL, BSC_WS_URL, SOLANA_RPC_URL, SOLANA_WS_URL.
    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("ETH_WS_URL") {
            self.chains
                .ethereum
                .get_or_insert_with(|| EvmChainSection {
                    ws_url: String::new(),
                    factory: None,
                    wrapped_native: None,
                })
                .ws_url = url;
        }
        if let Ok(url) = std::env::var("BSC_WS_URL") {
            self.chains
                .bsc
                .get_or_insert_with(|| EvmChainSection {
                    ws_url: String::new(),
                    factory: None,
                    wrapped_native: None,
                })
                .ws_url = url;
        }
        if let Ok(url) = std::env::var("SOLANA_RPC_URL") {
            self.chains.solana.get_or_insert_with(Default::default).rpc_url = url;
        }
        if let Ok(url) = std::env::var("SOLANA_WS_URL") {
            self.chains.solana.get_or_insert_with(Default::default).ws_url = url;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dexscreener.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "dexscreener.timeout_secs must be positive".to_string(),
            ));
        }
        if self.risk.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "risk.timeout_secs must be positive".to_string(),
            ));
        }
        if self.scanner.candidate_capacity == 0 {
            return Err(ConfigError::Invalid(
                "scanner.candidate_capacity must be positive".to_string(),
            ));
        }

        if let (Some(min), Some(max)) =
            (self.criteria.min_token_age_secs, self.criteria.max_token_age_secs)
        {
            if min > max {
                return Err(ConfigError::Invalid(format!(
                    "criteria age window inverted: min {} > max {}",
                    min, max
                )));
            }
        }
        if let Some(liquidity) = self.criteria.min_liquidity_usd {
            if liquidity < 0.0 {
                return Err(ConfigError::Invalid(
                    "criteria.min_liquidity_usd must not be negative".to_string(),
                ));
            }
        }

        for chain in self.enabled_chains()? {
            let configured = match chain {
                Chain::Ethereum => self.chains.ethereum.is_some(),
                Chain::Bsc => self.chains.bsc.is_some(),
                Chain::Solana => true, // solana has usable built-in endpoints
            };
            if !configured {
                return Err(ConfigError::Invalid(format!(
                    "chain '{}' enabled but [chains.{}] is missing",
                    chain, chain
                )));
            }
        }

        if let Some(eth) = &self.chains.ethereum {
            if eth.ws_url.is_empty() {
                return Err(ConfigError::Invalid(
                    "chains.ethereum.ws_url must not be empty".to_string(),
                ));
            }
        }
        if let Some(bsc) = &self.chains.bsc {
            if bsc.ws_url.is_empty() {
                return Err(ConfigError::Invalid(
                    "chains.bsc.ws_url must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Chains the scanner section enables
    pub fn enabled_chains(&self) -> Result<Vec<Chain>, ConfigError> {
        self.scanner
            .chains
            .iter()
            .map(|name| {
                Chain::from_str(name)
                    .map_err(|_| ConfigError::Invalid(format!("unknown chain '{}'", name)))
            })
            .collect()
    }

    /// Effective validation criteria: defaults plus the [criteria] overrides
    pub fn criteria(&self) -> ValidationCriteria {
        let mut criteria = ValidationCriteria::default();
        criteria.apply(&self.criteria);
        criteria
    }

    /// Build the scanner configuration.
    ///
    /// Every configured `[chains.*]` section yields a spec, not just the
    /// chains in `[scanner].chains`: the enabled set only picks which chains
    /// start by default, and a `--chains` override may start any configured
    /// chain. Solana always gets a config since its defaults are usable.
    pub fn scanner_config(&self) -> Result<ScannerConfig, ConfigError> {
        let mut evm_specs = Vec::new();
        if let Some(section) = &self.chains.ethereum {
            evm_specs.push(evm_spec(Chain::Ethereum, section)?);
        }
        if let Some(section) = &self.chains.bsc {
            evm_specs.push(evm_spec(Chain::Bsc, section)?);
        }

        let solana = Some(
            self.chains
                .solana
                .clone()
                .unwrap_or_default()
                .to_watcher_config(),
        );

        Ok(ScannerConfig {
            evm_specs,
            solana,
            indexing_delay: Duration::from_secs(self.scanner.indexing_delay_secs),
            solana_enrich_attempts: self.scanner.solana_enrich_attempts,
            solana_enrich_backoff: Duration::from_secs(self.scanner.solana_enrich_backoff_secs),
            candidate_capacity: self.scanner.candidate_capacity,
            criteria: self.criteria(),
        })
    }
}

fn evm_spec(chain: Chain, section: &EvmChainSection) -> Result<EvmChainSpec, ConfigError> {
    EvmChainSpec::new(
        chain,
        section.ws_url.clone(),
        section.factory.as_deref(),
        section.wrapped_native.as_deref(),
    )
    .map_err(|e| ConfigError::Invalid(e.to_string()))
}
