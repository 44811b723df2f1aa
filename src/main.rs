//! TokenScout binary: wire the scanner up from configuration and stream
//! detections to the log until interrupted.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use tokenscout::adapters::dexscreener::DexScreenerClient;
use tokenscout::adapters::evm::EvmCodeProvider;
use tokenscout::adapters::risk::{ChainedRiskAssessor, GoPlusSource, HoneypotIsSource};
use tokenscout::application::{ScannerEvent, TokenScanner};
use tokenscout::config::Config;
use tokenscout::domain::Chain;
use tokenscout::ports::risk::RiskDataSource;

#[derive(Parser, Debug)]
#[command(name = "tokenscout", version, about = "Multi-chain new-token discovery scanner")]
struct Cli {
    /// Path to a TOML config file (default: tokenscout.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Chains to watch, comma separated (overrides the config file)
    #[arg(long, value_delimiter = ',')]
    chains: Vec<String>,

    /// Debug-level logging (RUST_LOG still takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(config_level: &str, verbose: bool) {
    let default_filter = if verbose { "debug" } else { config_level };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    init_logging(&config.logging.level, cli.verbose);
    info!("tokenscout {}", env!("CARGO_PKG_VERSION"));

    let chains: Vec<Chain> = if cli.chains.is_empty() {
        config.enabled_chains()?
    } else {
        cli.chains
            .iter()
            .map(|name| {
                Chain::from_str(name)
                    .map_err(|_| anyhow::anyhow!("unknown chain '{}' on --chains", name))
            })
            .collect::<Result<_>>()?
    };
    info!(?chains, "chains selected");

    let scanner_config = config.scanner_config()?;

    let market_data = Arc::new(
        DexScreenerClient::with_config(config.dexscreener.to_client_config())
            .context("building market-data client")?,
    );

    let risk_timeout = config.risk.timeout();
    let goplus = match &config.risk.goplus_base_url {
        Some(base) => GoPlusSource::with_base_url(base.clone(), risk_timeout),
        None => GoPlusSource::new(risk_timeout),
    }
    .context("building goplus source")?;
    let honeypot = match &config.risk.honeypot_base_url {
        Some(base) => HoneypotIsSource::with_base_url(base.clone(), risk_timeout),
        None => HoneypotIsSource::new(risk_timeout),
    }
    .context("building honeypot.is source")?;
    let sources: Vec<Arc<dyn RiskDataSource>> = vec![Arc::new(goplus), Arc::new(honeypot)];

    let endpoints: HashMap<Chain, String> = scanner_config
        .evm_specs
        .iter()
        .map(|spec| (spec.chain, spec.ws_url.clone()))
        .collect();
    let code_provider = Arc::new(EvmCodeProvider::new(endpoints));
    let risk = Arc::new(ChainedRiskAssessor::new(sources, code_provider));

    let (scanner, mut events) = TokenScanner::new(scanner_config, market_data, risk);

    scanner.initialize().await.context("scanner initialization")?;
    scanner
        .start_scanning(&chains)
        .await
        .context("starting scanner")?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, shutting down");
                break;
            }
            event = events.recv() => {
                match event {
                    Some(ScannerEvent::TokenDetected(token)) => {
                        info!(
                            chain = %token.chain,
                            symbol = %token.symbol,
                            address = %token.address,
                            price_usd = token.price_usd,
                            liquidity_usd = token.liquidity_usd,
                            age = %token.age,
                            url = %token.url,
                            "token detected"
                        );
                    }
                    Some(ScannerEvent::RiskAssessed { chain, address, assessment }) => {
                        if assessment.is_risky {
                            warn!(
                                %chain,
                                %address,
                                source = ?assessment.source,
                                buy_tax = assessment.buy_tax_pct,
                                sell_tax = assessment.sell_tax_pct,
                                error = ?assessment.error,
                                "token flagged as risky"
                            );
                        } else {
                            info!(%chain, %address, source = ?assessment.source, "risk check passed");
                        }
                    }
                    Some(ScannerEvent::WatcherError { chain, message }) => {
                        error!(?chain, %message, "watcher error");
                    }
                    None => {
                        warn!("event channel closed");
                        break;
                    }
                }
            }
        }
    }

    scanner.stop_scanning().await;
    info!("scanner stopped");
    Ok(())
}
