//! End-to-end pipeline tests over the public scanner API, driven by
//! synthetic candidates and mock ports. Time is paused, so the real
//! indexing delay and retry backoffs run instantly.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use tokenscout::application::{ScannerConfig, ScannerEvent, TokenScanner, DEFAULT_INDEXING_DELAY};
use tokenscout::domain::{Chain, CriteriaUpdate, RiskAssessment, RiskSource};
use tokenscout::ports::mocks::{test_record, MockMarketData, MockRisk};
use tokenscout::ports::watcher::PoolCandidate;

const ETH_TOKEN: &str = "0x00000000000000000000000000000000000000AA";
const ETH_TOKEN_2: &str = "0x00000000000000000000000000000000000000BB";
const SOL_POOL: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

fn candidate(chain: Chain, token: &str) -> PoolCandidate {
    PoolCandidate {
        chain,
        token_address: token.to_string(),
        pair_address: format!("{}-pair", token),
    }
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<ScannerEvent>) -> Option<ScannerEvent> {
    tokio::time::timeout(Duration::from_secs(600), rx.recv())
        .await
        .ok()
        .flatten()
}

#[tokio::test(start_paused = true)]
async fn evm_detection_waits_for_the_indexing_delay() {
    let market = Arc::new(MockMarketData::new().with_record(
        Chain::Ethereum,
        ETH_TOKEN,
        test_record(Chain::Ethereum, ETH_TOKEN),
    ));
    let (scanner, mut events) =
        TokenScanner::new(ScannerConfig::default(), market, Arc::new(MockRisk::new()));

    let started = tokio::time::Instant::now();
    scanner
        .candidate_sender()
        .send(candidate(Chain::Ethereum, ETH_TOKEN))
        .await
        .unwrap();

    match next_event(&mut events).await {
        Some(ScannerEvent::TokenDetected(record)) => {
            assert_eq!(record.chain, Chain::Ethereum);
            assert_eq!(record.address, ETH_TOKEN);
            assert_eq!(record.liquidity_usd, 5_000.0);
            assert!(record.risk.is_none());
        }
        other => panic!("expected detection, got {:?}", other),
    }
    assert!(
        started.elapsed() >= DEFAULT_INDEXING_DELAY,
        "emission arrived before the indexing delay elapsed"
    );
}

#[tokio::test(start_paused = true)]
async fn burst_of_duplicates_yields_one_detection() {
    let market = Arc::new(MockMarketData::new().with_record(
        Chain::Ethereum,
        ETH_TOKEN,
        test_record(Chain::Ethereum, ETH_TOKEN),
    ));
    let (scanner, mut events) = TokenScanner::new(
        ScannerConfig::default(),
        market.clone(),
        Arc::new(MockRisk::new()),
    );

    let tx = scanner.candidate_sender();
    for _ in 0..5 {
        tx.send(candidate(Chain::Ethereum, ETH_TOKEN)).await.unwrap();
    }

    assert!(matches!(
        next_event(&mut events).await,
        Some(ScannerEvent::TokenDetected(_))
    ));
    assert!(next_event(&mut events).await.is_none());
    assert_eq!(market.total_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn distinct_tokens_are_each_detected() {
    let market = Arc::new(
        MockMarketData::new()
            .with_record(
                Chain::Ethereum,
                ETH_TOKEN,
                test_record(Chain::Ethereum, ETH_TOKEN),
            )
            .with_record(
                Chain::Bsc,
                ETH_TOKEN_2,
                test_record(Chain::Bsc, ETH_TOKEN_2),
            ),
    );
    let (scanner, mut events) =
        TokenScanner::new(ScannerConfig::default(), market, Arc::new(MockRisk::new()));

    let tx = scanner.candidate_sender();
    tx.send(candidate(Chain::Ethereum, ETH_TOKEN)).await.unwrap();
    tx.send(candidate(Chain::Bsc, ETH_TOKEN_2)).await.unwrap();

    let mut detected = Vec::new();
    for _ in 0..2 {
        match next_event(&mut events).await {
            Some(ScannerEvent::TokenDetected(record)) => detected.push(record.chain),
            other => panic!("expected detection, got {:?}", other),
        }
    }
    detected.sort_by_key(|chain| format!("{}", chain));
    assert_eq!(detected, vec![Chain::Bsc, Chain::Ethereum]);
}

#[tokio::test(start_paused = true)]
async fn blacklisted_address_is_filtered_out() {
    // Mainnet USDT
    let usdt = "0xdAC17F958D2ee523a2206206994597C13D831ec7";
    let mut record = test_record(Chain::Ethereum, usdt);
    record.symbol = "TBOND".to_string();
    record.name = "Treasury Bond".to_string();
    let market = Arc::new(MockMarketData::new().with_record(Chain::Ethereum, usdt, record));
    let (scanner, mut events) =
        TokenScanner::new(ScannerConfig::default(), market, Arc::new(MockRisk::new()));

    scanner
        .candidate_sender()
        .send(candidate(Chain::Ethereum, usdt))
        .await
        .unwrap();

    assert!(next_event(&mut events).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn malformed_solana_candidate_is_dropped_silently() {
    let market = Arc::new(MockMarketData::new());
    let (scanner, mut events) = TokenScanner::new(
        ScannerConfig::default(),
        market.clone(),
        Arc::new(MockRisk::new()),
    );

    scanner
        .candidate_sender()
        .send(candidate(Chain::Solana, "not-base58-l0OI"))
        .await
        .unwrap();

    assert!(next_event(&mut events).await.is_none());
    assert_eq!(market.total_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn solana_detection_skips_quality_filters() {
    // A record that would fail every EVM quality filter: suspicious symbol,
    // zero liquidity, zero volume. Solana emits it anyway.
    let mut record = test_record(Chain::Solana, SOL_POOL);
    record.symbol = "scam".to_string();
    record.liquidity_usd = 0.0;
    record.volume_24h_usd = 0.0;
    let market = Arc::new(MockMarketData::new().with_record(Chain::Solana, SOL_POOL, record));
    let (scanner, mut events) =
        TokenScanner::new(ScannerConfig::default(), market, Arc::new(MockRisk::new()));

    scanner
        .candidate_sender()
        .send(candidate(Chain::Solana, SOL_POOL))
        .await
        .unwrap();

    match next_event(&mut events).await {
        Some(ScannerEvent::TokenDetected(record)) => {
            assert_eq!(record.chain, Chain::Solana);
            assert_eq!(record.symbol, "scam");
        }
        other => panic!("expected detection, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn risky_verdict_arrives_as_separate_event() {
    let market = Arc::new(MockMarketData::new().with_record(
        Chain::Bsc,
        ETH_TOKEN,
        test_record(Chain::Bsc, ETH_TOKEN),
    ));
    let risk = Arc::new(MockRisk::new().with_assessment(RiskAssessment::max_risk(
        RiskSource::Secondary,
        "sell simulation failed",
    )));
    let (scanner, mut events) = TokenScanner::new(ScannerConfig::default(), market, risk);

    scanner
        .update_criteria(CriteriaUpdate {
            enable_honeypot_detection: Some(true),
            ..Default::default()
        })
        .await;
    scanner
        .candidate_sender()
        .send(candidate(Chain::Bsc, ETH_TOKEN))
        .await
        .unwrap();

    let mut saw_detection = false;
    let mut saw_risky_verdict = false;
    for _ in 0..2 {
        match next_event(&mut events).await {
            Some(ScannerEvent::TokenDetected(record)) => {
                assert!(record.risk.is_none());
                saw_detection = true;
            }
            Some(ScannerEvent::RiskAssessed { chain, assessment, .. }) => {
                assert_eq!(chain, Chain::Bsc);
                assert!(assessment.is_risky);
                assert_eq!(assessment.source, RiskSource::Secondary);
                saw_risky_verdict = true;
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
    assert!(saw_detection && saw_risky_verdict);
}

#[tokio::test(start_paused = true)]
async fn stopped_scanner_swallows_pipeline_output() {
    let market = Arc::new(MockMarketData::new().with_record(
        Chain::Ethereum,
        ETH_TOKEN,
        test_record(Chain::Ethereum, ETH_TOKEN),
    ));
    let (scanner, mut events) =
        TokenScanner::new(ScannerConfig::default(), market, Arc::new(MockRisk::new()));

    scanner
        .candidate_sender()
        .send(candidate(Chain::Ethereum, ETH_TOKEN))
        .await
        .unwrap();
    scanner.stop_scanning().await;
    scanner.stop_scanning().await;

    assert!(next_event(&mut events).await.is_none());
    assert!(!scanner.is_scanning().await);
    assert!(scanner.active_networks().await.is_empty());
}
