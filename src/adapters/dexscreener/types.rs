//! DexScreener API response types
//!
//! Mirrors the `latest/dex` JSON schema. Everything that the API has been
//! observed to omit is optional so a sparse pair never fails deserialization.

use serde::Deserialize;

/// Top-level response for both the token and pair endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DexScreenerResponse {
    #[serde(default)]
    pub schema_version: Option<String>,
    /// Token endpoint: all pairs trading the queried token
    #[serde(default)]
    pub pairs: Option<Vec<PairData>>,
    /// Pair endpoint: the single queried pair
    #[serde(default)]
    pub pair: Option<PairData>,
}

impl DexScreenerResponse {
    /// All pairs in the response regardless of endpoint shape
    pub fn into_pairs(self) -> Vec<PairData> {
        match (self.pairs, self.pair) {
            (Some(pairs), _) if !pairs.is_empty() => pairs,
            (_, Some(pair)) => vec![pair],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairData {
    pub chain_id: String,
    #[serde(default)]
    pub dex_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    pub pair_address: String,
    pub base_token: TokenMeta,
    #[serde(default)]
    pub quote_token: Option<TokenMeta>,
    /// Price in USD, stringly typed by the API
    #[serde(default)]
    pub price_usd: Option<String>,
    #[serde(default)]
    pub liquidity: Option<Liquidity>,
    #[serde(default)]
    pub volume: Option<Volume>,
    /// Pool creation time, epoch milliseconds
    #[serde(default)]
    pub pair_created_at: Option<i64>,
}

impl PairData {
    pub fn liquidity_usd(&self) -> f64 {
        self.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0)
    }

    pub fn volume_24h_usd(&self) -> f64 {
        self.volume.as_ref().and_then(|v| v.h24).unwrap_or(0.0)
    }

    pub fn price_usd(&self) -> f64 {
        self.price_usd
            .as_deref()
            .and_then(|p| p.parse().ok())
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenMeta {
    pub address: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Liquidity {
    #[serde(default)]
    pub usd: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Volume {
    #[serde(default)]
    pub h24: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_token_endpoint_response() {
        let json = r#"{
            "schemaVersion": "1.0.0",
            "pairs": [{
                "chainId": "ethereum",
                "dexId": "uniswap",
                "url": "https://dexscreener.com/ethereum/0xpair",
                "pairAddress": "0xPAIR",
                "baseToken": {"address": "0xTOKEN", "name": "New Token", "symbol": "NEW"},
                "quoteToken": {"address": "0xWETH", "name": "Wrapped Ether", "symbol": "WETH"},
                "priceUsd": "0.00123",
                "liquidity": {"usd": 5000.5},
                "volume": {"h24": 100.0},
                "pairCreatedAt": 1700000000000
            }]
        }"#;

        let resp: DexScreenerResponse = serde_json::from_str(json).unwrap();
        let pairs = resp.into_pairs();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].base_token.symbol, "NEW");
        assert_eq!(pairs[0].price_usd(), 0.00123);
        assert_eq!(pairs[0].liquidity_usd(), 5000.5);
        assert_eq!(pairs[0].volume_24h_usd(), 100.0);
    }

    #[test]
    fn parses_pair_endpoint_response() {
        let json = r#"{
            "pair": {
                "chainId": "solana",
                "pairAddress": "PoolAddr11111111111111111111111111111111111",
                "baseToken": {"address": "Mint111111111111111111111111111111111111111", "name": "Sol Meme", "symbol": "SMEME"},
                "priceUsd": "0.5"
            }
        }"#;

        let resp: DexScreenerResponse = serde_json::from_str(json).unwrap();
        let pairs = resp.into_pairs();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].chain_id, "solana");
        // Sparse pair: missing liquidity/volume/createdAt default cleanly
        assert_eq!(pairs[0].liquidity_usd(), 0.0);
        assert_eq!(pairs[0].pair_created_at, None);
    }

    #[test]
    fn empty_response_yields_no_pairs() {
        let resp: DexScreenerResponse = serde_json::from_str(r#"{"pairs": null}"#).unwrap();
        assert!(resp.into_pairs().is_empty());
    }
}
