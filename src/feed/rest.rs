//! REST client for the coincap API.
//!
//! Provides the full ranked coin list (`front`) and per-coin price
//! history. A refresh merges every returned coin into the registry and
//! swaps in a freshly built rank index, all under one write lock, so a
//! command evaluated mid-refresh never observes a partially numbered
//! rank array.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::registry::{CoinUpdate, RegistryHandle};

/// Default REST endpoint for coincap.
pub const DEFAULT_API_URL: &str = "http://coincap.io";

/// Request timeout for all REST calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
}

/// Client for the coincap REST endpoints.
#[derive(Clone)]
pub struct CoinCapClient {
    client: Client,
    base_url: String,
}

impl CoinCapClient {
    /// Creates a client against the default endpoint.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_API_URL.to_string())
    }

    /// Creates a client against a custom endpoint.
    pub fn with_base_url(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, base_url }
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches the full ranked coin list.
    pub async fn fetch_front(&self) -> Result<Vec<FrontCoin>, FeedError> {
        let url = format!("{}/front", self.base_url);
        debug!("Fetching coin front list: {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(FeedError::ApiError { status, message });
        }

        response
            .json()
            .await
            .map_err(|e| FeedError::ParseError(e.to_string()))
    }

    /// Fetches the `[timestamp, price]` history series for one coin over
    /// the given number of days.
    pub async fn fetch_history(
        &self,
        short: &str,
        days: u32,
    ) -> Result<Vec<(i64, f64)>, FeedError> {
        let url = format!("{}/history/{}day/{}", self.base_url, days, short);
        debug!("Fetching price history: {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(FeedError::ApiError { status, message });
        }

        let history: HistoryResponse = response
            .json()
            .await
            .map_err(|e| FeedError::ParseError(e.to_string()))?;

        Ok(history.price)
    }
}

impl Default for CoinCapClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CoinCapClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinCapClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Performs one full refresh: fetch, derive, merge, swap ranks.
///
/// On transport or parse failure nothing is committed; the caller retries
/// on its next tick.
pub async fn refresh_all(
    client: &CoinCapClient,
    registry: &RegistryHandle,
) -> Result<(), FeedError> {
    let coins = client.fetch_front().await?;

    // BTC's change comes from the same fetched batch so every derived
    // btcgain in this refresh is consistent.
    let btc_perc = coins
        .iter()
        .find(|c| c.short.eq_ignore_ascii_case("btc"))
        .and_then(|c| c.perc);

    let mut updates = Vec::with_capacity(coins.len());
    let mut ranks = vec![String::new(); coins.len() + 1];

    for (index, coin) in coins.into_iter().enumerate() {
        let rank = index as u32 + 1;
        ranks[rank as usize] = coin.short.to_lowercase();
        updates.push(coin.into_update(rank, btc_perc));
    }

    let count = updates.len();

    let mut reg = registry.write().await;
    for update in &updates {
        reg.merge(update);
    }
    reg.replace_ranks(ranks);
    drop(reg);

    debug!("Refreshed {} coins", count);
    Ok(())
}

/// Runs the periodic full refresh forever.
///
/// Failures are logged and retried on the next tick - no backoff, no
/// retry budget. The initial refresh is awaited by the caller before the
/// chat loop starts, so the first interval tick is consumed here.
pub async fn run_refresh_loop(
    client: CoinCapClient,
    registry: RegistryHandle,
    period: Duration,
) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await;

    loop {
        interval.tick().await;
        if let Err(e) = refresh_all(&client, &registry).await {
            warn!("Coin refresh failed: {}", e);
        }
    }
}

// ============ Response Types ============

/// One coin as returned by the `front` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct FrontCoin {
    pub short: String,
    pub long: String,
    pub price: Option<f64>,
    pub perc: Option<f64>,
    #[serde(rename = "cap24hrChange")]
    pub cap24hr_change: Option<NumOrString>,
    pub volume: Option<f64>,
    pub mktcap: Option<f64>,
    pub supply: Option<f64>,
    #[serde(rename = "vwapData")]
    pub vwap_data: Option<f64>,
}

impl FrontCoin {
    /// Converts a fetched coin into a registry update, attaching the
    /// derived rank and BTC-relative gain.
    fn into_update(self, rank: u32, btc_perc: Option<f64>) -> CoinUpdate {
        let btcgain = if self.short.eq_ignore_ascii_case("btc") {
            // N/A for BTC itself.
            Some(None)
        } else {
            match (self.perc, btc_perc) {
                (Some(p), Some(b)) => Some(Some(p - b)),
                _ => None,
            }
        };

        CoinUpdate {
            short: self.short,
            long: Some(self.long),
            rank: Some(rank),
            price: self.price,
            perc: self.perc,
            cap24hr_change: self.cap24hr_change.map(|c| c.into_display()),
            volume: self.volume,
            mktcap: self.mktcap,
            supply: self.supply,
            vwap: self.vwap_data,
            btcgain,
        }
    }
}

/// The feed sends the 24h change as a bare number or a pre-formatted
/// string depending on the code path. Keep whichever rendition arrived.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumOrString {
    Num(f64),
    Str(String),
}

impl NumOrString {
    pub fn into_display(self) -> String {
        match self {
            NumOrString::Num(n) => format!("{}", n),
            NumOrString::Str(s) => s,
        }
    }
}

/// Response shape of the `history/{days}day/{coin}` endpoint.
#[derive(Debug, Deserialize)]
struct HistoryResponse {
    price: Vec<(i64, f64)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_front_coin_deserializes() {
        let json = r#"{
            "short": "BTC",
            "long": "Bitcoin",
            "price": 100.5,
            "perc": 5.84,
            "cap24hrChange": 5.84,
            "volume": 123456.0,
            "mktcap": 9999999.0,
            "supply": 17000000.0,
            "vwapData": 99.2
        }"#;
        let coin: FrontCoin = serde_json::from_str(json).unwrap();
        assert_eq!(coin.short, "BTC");
        assert_eq!(coin.price, Some(100.5));
        assert_eq!(coin.vwap_data, Some(99.2));
    }

    #[test]
    fn test_change_accepts_string_or_number() {
        let as_num: NumOrString = serde_json::from_str("5.84").unwrap();
        assert_eq!(as_num.into_display(), "5.84");

        let as_str: NumOrString = serde_json::from_str("\"-2.31\"").unwrap();
        assert_eq!(as_str.into_display(), "-2.31");
    }

    #[test]
    fn test_into_update_derives_btcgain() {
        let coin: FrontCoin = serde_json::from_str(
            r#"{"short": "eth", "long": "ethereum", "perc": 3.0}"#,
        )
        .unwrap();
        let update = coin.into_update(2, Some(5.0));
        assert_eq!(update.rank, Some(2));
        assert_eq!(update.btcgain, Some(Some(-2.0)));

        let btc: FrontCoin = serde_json::from_str(
            r#"{"short": "btc", "long": "bitcoin", "perc": 5.0}"#,
        )
        .unwrap();
        let update = btc.into_update(1, Some(5.0));
        assert_eq!(update.btcgain, Some(None));
    }

    #[test]
    fn test_history_response_shape() {
        let json = r#"{"price": [[1514764800000, 100.0], [1514764860000, 101.5]]}"#;
        let history: HistoryResponse = serde_json::from_str(json).unwrap();
        assert_eq!(history.price.len(), 2);
        assert_eq!(history.price[1], (1514764860000, 101.5));
    }
}
