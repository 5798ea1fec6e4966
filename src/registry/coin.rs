//! Coin snapshot and partial-update types.
//!
//! A `Coin` always carries every field; values the feed has not reported
//! yet are `None`. Updates are explicit field-by-field merges - a field
//! absent from an incoming update never erases a previously known value.

/// Latest known market snapshot for one asset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Coin {
    /// Ticker symbol, e.g. "btc". Lowercased registry key.
    pub short: String,
    /// Full name, e.g. "bitcoin". Lowercased registry key.
    pub long: String,
    /// 1-based market-cap rank at the last full refresh.
    pub rank: Option<u32>,
    /// Current unit price in USD.
    pub price: Option<f64>,
    /// Signed 24h percentage change.
    pub perc: Option<f64>,
    /// The feed's own rendition of the 24h change. Kept as a string
    /// because the verbose-message sign check is a literal leading-minus
    /// test on this value.
    pub cap24hr_change: Option<String>,
    pub volume: Option<f64>,
    pub mktcap: Option<f64>,
    pub supply: Option<f64>,
    /// Volume-weighted average price.
    pub vwap: Option<f64>,
    /// 24h change relative to BTC. `None` for BTC itself ("N/A") and for
    /// coins whose change is not yet known.
    pub btcgain: Option<f64>,
}

impl Coin {
    /// Numeric value of the 24h change, parsed from the feed string.
    pub fn cap24hr_change_value(&self) -> Option<f64> {
        self.cap24hr_change.as_deref()?.trim().parse().ok()
    }

    /// Applies a partial update. Present fields win, absent fields keep
    /// their previous values.
    pub fn apply(&mut self, update: &CoinUpdate) {
        self.short = update.short.to_lowercase();
        if let Some(long) = &update.long {
            self.long = long.to_lowercase();
        }
        if let Some(rank) = update.rank {
            self.rank = Some(rank);
        }
        if let Some(price) = update.price {
            self.price = Some(price);
        }
        if let Some(perc) = update.perc {
            self.perc = Some(perc);
        }
        if let Some(change) = &update.cap24hr_change {
            self.cap24hr_change = Some(change.clone());
        }
        if let Some(volume) = update.volume {
            self.volume = Some(volume);
        }
        if let Some(mktcap) = update.mktcap {
            self.mktcap = Some(mktcap);
        }
        if let Some(supply) = update.supply {
            self.supply = Some(supply);
        }
        if let Some(vwap) = update.vwap {
            self.vwap = Some(vwap);
        }
        if let Some(btcgain) = update.btcgain {
            self.btcgain = btcgain;
        }
    }
}

/// Partial coin update from a full refresh or a streamed trade event.
///
/// `short` is the only required field - an event without identity is
/// malformed and dropped before it gets here.
#[derive(Debug, Clone, Default)]
pub struct CoinUpdate {
    pub short: String,
    pub long: Option<String>,
    pub rank: Option<u32>,
    pub price: Option<f64>,
    pub perc: Option<f64>,
    pub cap24hr_change: Option<String>,
    pub volume: Option<f64>,
    pub mktcap: Option<f64>,
    pub supply: Option<f64>,
    pub vwap: Option<f64>,
    /// `Some(None)` explicitly marks the coin as having no BTC-relative
    /// gain (BTC itself).
    pub btcgain: Option<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_update() -> CoinUpdate {
        CoinUpdate {
            short: "eth".to_string(),
            long: Some("ethereum".to_string()),
            rank: Some(2),
            price: Some(50.0),
            perc: Some(-2.0),
            cap24hr_change: Some("-2.0".to_string()),
            volume: Some(1_000.0),
            mktcap: Some(5_000.0),
            supply: Some(100.0),
            vwap: Some(49.5),
            btcgain: Some(Some(-7.0)),
        }
    }

    #[test]
    fn test_apply_full_update() {
        let mut coin = Coin::default();
        coin.apply(&full_update());
        assert_eq!(coin.short, "eth");
        assert_eq!(coin.long, "ethereum");
        assert_eq!(coin.price, Some(50.0));
        assert_eq!(coin.btcgain, Some(-7.0));
    }

    #[test]
    fn test_partial_update_keeps_known_fields() {
        let mut coin = Coin::default();
        coin.apply(&full_update());

        // A trade event carrying only a price must not erase anything.
        let patch = CoinUpdate {
            short: "eth".to_string(),
            price: Some(55.0),
            ..CoinUpdate::default()
        };
        coin.apply(&patch);

        assert_eq!(coin.price, Some(55.0));
        assert_eq!(coin.long, "ethereum");
        assert_eq!(coin.volume, Some(1_000.0));
        assert_eq!(coin.vwap, Some(49.5));
    }

    #[test]
    fn test_change_value_parses_feed_string() {
        let mut coin = Coin::default();
        coin.cap24hr_change = Some("-2.31".to_string());
        assert_eq!(coin.cap24hr_change_value(), Some(-2.31));

        coin.cap24hr_change = Some("bogus".to_string());
        assert_eq!(coin.cap24hr_change_value(), None);
    }
}
