//! Sort keys accepted by the table command.

use super::coin::Coin;

/// The fixed set of fields `top` can sort and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    MktCap,
    Price,
    Supply,
    Volume,
    Gain,
    Vwap,
    BtcGain,
}

impl SortKey {
    /// Parses one sort-key word. Unknown words yield `None` and are
    /// dropped by the caller.
    pub fn parse(word: &str) -> Option<SortKey> {
        match word {
            "mktcap" => Some(SortKey::MktCap),
            "price" => Some(SortKey::Price),
            "supply" => Some(SortKey::Supply),
            "volume" => Some(SortKey::Volume),
            "gain" => Some(SortKey::Gain),
            "vwap" => Some(SortKey::Vwap),
            "btcgain" => Some(SortKey::BtcGain),
            _ => None,
        }
    }

    /// The label shown in table headings.
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::MktCap => "mktcap",
            SortKey::Price => "price",
            SortKey::Supply => "supply",
            SortKey::Volume => "volume",
            SortKey::Gain => "gain",
            SortKey::Vwap => "vwap",
            SortKey::BtcGain => "btcgain",
        }
    }

    /// The coin field this key sorts by. `gain` is the 24h percentage
    /// change and `btcgain` the change relative to BTC.
    pub fn value(&self, coin: &Coin) -> Option<f64> {
        match self {
            SortKey::MktCap => coin.mktcap,
            SortKey::Price => coin.price,
            SortKey::Supply => coin.supply,
            SortKey::Volume => coin.volume,
            SortKey::Gain => coin.perc,
            SortKey::Vwap => coin.vwap,
            SortKey::BtcGain => coin.btcgain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_keys() {
        assert_eq!(SortKey::parse("mktcap"), Some(SortKey::MktCap));
        assert_eq!(SortKey::parse("btcgain"), Some(SortKey::BtcGain));
        assert_eq!(SortKey::parse("foo"), None);
        assert_eq!(SortKey::parse(""), None);
    }

    #[test]
    fn test_value_reads_matching_field() {
        let coin = Coin {
            short: "eth".to_string(),
            volume: Some(123.0),
            perc: Some(-2.0),
            ..Coin::default()
        };
        assert_eq!(SortKey::Volume.value(&coin), Some(123.0));
        assert_eq!(SortKey::Gain.value(&coin), Some(-2.0));
        assert_eq!(SortKey::MktCap.value(&coin), None);
    }
}
