//! Chat message builders for lookups and help.

use crate::registry::Coin;
use crate::slack::{AttachmentField, MessageAttachment};

use super::format::{capitalize, format_ratio, format_thousands, format_usd};

const TREND_UP: &str = ":chart_with_upwards_trend:";
const TREND_DOWN: &str = ":chart_with_downwards_trend:";

/// Command reference posted by `help`.
pub fn help_text() -> &'static str {
    "*All commands can be started with either `coincap` or `cc`*
Here are the commands:
    coincap help
    coincap [coin, ex: btc, :btc:, bitcoin]
    coincap [coin1] in [coin2]
    coincap [coin1,coin2,coin3...coinN] (no spaces between coins)

Flags:
    cc -v [coin]    verbose output
    cc -r [rank]    get coin at specified rank

Tables:
    cc top [limit] [sortBy]
    *sortBy can be one of: mktcap, price, supply, volume, gain, vwap, btcgain,*
    *or a comma delimited list of valid sortBy values*

    examples:
        `cc top` // displays top 10 sorted by mktcap by default
        `cc top 5` // top 5 sorted by mktcap
        `cc top gain` // top 10 sorted by 24hr % gain
        `cc top 20 volume` // top 20 sorted by volume
        `cc top volume,mktcap,gain` // top 10 sorted by volume and including mktcap & gain columns

Charts:
    cc chart [timePeriod] [coin]
    *timePeriod can be one of: 1, 7, 30, 90, 180, 365*
    *timePeriod defaults to 1 if not given*

    _Note: this command takes a few seconds longer than others,_
    _due to rendering a new chart each time. Please be patient._

    examples:
        `cc chart btc` // displays a 1day history chart for btc price
        `cc chart 7 btc` // displays a 7day history chart for btc price"
}

/// Inline lookup line: icon, price, comparison icon, cross rate, trend
/// glyph and 24h change. The caller guarantees both coins carry prices.
///
/// `explicit` marks an `in <coin2>` comparison, which reports the change
/// difference between the two coins instead of the raw 24h change.
pub fn inline_message(coin1: &Coin, coin2: &Coin, explicit: bool) -> String {
    let price1 = coin1.price.unwrap_or_default();
    let price2 = coin2.price.unwrap_or_default();

    let ratio = if coin1.short == coin2.short {
        format_ratio(1.0)
    } else {
        format_ratio(price1 / price2)
    };

    let (diff, gaining) = if explicit {
        let d = coin1.perc.unwrap_or_default() - coin2.perc.unwrap_or_default();
        (format!("{:.2}", d), d >= 0.0)
    } else {
        let raw = coin1
            .cap24hr_change
            .clone()
            .unwrap_or_else(|| "N/A".to_string());
        let gaining = coin1
            .cap24hr_change_value()
            .map(|v| v >= 0.0)
            .unwrap_or(false);
        (raw, gaining)
    };

    format!(
        "*{}* :{}: *{}* :{}: *{}* {} *{}%*",
        coin1.short.to_uppercase(),
        icon_for(&coin1.short),
        format_usd(price1),
        coin2.short,
        ratio,
        if gaining { TREND_UP } else { TREND_DOWN },
        diff,
    )
}

/// Rich attachment for the verbose lookup, colored by the sign of the
/// 24h change.
pub fn verbose_attachment(coin: &Coin) -> MessageAttachment {
    // Literal minus-glyph test on the feed's own string rendition; the
    // field may arrive pre-formatted.
    let loss = coin
        .cap24hr_change
        .as_deref()
        .map(|c| c.contains('-'))
        .unwrap_or(false);

    let change = coin
        .cap24hr_change
        .clone()
        .unwrap_or_else(|| "N/A".to_string());
    // The raw numeric string lacks a sign when non-negative.
    let change = if loss { change } else { format!("+{}", change) };

    let short_upper = coin.short.to_uppercase();
    let rank = coin
        .rank
        .map(|r| r.to_string())
        .unwrap_or_else(|| "?".to_string());

    MessageAttachment {
        color: if loss { "#ff0000" } else { "#00ff00" }.to_string(),
        pretext: format!(
            ":{}: <http://coincap.io/{} | {}> ({}) [Rank #{} @ coincap.io]",
            icon_for(&coin.short),
            short_upper,
            capitalize(&coin.long),
            short_upper,
            rank,
        ),
        fields: vec![
            field("Price", usd_or_na(coin.price)),
            field("Volume", usd_or_na(coin.volume)),
            field("24hr Change", format!("{}%", change)),
            field("VWAP", usd_or_na(coin.vwap)),
            field("Market Cap", usd_or_na(coin.mktcap)),
            field(
                "Total Supply",
                coin.supply
                    .map(format_thousands)
                    .unwrap_or_else(|| "N/A".to_string()),
            ),
        ],
    }
}

/// Emoji icon for a coin. One ticker collides with an unrelated unicode
/// emoji name and gets a substitute glyph.
fn icon_for(short: &str) -> String {
    if short.to_lowercase().contains("xrp") {
        "hankey".to_string()
    } else {
        short.to_string()
    }
}

fn field(title: &str, value: String) -> AttachmentField {
    AttachmentField {
        title: title.to_string(),
        value,
        short: true,
    }
}

fn usd_or_na(value: Option<f64>) -> String {
    value.map(format_usd).unwrap_or_else(|| "N/A".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin(short: &str, long: &str, price: f64, perc: f64) -> Coin {
        Coin {
            short: short.to_string(),
            long: long.to_string(),
            rank: Some(1),
            price: Some(price),
            perc: Some(perc),
            cap24hr_change: Some(format!("{}", perc)),
            volume: Some(1_000.0),
            mktcap: Some(9_000.0),
            supply: Some(21_000_000.0),
            vwap: Some(price),
            btcgain: None,
        }
    }

    #[test]
    fn test_inline_cross_rate_and_trend() {
        let eth = coin("eth", "ethereum", 50.0, -2.0);
        let btc = coin("btc", "bitcoin", 100.0, 5.0);

        let msg = inline_message(&eth, &btc, true);
        assert!(msg.contains("*0.50000000*"), "{}", msg);
        assert!(msg.contains(TREND_DOWN), "{}", msg);
        assert!(msg.contains("*-7.00%*"), "{}", msg);
    }

    #[test]
    fn test_inline_self_comparison_is_exactly_one() {
        let btc = coin("btc", "bitcoin", 100.0, 5.0);
        let msg = inline_message(&btc, &btc, true);
        assert!(msg.contains("*1.00000000*"), "{}", msg);
        assert!(msg.contains(TREND_UP), "{}", msg);
    }

    #[test]
    fn test_inline_default_uses_raw_change() {
        let btc = coin("btc", "bitcoin", 100.0, 5.0);
        let eth = coin("eth", "ethereum", 50.0, -2.0);
        let msg = inline_message(&eth, &btc, false);
        assert!(msg.contains("*-2%*"), "{}", msg);
        assert!(msg.contains(TREND_DOWN), "{}", msg);
    }

    #[test]
    fn test_xrp_icon_substitution() {
        let xrp = coin("xrp", "ripple", 1.0, 0.5);
        let btc = coin("btc", "bitcoin", 100.0, 5.0);
        let msg = inline_message(&xrp, &btc, false);
        assert!(msg.contains(":hankey:"), "{}", msg);

        let attachment = verbose_attachment(&xrp);
        assert!(attachment.pretext.starts_with(":hankey:"));
    }

    #[test]
    fn test_verbose_colors_and_sign_prefix() {
        let up = coin("btc", "bitcoin", 100.0, 5.84);
        let attachment = verbose_attachment(&up);
        assert_eq!(attachment.color, "#00ff00");
        assert_eq!(attachment.fields[2].value, "+5.84%");

        let down = coin("eth", "ethereum", 50.0, -2.31);
        let attachment = verbose_attachment(&down);
        assert_eq!(attachment.color, "#ff0000");
        assert_eq!(attachment.fields[2].value, "-2.31%");
    }

    #[test]
    fn test_verbose_pretext_links_profile() {
        let btc = coin("btc", "bitcoin", 100.0, 5.0);
        let attachment = verbose_attachment(&btc);
        assert!(attachment
            .pretext
            .contains("<http://coincap.io/BTC | Bitcoin> (BTC) [Rank #1 @ coincap.io]"));
    }
}
