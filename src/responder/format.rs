//! Locale-style number formatting (en-US, USD).

use crate::registry::{Coin, SortKey};

/// Formats a currency amount: `$1,234.56`, negative as `-$1,234.56`.
pub fn format_usd(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let amount = amount.abs();
    let whole = amount.trunc() as u64;
    let cents = ((amount - amount.trunc()) * 100.0).round() as u64;

    // Rounding cents can carry into the whole part.
    let (whole, cents) = if cents == 100 { (whole + 1, 0) } else { (whole, cents) };

    format!("{}${}.{:02}", sign, group_thousands(whole), cents)
}

/// Formats a count with thousands separators, keeping up to three
/// decimals: `17,000,000` or `16,512.5`.
pub fn format_thousands(n: f64) -> String {
    let sign = if n < 0.0 { "-" } else { "" };
    let rendered = format!("{:.3}", n.abs());
    let (int_part, frac_part) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');
    let grouped = group_thousands(int_part.parse::<u64>().unwrap_or(0));

    if frac.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac)
    }
}

/// Formats a ratio to 8 decimal places.
pub fn format_ratio(r: f64) -> String {
    format!("{:.8}", r)
}

/// Capitalizes the first letter and lowercases the rest.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Renders one coin field under the table formatting policy: currency
/// for mktcap/price/volume/vwap, two-decimal percentage for the gain
/// columns, thousands separators for supply. Unknown values are `N/A`.
pub fn format_field(coin: &Coin, key: SortKey) -> String {
    let value = match key.value(coin) {
        Some(v) => v,
        None => return "N/A".to_string(),
    };

    match key {
        SortKey::MktCap | SortKey::Price | SortKey::Volume | SortKey::Vwap => format_usd(value),
        SortKey::Gain | SortKey::BtcGain => format!("{:.2} %", value),
        SortKey::Supply => format_thousands(value),
    }
}

fn group_thousands(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }

    let mut groups = Vec::new();
    while n > 0 {
        groups.push(n % 1000);
        n /= 1000;
    }

    let mut out = groups.pop().map(|g| g.to_string()).unwrap_or_default();
    while let Some(g) = groups.pop() {
        out.push_str(&format!(",{:03}", g));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(1234.56), "$1,234.56");
        assert_eq!(format_usd(0.5), "$0.50");
        assert_eq!(format_usd(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_usd(-5.0), "-$5.00");
        assert_eq!(format_usd(9.999), "$10.00");
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(17_000_000.0), "17,000,000");
        assert_eq!(format_thousands(16_512.5), "16,512.5");
        assert_eq!(format_thousands(999.0), "999");
        assert_eq!(format_thousands(0.0), "0");
    }

    #[test]
    fn test_format_ratio() {
        assert_eq!(format_ratio(1.0), "1.00000000");
        assert_eq!(format_ratio(0.5), "0.50000000");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("bitcoin"), "Bitcoin");
        assert_eq!(capitalize("ETHEREUM"), "Ethereum");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_format_field_policy() {
        let coin = Coin {
            short: "eth".to_string(),
            price: Some(50.0),
            perc: Some(-2.0),
            supply: Some(100_000.0),
            ..Coin::default()
        };
        assert_eq!(format_field(&coin, SortKey::Price), "$50.00");
        assert_eq!(format_field(&coin, SortKey::Gain), "-2.00 %");
        assert_eq!(format_field(&coin, SortKey::Supply), "100,000");
        assert_eq!(format_field(&coin, SortKey::MktCap), "N/A");
        assert_eq!(format_field(&coin, SortKey::BtcGain), "N/A");
    }
}
