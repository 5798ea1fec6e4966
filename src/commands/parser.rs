//! Chat-message grammar.
//!
//! Case-insensitive, whitespace-delimited tokens. Token 0 must be the
//! invocation prefix (`coincap` or `cc`); token 1 is the command word;
//! the rest are arguments. Anything that does not parse is `None` and
//! produces no response.

use crate::registry::SortKey;

/// Allowed chart horizons, in days.
const CHART_PERIODS: [&str; 6] = ["1", "7", "30", "90", "180", "365"];

/// Default row count for the table command.
const DEFAULT_TABLE_LIMIT: usize = 10;

/// A parsed, normalized command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    /// Single-coin lookup, optionally against an explicit second coin
    /// (`cc eth in btc`). Without one the comparison defaults to BTC.
    Lookup {
        coin: String,
        base: Option<String>,
    },
    /// Comma-separated batch: one independent lookup per coin.
    Batch(Vec<String>),
    /// Flag mode: `-v` verbose, `-r` rank-based lookup.
    Flag {
        verbose: bool,
        target: LookupTarget,
    },
    /// Ranked table: `top [limit] [sortKey(,sortKey...)]`.
    Top {
        limit: usize,
        keys: Vec<SortKey>,
        /// True when no sort key was given and `mktcap` was assumed.
        standard: bool,
    },
    /// Historical chart: `chart [days] <coin>`.
    Chart {
        days: u32,
        coin: String,
    },
}

/// What a flag-mode lookup resolves by.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupTarget {
    Symbol(String),
    Rank(usize),
}

/// Parses one raw chat line. `None` means "not for us": missing prefix,
/// empty command, or malformed arguments - all silently ignored.
pub fn parse(text: &str) -> Option<Command> {
    let text = strip_emoji(&text.to_lowercase());
    let mut tokens = text.split_whitespace();

    let prefix = tokens.next()?;
    if prefix != "coincap" && prefix != "cc" {
        return None;
    }

    let command = tokens.next()?;
    let args: Vec<&str> = tokens.collect();

    // Alias entry: the community never spells bch the same way twice.
    if is_bch_misspelling(command) {
        return Some(Command::Lookup {
            coin: "bch".to_string(),
            base: None,
        });
    }

    if command.contains(',') {
        return Some(Command::Batch(
            command.split(',').map(str::to_string).collect(),
        ));
    }

    if let Some(flags) = command.strip_prefix('-') {
        return parse_flags(flags, &args);
    }

    match command {
        "help" => Some(Command::Help),
        "top" => parse_top(&args),
        "chart" => parse_chart(&args),
        coin => {
            let base = match args.first() {
                Some(&"in") => Some(args.get(1)?.to_string()),
                _ => None,
            };
            Some(Command::Lookup {
                coin: coin.to_string(),
                base,
            })
        }
    }
}

/// Collapses every `:word:` emoji token to `word`.
pub fn strip_emoji(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == ':' {
            let mut j = i + 1;
            while j < chars.len() && (chars[j].is_alphanumeric() || chars[j] == '_') {
                j += 1;
            }
            if j > i + 1 && j < chars.len() && chars[j] == ':' {
                out.extend(&chars[i + 1..j]);
                i = j + 1;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }

    out
}

/// Misspelling tolerance for one specific ticker: a `b`, two or more
/// `e`s, one or more `s`, one or more `h`, anywhere in the word.
pub fn is_bch_misspelling(word: &str) -> bool {
    let chars: Vec<char> = word.chars().collect();

    for start in 0..chars.len() {
        if chars[start] != 'b' {
            continue;
        }
        let mut i = start + 1;
        let e_start = i;
        while i < chars.len() && chars[i] == 'e' {
            i += 1;
        }
        if i - e_start < 2 {
            continue;
        }
        let s_start = i;
        while i < chars.len() && chars[i] == 's' {
            i += 1;
        }
        if i == s_start {
            continue;
        }
        if i < chars.len() && chars[i] == 'h' {
            return true;
        }
    }

    false
}

fn parse_flags(flags: &str, args: &[&str]) -> Option<Command> {
    let verbose = flags.contains('v');
    let by_rank = flags.contains('r');

    let arg = args.first()?;
    let target = if by_rank {
        LookupTarget::Rank(arg.parse().ok()?)
    } else {
        LookupTarget::Symbol(arg.to_string())
    };

    Some(Command::Flag { verbose, target })
}

/// Table arguments are order-insensitive by type: a numeric token sets
/// the limit, the first non-numeric token names the sort keys.
fn parse_top(args: &[&str]) -> Option<Command> {
    let mut limit = DEFAULT_TABLE_LIMIT;
    let mut keys_arg: Option<&str> = None;

    for arg in args {
        if let Ok(n) = arg.parse::<usize>() {
            limit = n;
        } else if keys_arg.is_none() {
            keys_arg = Some(arg);
        }
    }

    let standard = keys_arg.is_none();
    let keys = match keys_arg {
        None => vec![SortKey::MktCap],
        // Unknown keys are dropped; duplicates keep their first position.
        Some(list) => {
            let mut keys = Vec::new();
            for key in list.split(',').filter_map(SortKey::parse) {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
            keys
        }
    };

    Some(Command::Top {
        limit,
        keys,
        standard,
    })
}

fn parse_chart(args: &[&str]) -> Option<Command> {
    match args {
        [coin] => Some(Command::Chart {
            days: 1,
            coin: coin.to_string(),
        }),
        [period, coin] => {
            if !CHART_PERIODS.contains(period) {
                return None;
            }
            Some(Command::Chart {
                days: period.parse().ok()?,
                coin: coin.to_string(),
            })
        }
        _ => None,
    }
}
