//! Command dispatch against the coin registry.
//!
//! Every handler returns zero or more replies; an empty vector is the
//! silent no-op for resolution misses, invalid sort keys and failed
//! chart renders. There is no user-facing error channel.

use std::cmp::Ordering;

use chrono::Utc;
use tracing::warn;

use crate::chart::render_price_chart;
use crate::feed::CoinCapClient;
use crate::registry::{Coin, RegistryHandle, SortKey};
use crate::responder::format::format_field;
use crate::responder::{help_text, inline_message, verbose_attachment, AsciiTable};
use crate::slack::MessageAttachment;

use super::parser::{Command, LookupTarget};

/// One outbound reply produced by a command.
#[derive(Debug)]
pub enum Reply {
    /// Plain inline message.
    Text(String),
    /// Rich attachment (verbose lookup).
    Attachment(MessageAttachment),
    /// Rendered table body; the chat layer adds the monospace fences.
    Table(String),
    /// Chart image upload.
    FileUpload { filename: String, bytes: Vec<u8> },
}

/// Resolves parsed commands against the registry and the history feed.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: RegistryHandle,
    feed: CoinCapClient,
}

impl Dispatcher {
    pub fn new(registry: RegistryHandle, feed: CoinCapClient) -> Self {
        Self { registry, feed }
    }

    /// Dispatches one command. An empty vector means the command was
    /// silently skipped.
    pub async fn dispatch(&self, command: Command) -> Vec<Reply> {
        match command {
            Command::Help => vec![Reply::Text(help_text().to_string())],
            Command::Lookup { coin, base } => {
                self.lookup(&coin, base.as_deref()).await.into_iter().collect()
            }
            Command::Batch(coins) => {
                // One independent lookup per coin, order preserved,
                // misses skipped without affecting the rest.
                let mut replies = Vec::new();
                for coin in &coins {
                    if let Some(reply) = self.lookup(coin, None).await {
                        replies.push(reply);
                    }
                }
                replies
            }
            Command::Flag { verbose, target } => {
                self.flag_lookup(verbose, target).await.into_iter().collect()
            }
            Command::Top {
                limit,
                keys,
                standard,
            } => self.table(limit, &keys, standard).await.into_iter().collect(),
            Command::Chart { days, coin } => {
                self.chart(days, &coin).await.into_iter().collect()
            }
        }
    }

    /// Single-coin lookup. The comparison coin defaults to BTC; an
    /// explicit `in <coin2>` reports the change difference instead of
    /// the raw 24h change.
    async fn lookup(&self, coin: &str, base: Option<&str>) -> Option<Reply> {
        let reg = self.registry.read().await;
        let coin1 = reg.get(coin)?.clone();
        let (coin2, explicit) = match base {
            Some(base) => (reg.get(base)?.clone(), true),
            None => (reg.get("btc")?.clone(), false),
        };
        drop(reg);

        // A coin without a price yet is not presentable.
        if coin1.price.is_none() || coin2.price.is_none() {
            return None;
        }

        Some(Reply::Text(inline_message(&coin1, &coin2, explicit)))
    }

    async fn flag_lookup(&self, verbose: bool, target: LookupTarget) -> Option<Reply> {
        let reg = self.registry.read().await;
        let coin = match target {
            LookupTarget::Symbol(symbol) => reg.get(&symbol)?.clone(),
            LookupTarget::Rank(rank) => reg.get_by_rank(rank)?.clone(),
        };

        if verbose {
            return Some(Reply::Attachment(verbose_attachment(&coin)));
        }

        let btc = reg.get("btc")?.clone();
        drop(reg);

        if coin.price.is_none() || btc.price.is_none() {
            return None;
        }

        Some(Reply::Text(inline_message(&coin, &btc, false)))
    }

    /// Ranked table. The registry holds every coin under two keys, so
    /// the sorted list carries adjacent duplicates: the first row is
    /// dropped and the remainder deduplicated by ticker, reproducing the
    /// upstream feed's known leading-duplicate artifact.
    async fn table(&self, limit: usize, keys: &[SortKey], standard: bool) -> Option<Reply> {
        if keys.is_empty() {
            // Every requested sort key was unknown - abort silently.
            return None;
        }
        let primary = keys[0];

        let mut sorted = self.registry.read().await.all_entries();
        sorted.sort_by(|a, b| {
            let av = primary.value(a).unwrap_or(f64::NEG_INFINITY);
            let bv = primary.value(b).unwrap_or(f64::NEG_INFINITY);
            bv.partial_cmp(&av)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.short.cmp(&b.short))
        });

        // TODO: verify against a live feed sample whether this offset is
        // still needed; it compensates for a duplicate leading entry.
        if !sorted.is_empty() {
            sorted.remove(0);
        }
        sorted.dedup_by(|a, b| a.short == b.short);

        let rows: Vec<&Coin> = sorted.iter().take(limit).collect();
        if rows.is_empty() {
            return None;
        }

        let mut table = AsciiTable::new();

        if keys.len() > 1 {
            let mut heading = vec![String::new(), "coin".to_string()];
            heading.extend(keys.iter().map(|k| k.label().to_string()));
            table.set_heading(heading);

            for (i, coin) in rows.iter().enumerate() {
                let mut row = vec![(i + 1).to_string(), coin.short.clone()];
                row.extend(keys.iter().map(|k| format_field(coin, *k)));
                table.add_row(row);
            }
            for column in 2..keys.len() + 2 {
                table.set_align_right(column);
            }
        } else if standard {
            table.set_heading(vec![
                String::new(),
                "coin".to_string(),
                "price".to_string(),
                primary.label().to_string(),
            ]);
            for (i, coin) in rows.iter().enumerate() {
                table.add_row(vec![
                    (i + 1).to_string(),
                    coin.short.clone(),
                    format_field(coin, SortKey::Price),
                    format_field(coin, primary),
                ]);
            }
            table.set_align_right(2);
            table.set_align_right(3);
        } else {
            table.set_heading(vec![
                String::new(),
                "coin".to_string(),
                primary.label().to_string(),
            ]);
            for (i, coin) in rows.iter().enumerate() {
                table.add_row(vec![
                    (i + 1).to_string(),
                    coin.short.clone(),
                    format_field(coin, primary),
                ]);
            }
            table.set_align_right(2);
        }

        Some(Reply::Table(table.render()))
    }

    /// Historical price chart: fetch, render, upload. Any failure along
    /// the way is logged and swallowed - the user gets no message.
    async fn chart(&self, days: u32, coin: &str) -> Option<Reply> {
        let coin = self.registry.read().await.get(coin)?.clone();

        let history = match self.feed.fetch_history(&coin.short, days).await {
            Ok(history) => history,
            Err(e) => {
                warn!("Chart history fetch failed for {}: {}", coin.short, e);
                return None;
            }
        };

        let bytes = match render_price_chart(&history, &coin.short, days) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Chart render failed for {}: {}", coin.short, e);
                return None;
            }
        };

        Some(Reply::FileUpload {
            filename: format!("{}.png", Utc::now().timestamp_millis()),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::parser::parse;
    use crate::registry::{CoinUpdate, Registry, RegistryHandle};

    async fn seeded_registry() -> RegistryHandle {
        let handle = Registry::handle();
        let coins = [
            // (short, long, price, perc, volume)
            ("btc", "bitcoin", 100.0, 5.0, 9_000.0),
            ("eth", "ethereum", 50.0, -2.0, 7_000.0),
            ("xrp", "ripple", 1.0, 0.5, 8_000.0),
            ("ltc", "litecoin", 20.0, 1.0, 2_000.0),
            ("doge", "dogecoin", 0.1, 10.0, 500.0),
        ];

        let mut reg = handle.write().await;
        let mut ranks = vec![String::new()];
        for (i, (short, long, price, perc, volume)) in coins.iter().enumerate() {
            reg.merge(&CoinUpdate {
                short: short.to_string(),
                long: Some(long.to_string()),
                rank: Some(i as u32 + 1),
                price: Some(*price),
                perc: Some(*perc),
                cap24hr_change: Some(format!("{}", perc)),
                volume: Some(*volume),
                mktcap: Some(price * 1_000.0),
                supply: Some(1_000.0),
                vwap: Some(*price),
                btcgain: None,
            });
            ranks.push(short.to_string());
        }
        reg.replace_ranks(ranks);
        drop(reg);

        handle
    }

    async fn dispatcher() -> Dispatcher {
        Dispatcher::new(seeded_registry().await, CoinCapClient::new())
    }

    fn text(reply: &Reply) -> &str {
        match reply {
            Reply::Text(t) => t,
            other => panic!("expected text reply, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_lookup_cross_rate() {
        let d = dispatcher().await;
        let replies = d
            .dispatch(parse("cc eth in btc").unwrap())
            .await;
        assert_eq!(replies.len(), 1);
        let msg = text(&replies[0]);
        assert!(msg.contains("*0.50000000*"), "{}", msg);
        assert!(msg.contains(":chart_with_downwards_trend:"), "{}", msg);
    }

    #[tokio::test]
    async fn test_lookup_self_comparison() {
        let d = dispatcher().await;
        let replies = d.dispatch(parse("cc btc in btc").unwrap()).await;
        let msg = text(&replies[0]);
        assert!(msg.contains("*1.00000000*"), "{}", msg);
    }

    #[tokio::test]
    async fn test_unknown_coin_is_silent() {
        let d = dispatcher().await;
        let replies = d.dispatch(parse("cc nosuchcoin").unwrap()).await;
        assert!(replies.is_empty());
    }

    #[tokio::test]
    async fn test_batch_is_independent_and_ordered() {
        let d = dispatcher().await;
        let replies = d.dispatch(parse("cc btc,eth,doge").unwrap()).await;
        assert_eq!(replies.len(), 3);
        assert!(text(&replies[0]).starts_with("*BTC*"));
        assert!(text(&replies[1]).starts_with("*ETH*"));
        assert!(text(&replies[2]).starts_with("*DOGE*"));
        // Each defaults its comparison to BTC.
        assert!(text(&replies[1]).contains(":btc:"));
    }

    #[tokio::test]
    async fn test_batch_skips_misses() {
        let d = dispatcher().await;
        let replies = d.dispatch(parse("cc btc,bogus,eth").unwrap()).await;
        assert_eq!(replies.len(), 2);
    }

    #[tokio::test]
    async fn test_rank_flag_lookup() {
        let d = dispatcher().await;
        let replies = d.dispatch(parse("cc -r 2").unwrap()).await;
        assert_eq!(replies.len(), 1);
        assert!(text(&replies[0]).starts_with("*ETH*"));

        // Out-of-range rank is silent.
        let replies = d.dispatch(parse("cc -r 99").unwrap()).await;
        assert!(replies.is_empty());
    }

    #[tokio::test]
    async fn test_verbose_flag_yields_attachment() {
        let d = dispatcher().await;
        let replies = d.dispatch(parse("cc -v eth").unwrap()).await;
        assert_eq!(replies.len(), 1);
        match &replies[0] {
            Reply::Attachment(a) => assert_eq!(a.color, "#ff0000"),
            other => panic!("expected attachment, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_top_by_volume() {
        let d = dispatcher().await;
        let replies = d.dispatch(parse("cc top 3 volume").unwrap()).await;
        assert_eq!(replies.len(), 1);
        let rendered = match &replies[0] {
            Reply::Table(t) => t,
            other => panic!("expected table, got {:?}", other),
        };

        let lines: Vec<&str> = rendered.lines().collect();
        // Border, heading, separator, 3 rows, border.
        assert_eq!(lines.len(), 7);
        // Exactly 3 rows, descending by volume, rank column reflecting
        // output position - the doubled registry entries are gone.
        assert!(lines[3].contains("| 1 ") && lines[3].contains("btc"));
        assert!(lines[4].contains("| 2 ") && lines[4].contains("xrp"));
        assert!(lines[5].contains("| 3 ") && lines[5].contains("eth"));
    }

    #[tokio::test]
    async fn test_top_with_unknown_key_aborts() {
        let d = dispatcher().await;
        let replies = d.dispatch(parse("cc top foo").unwrap()).await;
        assert!(replies.is_empty());
    }

    #[tokio::test]
    async fn test_top_multi_key_columns() {
        let d = dispatcher().await;
        let replies = d
            .dispatch(parse("cc top 2 volume,gain").unwrap())
            .await;
        let rendered = match &replies[0] {
            Reply::Table(t) => t,
            other => panic!("expected table, got {:?}", other),
        };
        assert!(rendered.contains("volume"));
        assert!(rendered.contains("gain"));
        // No price column in multi-key mode.
        assert!(!rendered.contains("price"));
    }

    #[tokio::test]
    async fn test_top_on_empty_registry_is_silent() {
        let d = Dispatcher::new(Registry::handle(), CoinCapClient::new());
        let replies = d.dispatch(parse("cc top").unwrap()).await;
        assert!(replies.is_empty());
    }

    #[tokio::test]
    async fn test_help_is_unconditional() {
        let d = Dispatcher::new(Registry::handle(), CoinCapClient::new());
        let replies = d.dispatch(Command::Help).await;
        assert_eq!(replies.len(), 1);
        assert!(text(&replies[0]).contains("cc top [limit] [sortBy]"));
    }
}
