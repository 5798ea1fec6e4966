//! Feed ingestion for the coincap upstream.
//!
//! Two acquisition paths write into the registry: a periodic full-snapshot
//! fetch over REST and a persistent trade-event subscription over
//! WebSocket. Both paths are untrusted data sources with a defined shape;
//! everything they produce is normalized into `CoinUpdate`s before it
//! touches the registry.

mod rest;
mod stream;

pub use rest::{refresh_all, run_refresh_loop, CoinCapClient, FeedError, DEFAULT_API_URL};
pub use stream::{TradeStream, DEFAULT_WS_URL};
