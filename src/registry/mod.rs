//! In-memory coin registry.
//!
//! The registry is the single source of truth queried by command handling.
//! It is populated by the periodic full refresh and incrementally patched
//! by streamed trade events. All data held here is raw market state from
//! the feed; formatting happens in the responder layer.

mod coin;
mod sort;
mod store;

pub use coin::{Coin, CoinUpdate};
pub use sort::SortKey;
pub use store::{Registry, RegistryHandle};
