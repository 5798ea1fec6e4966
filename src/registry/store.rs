//! Registry storage: identifier -> coin mapping plus the rank index.
//!
//! Every coin is reachable under exactly two keys, its lowercased ticker
//! and its lowercased full name, and both keys always resolve to the same
//! latest fields. Entries are never deleted: delisted coins simply go
//! stale. That is accepted behavior, not a bug.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::coin::{Coin, CoinUpdate};

/// Shared handle to the registry.
///
/// All mutation goes through the single coarse write lock so each merge
/// stays a short atomic sequence of field assignments, matching the
/// cooperative-scheduling model the bot was designed around.
pub type RegistryHandle = Arc<RwLock<Registry>>;

/// In-memory identifier -> coin mapping plus rank index.
#[derive(Debug, Default)]
pub struct Registry {
    coins: HashMap<String, Coin>,
    /// `ranks[n]` is the short key of the coin at rank n (1-based, index 0
    /// unused and left empty).
    ranks: Vec<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fresh shared handle around an empty registry.
    pub fn handle() -> RegistryHandle {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Merges a partial update into the registry.
    ///
    /// The update is applied under both identity keys. When the update
    /// carries no full name, the previously known name (if any) locates
    /// the second key so the two entries never drift apart.
    pub fn merge(&mut self, update: &CoinUpdate) {
        let short_key = update.short.to_lowercase();

        let long_key = update
            .long
            .as_ref()
            .map(|l| l.to_lowercase())
            .or_else(|| {
                self.coins
                    .get(&short_key)
                    .filter(|c| !c.long.is_empty())
                    .map(|c| c.long.clone())
            });

        self.coins
            .entry(short_key.clone())
            .or_default()
            .apply(update);

        if let Some(long_key) = long_key.filter(|k| *k != short_key) {
            let merged = self.coins[&short_key].clone();
            self.coins.insert(long_key, merged);
        }
    }

    /// Swaps in a freshly built rank index. Index 0 is the unused slot.
    pub fn replace_ranks(&mut self, ranks: Vec<String>) {
        self.ranks = ranks;
    }

    /// Looks up a coin by either identity key, case-insensitively.
    pub fn get(&self, ident: &str) -> Option<&Coin> {
        self.coins.get(&ident.to_lowercase())
    }

    /// Looks up the coin at the given 1-based rank.
    pub fn get_by_rank(&self, rank: usize) -> Option<&Coin> {
        let key = self.ranks.get(rank)?;
        self.coins.get(key)
    }

    /// Snapshot of every entry, both keys included. The table pipeline
    /// relies on each coin appearing once per key here.
    pub fn all_entries(&self) -> Vec<Coin> {
        self.coins.values().cloned().collect()
    }

    /// Number of entries (counting both keys).
    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }
}
