//! Coincap Slack Bot
//!
//! A chat bot that relays cryptocurrency prices from coincap into a
//! Slack channel on demand.
//!
//! # Architecture
//!
//! - **One registry**: Both feeds (periodic REST snapshot, live trade
//!   WebSocket) merge into a single in-memory coin registry
//! - **Silent by default**: Malformed commands and resolution misses
//!   produce no reply; the channel never sees bot error chatter
//! - **Crash to recover**: The liveness watchdog exits the process when
//!   the chat connection goes dead, deferring restarts to supervision
//!
//! # Usage
//!
//! ```no_run
//! use coincap_bot::commands::{parse, Dispatcher};
//! use coincap_bot::feed::CoinCapClient;
//! use coincap_bot::registry::Registry;
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = Registry::handle();
//!     let dispatcher = Dispatcher::new(registry, CoinCapClient::new());
//!
//!     if let Some(command) = parse("coincap top 5 volume") {
//!         let replies = dispatcher.dispatch(command).await;
//!         assert!(replies.is_empty()); // nothing ingested yet
//!     }
//! }
//! ```

pub mod chart;
pub mod commands;
pub mod config;
pub mod feed;
pub mod registry;
pub mod responder;
pub mod slack;
pub mod telemetry;

// Re-export commonly used types
pub use commands::{parse, Command, Dispatcher, Reply};
pub use config::BotConfig;
pub use registry::{Coin, Registry, RegistryHandle};
