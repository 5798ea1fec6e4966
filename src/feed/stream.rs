//! WebSocket subscription for streamed trade events.
//!
//! Each event embeds a partial coin payload which is merged into the
//! registry under the same rule as a full refresh. One malformed event
//! must never break the subscription: bad payloads are logged and
//! dropped. Connection loss is handled with exponential backoff.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, error, info, warn};

use crate::registry::{CoinUpdate, RegistryHandle};

/// Default WebSocket endpoint for the coincap trade feed.
pub const DEFAULT_WS_URL: &str = "wss://coincap.io/trades";

/// Initial reconnection backoff.
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Maximum reconnection backoff.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    #[error("Connection closed by server: {0}")]
    ConnectionClosed(String),
}

/// Persistent subscription to the trade push source.
pub struct TradeStream {
    url: String,
    registry: RegistryHandle,
    connection: Option<WebSocketStream<MaybeTlsStream<TcpStream>>>,
    current_backoff: Duration,
}

impl TradeStream {
    /// Creates a trade stream against the default endpoint.
    pub fn new(registry: RegistryHandle) -> Self {
        Self::with_url(DEFAULT_WS_URL.to_string(), registry)
    }

    /// Creates a trade stream against a custom endpoint.
    pub fn with_url(url: String, registry: RegistryHandle) -> Self {
        Self {
            url,
            registry,
            connection: None,
            current_backoff: INITIAL_BACKOFF,
        }
    }

    /// Runs the subscription for the lifetime of the process.
    ///
    /// Reconnects with exponential backoff whenever the connection drops.
    pub async fn run(mut self) {
        info!("TradeStream starting: {}", self.url);

        loop {
            match self.connect().await {
                Ok(()) => {
                    if let Err(e) = self.run_until_disconnect().await {
                        warn!("Trade stream disconnected: {}", e);
                    }
                }
                Err(e) => {
                    error!("Trade stream connection failed: {}", e);
                }
            }

            debug!(
                "Reconnecting trade stream in {}ms",
                self.current_backoff.as_millis()
            );
            tokio::time::sleep(self.current_backoff).await;
            self.current_backoff = std::cmp::min(self.current_backoff * 2, MAX_BACKOFF);
        }
    }

    /// Establishes the WebSocket connection.
    async fn connect(&mut self) -> Result<(), StreamError> {
        match connect_async(&self.url).await {
            Ok((ws_stream, _response)) => {
                info!("Trade stream connected");
                self.connection = Some(ws_stream);
                self.current_backoff = INITIAL_BACKOFF;
                Ok(())
            }
            Err(e) => Err(StreamError::ConnectionFailed(e.to_string())),
        }
    }

    /// Reads events until the connection is lost.
    async fn run_until_disconnect(&mut self) -> Result<(), StreamError> {
        loop {
            let conn = match self.connection.as_mut() {
                Some(conn) => conn,
                None => return Err(StreamError::ConnectionFailed("No connection".to_string())),
            };

            match conn.next().await {
                Some(Ok(Message::Text(text))) => {
                    self.handle_text(&text).await;
                }
                Some(Ok(Message::Ping(data))) => {
                    if let Some(conn) = self.connection.as_mut() {
                        let _ = conn.send(Message::Pong(data)).await;
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame
                        .map(|f| f.reason.to_string())
                        .unwrap_or_else(|| "Unknown".to_string());
                    return Err(StreamError::ConnectionClosed(reason));
                }
                Some(Ok(_)) => {
                    // Binary and pong frames carry nothing for us.
                }
                Some(Err(e)) => {
                    return Err(StreamError::ReceiveFailed(e.to_string()));
                }
                None => {
                    return Err(StreamError::ConnectionClosed("Stream ended".to_string()));
                }
            }
        }
    }

    /// Parses one text frame and merges the embedded coin payload.
    async fn handle_text(&self, text: &str) {
        let event: TradeEvent = match serde_json::from_str(text) {
            Ok(event) => event,
            Err(e) => {
                debug!("Non-trade message received: {} ({})", text, e);
                return;
            }
        };

        let update = match event.into_update() {
            Some(update) => update,
            None => {
                warn!("Trade event missing coin identity, dropped");
                return;
            }
        };

        self.registry.write().await.merge(&update);
    }
}

impl std::fmt::Debug for TradeStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradeStream")
            .field("url", &self.url)
            .field("connected", &self.connection.is_some())
            .finish()
    }
}

// ============ Message Types ============

/// A push notification carrying a partial coin update.
#[derive(Debug, Clone, Deserialize)]
struct TradeEvent {
    msg: TradeCoin,
}

/// The embedded coin payload. Everything beyond the ticker is optional;
/// absent fields leave the registry untouched.
#[derive(Debug, Clone, Deserialize)]
struct TradeCoin {
    short: Option<String>,
    long: Option<String>,
    price: Option<f64>,
    perc: Option<f64>,
    #[serde(rename = "cap24hrChange")]
    cap24hr_change: Option<super::rest::NumOrString>,
    volume: Option<f64>,
    mktcap: Option<f64>,
    supply: Option<f64>,
    #[serde(rename = "vwapData")]
    vwap_data: Option<f64>,
}

impl TradeEvent {
    /// Converts the event into a registry update, or `None` when the
    /// identity is missing (malformed event).
    fn into_update(self) -> Option<CoinUpdate> {
        let coin = self.msg;
        let short = coin.short?;

        Some(CoinUpdate {
            short,
            long: coin.long,
            rank: None,
            price: coin.price,
            perc: coin.perc,
            cap24hr_change: coin.cap24hr_change.map(|c| c.into_display()),
            volume: coin.volume,
            mktcap: coin.mktcap,
            supply: coin.supply,
            vwap: coin.vwap_data,
            btcgain: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_event_parses() {
        let json = r#"{"msg": {"short": "eth", "long": "ethereum", "price": 55.0}}"#;
        let event: TradeEvent = serde_json::from_str(json).unwrap();
        let update = event.into_update().unwrap();
        assert_eq!(update.short, "eth");
        assert_eq!(update.price, Some(55.0));
        assert_eq!(update.volume, None);
    }

    #[test]
    fn test_trade_event_without_identity_is_dropped() {
        let json = r#"{"msg": {"price": 55.0}}"#;
        let event: TradeEvent = serde_json::from_str(json).unwrap();
        assert!(event.into_update().is_none());
    }

    #[test]
    fn test_non_trade_payload_is_not_an_event() {
        assert!(serde_json::from_str::<TradeEvent>("{\"type\":\"hello\"}").is_err());
    }
}
