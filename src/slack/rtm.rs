//! RTM socket: the inbound message stream.
//!
//! Opens a session via `rtm.connect` and reads events off the WebSocket.
//! Connection loss is absorbed here with exponential backoff; callers
//! just see an endless stream of events.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info, warn};

use super::client::SlackClient;
use super::events::InboundEvent;

/// Initial reconnection backoff.
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Maximum reconnection backoff.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Persistent inbound event socket.
pub struct RtmSocket {
    client: SlackClient,
    connection: Option<WebSocketStream<MaybeTlsStream<TcpStream>>>,
    current_backoff: Duration,
}

impl RtmSocket {
    pub fn new(client: SlackClient) -> Self {
        Self {
            client,
            connection: None,
            current_backoff: INITIAL_BACKOFF,
        }
    }

    /// Returns the next inbound event, reconnecting as needed. Only
    /// resolves once an event arrives; transport noise never surfaces.
    pub async fn next_event(&mut self) -> InboundEvent {
        loop {
            if self.connection.is_none() {
                self.connect().await;
            }

            let conn = match self.connection.as_mut() {
                Some(conn) => conn,
                None => continue,
            };

            match conn.next().await {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<InboundEvent>(&text) {
                        Ok(event) => return event,
                        Err(e) => {
                            debug!("Unparseable RTM payload: {} ({})", text, e);
                        }
                    }
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
                    warn!("RTM socket closed by server: {}", reason);
                    self.connection = None;
                }
                Some(Ok(_)) => {
                    // Binary and pong frames are ignored.
                }
                Some(Err(e)) => {
                    warn!("RTM receive error: {}", e);
                    self.connection = None;
                }
                None => {
                    warn!("RTM stream ended");
                    self.connection = None;
                }
            }
        }
    }

    /// Connects (or reconnects) with exponential backoff until a session
    /// is established.
    async fn connect(&mut self) {
        loop {
            match self.try_connect().await {
                Ok(()) => {
                    self.current_backoff = INITIAL_BACKOFF;
                    return;
                }
                Err(e) => {
                    warn!(
                        "RTM connect failed: {} - retrying in {}ms",
                        e,
                        self.current_backoff.as_millis()
                    );
                    tokio::time::sleep(self.current_backoff).await;
                    self.current_backoff =
                        std::cmp::min(self.current_backoff * 2, MAX_BACKOFF);
                }
            }
        }
    }

    async fn try_connect(&mut self) -> Result<(), String> {
        let url = self.client.rtm_connect().await.map_err(|e| e.to_string())?;

        let (ws_stream, _response) = connect_async(&url).await.map_err(|e| e.to_string())?;

        info!("RTM socket connected");
        self.connection = Some(ws_stream);
        Ok(())
    }
}

impl std::fmt::Debug for RtmSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RtmSocket")
            .field("connected", &self.connection.is_some())
            .finish()
    }
}
