//! WebSocket transport using `tokio-tungstenite`.
//!
//! Split into two steps so the accept loop never blocks on a slow client:
//! [`WsListener::accept`] only takes the TCP connection, and the
//! WebSocket upgrade ([`WsConnection::upgrade`]) runs inside the
//! connection's own task.

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

use crate::TransportError;

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one accepted connection, for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub(crate) fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Listens for incoming TCP connections.
pub struct WsListener {
    listener: TcpListener,
}

impl WsListener {
    /// Binds to `addr`. Use port 0 to let the OS pick one.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "WebSocket listener bound");
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Waits for the next TCP connection.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr), TransportError> {
        self.listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)
    }
}

/// A single upgraded WebSocket connection.
///
/// Owned by exactly one handler task, which alternates between reading a
/// request and writing its response, so no locking is needed.
pub struct WsConnection {
    id: ConnectionId,
    ws: WebSocketStream<TcpStream>,
}

impl WsConnection {
    /// Performs the WebSocket handshake on an accepted TCP stream.
    pub async fn upgrade(
        stream: TcpStream,
        peer: SocketAddr,
    ) -> Result<Self, TransportError> {
        let ws = tokio_tungstenite::accept_async(stream)
            .await
            .map_err(TransportError::Handshake)?;
        let id = ConnectionId::next();
        tracing::debug!(%id, %peer, "accepted WebSocket connection");
        Ok(Self { id, ws })
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Receives the next data frame. Text and binary frames are both
    /// accepted; control frames are skipped. Returns `Ok(None)` once the
    /// peer closes.
    pub async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        loop {
            match self.ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_bytes().to_vec()));
                }
                Some(Ok(Message::Binary(data))) => return Ok(Some(data.into())),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // ping/pong/raw frame
                Some(Err(e)) => return Err(TransportError::ReceiveFailed(e)),
            }
        }
    }

    /// Sends one frame: text if `data` is UTF-8 (always the case for
    /// JSON), binary otherwise.
    pub async fn send(&mut self, data: Vec<u8>) -> Result<(), TransportError> {
        let msg = match String::from_utf8(data) {
            Ok(text) => Message::text(text),
            Err(e) => Message::binary(e.into_bytes()),
        };
        self.ws.send(msg).await.map_err(TransportError::SendFailed)
    }

    /// Sends a close frame. Errors are ignored: the peer may already be
    /// gone.
    pub async fn close(&mut self) {
        let _ = self.ws.close(None).await;
    }
}
