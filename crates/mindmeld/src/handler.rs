//! Per-connection handler: decode, dispatch, respond.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Upgrade the TCP stream to a WebSocket
//!   2. Loop: receive a frame → decode a `Request` → validate into a
//!      `Command` → run it on the `LobbyService` → send one `Response`
//!   3. When the peer closes or the socket errors, mark every lobby seat
//!      this connection spoke for as disconnected. An idle timeout closes
//!      the socket but leaves presence alone.

use std::net::SocketAddr;
use std::sync::Arc;

use mindmeld_lobby::LobbyError;
use mindmeld_protocol::{
    Codec, Command, LobbyCode, Millis, PlayerId, ProtocolError, Request, Response,
};
use tokio::net::TcpStream;

use crate::MindmeldError;
use crate::server::ServerState;
use crate::ws::{ConnectionId, WsConnection};

/// Message sent for any fault that isn't the client's doing.
pub(crate) const INTERNAL_ERROR: &str = "internal server error";

/// A lobby seat this connection has acted as.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Seat {
    code: LobbyCode,
    player_id: PlayerId,
    /// The player's `last_seen` as of this connection's latest request.
    seen_at: Millis,
}

/// Releases a connection's lobby seats once its handler is gone.
///
/// Each seat is marked disconnected unless the player has been seen
/// since this connection last spoke for them, which means they are
/// already back on another socket. The release runs on a spawned task
/// because the service lock is async.
struct PresenceGuard<C: Codec> {
    conn_id: ConnectionId,
    seats: Vec<Seat>,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> PresenceGuard<C> {
    fn track(&mut self, code: LobbyCode, player_id: PlayerId, seen_at: Millis) {
        match self
            .seats
            .iter_mut()
            .find(|seat| seat.code == code && seat.player_id == player_id)
        {
            Some(seat) => seat.seen_at = seen_at,
            None => self.seats.push(Seat {
                code,
                player_id,
                seen_at,
            }),
        }
    }

    /// Forgets every seat, so dropping the guard changes nothing.
    fn forget(&mut self) {
        self.seats.clear();
    }
}

impl<C: Codec> Drop for PresenceGuard<C> {
    fn drop(&mut self) {
        if self.seats.is_empty() {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let conn_id = self.conn_id;
        let seats = std::mem::take(&mut self.seats);
        let state = Arc::clone(&self.state);
        runtime.spawn(async move {
            for Seat {
                code,
                player_id,
                seen_at,
            } in seats
            {
                if state.service.release_seat(&code, &player_id, seen_at).await {
                    tracing::debug!(%conn_id, %code, %player_id, "marked disconnected on close");
                }
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    stream: TcpStream,
    peer: SocketAddr,
    state: Arc<ServerState<C>>,
) -> Result<(), MindmeldError> {
    let mut conn = WsConnection::upgrade(stream, peer).await?;
    let conn_id = conn.id();

    let mut guard = PresenceGuard {
        conn_id,
        seats: Vec::new(),
        state: Arc::clone(&state),
    };

    loop {
        let data = match tokio::time::timeout(state.idle_timeout, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
            Err(_) => {
                tracing::info!(%conn_id, "connection idle, closing");
                guard.forget();
                conn.close().await;
                break;
            }
        };

        let response = respond(&state, &mut guard, &data).await;
        let bytes = encode_response(&state.codec, &response)?;
        conn.send(bytes).await?;
    }

    // guard drops here and releases whatever seats it still holds.
    Ok(())
}

/// Turns one inbound frame into exactly one response.
async fn respond<C: Codec>(
    state: &ServerState<C>,
    guard: &mut PresenceGuard<C>,
    data: &[u8],
) -> Response {
    let conn_id = guard.conn_id;
    let command = match decode_command(&state.codec, data) {
        Ok(command) => command,
        Err(e) => {
            tracing::debug!(%conn_id, error = %e, "rejected malformed request");
            return error_response(&LobbyError::from(e));
        }
    };

    let name = command.name();
    let player_id = command.player_id().clone();
    let target = command.lobby_code().cloned();

    match state.service.execute(command).await {
        Ok(response) => {
            let code = target.or_else(|| response.lobby_code.clone());
            let seen_at = response
                .lobby
                .as_ref()
                .and_then(|lobby| lobby.players.iter().find(|p| p.id == player_id))
                .map(|p| p.last_seen);
            if let (Some(code), Some(seen_at)) = (code, seen_at) {
                guard.track(code, player_id, seen_at);
            }
            response
        }
        Err(err) => {
            tracing::debug!(%conn_id, command = name, %player_id, error = %err, "request failed");
            error_response(&err)
        }
    }
}

fn decode_command<C: Codec>(codec: &C, data: &[u8]) -> Result<Command, ProtocolError> {
    let request: Request = codec.decode(data)?;
    Command::try_from(request)
}

fn error_response(err: &LobbyError) -> Response {
    Response::error(err.status_code(), err.to_string())
}

/// Encodes a response. If that fails the client still gets an answer: an
/// opaque 500, with the real cause only in the server log.
fn encode_response<C: Codec>(codec: &C, response: &Response) -> Result<Vec<u8>, MindmeldError> {
    match codec.encode(response) {
        Ok(bytes) => Ok(bytes),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode response");
            Ok(codec.encode(&Response::error(500, INTERNAL_ERROR))?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use mindmeld_lobby::{LobbyConfig, LobbyRegistry};
    use mindmeld_protocol::JsonCodec;

    use crate::LobbyService;

    fn guard() -> PresenceGuard<JsonCodec> {
        PresenceGuard {
            conn_id: ConnectionId::next(),
            seats: Vec::new(),
            state: Arc::new(ServerState {
                service: LobbyService::new(LobbyRegistry::new(LobbyConfig::default())),
                codec: JsonCodec,
                idle_timeout: Duration::from_secs(60),
            }),
        }
    }

    #[test]
    fn test_track_same_seat_refreshes_seen_at() {
        let mut guard = guard();
        guard.track(LobbyCode::new("ABC123"), PlayerId::new("p1"), 1_000);
        guard.track(LobbyCode::new("ABC123"), PlayerId::new("p1"), 4_000);
        guard.track(LobbyCode::new("ABC123"), PlayerId::new("p2"), 2_000);

        assert_eq!(guard.seats.len(), 2);
        assert_eq!(guard.seats[0].seen_at, 4_000);
        assert_eq!(guard.seats[1].player_id, PlayerId::new("p2"));
    }

    #[test]
    fn test_forget_leaves_nothing_to_release() {
        let mut guard = guard();
        guard.track(LobbyCode::new("ABC123"), PlayerId::new("p1"), 1_000);
        guard.forget();
        assert!(guard.seats.is_empty());
    }

    #[test]
    fn test_decode_command_missing_field_maps_to_validation() {
        let err = decode_command(&JsonCodec, br#"{"type":"StartGame","playerId":"p1"}"#)
            .unwrap_err();
        let response = error_response(&LobbyError::from(err));
        assert_eq!(response.code, Some(400));
        assert_eq!(response.error.as_deref(), Some("validation failed: lobbyCode is required"));
    }

    #[test]
    fn test_decode_command_garbage_is_400() {
        let err = decode_command(&JsonCodec, b"{{{").unwrap_err();
        assert_eq!(LobbyError::from(err).status_code(), 400);
    }

    #[test]
    fn test_encode_response_is_json() {
        let bytes = encode_response(&JsonCodec, &Response::error(403, "nope")).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains(r#""success":false"#));
        assert!(text.contains(r#""code":403"#));
    }
}
