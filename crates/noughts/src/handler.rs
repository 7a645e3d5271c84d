//! Per-connection handler: decode frames, dispatch requests, reply.
//!
//! Each accepted connection gets its own Tokio task running this loop:
//!   1. Receive a frame (or give up after the idle timeout)
//!   2. Decode it into an [`Envelope`]; undecodable frames get a
//!      `DecodeError` reply and the loop continues
//!   3. Dispatch requests to the registry, answer heartbeats, stop on
//!      `Disconnect`

use std::sync::Arc;
use std::time::Instant;

use noughts_protocol::{Codec, Envelope, ErrorKind, Payload, ProtocolError, SystemMessage};
use noughts_transport::{Connection, WebSocketConnection};

use crate::NoughtsError;
use crate::dispatch::dispatch;
use crate::server::ServerState;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), NoughtsError> {
    let conn_id = conn.id();
    let start = Instant::now();
    tracing::debug!(%conn_id, peer = ?conn.peer_addr(), "handling new connection");

    loop {
        let data = match tokio::time::timeout(state.idle_timeout, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                return Ok(());
            }
            Ok(Err(e)) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                return Ok(());
            }
            Err(_) => {
                tracing::info!(%conn_id, "connection idle, closing");
                break;
            }
        };

        let envelope: Envelope = match state.codec.decode(&data) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode envelope");
                let reply = SystemMessage::error(ErrorKind::DecodeError, e.to_string());
                send(&conn, &state.codec, 0, &start, Payload::System(reply)).await?;
                continue;
            }
        };
        let seq = envelope.seq;

        match envelope.payload {
            Payload::Request(request) => {
                let operation = request.operation();
                let reply = match dispatch(&state.registry, request).await {
                    Ok(response) => Payload::Response(response),
                    Err(e) => {
                        tracing::debug!(%conn_id, operation, error = %e, "request rejected");
                        Payload::System(SystemMessage::error(e.kind(), e.to_string()))
                    }
                };
                send(&conn, &state.codec, seq, &start, reply).await?;
            }

            Payload::System(SystemMessage::Heartbeat { client_time }) => {
                let ack = SystemMessage::HeartbeatAck {
                    client_time,
                    server_time: millis_since(&start),
                };
                send(&conn, &state.codec, seq, &start, Payload::System(ack)).await?;
            }

            Payload::System(SystemMessage::Disconnect { reason }) => {
                tracing::info!(%conn_id, %reason, "client disconnected");
                break;
            }

            // Server-to-client messages arriving from a client.
            Payload::Response(_) | Payload::System(_) => {
                tracing::debug!(%conn_id, seq, "ignoring unexpected message");
                let err = ProtocolError::InvalidMessage(
                    "clients may only send Request, Heartbeat or Disconnect".into(),
                );
                let reply = SystemMessage::error(ErrorKind::DecodeError, err.to_string());
                send(&conn, &state.codec, seq, &start, Payload::System(reply)).await?;
            }
        }
    }

    if let Err(e) = conn.close().await {
        tracing::debug!(%conn_id, error = %e, "close failed");
    }
    Ok(())
}

/// Wraps `payload` in an envelope and sends it.
async fn send(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    seq: u64,
    start: &Instant,
    payload: Payload,
) -> Result<(), NoughtsError> {
    let envelope = Envelope {
        seq,
        timestamp: millis_since(start),
        payload,
    };
    let bytes = codec.encode(&envelope)?;
    conn.send(&bytes).await?;
    Ok(())
}

fn millis_since(start: &Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
