//! Per-connection handler: welcome, decode loop, and dispatch.
//!
//! Each accepted connection gets its own tokio task running this
//! handler. The flow is:
//!   1. Assign a fresh player id and send `Welcome`
//!   2. Spawn the writer pump draining this player's outbound channel
//!   3. Loop: decode frames, dispatch events, drop what does not parse
//!
//! Messages that decode but fail game validation are dropped inside the
//! room actors; nothing about a rejection goes back on the wire.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use fadeline_protocol::{ClientMessage, JsonCodec, PROTOCOL_VERSION, PlayerId, ServerMessage};
use fadeline_room::PlayerSender;
use tokio::sync::mpsc;

use crate::ServerError;
use crate::server::ServerState;
use crate::ws::WsConnection;

/// Counter assigning player ids in connection order.
static NEXT_PLAYER_ID: AtomicU64 = AtomicU64::new(1);

/// Drop guard that sweeps a player out of both registries when the
/// handler exits. Cleanup happens even if the handler panics; since
/// `Drop` is synchronous, the async sweep runs in its own task.
struct DisconnectGuard {
    player: PlayerId,
    state: Arc<ServerState>,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        let player = self.player;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            state.peers.lock().await.unregister(player);
            state.rooms.lock().await.disconnect(player).await;
            tracing::info!(%player, "player swept after disconnect");
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WsConnection,
    state: Arc<ServerState>,
) -> Result<(), ServerError> {
    let player = PlayerId(NEXT_PLAYER_ID.fetch_add(1, Ordering::Relaxed));
    let (mut writer, mut reader) = conn.split();

    // Everything addressed to this player funnels through one channel,
    // whether it came from a room broadcast or a direct reply, so frames
    // reach the socket in delivery order.
    let (sender, mut outbound) = mpsc::unbounded_channel::<ServerMessage>();

    // Enqueued before the sender is shared anywhere, so Welcome is the
    // first frame on every connection.
    let _ = sender.send(ServerMessage::Welcome {
        player_id: player,
        version: PROTOCOL_VERSION,
    });

    state.peers.lock().await.register(player, sender.clone());
    let _guard = DisconnectGuard {
        player,
        state: Arc::clone(&state),
    };

    // Writer pump. Ends on its own once the disconnect sweep has removed
    // every clone of this player's sender.
    tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            let bytes = match JsonCodec.encode(&message) {
                Ok(bytes) => bytes,
                Err(err) => {
                    tracing::warn!(%player, error = %err, "failed to encode outbound message");
                    continue;
                }
            };
            if writer.send(bytes).await.is_err() {
                break;
            }
        }
    });

    tracing::info!(%player, "player connected");

    while let Some(frame) = reader.recv().await? {
        let message: ClientMessage = match state.codec.decode(&frame) {
            Ok(message) => message,
            Err(err) => {
                tracing::debug!(%player, error = %err, "dropping undecodable frame");
                continue;
            }
        };
        dispatch(&state, player, &sender, message).await;
    }

    tracing::info!(%player, "connection closed");
    Ok(())
}

async fn dispatch(
    state: &Arc<ServerState>,
    player: PlayerId,
    sender: &PlayerSender,
    message: ClientMessage,
) {
    match message {
        ClientMessage::GetRoomCounts => {
            let counts = state.rooms.lock().await.counts().await;
            let _ = sender.send(ServerMessage::RoomCounts { counts });
        }

        ClientMessage::JoinRoom { room } => {
            let result = {
                let mut rooms = state.rooms.lock().await;
                rooms.join(&room, player, sender.clone()).await
            };
            if let Err(err) = result {
                tracing::warn!(%player, room = %room, error = %err, "join failed");
            }
        }

        ClientMessage::Chat { text, room } => {
            // An empty room name targets every connection, lobby style.
            // A named room that does not exist swallows the line.
            if room.is_empty() {
                state
                    .peers
                    .lock()
                    .await
                    .broadcast(ServerMessage::Chat { text });
                return;
            }
            let result = {
                let rooms = state.rooms.lock().await;
                rooms.chat(&room, player, text).await
            };
            if let Err(err) = result {
                tracing::debug!(%player, room = %room, error = %err, "chat dropped");
            }
        }

        ClientMessage::MakeMove { room, cell } => {
            let result = {
                let rooms = state.rooms.lock().await;
                rooms.make_move(&room, player, cell).await
            };
            if let Err(err) = result {
                tracing::debug!(%player, room = %room, cell, error = %err, "move dropped");
            }
        }

        ClientMessage::PlayRps { room, choice } => {
            let result = {
                let rooms = state.rooms.lock().await;
                rooms.play_rps(&room, player, choice).await
            };
            if let Err(err) = result {
                tracing::debug!(%player, room = %room, error = %err, "tiebreak choice dropped");
            }
        }
    }
}
