//! Server wiring: bind, accept, and spawn per-connection handlers.

use std::sync::Arc;

use fadeline_engine::GameEngine;
use fadeline_protocol::JsonCodec;
use fadeline_room::RoomRegistry;
use tokio::sync::Mutex;

use crate::ServerError;
use crate::config::ServerConfig;
use crate::handler::handle_connection;
use crate::peers::PeerRegistry;
use crate::ws::WsListener;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks, with
/// interior mutability via `Mutex` where needed.
pub(crate) struct ServerState {
    pub(crate) rooms: Mutex<RoomRegistry>,
    pub(crate) peers: Mutex<PeerRegistry>,
    pub(crate) codec: JsonCodec,
}

/// A bound fadeline server, ready to accept connections.
pub struct Server {
    listener: WsListener,
    state: Arc<ServerState>,
}

impl Server {
    /// Validates the configuration and binds the listen socket.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let game = config.game.validated().map_err(ServerError::Config)?;
        let listener = WsListener::bind(&config.bind_addr).await?;
        let state = Arc::new(ServerState {
            rooms: Mutex::new(RoomRegistry::new(GameEngine::new(game))),
            peers: Mutex::new(PeerRegistry::new()),
            codec: JsonCodec,
        });
        Ok(Server { listener, state })
    }

    /// The bound listen address; useful after binding port 0.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("fadeline server running");
        loop {
            match self.listener.accept().await {
                Ok((conn, addr)) => {
                    tracing::debug!(%addr, "accepted websocket connection");
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(err) = handle_connection(conn, state).await {
                            tracing::debug!(error = %err, "connection ended with error");
                        }
                    });
                }
                Err(err) => {
                    tracing::error!(error = %err, "accept failed");
                }
            }
        }
    }
}
