//! WebSocket plumbing over `tokio-tungstenite`.
//!
//! The listener accepts TCP connections and completes the websocket
//! upgrade; each accepted connection is split into independent read and
//! write halves so room broadcasts can be pumped out while the read
//! loop sits on the next client frame.

use std::net::SocketAddr;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

use crate::ServerError;

type WsStream = WebSocketStream<TcpStream>;

/// Listens for incoming websocket connections.
pub struct WsListener {
    listener: TcpListener,
}

impl WsListener {
    /// Binds the listen socket.
    pub async fn bind(addr: &str) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr).await.map_err(ServerError::Bind)?;
        tracing::info!(addr, "listening for websocket connections");
        Ok(WsListener { listener })
    }

    /// The bound address; useful after binding port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts one connection and completes the websocket upgrade.
    pub async fn accept(&self) -> Result<(WsConnection, SocketAddr), ServerError> {
        let (stream, addr) = self.listener.accept().await.map_err(ServerError::Accept)?;
        let ws = tokio_tungstenite::accept_async(stream)
            .await
            .map_err(ServerError::Handshake)?;
        Ok((WsConnection { ws }, addr))
    }
}

/// One accepted websocket connection, not yet split.
pub struct WsConnection {
    ws: WsStream,
}

impl WsConnection {
    /// Splits into a write half and a read half.
    pub fn split(self) -> (WsWriter, WsReader) {
        let (sink, stream) = self.ws.split();
        (WsWriter { sink }, WsReader { stream })
    }
}

/// Write half of a connection.
pub struct WsWriter {
    sink: SplitSink<WsStream, Message>,
}

impl WsWriter {
    /// Sends one binary frame.
    pub async fn send(&mut self, data: Vec<u8>) -> Result<(), ServerError> {
        self.sink
            .send(Message::Binary(data.into()))
            .await
            .map_err(ServerError::Send)
    }
}

/// Read half of a connection.
pub struct WsReader {
    stream: SplitStream<WsStream>,
}

impl WsReader {
    /// Next data frame as raw bytes. Text and binary frames are both
    /// accepted; `None` means the peer closed the connection.
    pub async fn recv(&mut self) -> Result<Option<Vec<u8>>, ServerError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Binary(data))) => return Ok(Some(data.into())),
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_bytes().to_vec()));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // skip ping/pong/frame
                Some(Err(e)) => return Err(ServerError::Receive(e)),
            }
        }
    }
}
