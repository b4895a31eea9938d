//! End-to-end tests over real websocket connections.

use std::time::Duration;

use fadeline_engine::{GameConfig, LOSE_TEXT, WIN_TEXT};
use fadeline_protocol::{
    ClientMessage, Mark, PROTOCOL_VERSION, PlayerId, RpsChoice, ServerMessage,
};
use fadeline_server::{Server, ServerConfig};
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server on a random port and returns its address.
async fn start_server(game: GameConfig) -> String {
    let config = ServerConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        game,
    };
    let server = Server::bind(config).await.expect("server should bind");
    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    addr
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

fn frame(message: &ClientMessage) -> Message {
    Message::Binary(serde_json::to_vec(message).expect("encode").into())
}

async fn recv(ws: &mut ClientWs) -> ServerMessage {
    let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
        .await
        .expect("timed out waiting for a frame")
        .expect("stream ended")
        .expect("websocket error");
    serde_json::from_slice(&msg.into_data()).expect("decode")
}

/// Connects and consumes the welcome, returning the assigned id.
async fn connect_player(addr: &str) -> (ClientWs, PlayerId) {
    let mut ws = connect(addr).await;
    match recv(&mut ws).await {
        ServerMessage::Welcome { player_id, version } => {
            assert_eq!(version, PROTOCOL_VERSION);
            (ws, player_id)
        }
        other => panic!("expected Welcome, got {other:?}"),
    }
}

/// Reads frames until a chat line arrives, returning the messages seen
/// on the way and the chat text.
async fn recv_until_chat(ws: &mut ClientWs) -> (Vec<ServerMessage>, String) {
    let mut seen = Vec::new();
    loop {
        match recv(ws).await {
            ServerMessage::Chat { text } => return (seen, text),
            other => seen.push(other),
        }
    }
}

/// Joins both players into `room` and settles the tiebreak so the first
/// returned player opens the game.
async fn seated_pair(
    addr: &str,
    room: &str,
) -> ((ClientWs, PlayerId), (ClientWs, PlayerId)) {
    let (mut ws1, p1) = connect_player(addr).await;
    let (mut ws2, p2) = connect_player(addr).await;

    ws1.send(frame(&ClientMessage::JoinRoom {
        room: room.to_string(),
    }))
    .await
    .expect("join");
    let _ = recv(&mut ws1).await; // own join state

    ws2.send(frame(&ClientMessage::JoinRoom {
        room: room.to_string(),
    }))
    .await
    .expect("join");
    let _ = recv(&mut ws1).await; // second join state
    let _ = recv(&mut ws2).await;

    ws1.send(frame(&ClientMessage::PlayRps {
        room: room.to_string(),
        choice: RpsChoice::Rock,
    }))
    .await
    .expect("rps");
    ws2.send(frame(&ClientMessage::PlayRps {
        room: room.to_string(),
        choice: RpsChoice::Scissors,
    }))
    .await
    .expect("rps");
    let _ = recv(&mut ws1).await; // resolution state
    let _ = recv(&mut ws2).await;

    ((ws1, p1), (ws2, p2))
}

// =========================================================================
// Connection basics
// =========================================================================

#[tokio::test]
async fn test_welcome_arrives_first() {
    let addr = start_server(GameConfig::default()).await;
    let mut ws = connect(&addr).await;

    match recv(&mut ws).await {
        ServerMessage::Welcome { version, .. } => assert_eq!(version, PROTOCOL_VERSION),
        other => panic!("expected Welcome, got {other:?}"),
    }
}

#[tokio::test]
async fn test_each_connection_gets_its_own_id() {
    let addr = start_server(GameConfig::default()).await;
    let (_ws1, p1) = connect_player(&addr).await;
    let (_ws2, p2) = connect_player(&addr).await;

    assert_ne!(p1, p2);
}

#[tokio::test]
async fn test_undecodable_frames_are_dropped_silently() {
    let addr = start_server(GameConfig::default()).await;
    let (mut ws, _) = connect_player(&addr).await;

    ws.send(Message::Binary(b"not json".to_vec().into()))
        .await
        .expect("send");
    ws.send(Message::text(r#"{"type":"Flarp"}"#)).await.expect("send");

    // The connection survives; the next real request is answered.
    ws.send(frame(&ClientMessage::GetRoomCounts)).await.expect("send");
    match recv(&mut ws).await {
        ServerMessage::RoomCounts { counts } => assert!(counts.is_empty()),
        other => panic!("expected room counts, got {other:?}"),
    }
}

// =========================================================================
// Rooms over the wire
// =========================================================================

#[tokio::test]
async fn test_join_room_broadcasts_state() {
    let addr = start_server(GameConfig::default()).await;
    let (mut ws1, p1) = connect_player(&addr).await;
    let (mut ws2, p2) = connect_player(&addr).await;

    ws1.send(frame(&ClientMessage::JoinRoom {
        room: "lobby".into(),
    }))
    .await
    .expect("join");
    match recv(&mut ws1).await {
        ServerMessage::GameState { state } => {
            assert_eq!(state.players, vec![p1]);
            assert_eq!(state.board.len(), 25);
            assert_eq!(state.turn, 0);
        }
        other => panic!("expected a state broadcast, got {other:?}"),
    }

    ws2.send(frame(&ClientMessage::JoinRoom {
        room: "lobby".into(),
    }))
    .await
    .expect("join");
    for ws in [&mut ws1, &mut ws2] {
        match recv(ws).await {
            ServerMessage::GameState { state } => {
                assert_eq!(state.players, vec![p1, p2]);
            }
            other => panic!("expected a state broadcast, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_room_counts_enumerate_live_rooms() {
    let addr = start_server(GameConfig::default()).await;
    let (mut ws1, _) = connect_player(&addr).await;
    let (mut ws2, _) = connect_player(&addr).await;

    ws1.send(frame(&ClientMessage::JoinRoom {
        room: "alpha".into(),
    }))
    .await
    .expect("join");
    let _ = recv(&mut ws1).await;

    ws2.send(frame(&ClientMessage::GetRoomCounts)).await.expect("send");
    match recv(&mut ws2).await {
        ServerMessage::RoomCounts { counts } => {
            assert_eq!(counts.len(), 1);
            assert_eq!(counts.get("alpha"), Some(&1));
        }
        other => panic!("expected room counts, got {other:?}"),
    }
}

#[tokio::test]
async fn test_chat_relays_inside_the_room_only() {
    let addr = start_server(GameConfig::default()).await;
    let (mut ws1, _) = connect_player(&addr).await;
    let (mut ws2, _) = connect_player(&addr).await;
    let (mut ws3, _) = connect_player(&addr).await;

    ws1.send(frame(&ClientMessage::JoinRoom { room: "cafe".into() }))
        .await
        .expect("join");
    let _ = recv(&mut ws1).await;
    ws2.send(frame(&ClientMessage::JoinRoom { room: "cafe".into() }))
        .await
        .expect("join");
    let _ = recv(&mut ws1).await;
    let _ = recv(&mut ws2).await;

    ws1.send(frame(&ClientMessage::Chat {
        text: "anyone here?".into(),
        room: "cafe".into(),
    }))
    .await
    .expect("chat");

    for ws in [&mut ws1, &mut ws2] {
        match recv(ws).await {
            ServerMessage::Chat { text } => assert_eq!(text, "anyone here?"),
            other => panic!("expected the chat relay, got {other:?}"),
        }
    }

    // The bystander heard nothing; their next frame is the counts reply.
    ws3.send(frame(&ClientMessage::GetRoomCounts)).await.expect("send");
    assert!(matches!(
        recv(&mut ws3).await,
        ServerMessage::RoomCounts { .. }
    ));
}

#[tokio::test]
async fn test_chat_outside_any_room_reaches_all_peers() {
    let addr = start_server(GameConfig::default()).await;
    let (mut ws1, _) = connect_player(&addr).await;
    let (mut ws2, _) = connect_player(&addr).await;

    // No `room` field at all: it decodes with an empty room name, so the
    // line goes out to every connection instead of one room.
    ws1.send(Message::text(r#"{"type":"Chat","text":"hello all"}"#))
        .await
        .expect("send");

    for ws in [&mut ws1, &mut ws2] {
        match recv(ws).await {
            ServerMessage::Chat { text } => assert_eq!(text, "hello all"),
            other => panic!("expected the lobby chat, got {other:?}"),
        }
    }
}

// =========================================================================
// Game flow over the wire
// =========================================================================

#[tokio::test]
async fn test_full_game_over_websocket() {
    let addr = start_server(GameConfig::grid_five()).await;
    let ((mut ws1, p1), (mut ws2, _p2)) = seated_pair(&addr, "duel").await;

    // Lockstep: wait for each move's broadcast on both sockets before
    // the next move goes out, so cross-socket ordering is fixed.
    for (who, cell) in [(1u8, 0usize), (2, 5), (1, 1), (2, 6), (1, 2), (2, 7)] {
        {
            let ws = if who == 1 { &mut ws1 } else { &mut ws2 };
            ws.send(frame(&ClientMessage::MakeMove {
                room: "duel".into(),
                cell,
            }))
            .await
            .expect("move");
        }
        assert!(matches!(recv(&mut ws1).await, ServerMessage::GameState { .. }));
        assert!(matches!(recv(&mut ws2).await, ServerMessage::GameState { .. }));
    }

    // The winning move: player 1 completes the top row.
    ws1.send(frame(&ClientMessage::MakeMove {
        room: "duel".into(),
        cell: 3,
    }))
    .await
    .expect("move");

    match recv(&mut ws1).await {
        ServerMessage::GameState { state } => {
            assert_eq!(state.board[3], Some(Mark::X));
            assert_eq!(state.turn, 7);
            assert_eq!(state.players[0], p1);
        }
        other => panic!("expected the winning state, got {other:?}"),
    }
    match recv(&mut ws1).await {
        ServerMessage::Chat { text } => assert_eq!(text, WIN_TEXT),
        other => panic!("expected the verdict, got {other:?}"),
    }

    let _ = recv(&mut ws2).await; // the same state broadcast
    match recv(&mut ws2).await {
        ServerMessage::Chat { text } => assert_eq!(text, LOSE_TEXT),
        other => panic!("expected the verdict, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rejected_moves_produce_no_reply() {
    let addr = start_server(GameConfig::grid_five()).await;
    let ((mut ws1, _), (mut ws2, _)) = seated_pair(&addr, "duel").await;

    // Not player 2's turn; the server must stay quiet on both sockets.
    ws2.send(frame(&ClientMessage::MakeMove {
        room: "duel".into(),
        cell: 0,
    }))
    .await
    .expect("move");

    let quiet = tokio::time::timeout(Duration::from_millis(200), ws1.next()).await;
    assert!(quiet.is_err(), "a rejected move must not produce traffic");
    let quiet = tokio::time::timeout(Duration::from_millis(200), ws2.next()).await;
    assert!(quiet.is_err(), "a rejected move must not echo to the sender");
}

#[tokio::test]
async fn test_spectator_receives_broadcasts() {
    let addr = start_server(GameConfig::grid_five()).await;
    let ((mut ws1, _), (mut ws2, _)) = seated_pair(&addr, "duel").await;
    let (mut ws3, _) = connect_player(&addr).await;

    ws3.send(frame(&ClientMessage::JoinRoom { room: "duel".into() }))
        .await
        .expect("join");
    let _ = recv(&mut ws1).await; // three-player state
    let _ = recv(&mut ws2).await;
    let _ = recv(&mut ws3).await;

    ws1.send(frame(&ClientMessage::MakeMove {
        room: "duel".into(),
        cell: 12,
    }))
    .await
    .expect("move");

    match recv(&mut ws3).await {
        ServerMessage::GameState { state } => {
            assert_eq!(state.board[12], Some(Mark::X));
            assert_eq!(state.players.len(), 3);
        }
        other => panic!("expected the move broadcast, got {other:?}"),
    }
}

// =========================================================================
// Disconnects
// =========================================================================

#[tokio::test]
async fn test_disconnect_destroys_an_abandoned_room() {
    let addr = start_server(GameConfig::default()).await;
    let (mut ws1, _) = connect_player(&addr).await;
    let (mut ws2, _) = connect_player(&addr).await;

    ws1.send(frame(&ClientMessage::JoinRoom { room: "solo".into() }))
        .await
        .expect("join");
    let _ = recv(&mut ws1).await;

    ws1.close(None).await.expect("close");
    tokio::time::sleep(Duration::from_millis(100)).await;

    ws2.send(frame(&ClientMessage::GetRoomCounts)).await.expect("send");
    match recv(&mut ws2).await {
        ServerMessage::RoomCounts { counts } => assert!(counts.is_empty()),
        other => panic!("expected room counts, got {other:?}"),
    }
}

#[tokio::test]
async fn test_disconnect_mid_game_notifies_the_peer() {
    let addr = start_server(GameConfig::grid_five()).await;
    let ((ws1, _p1), (mut ws2, p2)) = seated_pair(&addr, "duel").await;

    drop(ws1); // abrupt close, no goodbye frame

    match recv(&mut ws2).await {
        ServerMessage::GameState { state } => assert_eq!(state.players, vec![p2]),
        other => panic!("expected the shrunk room, got {other:?}"),
    }
}

// =========================================================================
// Turn timer
// =========================================================================

#[tokio::test]
async fn test_turn_timer_fires_over_websocket() {
    let game = GameConfig::grid_four().with_turn_timeout(Some(Duration::from_millis(200)));
    let addr = start_server(game).await;
    let ((mut ws1, _), (mut ws2, _)) = seated_pair(&addr, "duel").await;

    for (who, cell) in [(1u8, 0usize), (2, 4)] {
        {
            let ws = if who == 1 { &mut ws1 } else { &mut ws2 };
            ws.send(frame(&ClientMessage::MakeMove {
                room: "duel".into(),
                cell,
            }))
            .await
            .expect("move");
        }
        assert!(matches!(recv(&mut ws1).await, ServerMessage::GameState { .. }));
        assert!(matches!(recv(&mut ws2).await, ServerMessage::GameState { .. }));
    }

    // Nobody moves; the window lapses and player 1's oldest piece fades.
    let (seen, text) = recv_until_chat(&mut ws2).await;
    assert_eq!(text, "** X timed out! **");
    match seen.last() {
        Some(ServerMessage::GameState { state }) => {
            assert_eq!(state.faded_cell, Some(0));
            assert_eq!(state.board[0], None);
        }
        other => panic!("expected the faded state before the notice, got {other:?}"),
    }
}
