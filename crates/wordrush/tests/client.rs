//! Integration tests for the room runtime over an in-memory connection.
//!
//! The test plays the server on the far end of a [`MemoryConnection`]
//! pair: it pushes wire JSON and reads back whatever the client sends.

use std::time::Duration;

use tokio::sync::mpsc;
use wordrush::CLOSED_BY_CLIENT;
use wordrush::prelude::*;

const INFO: &str = r#"{"type":"Info","uuid":"u1","room":{
    "owner":"u1",
    "settings":{"public":false,"game":"WordBomb"},
    "clients":[{"uuid":"u1","username":"nat"},{"uuid":"u2","username":"bo"}],
    "state":{"type":"Lobby","ready":[]}}}"#;

const STARTED: &str = r#"{"type":"GameStarted","rejoin_token":"tok-1","game":{
    "type":"WordBomb",
    "players":[{"uuid":"u1","lives":2},{"uuid":"u2","lives":2}],
    "turn":"u1","prompt":"ca"}}"#;

const PROMPT_TO_U2: &str =
    r#"{"type":"WordBombPrompt","correct_guess":"cat","life_change":0,"prompt":"og","turn":"u2"}"#;

const TIMEOUT: Duration = Duration::from_secs(5);

fn setup() -> (WordrushClient, GameClient, MemoryConnection) {
    let client = WordrushClient::builder().build();
    let (client_end, server) = MemoryConnection::pair();
    let room = client.attach(client_end, RoomId::from("abc"));
    (client, room, server)
}

/// Waits until the session satisfies `pred`.
async fn wait_until(room: &GameClient, pred: impl FnMut(&Session) -> bool) -> Session {
    let mut rx = room.watch();
    tokio::time::timeout(TIMEOUT, rx.wait_for(pred))
        .await
        .expect("timed out waiting for state")
        .expect("runtime should be alive")
        .clone()
}

/// Reads the next frame the client sent, as JSON.
async fn next_sent(server: &MemoryConnection) -> serde_json::Value {
    let data = tokio::time::timeout(TIMEOUT, server.recv())
        .await
        .expect("timed out waiting for a frame")
        .expect("recv ok")
        .expect("some frame");
    serde_json::from_slice(&data).expect("client sends JSON")
}

#[tokio::test]
async fn test_join_then_ready_up() {
    let (_client, room, server) = setup();
    server.send(INFO.as_bytes()).await.unwrap();

    let session = tokio::time::timeout(TIMEOUT, room.synced())
        .await
        .unwrap()
        .expect("should sync");
    assert!(session.lobby().is_some());
    assert_eq!(session.owner_id(), Some(&PlayerId::from("u1")));

    room.emitter().toggle_ready().unwrap();
    assert_eq!(next_sent(&server).await["type"], "Ready");
}

#[tokio::test]
async fn test_game_started_stores_rejoin_token() {
    let (client, room, server) = setup();
    server.send(INFO.as_bytes()).await.unwrap();
    server.send(STARTED.as_bytes()).await.unwrap();

    wait_until(&room, |s| s.word_bomb().is_some()).await;
    assert_eq!(
        client.connector().tokens().get(&RoomId::from("abc")).as_deref(),
        Some("tok-1")
    );
}

#[tokio::test]
async fn test_guess_only_on_own_turn() {
    let (_client, room, server) = setup();
    server.send(INFO.as_bytes()).await.unwrap();
    server.send(STARTED.as_bytes()).await.unwrap();
    wait_until(&room, |s| s.word_bomb().is_some()).await;

    room.emitter().submit_guess("Cat").unwrap();
    let sent = next_sent(&server).await;
    assert_eq!(sent["type"], "WordBombGuess");
    assert_eq!(sent["word"], "cat");

    server.send(PROMPT_TO_U2.as_bytes()).await.unwrap();
    let session = wait_until(&room, |s| {
        s.word_bomb().is_some_and(|g| g.turn().as_str() == "u2")
    })
    .await;
    let used: String = session.word_bomb().unwrap().used_letters().unwrap().iter().collect();
    assert_eq!(used, "act");

    assert_eq!(room.emitter().submit_guess("dog"), Err(ActionError::NotYourTurn));
}

#[tokio::test]
async fn test_typing_updates_draft_and_previews() {
    let (_client, room, server) = setup();
    server.send(INFO.as_bytes()).await.unwrap();
    server.send(STARTED.as_bytes()).await.unwrap();
    wait_until(&room, |s| s.word_bomb().is_some()).await;

    room.emitter().echo_own_input("ca").unwrap();
    wait_until(&room, |s| s.word_bomb().is_some_and(|g| g.input() == "ca")).await;

    let sent = next_sent(&server).await;
    assert_eq!(sent["type"], "WordBombInput");
    assert_eq!(sent["input"], "ca");
}

#[tokio::test]
async fn test_undecodable_frames_are_dropped() {
    let (_client, room, server) = setup();
    server.send(b"not json").await.unwrap();
    server.send(br#"{"type":"NoSuchMessage"}"#).await.unwrap();
    server.send(INFO.as_bytes()).await.unwrap();

    let session = wait_until(&room, |s| s.lobby().is_some()).await;
    assert!(!session.is_closed());
}

#[tokio::test]
async fn test_late_subscriber_gets_replay() {
    let (_client, room, server) = setup();
    server.send(INFO.as_bytes()).await.unwrap();
    server
        .send(br#"{"type":"ServerMessage","content":"restarting soon"}"#)
        .await
        .unwrap();
    wait_until(&room, |s| !s.chat().is_empty()).await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    room.subscribe(
        MessageKind::Notice,
        Box::new(move |m: &ServerMessage| {
            let _ = tx.send(m.clone());
        }),
    )
    .await;

    let replayed = tokio::time::timeout(TIMEOUT, rx.recv())
        .await
        .expect("timed out waiting for the notice")
        .expect("handler is alive");
    assert_eq!(
        replayed,
        ServerMessage::Notice {
            content: "restarting soon".into()
        }
    );
    assert!(rx.try_recv().is_err(), "replayed exactly once");
}

#[tokio::test]
async fn test_unsubscribed_kind_backlog_is_bounded() {
    let client = WordrushClient::builder()
        .config(ClientConfig {
            dispatcher_backlog: 4,
            ..ClientConfig::default()
        })
        .build();
    let (client_end, server) = MemoryConnection::pair();
    let room = client.attach(client_end, RoomId::from("abc"));

    server.send(INFO.as_bytes()).await.unwrap();
    server.send(STARTED.as_bytes()).await.unwrap();
    for n in 0..50 {
        let frame = format!(r#"{{"type":"WordBombInput","uuid":"u2","input":"k{n}"}}"#);
        server.send(frame.as_bytes()).await.unwrap();
    }
    // Applied after every keystroke before it, so all of them are queued.
    server
        .send(br#"{"type":"ServerMessage","content":"done"}"#)
        .await
        .unwrap();
    wait_until(&room, |s| !s.chat().is_empty()).await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    room.subscribe(
        MessageKind::WordBombInput,
        Box::new(move |m: &ServerMessage| {
            let _ = tx.send(m.clone());
        }),
    )
    .await;

    let mut replayed = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        if let ServerMessage::WordBombInput { input, .. } = msg {
            replayed.push(input);
        }
    }
    assert_eq!(replayed, vec!["k46", "k47", "k48", "k49"]);
}

#[tokio::test]
async fn test_close_with_reason_ends_session() {
    let (_client, room, server) = setup();
    server.send(INFO.as_bytes()).await.unwrap();
    server
        .close_with_reason("Username too long (max 20 characters)")
        .unwrap();

    let reason = tokio::time::timeout(TIMEOUT, room.closed()).await.unwrap();
    assert_eq!(reason, "Username too long (max 20 characters)");
    // Info arrived first, so the room did sync before closing.
    assert!(room.snapshot().self_id().is_some());
    assert!(matches!(room.snapshot().phase(), Phase::Error { .. }));
    assert_eq!(room.emitter().chat("hi"), Err(ActionError::Closed));
}

#[tokio::test]
async fn test_client_close_closes_connection() {
    let (_client, room, server) = setup();
    server.send(INFO.as_bytes()).await.unwrap();
    wait_until(&room, |s| s.lobby().is_some()).await;

    let reason = tokio::time::timeout(TIMEOUT, room.close()).await.unwrap();
    assert_eq!(reason, CLOSED_BY_CLIENT);
    assert_eq!(server.recv().await.unwrap(), None);
}

#[tokio::test]
async fn test_refused_join_fails_sync() {
    let (_client, room, server) = setup();
    server.close_with_reason("Room is full").unwrap();

    let err = tokio::time::timeout(TIMEOUT, room.synced())
        .await
        .unwrap()
        .expect_err("closed before any snapshot");
    assert!(err.to_string().contains("Room is full"));
}
