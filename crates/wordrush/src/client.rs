//! `WordrushClient` builder and the per-room runtime.
//!
//! This is the entry point for joining a room. It ties together all the
//! layers: transport → protocol → state, plus the session connector for
//! joining and rejoin tokens.
//!
//! # One task per room
//!
//! Each [`GameClient`] is backed by a single Tokio task that owns the
//! connection and the [`Session`]. Inbound frames and outbound actions
//! are multiplexed with `tokio::select!` in that task, so a state
//! transition always runs to completion before the next one starts:
//!
//! ```text
//!             ┌──────────── runtime task ────────────┐
//! socket ───→ │ decode → Session::apply → watch::send │ ───→ observers
//!             │                  └─→ Dispatcher::publish │ ───→ subscribers
//! emitter ──→ │ command queue → socket                 │
//!             └────────────────────────────────────────┘
//! ```
//!
//! When the connection ends, the session enters its terminal `Error`
//! phase carrying the reason, and the dispatcher is disposed.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use wordrush_protocol::{Codec, JsonCodec, MessageKind, RoomId, ServerMessage};
use wordrush_session::{
    MemoryTokenStore, MemoryUsernameStore, SessionConnector, TokenStore, UsernameStore,
};
use wordrush_state::{Dispatcher, Handler, Phase, Session, SubscriptionId};
use wordrush_transport::{Connection, TransportError};

use crate::emitter::Command;
use crate::{ActionEmitter, ClientConfig, WordrushError};

/// The session connector with type-erased stores, as used by the client.
pub type Connector = SessionConnector<Arc<dyn TokenStore>, Arc<dyn UsernameStore>>;

/// Reason recorded when the client itself closes the session.
pub const CLOSED_BY_CLIENT: &str = "closed by client";

/// Reason recorded when the server closes without giving one.
pub const CONNECTION_CLOSED: &str = "connection closed";

/// Builder for configuring a Wordrush client.
///
/// # Example
///
/// ```rust,no_run
/// use wordrush::prelude::*;
///
/// # async fn example() -> Result<(), WordrushError> {
/// let client = WordrushClient::builder()
///     .server_url("ws://127.0.0.1:8080")
///     .token_store(JsonTokenStore::new("tokens.json"))
///     .build();
///
/// let room = client.join(&RoomId::from("abc"), "nat").await?;
/// room.emitter().toggle_ready()?;
/// # Ok(())
/// # }
/// ```
pub struct WordrushClientBuilder {
    config: ClientConfig,
    tokens: Arc<dyn TokenStore>,
    usernames: Arc<dyn UsernameStore>,
}

impl WordrushClientBuilder {
    /// Creates a new builder with default settings and in-memory stores.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            tokens: Arc::new(MemoryTokenStore::new()),
            usernames: Arc::new(MemoryUsernameStore::new()),
        }
    }

    /// Sets the game server's base URL.
    pub fn server_url(mut self, url: &str) -> Self {
        self.config.server_url = url.to_string();
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets where rejoin tokens are kept.
    pub fn token_store(mut self, store: impl TokenStore) -> Self {
        self.tokens = Arc::new(store);
        self
    }

    /// Sets where the last username is kept.
    pub fn username_store(mut self, store: impl UsernameStore) -> Self {
        self.usernames = Arc::new(store);
        self
    }

    /// Builds the client. Nothing connects until a room is joined.
    pub fn build(self) -> WordrushClient {
        let connector =
            SessionConnector::new(self.config.connector_config(), self.tokens, self.usernames);
        WordrushClient {
            config: self.config,
            connector: Arc::new(connector),
        }
    }
}

impl Default for WordrushClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Joins rooms. Each joined room gets its own [`GameClient`].
pub struct WordrushClient {
    config: ClientConfig,
    connector: Arc<Connector>,
}

impl WordrushClient {
    /// Creates a new builder.
    pub fn builder() -> WordrushClientBuilder {
        WordrushClientBuilder::new()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The connector, for access to the stores.
    pub fn connector(&self) -> &Connector {
        &self.connector
    }

    /// The username used last time, if one was remembered.
    pub fn remembered_username(&self) -> Option<String> {
        self.connector.usernames().get()
    }

    /// Joins `room` as a new player.
    pub async fn join(&self, room: &RoomId, username: &str) -> Result<GameClient, WordrushError> {
        let conn = self.connector.connect(room, username, None).await?;
        Ok(self.attach(conn, room.clone()))
    }

    /// Joins `room` presenting the rejoin token stored for it, so the
    /// server can hand back our seat in a running game.
    pub async fn rejoin(&self, room: &RoomId, username: &str) -> Result<GameClient, WordrushError> {
        let conn = self.connector.resume(room, username).await?;
        Ok(self.attach(conn, room.clone()))
    }

    /// Runs a room session over an already open connection.
    ///
    /// This is how [`join`](Self::join) finishes, and how tests drive the
    /// client over an in-memory pair.
    pub fn attach<C>(&self, conn: C, room: RoomId) -> GameClient
    where
        C: Connection<Error = TransportError>,
    {
        GameClient::spawn(conn, room, self.config.clone(), Arc::clone(&self.connector))
    }
}

/// Handle to one room session.
///
/// Dropping every handle (and every [`ActionEmitter`] clone) closes the
/// connection.
pub struct GameClient {
    room_id: RoomId,
    state: watch::Receiver<Session>,
    emitter: ActionEmitter,
    dispatcher: Arc<Mutex<Dispatcher<ServerMessage>>>,
    task: JoinHandle<()>,
}

impl GameClient {
    fn spawn<C>(conn: C, room_id: RoomId, config: ClientConfig, connector: Arc<Connector>) -> Self
    where
        C: Connection<Error = TransportError>,
    {
        let (state_tx, state_rx) = watch::channel(Session::new(room_id.clone()));
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let dispatcher = Arc::new(Mutex::new(Dispatcher::with_backlog(
            config.dispatcher_backlog,
        )));

        let runtime = Runtime {
            conn,
            codec: JsonCodec,
            room_id: room_id.clone(),
            connector,
            state: state_tx,
            dispatcher: Arc::clone(&dispatcher),
            commands: cmd_rx,
        };
        let task = tokio::spawn(runtime.run());

        Self {
            room_id,
            emitter: ActionEmitter::new(cmd_tx, state_rx.clone(), config),
            state: state_rx,
            dispatcher,
            task,
        }
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// A copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// A receiver that is notified after every applied event.
    pub fn watch(&self) -> watch::Receiver<Session> {
        self.state.clone()
    }

    /// The action emitter for this room.
    pub fn emitter(&self) -> &ActionEmitter {
        &self.emitter
    }

    /// Subscribes to server events of one kind.
    ///
    /// Events of that kind that arrived before anyone subscribed are
    /// replayed to `handler` first. Handlers run on the runtime task,
    /// after the event has been applied to the session.
    pub async fn subscribe(&self, kind: MessageKind, handler: Handler<ServerMessage>) -> SubscriptionId {
        self.dispatcher.lock().await.subscribe(kind, handler)
    }

    /// Removes a subscription.
    pub async fn unsubscribe(&self, kind: MessageKind, id: SubscriptionId) -> bool {
        self.dispatcher.lock().await.unsubscribe(kind, id)
    }

    /// Waits for the first room snapshot.
    ///
    /// # Errors
    /// [`TransportError::ConnectionClosed`] with the close reason if the
    /// session ends before the server sends one (e.g. the username was
    /// refused).
    pub async fn synced(&self) -> Result<Session, WordrushError> {
        let mut state = self.state.clone();
        let _ = state
            .wait_for(|s| s.self_id().is_some() || s.is_closed())
            .await;
        let session = state.borrow().clone();
        match session.phase() {
            Phase::Error { reason } => {
                Err(TransportError::ConnectionClosed(reason.clone()).into())
            }
            _ => Ok(session),
        }
    }

    /// Waits for the session to end and returns the reason.
    pub async fn closed(&self) -> String {
        let mut state = self.state.clone();
        // The runtime always publishes the terminal phase before it exits,
        // so the last value is closed even if the sender is gone.
        let _ = state.wait_for(Session::is_closed).await;
        let session = state.borrow();
        match session.phase() {
            Phase::Error { reason } => reason.clone(),
            _ => CONNECTION_CLOSED.to_string(),
        }
    }

    /// Closes the connection and waits for the runtime to finish.
    pub async fn close(self) -> String {
        let _ = self.emitter.commands().send(Command::Close);
        let reason = self.closed().await;
        if let Err(e) = self.task.await {
            tracing::warn!(room_id = %self.room_id, error = %e, "runtime task failed");
        }
        reason
    }
}

/// Everything the runtime task owns.
struct Runtime<C, K> {
    conn: C,
    codec: K,
    room_id: RoomId,
    connector: Arc<Connector>,
    state: watch::Sender<Session>,
    dispatcher: Arc<Mutex<Dispatcher<ServerMessage>>>,
    commands: mpsc::UnboundedReceiver<Command>,
}

impl<C, K> Runtime<C, K>
where
    C: Connection<Error = TransportError>,
    K: Codec,
{
    async fn run(mut self) {
        let conn_id = self.conn.id();
        tracing::debug!(room_id = %self.room_id, %conn_id, "room runtime started");

        let mut session = Session::new(self.room_id.clone());

        let reason = loop {
            tokio::select! {
                frame = self.conn.recv() => match frame {
                    Ok(Some(data)) => {
                        let msg = match self.codec.decode_message(&data) {
                            Ok(msg) => msg,
                            Err(e) => {
                                tracing::warn!(room_id = %self.room_id, error = %e, "dropping undecodable frame");
                                continue;
                            }
                        };
                        tracing::debug!(room_id = %self.room_id, kind = ?msg.kind(), "event received");

                        if let Err(e) = self.connector.observe(&self.room_id, &msg) {
                            tracing::warn!(room_id = %self.room_id, error = %e, "failed to store rejoin token");
                        }
                        session = session.apply(&msg);
                        self.state.send_replace(session.clone());
                        self.dispatcher.lock().await.publish(msg);
                    }
                    Ok(None) => break CONNECTION_CLOSED.to_string(),
                    Err(TransportError::ConnectionClosed(reason)) => break reason,
                    Err(e) => break e.to_string(),
                },
                cmd = self.commands.recv() => match cmd {
                    Some(Command::Send(bytes)) => {
                        if let Err(e) = self.conn.send(&bytes).await {
                            break e.to_string();
                        }
                    }
                    Some(Command::SetDraft(text)) => {
                        session = session.with_draft(&text);
                        self.state.send_replace(session.clone());
                    }
                    Some(Command::Close) | None => {
                        if let Err(e) = self.conn.close().await {
                            tracing::debug!(room_id = %self.room_id, error = %e, "close failed");
                        }
                        break CLOSED_BY_CLIENT.to_string();
                    }
                },
            }
        };

        tracing::info!(room_id = %self.room_id, %conn_id, %reason, "room session closed");
        self.state.send_replace(session.close(reason));
        self.dispatcher.lock().await.dispose();
    }
}
