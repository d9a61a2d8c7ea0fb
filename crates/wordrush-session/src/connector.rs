//! Joining a room.
//!
//! The [`SessionConnector`] turns "join room `abc` as `nat`" into one open
//! [`WebSocketConnection`]. It owns the two local stores, so it is also the
//! place where rejoin tokens get written when a game starts.
//!
//! # Join flow
//!
//! ```text
//! validate username ──→ remember username ──→ build room URL ──→ open socket
//!                                                   │
//!                      ?username=nat[&rejoin_token=...]
//! ```
//!
//! There is no automatic reconnect. When a connection drops, the caller
//! decides whether to [`resume`](SessionConnector::resume), which simply
//! calls `connect` again with the stored token.

use url::Url;
use wordrush_protocol::{RoomId, ServerMessage};
use wordrush_transport::WebSocketConnection;

use crate::{SessionError, TokenStore, UsernameStore};

/// Longest username the server accepts, in characters.
pub const MAX_USERNAME_LEN: usize = 20;

/// Where to connect and what the server accepts.
#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    /// Base URL of the game server (`ws://` or `wss://`).
    ///
    /// Default: `ws://127.0.0.1:8080`.
    pub server_url: String,

    /// Longest accepted username, in characters.
    ///
    /// Default: 20.
    pub max_username_len: usize,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            server_url: "ws://127.0.0.1:8080".to_string(),
            max_username_len: MAX_USERNAME_LEN,
        }
    }
}

/// Opens room connections and keeps the local stores up to date.
#[derive(Debug)]
pub struct SessionConnector<T, U> {
    config: ConnectorConfig,
    tokens: T,
    usernames: U,
}

impl<T: TokenStore, U: UsernameStore> SessionConnector<T, U> {
    /// Creates a connector over the given stores.
    pub fn new(config: ConnectorConfig, tokens: T, usernames: U) -> Self {
        Self {
            config,
            tokens,
            usernames,
        }
    }

    /// The connector's configuration.
    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    /// The rejoin-token store.
    pub fn tokens(&self) -> &T {
        &self.tokens
    }

    /// The username store.
    pub fn usernames(&self) -> &U {
        &self.usernames
    }

    /// Checks a username against the server's rules and returns it
    /// trimmed.
    ///
    /// # Errors
    /// [`SessionError::InvalidUsername`] if it is blank or longer than
    /// `max_username_len` characters.
    pub fn validate_username<'a>(&self, username: &'a str) -> Result<&'a str, SessionError> {
        let name = username.trim();
        if name.is_empty() {
            return Err(SessionError::InvalidUsername("username is empty".into()));
        }
        let len = name.chars().count();
        if len > self.config.max_username_len {
            return Err(SessionError::InvalidUsername(format!(
                "{len} characters (max {})",
                self.config.max_username_len
            )));
        }
        Ok(name)
    }

    /// Builds `{server_url}/api/room/{room}?username=..[&rejoin_token=..]`.
    ///
    /// The room name and query values are percent-encoded.
    pub fn room_url(
        &self,
        room: &RoomId,
        username: &str,
        rejoin_token: Option<&str>,
    ) -> Result<Url, SessionError> {
        let mut url = Url::parse(&self.config.server_url)
            .map_err(|e| SessionError::InvalidUrl(format!("{}: {e}", self.config.server_url)))?;

        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(SessionError::InvalidUrl(format!(
                "unsupported scheme `{}`",
                url.scheme()
            )));
        }

        url.path_segments_mut()
            .map_err(|()| SessionError::InvalidUrl(self.config.server_url.clone()))?
            .pop_if_empty()
            .extend(["api", "room", room.as_str()]);

        {
            let mut query = url.query_pairs_mut();
            query.clear().append_pair("username", username);
            if let Some(token) = rejoin_token {
                query.append_pair("rejoin_token", token);
            }
        }

        Ok(url)
    }

    /// Joins `room` as `username`, optionally presenting a rejoin token.
    ///
    /// The username is validated and remembered before the socket is
    /// opened. The order of the first server events is not checked here;
    /// that is the state machine's job.
    pub async fn connect(
        &self,
        room: &RoomId,
        username: &str,
        rejoin_token: Option<&str>,
    ) -> Result<WebSocketConnection, SessionError> {
        let username = self.validate_username(username)?;
        let url = self.room_url(room, username, rejoin_token)?;

        if let Err(e) = self.usernames.set(username) {
            tracing::warn!(error = %e, "failed to remember username");
        }

        tracing::info!(
            room_id = %room,
            username,
            rejoining = rejoin_token.is_some(),
            "joining room"
        );
        let conn = WebSocketConnection::connect(url.as_str()).await?;
        Ok(conn)
    }

    /// Joins `room` again using the token stored for it, if there is one.
    pub async fn resume(
        &self,
        room: &RoomId,
        username: &str,
    ) -> Result<WebSocketConnection, SessionError> {
        let token = self.tokens.get(room);
        self.connect(room, username, token.as_deref()).await
    }

    /// Looks at an inbound message for things worth persisting.
    ///
    /// Today that is only the rejoin token carried by `GameStarted`.
    pub fn observe(&self, room: &RoomId, msg: &ServerMessage) -> Result<(), SessionError> {
        if let ServerMessage::GameStarted {
            rejoin_token: Some(token),
            ..
        } = msg
        {
            self.tokens.set(room, token)?;
        }
        Ok(())
    }
}
