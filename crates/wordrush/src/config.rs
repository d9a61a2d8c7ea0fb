//! Client configuration.

use wordrush_session::{ConnectorConfig, MAX_USERNAME_LEN};
use wordrush_state::{DEFAULT_BACKLOG, MAX_INPUT_LEN};

/// Longest chat message the server accepts, in characters.
pub const MAX_CHAT_LEN: usize = 250;

/// Settings shared by every room a client joins.
///
/// The length limits mirror the server's. Checking them locally means an
/// oversized message is refused with a clear [`ActionError`] instead of
/// being silently dropped by the server.
///
/// [`ActionError`]: crate::ActionError
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the game server.
    ///
    /// Default: `ws://127.0.0.1:8080`.
    pub server_url: String,

    /// Default: 20.
    pub max_username_len: usize,

    /// Default: 250.
    pub max_chat_len: usize,

    /// Longest WordBomb input or guess, and longest Anagrams guess.
    ///
    /// Default: 35.
    pub max_word_len: usize,

    /// Server events kept per kind until someone subscribes to that kind.
    /// Beyond this the oldest are dropped.
    ///
    /// Default: 1024.
    pub dispatcher_backlog: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "ws://127.0.0.1:8080".to_string(),
            max_username_len: MAX_USERNAME_LEN,
            max_chat_len: MAX_CHAT_LEN,
            max_word_len: MAX_INPUT_LEN,
            dispatcher_backlog: DEFAULT_BACKLOG,
        }
    }
}

impl ClientConfig {
    /// The part of this config the session connector needs.
    pub fn connector_config(&self) -> ConnectorConfig {
        ConnectorConfig {
            server_url: self.server_url.clone(),
            max_username_len: self.max_username_len,
        }
    }
}
