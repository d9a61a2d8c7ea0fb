//! # Wordrush
//!
//! Client engine for the Wordrush multiplayer word games, WordBomb and
//! Anagrams.
//!
//! The client joins one room per [`GameClient`], interprets the server's
//! event stream into a strongly typed [`Session`](wordrush_state::Session)
//! and sends user actions back through an [`ActionEmitter`] that refuses
//! anything the server would reject anyway.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wordrush::prelude::*;
//!
//! # async fn example() -> Result<(), WordrushError> {
//! wordrush::logging::init()?;
//!
//! let client = WordrushClient::builder()
//!     .server_url("ws://127.0.0.1:8080")
//!     .build();
//! let room = client.join(&RoomId::from("abc"), "nat").await?;
//!
//! let mut updates = room.watch();
//! while updates.changed().await.is_ok() {
//!     let session = updates.borrow_and_update().clone();
//!     if let Some(game) = session.word_bomb() {
//!         println!("prompt: {}", game.prompt());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod emitter;
mod error;
pub mod logging;

pub use client::{
    CLOSED_BY_CLIENT, CONNECTION_CLOSED, Connector, GameClient, WordrushClient,
    WordrushClientBuilder,
};
pub use config::{ClientConfig, MAX_CHAT_LEN};
pub use emitter::{ActionEmitter, ActionError};
pub use error::WordrushError;

pub use wordrush_protocol as protocol;
pub use wordrush_session as session;
pub use wordrush_state as state;
pub use wordrush_transport as transport;

/// Everything a typical client needs, in one import.
pub mod prelude {
    pub use crate::{
        ActionEmitter, ActionError, ClientConfig, GameClient, WordrushClient,
        WordrushClientBuilder, WordrushError,
    };
    pub use wordrush_protocol::{
        ClientAction, Game, MessageKind, PlayerId, RoomId, RoomSettings, ServerMessage,
    };
    pub use wordrush_session::{
        FileUsernameStore, JsonTokenStore, MemoryTokenStore, MemoryUsernameStore, TokenStore,
        UsernameStore,
    };
    pub use wordrush_state::{
        AnagramsState, ChatKind, LobbyState, Phase, PostGameSummary, Session, WordBombState,
    };
    pub use wordrush_transport::{Connection, MemoryConnection};
}
