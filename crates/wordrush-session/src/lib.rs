//! Session layer for the Wordrush client.
//!
//! This crate gets a player into a room and keeps the small amount of
//! local state that outlives a connection:
//!
//! 1. **Joining**: validating the username, building the room URL and
//!    opening the socket ([`SessionConnector`])
//! 2. **Rejoin tokens**: storing the token a server hands out when a game
//!    starts so a dropped player can take their seat back ([`TokenStore`])
//! 3. **Username memory**: prefilling the last used name
//!    ([`UsernameStore`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Client runtime (above)  ← drives one connection per room
//!     ↕
//! Session Layer (this crate)  ← opens connections, persists tokens
//!     ↕
//! Transport Layer (below)  ← WebSocketConnection
//! ```

mod connector;
mod error;
mod store;

pub use connector::{ConnectorConfig, MAX_USERNAME_LEN, SessionConnector};
pub use error::SessionError;
pub use store::{
    FileUsernameStore, JsonTokenStore, MemoryTokenStore, MemoryUsernameStore, TokenStore,
    UsernameStore,
};
