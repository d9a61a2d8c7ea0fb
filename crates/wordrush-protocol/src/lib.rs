//! Wire protocol for the Wordrush game client.
//!
//! This crate defines the "language" the client and the game server speak:
//!
//! - **Types** ([`ServerMessage`], [`ClientAction`], snapshots, ids):
//!   the message structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages
//!   are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw frames) and the session
//! state machine. It doesn't know about connections or game rules; it only
//! knows how to serialize and deserialize messages.
//!
//! ```text
//! Transport (bytes) → Protocol (ServerMessage) → State (Session)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, MAX_ACTION_FRAME_LEN};
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    AnagramsGuessInfo, AnagramsPlayerData, AnagramsSnapshot, ClientAction, ClientInfo,
    ConnectionUpdate, CountdownState, Game, GameSnapshot, LobbySnapshot, MessageKind, PlayerId,
    PostGameInfo, RoomId, RoomInfo, RoomSettings, RoomStateInfo, ServerMessage,
    WordBombGuessInfo, WordBombPlayerData, WordBombSnapshot,
};
