//! Client-side game state for Wordrush.
//!
//! Everything in this crate is synchronous and pure: state comes in, an
//! event comes in, the next state comes out. The client runtime owns the
//! I/O and feeds events through here in arrival order.
//!
//! # Key types
//!
//! - [`Dispatcher`]: routes server events to subscribers by kind,
//!   replaying events that arrived before anyone subscribed
//! - [`Session`]: the room as a whole: roster, chat, owner, settings and
//!   the current [`Phase`]
//! - [`LobbyState`], [`WordBombState`], [`AnagramsState`]: per-phase
//!   reducers
//! - [`PostGameSummary`]: sorted leaderboards shown after a game

mod anagrams;
mod chat;
mod dispatcher;
mod lobby;
mod post_game;
mod roster;
mod session;
mod word_bomb;

pub use anagrams::{AnagramsPlayer, AnagramsState, MAX_GUESS_LEN, word_score};
pub use chat::{ChatEntry, ChatKind, ChatLog};
pub use dispatcher::{DEFAULT_BACKLOG, Dispatcher, Handler, Keyed, SubscriptionId};
pub use lobby::{LobbyState, MIN_READY};
pub use post_game::{AnagramsSummary, FastestGuess, PostGameSummary, Ranked, WordBombSummary};
pub use roster::Roster;
pub use session::{Phase, Session};
pub use word_bomb::{MAX_INPUT_LEN, TRACKED_ALPHABET, WordBombPlayer, WordBombState};
