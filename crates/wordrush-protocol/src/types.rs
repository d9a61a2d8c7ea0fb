//! Core protocol types for the Wordrush wire format.
//!
//! Every type in this module travels "on the wire": it is serialized to
//! JSON by the client ([`ClientAction`]) or deserialized from JSON pushed
//! by the server ([`ServerMessage`]).
//!
//! All enums use serde's internally tagged representation
//! (`#[serde(tag = "type")]`), so a message looks like:
//!
//! ```json
//! { "type": "WordBombPrompt", "life_change": -1, "prompt": "og", "turn": "u2" }
//! ```
//!
//! Variant names are PascalCase on the wire and field names are
//! snake_case, which is also what Rust uses, so serde needs almost no
//! renaming. The serde attributes below are the single place where wire
//! naming is decided.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player, assigned by the server.
///
/// The server uses UUIDs, but the client treats ids as opaque strings: it
/// only ever compares them. `#[serde(transparent)]` keeps the JSON a plain
/// string rather than `{ "0": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The name of a room, as it appears in the room URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Returns the room name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Room metadata
// ---------------------------------------------------------------------------

/// The game modes a room can be configured to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Game {
    /// Turn-based elimination: type a word containing the prompt.
    #[default]
    WordBomb,
    /// Simultaneous: find words using the letters of one anagram.
    Anagrams,
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WordBomb => write!(f, "Word Bomb"),
            Self::Anagrams => write!(f, "Anagrams"),
        }
    }
}

/// Room settings, owned by the room owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoomSettings {
    /// Whether the room is listed publicly.
    pub public: bool,
    /// Which game starts when the lobby countdown ends.
    pub game: Game,
}

/// One connected (or recently disconnected) client in a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Server-assigned id.
    pub uuid: PlayerId,
    /// Display name chosen at join time.
    pub username: String,
    /// `true` while the client is gone but its seat is kept.
    #[serde(default)]
    pub disconnected: bool,
}

/// The full room snapshot carried by [`ServerMessage::Info`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomInfo {
    /// The current room owner.
    pub owner: PlayerId,
    /// Current room settings.
    pub settings: RoomSettings,
    /// Every client in the room, in display order.
    pub clients: Vec<ClientInfo>,
    /// The snapshot of whatever mode the room is in.
    pub state: RoomStateInfo,
}

// ---------------------------------------------------------------------------
// Mode snapshots
// ---------------------------------------------------------------------------

/// Lobby snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LobbySnapshot {
    /// Players that have readied up.
    pub ready: Vec<PlayerId>,
    /// Seconds left on the start countdown, if one is running.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_countdown: Option<u8>,
}

/// A player's seat in a WordBomb game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordBombPlayerData {
    pub uuid: PlayerId,
    /// What the player is currently typing (live preview).
    #[serde(default)]
    pub input: String,
    pub lives: u8,
}

/// WordBomb snapshot, sent on join and at game start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordBombSnapshot {
    pub players: Vec<WordBombPlayerData>,
    /// The player currently holding the bomb.
    pub turn: PlayerId,
    pub prompt: String,
    /// Letters the receiving player has already used, when the server
    /// tracks them for us (present on rejoin).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_letters: Option<Vec<char>>,
}

/// A player's board in an Anagrams game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnagramsPlayerData {
    pub uuid: PlayerId,
    #[serde(default)]
    pub used_words: Vec<String>,
}

/// Anagrams snapshot, sent on join and at game start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnagramsSnapshot {
    pub players: Vec<AnagramsPlayerData>,
    pub anagram: String,
}

/// Whatever state the room is in when we join.
///
/// Newtype variants wrapping structs are flattened by serde's internal
/// tagging, so `Lobby(LobbySnapshot)` reads `{ "type": "Lobby", "ready": [] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RoomStateInfo {
    Lobby(LobbySnapshot),
    WordBomb(WordBombSnapshot),
    Anagrams(AnagramsSnapshot),
}

/// The snapshot carried by [`ServerMessage::GameStarted`]: a room state
/// that is never the lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameSnapshot {
    WordBomb(WordBombSnapshot),
    Anagrams(AnagramsSnapshot),
}

impl GameSnapshot {
    /// Which game this snapshot belongs to.
    pub fn game(&self) -> Game {
        match self {
            Self::WordBomb(_) => Game::WordBomb,
            Self::Anagrams(_) => Game::Anagrams,
        }
    }
}

impl From<GameSnapshot> for RoomStateInfo {
    fn from(game: GameSnapshot) -> Self {
        match game {
            GameSnapshot::WordBomb(s) => Self::WordBomb(s),
            GameSnapshot::Anagrams(s) => Self::Anagrams(s),
        }
    }
}

// ---------------------------------------------------------------------------
// Post-game
// ---------------------------------------------------------------------------

/// Statistics sent once when a game ends.
///
/// Leaderboard entries are tuples on the wire (`["uuid", 1.25, "word"]`),
/// which serde maps to Rust tuples directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PostGameInfo {
    WordBomb {
        winner: PlayerId,
        mins_elapsed: f64,
        words_used: u32,
        letters_typed: u32,
        /// `(player, seconds, word)`
        #[serde(default)]
        fastest_guesses: Vec<(PlayerId, f64, String)>,
        #[serde(default)]
        longest_words: Vec<(PlayerId, String)>,
        #[serde(default)]
        avg_wpms: Vec<(PlayerId, f64)>,
        #[serde(default)]
        avg_word_lengths: Vec<(PlayerId, f64)>,
    },
    Anagrams {
        original_word: String,
        /// `(player, points)`
        leaderboard: Vec<(PlayerId, u32)>,
    },
}

// ---------------------------------------------------------------------------
// Small tagged payloads
// ---------------------------------------------------------------------------

/// What happened to a client's connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConnectionUpdate {
    Connected {
        username: String,
    },
    Reconnected {
        username: String,
    },
    Disconnected {
        /// Set when the departing client owned the room.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new_room_owner: Option<PlayerId>,
    },
}

/// A change to the lobby start countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CountdownState {
    InProgress {
        time_left: u8,
    },
    // Older servers send the lowercase tag.
    #[serde(alias = "stopped")]
    Stopped,
}

/// Why the server rejected a WordBomb guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WordBombGuessInfo {
    PromptNotIn,
    NotEnglish,
    AlreadyUsed,
}

impl fmt::Display for WordBombGuessInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PromptNotIn => write!(f, "word does not contain the prompt"),
            Self::NotEnglish => write!(f, "not an english word"),
            Self::AlreadyUsed => write!(f, "word already used"),
        }
    }
}

/// Why the server rejected an Anagrams guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnagramsGuessInfo {
    NotLongEnough,
    PromptMismatch,
    NotEnglish,
    AlreadyUsed,
}

impl fmt::Display for AnagramsGuessInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotLongEnough => write!(f, "word is too short"),
            Self::PromptMismatch => write!(f, "word uses letters not in the anagram"),
            Self::NotEnglish => write!(f, "not an english word"),
            Self::AlreadyUsed => write!(f, "word already used"),
        }
    }
}

// ---------------------------------------------------------------------------
// ClientAction: client → server
// ---------------------------------------------------------------------------

/// Everything the client can send to the server.
///
/// The protocol is event-sourced, not request/response: none of these
/// get a direct reply. The server confirms an action (or not) by pushing
/// [`ServerMessage`]s to the whole room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientAction {
    Ready,
    Unready,
    /// Owner only: skip the rest of the countdown.
    StartEarly,
    /// Owner only: change room settings. Flattened on the wire:
    /// `{ "type": "RoomSettings", "public": true, "game": "Anagrams" }`.
    RoomSettings(RoomSettings),
    ChatMessage {
        content: String,
    },
    /// Live preview of the turn holder's keystrokes.
    WordBombInput {
        input: String,
    },
    WordBombGuess {
        word: String,
    },
    AnagramsGuess {
        word: String,
    },
}

// ---------------------------------------------------------------------------
// ServerMessage: server → client
// ---------------------------------------------------------------------------

/// Everything the server can push to the client.
///
/// Matching on this enum is exhaustive, so adding a message kind is a
/// compile error everywhere it is interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Initial snapshot, sent once after the connection opens.
    Info {
        /// Our own id in this room.
        uuid: PlayerId,
        room: RoomInfo,
    },
    /// A request we made was refused (bad settings change, etc).
    Error {
        content: String,
    },
    /// A plain notice from the server, shown in chat.
    #[serde(rename = "ServerMessage")]
    Notice {
        content: String,
    },
    RoomSettings(RoomSettings),
    ChatMessage {
        author: PlayerId,
        content: String,
    },
    ConnectionUpdate {
        uuid: PlayerId,
        state: ConnectionUpdate,
    },
    ReadyPlayers {
        ready: Vec<PlayerId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        countdown_update: Option<CountdownState>,
    },
    StartingCountdown {
        time_left: u8,
    },
    GameStarted {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rejoin_token: Option<String>,
        game: GameSnapshot,
    },
    GameEnded {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new_room_owner: Option<PlayerId>,
        info: PostGameInfo,
    },
    WordBombInput {
        uuid: PlayerId,
        input: String,
    },
    WordBombInvalidGuess {
        uuid: PlayerId,
        reason: WordBombGuessInfo,
    },
    WordBombPrompt {
        /// The word that answered the previous prompt, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        correct_guess: Option<String>,
        /// Applied to the previous turn holder's lives.
        life_change: i8,
        prompt: String,
        /// The next turn holder.
        turn: PlayerId,
    },
    AnagramsInvalidGuess {
        reason: AnagramsGuessInfo,
    },
    AnagramsCorrectGuess {
        uuid: PlayerId,
        guess: String,
    },
    /// A new anagram for the next round. Words found so far are kept.
    AnagramsPrompt {
        anagram: String,
    },
}

/// The discriminant of a [`ServerMessage`], used to key subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageKind {
    Info,
    Error,
    Notice,
    RoomSettings,
    ChatMessage,
    ConnectionUpdate,
    ReadyPlayers,
    StartingCountdown,
    GameStarted,
    GameEnded,
    WordBombInput,
    WordBombInvalidGuess,
    WordBombPrompt,
    AnagramsInvalidGuess,
    AnagramsCorrectGuess,
    AnagramsPrompt,
}

impl MessageKind {
    /// Every kind, in declaration order.
    pub const ALL: [MessageKind; 16] = [
        Self::Info,
        Self::Error,
        Self::Notice,
        Self::RoomSettings,
        Self::ChatMessage,
        Self::ConnectionUpdate,
        Self::ReadyPlayers,
        Self::StartingCountdown,
        Self::GameStarted,
        Self::GameEnded,
        Self::WordBombInput,
        Self::WordBombInvalidGuess,
        Self::WordBombPrompt,
        Self::AnagramsInvalidGuess,
        Self::AnagramsCorrectGuess,
        Self::AnagramsPrompt,
    ];
}

impl ServerMessage {
    /// Returns the kind of this message.
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Info { .. } => MessageKind::Info,
            Self::Error { .. } => MessageKind::Error,
            Self::Notice { .. } => MessageKind::Notice,
            Self::RoomSettings(_) => MessageKind::RoomSettings,
            Self::ChatMessage { .. } => MessageKind::ChatMessage,
            Self::ConnectionUpdate { .. } => MessageKind::ConnectionUpdate,
            Self::ReadyPlayers { .. } => MessageKind::ReadyPlayers,
            Self::StartingCountdown { .. } => MessageKind::StartingCountdown,
            Self::GameStarted { .. } => MessageKind::GameStarted,
            Self::GameEnded { .. } => MessageKind::GameEnded,
            Self::WordBombInput { .. } => MessageKind::WordBombInput,
            Self::WordBombInvalidGuess { .. } => MessageKind::WordBombInvalidGuess,
            Self::WordBombPrompt { .. } => MessageKind::WordBombPrompt,
            Self::AnagramsInvalidGuess { .. } => MessageKind::AnagramsInvalidGuess,
            Self::AnagramsCorrectGuess { .. } => MessageKind::AnagramsCorrectGuess,
            Self::AnagramsPrompt { .. } => MessageKind::AnagramsPrompt,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
