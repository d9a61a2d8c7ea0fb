//! The session state machine.
//!
//! A [`Session`] is everything the client knows about one room: who we
//! are, who else is there, the chat log, and which phase the room is in.
//! It changes only by applying server events, one at a time, in the
//! order they arrived.
//!
//! ```text
//!              Info                 GameStarted
//! Connecting ───────→ Lobby ───────────────────→ WordBomb / Anagrams
//!                       ↑                               │
//!                       └────────── GameEnded ──────────┘
//!
//! any phase ──(channel closed)──→ Error   (terminal)
//! ```
//!
//! `Info` may also arrive later (the server resends it on rejoin); it
//! always resynchronizes everything from the snapshot.
//!
//! Events that don't fit the current phase, or that name players we
//! don't know, are logged and ignored. The server is the authority; a
//! stray event must not wedge the client.

use wordrush_protocol::{
    ConnectionUpdate, Game, GameSnapshot, MessageKind, PlayerId, PostGameInfo, RoomId,
    RoomSettings, RoomStateInfo, ServerMessage,
};

use crate::{
    AnagramsState, ChatLog, LobbyState, PostGameSummary, Roster, WordBombState,
};

/// Which part of the room lifecycle we are in, with that phase's state.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// Connected, waiting for the first `Info`.
    Connecting,
    Lobby(LobbyState),
    WordBomb(WordBombState),
    Anagrams(AnagramsState),
    /// The channel closed. Nothing changes after this.
    Error { reason: String },
}

impl Phase {
    /// A short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Lobby(_) => "lobby",
            Self::WordBomb(_) => "word_bomb",
            Self::Anagrams(_) => "anagrams",
            Self::Error { .. } => "error",
        }
    }

    /// The game being played, if one is running.
    pub fn game(&self) -> Option<Game> {
        match self {
            Self::WordBomb(_) => Some(Game::WordBomb),
            Self::Anagrams(_) => Some(Game::Anagrams),
            _ => None,
        }
    }

    fn from_room_state(state: RoomStateInfo, self_id: &PlayerId) -> Self {
        match state {
            RoomStateInfo::Lobby(snapshot) => Self::Lobby(LobbyState::from_snapshot(snapshot)),
            RoomStateInfo::WordBomb(snapshot) => {
                Self::WordBomb(WordBombState::from_snapshot(snapshot, self_id))
            }
            RoomStateInfo::Anagrams(snapshot) => {
                Self::Anagrams(AnagramsState::from_snapshot(snapshot))
            }
        }
    }
}

/// The client's view of one room.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    room_id: RoomId,
    self_id: Option<PlayerId>,
    owner_id: Option<PlayerId>,
    settings: RoomSettings,
    roster: Roster,
    chat: ChatLog,
    phase: Phase,
}

impl Session {
    /// A fresh session for `room_id`, waiting for its first snapshot.
    pub fn new(room_id: RoomId) -> Self {
        Self {
            room_id,
            self_id: None,
            owner_id: None,
            settings: RoomSettings::default(),
            roster: Roster::default(),
            chat: ChatLog::default(),
            phase: Phase::Connecting,
        }
    }

    /// Applies one server event and returns the next session.
    pub fn apply(mut self, event: &ServerMessage) -> Self {
        if let Phase::Error { .. } = self.phase {
            tracing::debug!(room_id = %self.room_id, kind = ?event.kind(), "session closed, event ignored");
            return self;
        }

        match event {
            ServerMessage::Info { uuid, room } => {
                let room = room.clone();
                self.phase = Phase::from_room_state(room.state, uuid);
                self.self_id = Some(uuid.clone());
                self.owner_id = Some(room.owner);
                self.settings = room.settings;
                self.roster = Roster::from_clients(room.clients);
                tracing::info!(
                    room_id = %self.room_id,
                    player_id = %uuid,
                    phase = self.phase.name(),
                    players = self.roster.len(),
                    "room snapshot received"
                );
            }
            ServerMessage::RoomSettings(settings) => {
                self.settings = *settings;
            }
            ServerMessage::ChatMessage { author, content } => {
                self.chat.push_message(author.clone(), content.clone());
            }
            ServerMessage::Notice { content } => {
                self.chat.push_info(content.clone());
            }
            ServerMessage::Error { content } => {
                tracing::debug!(room_id = %self.room_id, content, "server refused a request");
                self.chat.push_error(content.clone());
            }
            ServerMessage::ConnectionUpdate { uuid, state } => {
                self = self.connection_update(uuid, state);
            }
            ServerMessage::GameStarted { game, .. } => {
                self = self.game_started(game);
            }
            ServerMessage::GameEnded {
                new_room_owner,
                info,
            } => {
                self = self.game_ended(new_room_owner.as_ref(), info);
            }
            ServerMessage::ReadyPlayers { .. } | ServerMessage::StartingCountdown { .. } => {
                self.phase = match self.phase {
                    Phase::Lobby(lobby) => Phase::Lobby(lobby.apply(event)),
                    other => wrong_phase(&self.room_id, other, event),
                };
            }
            ServerMessage::WordBombInput { .. }
            | ServerMessage::WordBombInvalidGuess { .. }
            | ServerMessage::WordBombPrompt { .. } => {
                let me = self.self_id.clone().unwrap_or_default();
                self.phase = match self.phase {
                    Phase::WordBomb(game) => Phase::WordBomb(game.apply(event, &me)),
                    other => wrong_phase(&self.room_id, other, event),
                };
            }
            ServerMessage::AnagramsInvalidGuess { .. }
            | ServerMessage::AnagramsCorrectGuess { .. }
            | ServerMessage::AnagramsPrompt { .. } => {
                let me = self.self_id.clone().unwrap_or_default();
                self.phase = match self.phase {
                    Phase::Anagrams(game) => Phase::Anagrams(game.apply(event, &me)),
                    other => wrong_phase(&self.room_id, other, event),
                };
            }
        }
        self
    }

    fn connection_update(mut self, uuid: &PlayerId, state: &ConnectionUpdate) -> Self {
        match state {
            ConnectionUpdate::Connected { username } | ConnectionUpdate::Reconnected { username } => {
                self.roster.upsert(uuid.clone(), username.clone());
                self.chat.push_info(format!("{username} has joined"));
                tracing::debug!(room_id = %self.room_id, player_id = %uuid, username, "player joined");
            }
            ConnectionUpdate::Disconnected { new_room_owner } => {
                let name = self.roster.display_name(uuid);
                let known = match self.phase {
                    Phase::Lobby(_) | Phase::Connecting => self.roster.remove(uuid).is_some(),
                    _ => self.roster.mark_disconnected(uuid),
                };
                if !known {
                    tracing::warn!(room_id = %self.room_id, player_id = %uuid, "unknown player disconnected");
                }
                if let Some(owner) = new_room_owner {
                    self.owner_id = Some(owner.clone());
                }
                self.chat.push_info(format!("{name} has left"));
                tracing::debug!(room_id = %self.room_id, player_id = %uuid, "player left");
            }
        }
        self
    }

    fn game_started(mut self, game: &GameSnapshot) -> Self {
        let Some(me) = self.self_id.clone() else {
            tracing::warn!(room_id = %self.room_id, "game started before the room snapshot");
            return self;
        };
        self.phase = Phase::from_room_state(game.clone().into(), &me);
        tracing::info!(room_id = %self.room_id, game = %game.game(), "game started");
        self
    }

    fn game_ended(mut self, new_room_owner: Option<&PlayerId>, info: &PostGameInfo) -> Self {
        if self.phase.game().is_none() {
            tracing::warn!(room_id = %self.room_id, phase = self.phase.name(), "game ended outside a game ignored");
            return self;
        }
        let summary = PostGameSummary::from_info(info, &self.roster);
        if let Some(owner) = new_room_owner {
            self.owner_id = Some(owner.clone());
        }
        self.roster.retain_connected();
        self.phase = Phase::Lobby(LobbyState::after_game(summary));
        tracing::info!(room_id = %self.room_id, "game ended");
        self
    }

    /// Ends the session. `reason` is whatever the transport reported.
    pub fn close(mut self, reason: impl Into<String>) -> Self {
        if !matches!(self.phase, Phase::Error { .. }) {
            self.phase = Phase::Error {
                reason: reason.into(),
            };
        }
        self
    }

    /// Replaces our own draft in the running game. Outside a game there
    /// is no draft and nothing changes.
    pub fn with_draft(mut self, text: &str) -> Self {
        self.phase = match self.phase {
            Phase::WordBomb(game) => Phase::WordBomb(game.with_draft(text)),
            Phase::Anagrams(game) => Phase::Anagrams(game.with_draft(text)),
            other => other,
        };
        self
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Our own id, once the first snapshot has arrived.
    pub fn self_id(&self) -> Option<&PlayerId> {
        self.self_id.as_ref()
    }

    pub fn owner_id(&self) -> Option<&PlayerId> {
        self.owner_id.as_ref()
    }

    /// Whether we own the room.
    pub fn is_owner(&self) -> bool {
        self.self_id.is_some() && self.self_id == self.owner_id
    }

    pub fn settings(&self) -> RoomSettings {
        self.settings
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.phase, Phase::Error { .. })
    }

    pub fn lobby(&self) -> Option<&LobbyState> {
        match &self.phase {
            Phase::Lobby(lobby) => Some(lobby),
            _ => None,
        }
    }

    pub fn word_bomb(&self) -> Option<&WordBombState> {
        match &self.phase {
            Phase::WordBomb(game) => Some(game),
            _ => None,
        }
    }

    pub fn anagrams(&self) -> Option<&AnagramsState> {
        match &self.phase {
            Phase::Anagrams(game) => Some(game),
            _ => None,
        }
    }
}

fn wrong_phase(room_id: &RoomId, phase: Phase, event: &ServerMessage) -> Phase {
    let kind: MessageKind = event.kind();
    tracing::warn!(%room_id, phase = phase.name(), ?kind, "event does not fit the current phase");
    phase
}
