//! Sending user actions.
//!
//! The [`ActionEmitter`] is the only way user intent reaches the server.
//! Every method checks the latest session snapshot first (right phase?
//! our turn? within the length limits?) and either queues exactly one
//! frame or returns an [`ActionError`] and sends nothing.
//!
//! Nothing here changes game state directly. The server answers an
//! action by pushing events to the whole room, and those come back
//! through the runtime like any other event. The single exception is our
//! own draft, which only exists locally.

use tokio::sync::{mpsc, watch};
use wordrush_protocol::{ClientAction, Codec, JsonCodec, ProtocolError, RoomSettings};
use wordrush_state::{Phase, Session};

use crate::ClientConfig;

/// Why an action was refused locally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// WordBomb guesses are only accepted from the turn holder.
    #[error("it is not your turn")]
    NotYourTurn,

    /// The action doesn't apply to the phase the room is in.
    #[error("{action} is not available in the {phase} phase")]
    WrongPhase {
        action: &'static str,
        phase: &'static str,
    },

    /// The text is over the server's limit.
    #[error("too long: {len} characters (max {max})")]
    TooLong { len: usize, max: usize },

    /// Nothing left to send after trimming.
    #[error("nothing to send")]
    Empty,

    /// The session has ended; nothing can be sent anymore.
    #[error("session is closed")]
    Closed,

    /// The action could not be encoded, or the frame is bigger than the
    /// server reads.
    #[error("encode failed: {0}")]
    Encode(String),
}

impl From<ProtocolError> for ActionError {
    fn from(e: ProtocolError) -> Self {
        Self::Encode(e.to_string())
    }
}

/// Work queued for the runtime task.
#[derive(Debug)]
pub(crate) enum Command {
    /// An encoded frame to send as-is.
    Send(Vec<u8>),
    /// Replace our own draft in the running game.
    SetDraft(String),
    /// Close the connection.
    Close,
}

/// Validates and queues user actions for one room.
///
/// Cheap to clone; every clone feeds the same connection.
#[derive(Debug, Clone)]
pub struct ActionEmitter {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<Session>,
    config: ClientConfig,
    codec: JsonCodec,
}

impl ActionEmitter {
    pub(crate) fn new(
        commands: mpsc::UnboundedSender<Command>,
        state: watch::Receiver<Session>,
        config: ClientConfig,
    ) -> Self {
        Self {
            commands,
            state,
            config,
            codec: JsonCodec,
        }
    }

    pub(crate) fn commands(&self) -> &mpsc::UnboundedSender<Command> {
        &self.commands
    }

    /// Readies up, or un-readies if we are already ready.
    pub fn toggle_ready(&self) -> Result<(), ActionError> {
        let action = {
            let session = self.open_session()?;
            let (Phase::Lobby(lobby), Some(me)) = (session.phase(), session.self_id()) else {
                return Err(wrong_phase("toggle ready", &session));
            };
            lobby.toggle_ready_action(me)
        };
        self.send(&action)
    }

    /// Asks the server to skip the rest of the countdown.
    ///
    /// Not checked locally; the server ignores it from anyone but the
    /// owner. Use [`can_start_early`](Self::can_start_early) to decide
    /// whether to offer it.
    pub fn start_early(&self) -> Result<(), ActionError> {
        self.open_session()?;
        self.send(&ClientAction::StartEarly)
    }

    /// Whether an early start would be accepted: we own the room and at
    /// least two players are ready.
    pub fn can_start_early(&self) -> bool {
        let session = self.state.borrow();
        match (session.lobby(), session.self_id(), session.owner_id()) {
            (Some(lobby), Some(me), Some(owner)) => lobby.can_start_early(me, owner),
            _ => false,
        }
    }

    /// Changes the room settings (owner only, enforced by the server).
    pub fn update_settings(&self, settings: RoomSettings) -> Result<(), ActionError> {
        self.open_session()?;
        self.send(&ClientAction::RoomSettings(settings))
    }

    /// Sends a chat message. Surrounding whitespace is trimmed.
    pub fn chat(&self, content: &str) -> Result<(), ActionError> {
        self.open_session()?;
        let content = content.trim();
        if content.is_empty() {
            return Err(ActionError::Empty);
        }
        check_len(content, self.config.max_chat_len)?;
        self.send(&ClientAction::ChatMessage {
            content: content.to_string(),
        })
    }

    /// Records a keystroke in our own draft.
    ///
    /// In WordBomb, while we hold the turn, the draft is also sent so the
    /// other players can watch us type. The draft is cut to the word
    /// length limit.
    pub fn echo_own_input(&self, text: &str) -> Result<(), ActionError> {
        let text: String = text.chars().take(self.config.max_word_len).collect();
        let preview = {
            let session = self.open_session()?;
            match (session.phase(), session.self_id()) {
                (Phase::WordBomb(game), Some(me)) => game.is_own_turn(me),
                (Phase::Anagrams(_), _) => false,
                _ => return Err(wrong_phase("typing", &session)),
            }
        };

        self.commands
            .send(Command::SetDraft(text.clone()))
            .map_err(|_| ActionError::Closed)?;
        if preview {
            self.send(&ClientAction::WordBombInput { input: text })?;
        }
        Ok(())
    }

    /// Submits a WordBomb guess. Only the turn holder may guess.
    ///
    /// The word is lowercased and stripped of anything that isn't an
    /// ASCII letter before it is checked and sent.
    pub fn submit_guess(&self, word: &str) -> Result<(), ActionError> {
        {
            let session = self.open_session()?;
            let (Phase::WordBomb(game), Some(me)) = (session.phase(), session.self_id()) else {
                return Err(wrong_phase("WordBomb guess", &session));
            };
            if !game.is_own_turn(me) {
                return Err(ActionError::NotYourTurn);
            }
        }
        let word = self.normalize_word(word)?;
        self.send(&ClientAction::WordBombGuess { word })
    }

    /// Submits an Anagrams guess, normalized like
    /// [`submit_guess`](Self::submit_guess).
    pub fn anagrams_guess(&self, word: &str) -> Result<(), ActionError> {
        {
            let session = self.open_session()?;
            if !matches!(session.phase(), Phase::Anagrams(_)) {
                return Err(wrong_phase("Anagrams guess", &session));
            }
        }
        let word = self.normalize_word(word)?;
        self.send(&ClientAction::AnagramsGuess { word })
    }

    /// Borrows the latest snapshot, refusing if the session has ended.
    fn open_session(&self) -> Result<watch::Ref<'_, Session>, ActionError> {
        let session = self.state.borrow();
        if session.is_closed() {
            return Err(ActionError::Closed);
        }
        Ok(session)
    }

    fn normalize_word(&self, word: &str) -> Result<String, ActionError> {
        let word: String = word
            .chars()
            .filter(char::is_ascii_alphabetic)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if word.is_empty() {
            return Err(ActionError::Empty);
        }
        check_len(&word, self.config.max_word_len)?;
        Ok(word)
    }

    fn send(&self, action: &ClientAction) -> Result<(), ActionError> {
        let bytes = self.codec.encode_action(action)?;
        self.commands
            .send(Command::Send(bytes))
            .map_err(|_| ActionError::Closed)
    }
}

fn check_len(text: &str, max: usize) -> Result<(), ActionError> {
    let len = text.chars().count();
    if len > max {
        return Err(ActionError::TooLong { len, max });
    }
    Ok(())
}

fn wrong_phase(action: &'static str, session: &Session) -> ActionError {
    ActionError::WrongPhase {
        action,
        phase: session.phase().name(),
    }
}
