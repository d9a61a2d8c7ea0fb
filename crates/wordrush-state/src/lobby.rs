//! Lobby state: who is ready and whether the start countdown is running.

use std::collections::BTreeSet;

use wordrush_protocol::{ClientAction, CountdownState, LobbySnapshot, PlayerId, ServerMessage};

use crate::PostGameSummary;

/// Fewest ready players for a countdown to run (and for an early start).
pub const MIN_READY: usize = 2;

/// The lobby between games.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LobbyState {
    ready: BTreeSet<PlayerId>,
    countdown: Option<u8>,
    post_game: Option<PostGameSummary>,
}

impl LobbyState {
    /// Builds the lobby from the snapshot in `Info`.
    pub fn from_snapshot(snapshot: LobbySnapshot) -> Self {
        let ready: BTreeSet<PlayerId> = snapshot.ready.into_iter().collect();
        let countdown = snapshot
            .starting_countdown
            .filter(|_| ready.len() >= MIN_READY);
        Self {
            ready,
            countdown,
            post_game: None,
        }
    }

    /// The lobby a game ends into: nobody ready, no countdown, the
    /// results on display.
    pub fn after_game(summary: PostGameSummary) -> Self {
        Self {
            ready: BTreeSet::new(),
            countdown: None,
            post_game: Some(summary),
        }
    }

    /// Applies a lobby event. Anything else is returned unchanged.
    pub fn apply(mut self, event: &ServerMessage) -> Self {
        match event {
            ServerMessage::ReadyPlayers {
                ready,
                countdown_update,
            } => {
                self.ready = ready.iter().cloned().collect();
                match countdown_update {
                    Some(CountdownState::InProgress { time_left }) => {
                        self.countdown = Some(*time_left);
                    }
                    Some(CountdownState::Stopped) => self.countdown = None,
                    None => {}
                }
                if self.ready.len() < MIN_READY {
                    self.countdown = None;
                }
            }
            ServerMessage::StartingCountdown { time_left } => {
                if self.ready.len() >= MIN_READY {
                    self.countdown = Some(*time_left);
                } else {
                    tracing::warn!(
                        ready = self.ready.len(),
                        time_left,
                        "countdown tick with too few players ready ignored"
                    );
                }
            }
            other => {
                tracing::warn!(kind = ?other.kind(), "not a lobby event");
            }
        }
        self
    }

    pub fn ready(&self) -> &BTreeSet<PlayerId> {
        &self.ready
    }

    pub fn is_ready(&self, id: &PlayerId) -> bool {
        self.ready.contains(id)
    }

    /// Seconds left before the game starts, while the countdown runs.
    pub fn countdown(&self) -> Option<u8> {
        self.countdown
    }

    /// Results of the last game, until the next one starts.
    pub fn post_game(&self) -> Option<&PostGameSummary> {
        self.post_game.as_ref()
    }

    /// The action that flips `self_id`'s ready state. The lobby itself
    /// only changes once the server echoes `ReadyPlayers`.
    pub fn toggle_ready_action(&self, self_id: &PlayerId) -> ClientAction {
        if self.is_ready(self_id) {
            ClientAction::Unready
        } else {
            ClientAction::Ready
        }
    }

    /// Whether `self_id` may skip the countdown: they own the room and
    /// enough players are ready.
    pub fn can_start_early(&self, self_id: &PlayerId, owner_id: &PlayerId) -> bool {
        self_id == owner_id && self.ready.len() >= MIN_READY
    }
}
