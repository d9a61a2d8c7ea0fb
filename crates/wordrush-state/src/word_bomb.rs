//! WordBomb state.
//!
//! Players take turns holding the bomb. The holder must type a word that
//! contains the current prompt before the timer runs out; failing costs a
//! life. All of that is decided by the server. The client only follows
//! along:
//!
//! - `WordBombPrompt` closes the previous turn (applying its life change)
//!   and names the next holder,
//! - `WordBombInput` mirrors what other players are typing.
//!
//! On top of that we track which letters the local player has used in
//! correct guesses. Using every tracked letter wins a life on the server,
//! and the set starts over.

use std::collections::BTreeSet;

use wordrush_protocol::{PlayerId, ServerMessage, WordBombPlayerData, WordBombSnapshot};

/// Letters that count towards the bonus life. `x` and `z` are left out.
pub const TRACKED_ALPHABET: &str = "abcdefghijklmnopqrstuvwy";

/// Longest input the server accepts.
pub const MAX_INPUT_LEN: usize = 35;

/// One seat at the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordBombPlayer {
    pub id: PlayerId,
    /// What the player is typing, as last mirrored by the server.
    pub input: String,
    pub lives: u8,
}

impl From<WordBombPlayerData> for WordBombPlayer {
    fn from(data: WordBombPlayerData) -> Self {
        Self {
            id: data.uuid,
            input: data.input,
            lives: data.lives,
        }
    }
}

/// A WordBomb game in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordBombState {
    players: Vec<WordBombPlayer>,
    turn: PlayerId,
    prompt: String,
    /// `None` when we are watching rather than playing.
    used_letters: Option<BTreeSet<char>>,
    /// Our own draft.
    input: String,
}

impl WordBombState {
    /// Builds the game from a snapshot, as seen by `self_id`.
    pub fn from_snapshot(snapshot: WordBombSnapshot, self_id: &PlayerId) -> Self {
        let players: Vec<WordBombPlayer> =
            snapshot.players.into_iter().map(WordBombPlayer::from).collect();

        let playing = players.iter().any(|p| &p.id == self_id);
        let used_letters = playing.then(|| {
            let mut used = BTreeSet::new();
            add_letters(&mut used, snapshot.used_letters.unwrap_or_default());
            used
        });

        Self {
            players,
            turn: snapshot.turn,
            prompt: snapshot.prompt,
            used_letters,
            input: String::new(),
        }
    }

    /// Applies a WordBomb event. Anything else is returned unchanged.
    pub fn apply(mut self, event: &ServerMessage, self_id: &PlayerId) -> Self {
        match event {
            ServerMessage::WordBombPrompt {
                correct_guess,
                life_change,
                prompt,
                turn,
            } => {
                let previous = std::mem::replace(&mut self.turn, turn.clone());

                match self.players.iter_mut().find(|p| p.id == previous) {
                    Some(player) => {
                        player.lives = player.lives.saturating_add_signed(*life_change);
                        player.input.clear();
                    }
                    None => {
                        tracing::warn!(player_id = %previous, "prompt for unknown turn holder");
                    }
                }

                if &previous == self_id {
                    if let (Some(word), Some(used)) = (correct_guess, self.used_letters.as_mut()) {
                        add_letters(used, word.chars());
                    }
                }

                if turn == self_id {
                    self.input.clear();
                }
                self.prompt = prompt.clone();
            }
            ServerMessage::WordBombInput { uuid, input } => {
                match self.players.iter_mut().find(|p| &p.id == uuid) {
                    Some(player) => player.input = input.clone(),
                    None => tracing::warn!(player_id = %uuid, "input from unknown player"),
                }
            }
            // Rejections are shown by whoever subscribed to them.
            ServerMessage::WordBombInvalidGuess { .. } => {}
            other => {
                tracing::warn!(kind = ?other.kind(), "not a WordBomb event");
            }
        }
        self
    }

    /// Replaces our own draft, truncated to [`MAX_INPUT_LEN`] characters.
    pub fn with_draft(mut self, text: &str) -> Self {
        self.input = text.chars().take(MAX_INPUT_LEN).collect();
        self
    }

    pub fn players(&self) -> &[WordBombPlayer] {
        &self.players
    }

    pub fn player(&self, id: &PlayerId) -> Option<&WordBombPlayer> {
        self.players.iter().find(|p| &p.id == id)
    }

    /// Lives left for `id`, if they are playing.
    pub fn lives(&self, id: &PlayerId) -> Option<u8> {
        self.player(id).map(|p| p.lives)
    }

    /// Players with at least one life.
    pub fn alive(&self) -> impl Iterator<Item = &WordBombPlayer> {
        self.players.iter().filter(|p| p.lives > 0)
    }

    pub fn turn(&self) -> &PlayerId {
        &self.turn
    }

    /// The seat of whoever holds the bomb.
    pub fn turn_player(&self) -> Option<&WordBombPlayer> {
        self.player(&self.turn)
    }

    pub fn is_own_turn(&self, self_id: &PlayerId) -> bool {
        &self.turn == self_id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Letters we have used since the set last started over.
    pub fn used_letters(&self) -> Option<&BTreeSet<char>> {
        self.used_letters.as_ref()
    }

    /// Tracked letters we still need, in alphabet order.
    pub fn unused_letters(&self) -> Vec<char> {
        let used = self.used_letters.as_ref();
        TRACKED_ALPHABET
            .chars()
            .filter(|c| !used.is_some_and(|u| u.contains(c)))
            .collect()
    }

    /// Our own draft.
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// Adds the tracked letters of `chars` to `used`, starting over once
/// every tracked letter is in.
fn add_letters(used: &mut BTreeSet<char>, chars: impl IntoIterator<Item = char>) {
    used.extend(
        chars
            .into_iter()
            .map(|c| c.to_ascii_lowercase())
            .filter(|c| TRACKED_ALPHABET.contains(*c)),
    );
    if used.len() == TRACKED_ALPHABET.len() {
        used.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> PlayerId {
        PlayerId::from(s)
    }

    fn snapshot(turn: &str) -> WordBombSnapshot {
        WordBombSnapshot {
            players: vec![
                WordBombPlayerData {
                    uuid: id("u1"),
                    input: String::new(),
                    lives: 2,
                },
                WordBombPlayerData {
                    uuid: id("u2"),
                    input: String::new(),
                    lives: 2,
                },
            ],
            turn: id(turn),
            prompt: "ca".into(),
            used_letters: None,
        }
    }

    fn prompt(guess: Option<&str>, life_change: i8, prompt: &str, turn: &str) -> ServerMessage {
        ServerMessage::WordBombPrompt {
            correct_guess: guess.map(str::to_string),
            life_change,
            prompt: prompt.into(),
            turn: id(turn),
        }
    }

    #[test]
    fn test_own_correct_guess_passes_turn_and_tracks_letters() {
        let me = id("u1");
        let state = WordBombState::from_snapshot(snapshot("u1"), &me)
            .apply(&prompt(Some("cat"), 0, "og", "u2"), &me);

        assert_eq!(state.lives(&me), Some(2));
        assert_eq!(state.turn(), &id("u2"));
        assert_eq!(state.prompt(), "og");
        let used: Vec<char> = state.used_letters().unwrap().iter().copied().collect();
        assert_eq!(used, ['a', 'c', 't']);
    }

    #[test]
    fn test_life_loss_hits_previous_holder_and_saturates() {
        let me = id("u1");
        let state = WordBombState::from_snapshot(snapshot("u2"), &me)
            .apply(&prompt(None, -1, "og", "u1"), &me)
            .apply(&prompt(None, -1, "ab", "u2"), &me)
            .apply(&prompt(None, -1, "cd", "u1"), &me)
            .apply(&prompt(None, -1, "ef", "u2"), &me);

        assert_eq!(state.lives(&id("u2")), Some(0));
        assert_eq!(state.lives(&me), Some(0));
        assert_eq!(state.alive().count(), 0);
    }

    #[test]
    fn test_other_players_guesses_do_not_touch_used_letters() {
        let me = id("u1");
        let state = WordBombState::from_snapshot(snapshot("u2"), &me)
            .apply(&prompt(Some("zebra"), 0, "og", "u1"), &me);
        assert!(state.used_letters().unwrap().is_empty());
    }

    #[test]
    fn test_used_letters_wrap_to_empty() {
        let me = id("u1");
        let mut state = WordBombState::from_snapshot(snapshot("u1"), &me);

        // Each guess hands the turn to u2 and back.
        for word in ["abcdefgh", "ijklmnop", "qrstuvw"] {
            state = state
                .apply(&prompt(Some(word), 0, "xx", "u2"), &me)
                .apply(&prompt(None, 0, "xx", "u1"), &me);
        }
        assert_eq!(state.unused_letters(), ['y']);

        let state = state.apply(&prompt(Some("yak"), 0, "xx", "u2"), &me);
        let used = state.used_letters().expect("still tracked");
        assert!(used.is_empty());
        assert_eq!(state.unused_letters().len(), TRACKED_ALPHABET.len());
    }

    #[test]
    fn test_snapshot_used_letters_are_kept() {
        let me = id("u1");
        let mut snap = snapshot("u2");
        snap.used_letters = Some(vec!['q', 'x', 'a']);
        let state = WordBombState::from_snapshot(snap, &me);
        // 'x' isn't tracked.
        let used: Vec<char> = state.used_letters().unwrap().iter().copied().collect();
        assert_eq!(used, ['a', 'q']);
    }

    #[test]
    fn test_spectator_has_no_used_letters() {
        let state = WordBombState::from_snapshot(snapshot("u1"), &id("watcher"));
        assert!(state.used_letters().is_none());
    }

    #[test]
    fn test_input_mirrors_and_draft_clears_on_own_turn() {
        let me = id("u1");
        let state = WordBombState::from_snapshot(snapshot("u2"), &me)
            .with_draft("hello")
            .apply(
                &ServerMessage::WordBombInput {
                    uuid: id("u2"),
                    input: "og".into(),
                },
                &me,
            );
        assert_eq!(state.player(&id("u2")).unwrap().input, "og");
        assert_eq!(state.input(), "hello");

        let state = state.apply(&prompt(None, -1, "ab", "u1"), &me);
        assert_eq!(state.input(), "");
        assert_eq!(state.player(&id("u2")).unwrap().input, "");
        assert!(state.is_own_turn(&me));
        assert_eq!(state.turn_player().unwrap().id, me);
    }

    #[test]
    fn test_draft_is_truncated() {
        let state = WordBombState::from_snapshot(snapshot("u1"), &id("u1")).with_draft(&"a".repeat(50));
        assert_eq!(state.input().len(), MAX_INPUT_LEN);
    }

    #[test]
    fn test_same_events_same_result_regardless_of_batching() {
        let me = id("u1");
        let events = [
            prompt(Some("cab"), 0, "og", "u2"),
            prompt(None, -1, "re", "u1"),
            prompt(None, -1, "st", "u2"),
            prompt(Some("rest"), 0, "in", "u1"),
        ];

        let one_by_one = events
            .iter()
            .fold(WordBombState::from_snapshot(snapshot("u1"), &me), |s, e| s.apply(e, &me));

        let (first, second) = events.split_at(1);
        let mut batched = WordBombState::from_snapshot(snapshot("u1"), &me);
        for batch in [first, second] {
            for e in batch {
                batched = batched.apply(e, &me);
            }
        }

        assert_eq!(one_by_one, batched);
        assert_eq!(one_by_one.lives(&me), Some(1));
        assert_eq!(one_by_one.lives(&id("u2")), Some(1));
        assert_eq!(one_by_one.turn(), &me);
    }

    #[test]
    fn test_unknown_player_is_ignored() {
        let me = id("u1");
        let before = WordBombState::from_snapshot(snapshot("u1"), &me);
        let after = before.clone().apply(
            &ServerMessage::WordBombInput {
                uuid: id("ghost"),
                input: "boo".into(),
            },
            &me,
        );
        assert_eq!(before, after);
    }
}
