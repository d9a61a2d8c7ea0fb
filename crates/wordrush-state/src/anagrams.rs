//! Anagrams state.
//!
//! Everyone works the same anagram at once. Each correct guess is pushed
//! to the whole room, so the client simply collects them per player. A
//! new round replaces the anagram but keeps the words already found.

use wordrush_protocol::{AnagramsPlayerData, AnagramsSnapshot, PlayerId, ServerMessage};

/// Longest guess the server accepts.
pub const MAX_GUESS_LEN: usize = 35;

/// Points for one word: `50 * 2^(len - 2)`, nothing for words shorter
/// than two letters.
///
/// ```
/// use wordrush_state::word_score;
///
/// assert_eq!(word_score("a"), 0);
/// assert_eq!(word_score("at"), 50);
/// assert_eq!(word_score("stone"), 400);
/// ```
pub fn word_score(word: &str) -> u32 {
    let len = word.chars().count();
    if len < 2 {
        return 0;
    }
    u32::try_from(len - 2)
        .ok()
        .and_then(|exp| 2u32.checked_pow(exp))
        .and_then(|factor| factor.checked_mul(50))
        .unwrap_or(u32::MAX)
}

/// One player's finds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnagramsPlayer {
    pub id: PlayerId,
    /// Words found so far, oldest first.
    pub used_words: Vec<String>,
}

impl AnagramsPlayer {
    /// Display score: the sum of [`word_score`] over every word found.
    pub fn score(&self) -> u32 {
        self.used_words
            .iter()
            .map(|w| word_score(w))
            .fold(0, u32::saturating_add)
    }
}

impl From<AnagramsPlayerData> for AnagramsPlayer {
    fn from(data: AnagramsPlayerData) -> Self {
        Self {
            id: data.uuid,
            used_words: data.used_words,
        }
    }
}

/// An Anagrams game in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnagramsState {
    players: Vec<AnagramsPlayer>,
    anagram: String,
    input: String,
}

impl AnagramsState {
    pub fn from_snapshot(snapshot: AnagramsSnapshot) -> Self {
        Self {
            players: snapshot.players.into_iter().map(AnagramsPlayer::from).collect(),
            anagram: snapshot.anagram,
            input: String::new(),
        }
    }

    /// Applies an Anagrams event. Anything else is returned unchanged.
    pub fn apply(mut self, event: &ServerMessage, self_id: &PlayerId) -> Self {
        match event {
            ServerMessage::AnagramsCorrectGuess { uuid, guess } => {
                match self.players.iter_mut().find(|p| &p.id == uuid) {
                    Some(player) => player.used_words.push(guess.clone()),
                    None => tracing::warn!(player_id = %uuid, "guess from unknown player"),
                }
                if uuid == self_id {
                    self.input.clear();
                }
            }
            ServerMessage::AnagramsPrompt { anagram } => {
                self.anagram = anagram.clone();
            }
            ServerMessage::AnagramsInvalidGuess { .. } => {}
            other => {
                tracing::warn!(kind = ?other.kind(), "not an Anagrams event");
            }
        }
        self
    }

    /// Replaces our own draft, truncated to [`MAX_GUESS_LEN`] characters.
    pub fn with_draft(mut self, text: &str) -> Self {
        self.input = text.chars().take(MAX_GUESS_LEN).collect();
        self
    }

    pub fn players(&self) -> &[AnagramsPlayer] {
        &self.players
    }

    pub fn player(&self, id: &PlayerId) -> Option<&AnagramsPlayer> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub fn anagram(&self) -> &str {
        &self.anagram
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Live standings by display score, highest first. Ties keep seat
    /// order.
    pub fn leaderboard(&self) -> Vec<(PlayerId, u32)> {
        let mut rows: Vec<(PlayerId, u32)> = self
            .players
            .iter()
            .map(|p| (p.id.clone(), p.score()))
            .collect();
        rows.sort_by_key(|(_, score)| std::cmp::Reverse(*score));
        rows
    }
}
