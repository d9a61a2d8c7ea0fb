//! Post-game summaries.
//!
//! The server sends its statistics once, in `GameEnded`. We turn them into
//! sorted leaderboards with usernames resolved up front, because players
//! who disconnected during the game are dropped from the roster right
//! after and their names would otherwise be lost.

use std::cmp::Ordering;

use wordrush_protocol::{PlayerId, PostGameInfo};

use crate::Roster;

/// One row of a leaderboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub player: PlayerId,
    pub username: String,
    pub value: T,
}

impl<T> Ranked<T> {
    fn new(roster: &Roster, player: &PlayerId, value: T) -> Self {
        Self {
            player: player.clone(),
            username: roster.display_name(player),
            value,
        }
    }
}

/// A fastest-guess record: how long a word took to find.
#[derive(Debug, Clone, PartialEq)]
pub struct FastestGuess {
    pub seconds: f64,
    pub word: String,
}

/// WordBomb results.
#[derive(Debug, Clone, PartialEq)]
pub struct WordBombSummary {
    pub winner: PlayerId,
    pub winner_name: String,
    pub mins_elapsed: f64,
    pub words_used: u32,
    pub letters_typed: u32,
    /// Quickest first.
    pub fastest_guesses: Vec<Ranked<FastestGuess>>,
    /// Longest first.
    pub longest_words: Vec<Ranked<String>>,
    /// Highest first.
    pub avg_wpms: Vec<Ranked<f64>>,
    /// Highest first.
    pub avg_word_lengths: Vec<Ranked<f64>>,
}

/// Anagrams results.
#[derive(Debug, Clone, PartialEq)]
pub struct AnagramsSummary {
    pub original_word: String,
    /// Highest score first.
    pub leaderboard: Vec<Ranked<u32>>,
    /// The top of the leaderboard. `None` if nobody played.
    pub winner: Option<PlayerId>,
}

/// What the lobby shows after a game, until the next one starts.
#[derive(Debug, Clone, PartialEq)]
pub enum PostGameSummary {
    WordBomb(WordBombSummary),
    Anagrams(AnagramsSummary),
}

impl PostGameSummary {
    /// Builds a summary from the server's statistics, resolving names
    /// through `roster`.
    pub fn from_info(info: &PostGameInfo, roster: &Roster) -> Self {
        match info {
            PostGameInfo::WordBomb {
                winner,
                mins_elapsed,
                words_used,
                letters_typed,
                fastest_guesses,
                longest_words,
                avg_wpms,
                avg_word_lengths,
            } => {
                let mut fastest: Vec<_> = fastest_guesses
                    .iter()
                    .map(|(id, seconds, word)| {
                        let guess = FastestGuess {
                            seconds: *seconds,
                            word: word.clone(),
                        };
                        Ranked::new(roster, id, guess)
                    })
                    .collect();
                fastest.sort_by(|a, b| a.value.seconds.total_cmp(&b.value.seconds));

                let mut longest: Vec<_> = longest_words
                    .iter()
                    .map(|(id, word)| Ranked::new(roster, id, word.clone()))
                    .collect();
                longest.sort_by_key(|r| std::cmp::Reverse(r.value.chars().count()));

                Self::WordBomb(WordBombSummary {
                    winner: winner.clone(),
                    winner_name: roster.display_name(winner),
                    mins_elapsed: *mins_elapsed,
                    words_used: *words_used,
                    letters_typed: *letters_typed,
                    fastest_guesses: fastest,
                    longest_words: longest,
                    avg_wpms: ranked_desc(roster, avg_wpms),
                    avg_word_lengths: ranked_desc(roster, avg_word_lengths),
                })
            }
            PostGameInfo::Anagrams {
                original_word,
                leaderboard,
            } => {
                let mut rows: Vec<_> = leaderboard
                    .iter()
                    .map(|(id, points)| Ranked::new(roster, id, *points))
                    .collect();
                rows.sort_by_key(|r| std::cmp::Reverse(r.value));
                let winner = rows.first().map(|r| r.player.clone());

                Self::Anagrams(AnagramsSummary {
                    original_word: original_word.clone(),
                    leaderboard: rows,
                    winner,
                })
            }
        }
    }

    /// The winner, if there is one.
    pub fn winner(&self) -> Option<&PlayerId> {
        match self {
            Self::WordBomb(s) => Some(&s.winner),
            Self::Anagrams(s) => s.winner.as_ref(),
        }
    }
}

fn ranked_desc(roster: &Roster, rows: &[(PlayerId, f64)]) -> Vec<Ranked<f64>> {
    let mut ranked: Vec<_> = rows
        .iter()
        .map(|(id, value)| Ranked::new(roster, id, *value))
        .collect();
    ranked.sort_by(|a, b| descending(a.value, b.value));
    ranked
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}
