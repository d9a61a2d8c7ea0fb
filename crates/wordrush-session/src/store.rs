//! Local persistence for rejoin tokens and the remembered username.
//!
//! The client only ever needs two tiny pieces of durable state:
//!
//! - a **rejoin token** per room, handed out by the server when a game
//!   starts so a dropped player can take their seat back, and
//! - the **username** the player last joined with.
//!
//! Both are reached through a trait so the connector doesn't care where
//! they live. The file-backed stores keep plain JSON / plain text next to
//! each other in a config directory; the in-memory stores are for tests
//! and for embedders that persist somewhere else.
//!
//! Reads never fail: a missing or unreadable file means "nothing stored".
//! Writes report I/O errors so the caller can log them.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use wordrush_protocol::RoomId;

use crate::SessionError;

/// Stores one rejoin token per room. Last write wins.
pub trait TokenStore: Send + Sync + 'static {
    /// Returns the token stored for `room`, if any.
    fn get(&self, room: &RoomId) -> Option<String>;

    /// Stores `token` for `room`, replacing any previous token.
    fn set(&self, room: &RoomId, token: &str) -> Result<(), SessionError>;
}

/// Remembers the username the player last joined with.
pub trait UsernameStore: Send + Sync + 'static {
    /// Returns the remembered username, if any.
    fn get(&self) -> Option<String>;

    /// Remembers `username`.
    fn set(&self, username: &str) -> Result<(), SessionError>;
}

impl<T: TokenStore + ?Sized> TokenStore for Arc<T> {
    fn get(&self, room: &RoomId) -> Option<String> {
        (**self).get(room)
    }

    fn set(&self, room: &RoomId, token: &str) -> Result<(), SessionError> {
        (**self).set(room, token)
    }
}

impl<U: UsernameStore + ?Sized> UsernameStore for Arc<U> {
    fn get(&self) -> Option<String> {
        (**self).get()
    }

    fn set(&self, username: &str) -> Result<(), SessionError> {
        (**self).set(username)
    }
}

/// Locks a mutex, taking the data back even if a writer panicked.
///
/// The guarded values are plain maps and strings that are never left
/// half-updated, so a poisoned lock is still safe to read.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ---------------------------------------------------------------------------
// In-memory stores
// ---------------------------------------------------------------------------

/// A [`TokenStore`] that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<BTreeMap<RoomId, String>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, room: &RoomId) -> Option<String> {
        lock(&self.tokens).get(room).cloned()
    }

    fn set(&self, room: &RoomId, token: &str) -> Result<(), SessionError> {
        lock(&self.tokens).insert(room.clone(), token.to_string());
        Ok(())
    }
}

/// A [`UsernameStore`] that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryUsernameStore {
    username: Mutex<Option<String>>,
}

impl MemoryUsernameStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl UsernameStore for MemoryUsernameStore {
    fn get(&self) -> Option<String> {
        lock(&self.username).clone()
    }

    fn set(&self, username: &str) -> Result<(), SessionError> {
        *lock(&self.username) = Some(username.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File-backed stores
// ---------------------------------------------------------------------------

/// On-disk shape of the token file: a flat JSON object of
/// `room name → token`.
///
/// ```json
/// { "abc": "3f0c...", "lobby-7": "91aa..." }
/// ```
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
struct TokenFile {
    rooms: BTreeMap<RoomId, String>,
}

/// A [`TokenStore`] backed by a JSON file.
///
/// The file is re-read on every access so several clients sharing the
/// same file see each other's writes. If the file is missing or doesn't
/// parse, it is treated as empty (and rewritten on the next `set`).
#[derive(Debug)]
pub struct JsonTokenStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonTokenStore {
    /// Creates a store that reads and writes `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// The file this store uses.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> TokenFile {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return TokenFile::default(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read token file");
                return TokenFile::default();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "token file is malformed, starting from an empty map"
            );
            TokenFile::default()
        })
    }
}

impl TokenStore for JsonTokenStore {
    fn get(&self, room: &RoomId) -> Option<String> {
        self.load().rooms.get(room).cloned()
    }

    fn set(&self, room: &RoomId, token: &str) -> Result<(), SessionError> {
        // Serialize read-modify-write within this process.
        let _guard = lock(&self.write_lock);

        let mut file = self.load();
        file.rooms.insert(room.clone(), token.to_string());

        let json = serde_json::to_string_pretty(&file)?;
        write_creating_parent(&self.path, json.as_bytes())?;

        tracing::debug!(room_id = %room, path = %self.path.display(), "rejoin token stored");
        Ok(())
    }
}

/// A [`UsernameStore`] backed by a plain text file.
#[derive(Debug)]
pub struct FileUsernameStore {
    path: PathBuf,
}

impl FileUsernameStore {
    /// Creates a store that reads and writes `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this store uses.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UsernameStore for FileUsernameStore {
    fn get(&self) -> Option<String> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let name = raw.trim();
        (!name.is_empty()).then(|| name.to_string())
    }

    fn set(&self, username: &str) -> Result<(), SessionError> {
        write_creating_parent(&self.path, username.as_bytes())?;
        Ok(())
    }
}

fn write_creating_parent(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, contents)
}
