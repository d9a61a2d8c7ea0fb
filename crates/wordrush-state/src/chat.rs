//! The room's chat log.

use wordrush_protocol::PlayerId;

use crate::Roster;

/// Where a chat line came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatKind {
    /// Joins, leaves and server notices.
    Info,
    /// Requests the server refused.
    Error,
    /// A message typed by a client.
    FromClient { author: PlayerId },
}

/// One line in the chat log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub kind: ChatKind,
    pub content: String,
}

impl ChatEntry {
    /// Renders the line for display, resolving the author's name.
    pub fn render(&self, roster: &Roster) -> String {
        match &self.kind {
            ChatKind::Info => self.content.clone(),
            ChatKind::Error => format!("error: {}", self.content),
            ChatKind::FromClient { author } => {
                format!("{}: {}", roster.display_name(author), self.content)
            }
        }
    }
}

/// Append-only chat history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatLog {
    entries: Vec<ChatEntry>,
}

impl ChatLog {
    pub fn push_info(&mut self, content: impl Into<String>) {
        self.push(ChatKind::Info, content.into());
    }

    pub fn push_error(&mut self, content: impl Into<String>) {
        self.push(ChatKind::Error, content.into());
    }

    pub fn push_message(&mut self, author: PlayerId, content: impl Into<String>) {
        self.push(ChatKind::FromClient { author }, content.into());
    }

    fn push(&mut self, kind: ChatKind, content: String) {
        self.entries.push(ChatEntry { kind, content });
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&ChatEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
