//! The ordered list of clients in a room.

use wordrush_protocol::{ClientInfo, PlayerId};

/// Every client in the room, in display order.
///
/// Ids are unique. A client joining for the first time is appended; a
/// client that reconnects keeps its place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    clients: Vec<ClientInfo>,
}

impl Roster {
    /// Builds a roster from a server snapshot.
    ///
    /// If the snapshot repeats an id, the later entry wins but keeps the
    /// earlier position.
    pub fn from_clients(clients: Vec<ClientInfo>) -> Self {
        let mut roster = Self::default();
        for client in clients {
            match roster.position(&client.uuid) {
                Some(i) => roster.clients[i] = client,
                None => roster.clients.push(client),
            }
        }
        roster
    }

    fn position(&self, id: &PlayerId) -> Option<usize> {
        self.clients.iter().position(|c| &c.uuid == id)
    }

    pub fn get(&self, id: &PlayerId) -> Option<&ClientInfo> {
        self.clients.iter().find(|c| &c.uuid == id)
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.position(id).is_some()
    }

    /// The display name for `id`, if the client is known.
    pub fn username(&self, id: &PlayerId) -> Option<&str> {
        self.get(id).map(|c| c.username.as_str())
    }

    /// Like [`username`](Self::username), but falls back to the raw id so
    /// there is always something to show.
    pub fn display_name(&self, id: &PlayerId) -> String {
        self.username(id)
            .map(str::to_string)
            .unwrap_or_else(|| id.to_string())
    }

    /// Adds a client or brings a known one back, marking it connected.
    pub fn upsert(&mut self, id: PlayerId, username: String) {
        match self.position(&id) {
            Some(i) => {
                let client = &mut self.clients[i];
                client.username = username;
                client.disconnected = false;
            }
            None => self.clients.push(ClientInfo {
                uuid: id,
                username,
                disconnected: false,
            }),
        }
    }

    /// Removes a client. Returns the removed entry, if there was one.
    pub fn remove(&mut self, id: &PlayerId) -> Option<ClientInfo> {
        let i = self.position(id)?;
        Some(self.clients.remove(i))
    }

    /// Marks a client as gone but keeps its seat. Returns `false` for an
    /// unknown id.
    pub fn mark_disconnected(&mut self, id: &PlayerId) -> bool {
        match self.position(id) {
            Some(i) => {
                self.clients[i].disconnected = true;
                true
            }
            None => false,
        }
    }

    /// Drops every disconnected client.
    pub fn retain_connected(&mut self) {
        self.clients.retain(|c| !c.disconnected);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClientInfo> {
        self.clients.iter()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(id: &str, name: &str) -> ClientInfo {
        ClientInfo {
            uuid: PlayerId::from(id),
            username: name.to_string(),
            disconnected: false,
        }
    }

    #[test]
    fn test_from_clients_dedupes_ids() {
        let roster = Roster::from_clients(vec![
            client("u1", "nat"),
            client("u2", "bo"),
            client("u1", "natalie"),
        ]);
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.username(&PlayerId::from("u1")), Some("natalie"));
        let order: Vec<&str> = roster.iter().map(|c| c.uuid.as_str()).collect();
        assert_eq!(order, ["u1", "u2"]);
    }

    #[test]
    fn test_upsert_keeps_position_and_clears_disconnected() {
        let mut roster = Roster::from_clients(vec![client("u1", "nat"), client("u2", "bo")]);
        let u1 = PlayerId::from("u1");

        assert!(roster.mark_disconnected(&u1));
        roster.upsert(u1.clone(), "nat2".into());

        let first = roster.iter().next().unwrap();
        assert_eq!(first.uuid, u1);
        assert_eq!(first.username, "nat2");
        assert!(!first.disconnected);
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn test_retain_connected() {
        let mut roster = Roster::from_clients(vec![client("u1", "nat"), client("u2", "bo")]);
        roster.mark_disconnected(&PlayerId::from("u2"));
        roster.retain_connected();
        assert_eq!(roster.len(), 1);
        assert!(!roster.contains(&PlayerId::from("u2")));
    }

    #[test]
    fn test_unknown_ids() {
        let mut roster = Roster::default();
        let ghost = PlayerId::from("ghost");
        assert!(!roster.mark_disconnected(&ghost));
        assert!(roster.remove(&ghost).is_none());
        assert_eq!(roster.display_name(&ghost), "ghost");
    }
}
