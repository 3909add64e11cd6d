//! Ordered log of finalized sessions, newest first.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::record::{parse_tags, Session};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SessionLog {
    sessions: Vec<Session>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log from entries in newest-first order. Later entries that
    /// repeat an earlier id are dropped.
    pub fn from_sessions(sessions: Vec<Session>) -> Self {
        let mut seen = HashSet::new();
        let sessions = sessions
            .into_iter()
            .filter(|s| seen.insert(s.id.clone()))
            .collect();
        Self { sessions }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Prepend a finalized session. Returns `false` (and leaves the log
    /// untouched) if the id is already present.
    pub fn prepend(&mut self, session: Session) -> bool {
        if self.contains(&session.id) {
            return false;
        }
        self.sessions.insert(0, session);
        true
    }

    /// Replace note and tags of the session with `id`. Identity, timestamps
    /// and duration never change. Returns the edited session.
    pub fn edit(&mut self, id: &str, note: &str, tags_input: &str) -> Option<&Session> {
        let session = self.sessions.iter_mut().find(|s| s.id == id)?;
        session.note = note.trim().to_string();
        session.tags = parse_tags(tags_input);
        Some(&*session)
    }

    pub fn remove(&mut self, id: &str) -> Option<Session> {
        let index = self.sessions.iter().position(|s| s.id == id)?;
        Some(self.sessions.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter()
    }
}

impl<'de> Deserialize<'de> for SessionLog {
    /// Entries that fail to decode are dropped instead of failing the log.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let Value::Array(items) = value else {
            return Ok(Self::new());
        };
        let sessions = items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<Session>(item).ok())
            .collect();
        Ok(Self::from_sessions(sessions))
    }
}

impl<'a> IntoIterator for &'a SessionLog {
    type Item = &'a Session;
    type IntoIter = std::slice::Iter<'a, Session>;

    fn into_iter(self) -> Self::IntoIter {
        self.sessions.iter()
    }
}
