use std::collections::HashMap;

use system::{ConnectionId, Participant, ParticipantId};
use thiserror::Error;

use crate::outbox::ConnectionTx;

pub struct Session {
    pub participant: Participant,
    pub tx: ConnectionTx,
}

impl Session {
    pub fn new(participant: Participant, tx: ConnectionTx) -> Self {
        Self { participant, tx }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("connection {0} is already registered")]
    DuplicateHandle(ConnectionId),
    #[error("connection {0} is not registered")]
    NotFound(ConnectionId),
}

/// Who is currently in the room, keyed by connection.
#[derive(Default)]
pub struct Registry {
    sessions: HashMap<ConnectionId, Session>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        connection_id: ConnectionId,
        session: Session,
    ) -> Result<(), RegistryError> {
        if self.sessions.contains_key(&connection_id) {
            return Err(RegistryError::DuplicateHandle(connection_id));
        }
        self.sessions.insert(connection_id, session);
        Ok(())
    }

    pub fn unregister(&mut self, connection_id: &ConnectionId) -> Result<Session, RegistryError> {
        self.sessions
            .remove(connection_id)
            .ok_or(RegistryError::NotFound(*connection_id))
    }

    /// Participants currently active, sorted by id.
    pub fn snapshot(&self, without: Option<&ConnectionId>) -> Vec<Participant> {
        let mut participants: Vec<Participant> = self
            .recipients(without)
            .map(|(_, session)| session.participant.clone())
            .collect();
        participants.sort_by(|a, b| a.id.cmp(&b.id));
        participants
    }

    pub fn get(&self, connection_id: &ConnectionId) -> Option<&Session> {
        self.sessions.get(connection_id)
    }

    pub fn contains_participant(&self, id: &ParticipantId) -> bool {
        self.sessions.values().any(|s| &s.participant.id == id)
    }

    pub fn recipients<'a>(
        &'a self,
        without: Option<&'a ConnectionId>,
    ) -> impl Iterator<Item = (&'a ConnectionId, &'a Session)> + 'a {
        self.sessions
            .iter()
            .filter(move |(connection_id, _)| without != Some(*connection_id))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
