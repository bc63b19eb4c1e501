use system::{ConnectionId, Participant, ServerMessage, Welcome};
use thiserror::Error;

use crate::allocator::{Allocate, AllocationError};
use crate::connection::{ConnectionEvent, DisconnectReason};
use crate::outbox::ConnectionTx;
use crate::registry::{RegistryError, Session};
use crate::server_state::ServerState;

/// Attempts at drawing an unused participant id before giving up.
pub const MAX_ALLOCATION_ATTEMPTS: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl<A: Allocate> ServerState<A> {
    /// Registers a new connection and introduces it to the room.
    ///
    /// The new connection gets its welcome and the current roster, everyone
    /// else gets a join notice. On failure nothing is registered and the
    /// connection is told to close.
    pub fn connect(
        &mut self,
        connection_id: ConnectionId,
        tx: ConnectionTx,
    ) -> Result<Participant, LifecycleError> {
        let participant = match self.allocate_participant() {
            Ok(participant) => participant,
            Err(err) => {
                tx.finish(ConnectionEvent::Disconnected {
                    reason: DisconnectReason::Rejected,
                });
                return Err(err.into());
            }
        };
        let session = Session::new(participant.clone(), tx.clone());
        if let Err(err) = self.registry.register(connection_id, session) {
            tx.finish(ConnectionEvent::Disconnected {
                reason: DisconnectReason::Rejected,
            });
            return Err(err.into());
        }

        tx.push(ConnectionEvent::Connected { connection_id });
        self.send_to(&connection_id, ServerMessage::Welcome(Welcome::new(&participant)));
        let current_users = self.registry.snapshot(Some(&connection_id));
        self.send_to(&connection_id, ServerMessage::CurrentUsers(current_users));

        self.stats.joins += 1;
        log::info!("User {} has joined", participant.id);

        let fan_out = self.announce_join(&connection_id, &participant);
        self.evict_lagging(fan_out.lagging);
        Ok(participant)
    }

    /// Removes a connection and tells the remaining participants.
    ///
    /// Unknown connections are ignored, so a repeated disconnect never
    /// announces a second leave.
    pub fn disconnect(&mut self, connection_id: &ConnectionId) -> Option<Participant> {
        let session = match self.registry.unregister(connection_id) {
            Ok(session) => session,
            Err(err) => {
                log::debug!("Ignoring disconnect: {}", err);
                return None;
            }
        };
        session.tx.finish(ConnectionEvent::Disconnected {
            reason: DisconnectReason::Left,
        });

        self.stats.leaves += 1;
        log::info!("User {} has left", session.participant.id);

        let fan_out = self.announce_leave(&session.participant);
        self.evict_lagging(fan_out.lagging);
        if self.registry.is_empty() {
            log::debug!("Room is empty");
        }
        Some(session.participant)
    }

    /// Disconnects recipients that fell behind on strokes. Their own leave
    /// notices may leave others lagging, so this runs until nobody is.
    pub(crate) fn evict_lagging(&mut self, lagging: Vec<ConnectionId>) {
        let mut pending = lagging;
        while let Some(connection_id) = pending.pop() {
            let session = match self.registry.unregister(&connection_id) {
                Ok(session) => session,
                Err(_) => continue,
            };
            log::warn!(
                "Disconnecting user {} with {} undelivered messages",
                session.participant.id,
                session.tx.len()
            );
            session.tx.evict(ConnectionEvent::Disconnected {
                reason: DisconnectReason::Lagging,
            });
            self.stats.leaves += 1;
            self.stats.lagging_evictions += 1;

            let fan_out = self.announce_leave(&session.participant);
            pending.extend(fan_out.lagging);
        }
    }

    fn allocate_participant(&mut self) -> Result<Participant, AllocationError> {
        for _ in 0..MAX_ALLOCATION_ATTEMPTS {
            let (id, color) = self.allocator.allocate();
            if !self.registry.contains_participant(&id) {
                return Ok(Participant::new(id, color));
            }
            log::debug!("Participant id {} is taken, drawing again", id);
        }
        Err(AllocationError::IdentifierSpaceExhausted {
            attempts: MAX_ALLOCATION_ATTEMPTS,
        })
    }
}
