use system::{Color, ParticipantId};
use thiserror::Error;
use uuid::Uuid;

/// Length of a participant id, in hex digits.
pub const PARTICIPANT_ID_LEN: usize = 8;

/// Hands out a public id and a display color for a new participant.
///
/// Ids are not guaranteed to be unique; the lifecycle retries against the
/// registry when an id is already taken.
pub trait Allocate: Send {
    fn allocate(&mut self) -> (ParticipantId, Color);
}

impl<F> Allocate for F
where
    F: FnMut() -> (ParticipantId, Color) + Send,
{
    fn allocate(&mut self) -> (ParticipantId, Color) {
        self()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RandomAllocator;

impl Allocate for RandomAllocator {
    fn allocate(&mut self) -> (ParticipantId, Color) {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(PARTICIPANT_ID_LEN);

        let bytes = Uuid::new_v4().into_bytes();
        let color = Color::from_bytes([bytes[0], bytes[1], bytes[2]]);

        (ParticipantId::new(id), color)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllocationError {
    #[error("no free participant id after {attempts} attempts")]
    IdentifierSpaceExhausted { attempts: usize },
}
