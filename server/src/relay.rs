use system::{ConnectionId, Participant, ServerMessage, Stroke, StrokeEvent, VideoFrameEvent};

use crate::allocator::Allocate;
use crate::connection::ConnectionEvent;
use crate::outbox::Delivery;
use crate::server_state::ServerState;

/// Outcome of delivering one message to a set of recipients.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FanOut {
    pub recipients: usize,
    pub replaced_frames: usize,
    pub lagging: Vec<ConnectionId>,
}

impl<A: Allocate> ServerState<A> {
    /// Forwards a video frame to everyone but its sender.
    ///
    /// Returns `None` when the sender is not (or no longer) registered.
    pub fn relay_video_frame(
        &mut self,
        from: &ConnectionId,
        video_data: String,
    ) -> Option<FanOut> {
        let sender = self.sender(from)?;
        let event = VideoFrameEvent {
            sender: sender.id,
            video_data,
            color: sender.color,
        };
        let fan_out = self.broadcast(ServerMessage::VideoData(event), Some(from));

        self.stats.frames_relayed += 1;
        self.stats.frames_dropped += fan_out.replaced_frames;
        self.evict_lagging(fan_out.lagging.clone());
        Some(fan_out)
    }

    /// Forwards a stroke to everyone but its sender.
    pub fn relay_draw_stroke(&mut self, from: &ConnectionId, stroke: Stroke) -> Option<FanOut> {
        let sender = self.sender(from)?;
        let event = StrokeEvent::new(&stroke, &sender);
        let fan_out = self.broadcast(ServerMessage::Drawed(event), Some(from));

        self.stats.strokes_relayed += 1;
        self.evict_lagging(fan_out.lagging.clone());
        Some(fan_out)
    }

    pub(crate) fn announce_join(
        &self,
        joined: &ConnectionId,
        participant: &Participant,
    ) -> FanOut {
        self.broadcast(ServerMessage::UserJoined(participant.clone()), Some(joined))
    }

    /// Sent after the participant is unregistered, so it never reaches them.
    pub(crate) fn announce_leave(&self, participant: &Participant) -> FanOut {
        self.broadcast(ServerMessage::UserLeft(participant.id.clone()), None)
    }

    pub(crate) fn send_to(&self, to: &ConnectionId, message: ServerMessage) -> Delivery {
        match self.registry.get(to) {
            Some(session) => session.tx.push(ConnectionEvent::Message(message)),
            None => Delivery::Closed,
        }
    }

    fn broadcast(&self, message: ServerMessage, without: Option<&ConnectionId>) -> FanOut {
        let mut fan_out = FanOut::default();
        for (connection_id, session) in self.registry.recipients(without) {
            match session.tx.push(ConnectionEvent::Message(message.clone())) {
                Delivery::Queued => fan_out.recipients += 1,
                Delivery::ReplacedOldestFrame => {
                    fan_out.recipients += 1;
                    fan_out.replaced_frames += 1;
                }
                Delivery::Lagging => {
                    fan_out.recipients += 1;
                    fan_out.lagging.push(*connection_id);
                }
                Delivery::Closed => {
                    log::debug!("Skipping closed connection {}", connection_id);
                }
            }
        }
        fan_out
    }

    fn sender(&self, from: &ConnectionId) -> Option<Participant> {
        let sender = self.registry.get(from).map(|s| s.participant.clone());
        if sender.is_none() {
            log::debug!("Ignoring event from unregistered connection {}", from);
        }
        sender
    }
}
