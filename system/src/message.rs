use crate::{Color, Participant, ParticipantId, Stroke};
use euclid::default::Point2D;
use serde::{Deserialize, Serialize};

/// Messages a participant sends to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    VideoData(VideoFrameCommand),
    Drawed(StrokeCommand),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoFrameCommand {
    /// Encoded image, opaque to the server.
    pub video_data: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeCommand {
    pub startx: f64,
    pub starty: f64,
    pub endx: f64,
    pub endy: f64,
}

impl StrokeCommand {
    pub fn stroke(&self) -> Stroke {
        Stroke::new(
            Point2D::new(self.startx, self.starty),
            Point2D::new(self.endx, self.endy),
        )
    }
}

impl From<Stroke> for StrokeCommand {
    fn from(stroke: Stroke) -> Self {
        Self {
            startx: stroke.start.x,
            starty: stroke.start.y,
            endx: stroke.end.x,
            endy: stroke.end.y,
        }
    }
}

/// Messages the server sends to a participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    Welcome(Welcome),
    CurrentUsers(Vec<Participant>),
    UserJoined(Participant),
    UserLeft(ParticipantId),
    VideoData(VideoFrameEvent),
    Drawed(StrokeEvent),
}

impl ServerMessage {
    /// Video frames are a refreshable signal and may be dropped under load.
    pub fn is_video_frame(&self) -> bool {
        matches!(self, Self::VideoData(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Welcome {
    pub user_id: ParticipantId,
    pub color: Color,
    pub message: String,
}

impl Welcome {
    pub fn new(participant: &Participant) -> Self {
        Self {
            user_id: participant.id.clone(),
            color: participant.color,
            message: format!("Welcome! Your ID is {}", participant.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoFrameEvent {
    pub sender: ParticipantId,
    pub video_data: String,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeEvent {
    pub startx: f64,
    pub starty: f64,
    pub endx: f64,
    pub endy: f64,
    pub id: ParticipantId,
    pub color: Color,
}

impl StrokeEvent {
    pub fn new(stroke: &Stroke, sender: &Participant) -> Self {
        Self {
            startx: stroke.start.x,
            starty: stroke.start.y,
            endx: stroke.end.x,
            endy: stroke.end.y,
            id: sender.id.clone(),
            color: sender.color,
        }
    }

    pub fn stroke(&self) -> Stroke {
        Stroke::new(
            Point2D::new(self.startx, self.starty),
            Point2D::new(self.endx, self.endy),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn participant() -> Participant {
        Participant::new(ParticipantId::new("A1"), Color::new(0x11, 0x22, 0x33))
    }

    #[test]
    fn welcome_uses_socket_style_event_names() {
        let message = ServerMessage::Welcome(Welcome::new(&participant()));
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "type": "welcome",
                "data": {
                    "userId": "A1",
                    "color": "#112233",
                    "message": "Welcome! Your ID is A1",
                }
            })
        );
    }

    #[test]
    fn user_left_carries_only_the_id() {
        let message = ServerMessage::UserLeft(ParticipantId::new("A1"));
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({ "type": "userLeft", "data": "A1" })
        );
    }

    #[test]
    fn stroke_event_is_tagged_with_sender() {
        let command = StrokeCommand {
            startx: 0.0,
            starty: 0.0,
            endx: 10.0,
            endy: 10.0,
        };
        let event = StrokeEvent::new(&command.stroke(), &participant());
        assert_eq!(
            serde_json::to_value(&ServerMessage::Drawed(event)).unwrap(),
            json!({
                "type": "drawed",
                "data": {
                    "startx": 0.0, "starty": 0.0, "endx": 10.0, "endy": 10.0,
                    "id": "A1", "color": "#112233",
                }
            })
        );
    }

    #[test]
    fn only_video_data_is_a_video_frame() {
        let frame = ServerMessage::VideoData(VideoFrameEvent {
            sender: ParticipantId::new("A1"),
            video_data: "data:image/png;base64,AAAA".into(),
            color: Color::default(),
        });
        assert!(frame.is_video_frame());
        assert!(!ServerMessage::CurrentUsers(vec![]).is_video_frame());
    }
}
