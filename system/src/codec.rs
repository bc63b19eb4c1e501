use crate::{ClientMessage, ServerMessage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("video frame without payload")]
    EmptyVideoPayload,
    #[error("stroke coordinates must be finite")]
    NonFiniteStroke,
}

/// Decodes one text frame from a participant and checks it is usable.
pub fn decode_client_message(text: &str) -> Result<ClientMessage, DecodeError> {
    let message = serde_json::from_str::<ClientMessage>(text)?;
    match &message {
        ClientMessage::VideoData(frame) if frame.video_data.is_empty() => {
            Err(DecodeError::EmptyVideoPayload)
        }
        ClientMessage::Drawed(command) if !command.stroke().is_finite() => {
            Err(DecodeError::NonFiniteStroke)
        }
        _ => Ok(message),
    }
}

pub fn encode_client_message(message: &ClientMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}

pub fn decode_server_message(text: &str) -> Result<ServerMessage, DecodeError> {
    Ok(serde_json::from_str(text)?)
}

pub fn encode_server_message(message: &ServerMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}
