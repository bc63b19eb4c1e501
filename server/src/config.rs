use std::net::SocketAddr;

use clap::Parser;

use crate::outbox::OutboxLimits;

#[derive(Parser, Debug, Clone)]
#[command(name = "pixelroom-server")]
#[command(version, about = "Relays halftone video and canvas strokes between participants")]
pub struct ServerConfig {
    /// Address the HTTP and websocket server listens on
    #[arg(long, default_value = "127.0.0.1:8080", env = "PIXELROOM_BIND")]
    pub bind: SocketAddr,

    /// Origin allowed to call the server from a browser; any origin when unset
    #[arg(long, env = "PIXELROOM_ALLOWED_ORIGIN")]
    pub allowed_origin: Option<String>,

    /// Video frames queued per participant before the oldest is dropped
    #[arg(long, default_value_t = 4, env = "PIXELROOM_FRAME_CAPACITY")]
    pub frame_capacity: usize,

    /// Undelivered strokes and notices tolerated before a participant is disconnected
    #[arg(long, default_value_t = 1024, env = "PIXELROOM_BACKLOG_LIMIT")]
    pub backlog_limit: usize,

    /// Largest websocket frame accepted, in bytes
    #[arg(long, default_value_t = 1 << 20, env = "PIXELROOM_MAX_FRAME_BYTES")]
    pub max_frame_bytes: usize,
}

impl ServerConfig {
    pub fn outbox_limits(&self) -> OutboxLimits {
        OutboxLimits {
            frame_capacity: self.frame_capacity,
            backlog_limit: self.backlog_limit,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        let limits = OutboxLimits::default();
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            allowed_origin: None,
            frame_capacity: limits.frame_capacity,
            backlog_limit: limits.backlog_limit,
            max_frame_bytes: 1 << 20,
        }
    }
}
