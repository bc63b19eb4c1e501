use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use actix::{Actor, ActorContext, AsyncContext, Handler, Message, Running, StreamHandler};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use actix_web_actors::ws::{CloseCode, CloseReason};

use system::{
    decode_client_message, encode_server_message, ClientMessage, ConnectionId, ServerMessage,
};

use crate::config::ServerConfig;
use crate::outbox::{ConnectionTx, Outbox, OutboxLimits};
use crate::server::{ServerCommand, ServerTx};

#[derive(Debug)]
pub enum ConnectionCommand {
    Connect {
        connection_id: ConnectionId,
        tx: ConnectionTx,
    },
    Disconnect {
        from: ConnectionId,
    },
    ClientMessage {
        from: ConnectionId,
        message: ClientMessage,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    Left,
    /// The connection could not keep up with the strokes sent to it.
    Lagging,
    /// No free participant id, or the handle was already registered.
    Rejected,
}

impl From<DisconnectReason> for CloseReason {
    fn from(reason: DisconnectReason) -> Self {
        match reason {
            DisconnectReason::Left => CloseCode::Normal.into(),
            DisconnectReason::Lagging => (CloseCode::Policy, "connection is lagging").into(),
            DisconnectReason::Rejected => {
                (CloseCode::Again, "cannot join the room right now").into()
            }
        }
    }
}

#[derive(Debug)]
pub enum ConnectionEvent {
    Connected { connection_id: ConnectionId },
    Message(ServerMessage),
    Disconnected { reason: DisconnectReason },
}

impl ConnectionEvent {
    pub fn is_video_frame(&self) -> bool {
        matches!(self, Self::Message(message) if message.is_video_frame())
    }
}

/// Source of connection handles, shared by all HTTP workers.
#[derive(Debug)]
pub struct ConnectionIdSource(AtomicU32);

impl ConnectionIdSource {
    pub fn new() -> Self {
        Self(AtomicU32::new(1))
    }

    pub fn next(&self) -> ConnectionId {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for ConnectionIdSource {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Message)]
#[rtype(result = "()")]
struct ConnectionActorMessage(ConnectionEvent);

enum ConnectionState {
    Connecting,
    Active,
    Disconnected,
}

struct ConnectionActor {
    connection_id: ConnectionId,
    state: ConnectionState,
    srv_tx: ServerTx,
    outbox: ConnectionTx,
}

impl ConnectionActor {
    fn new(connection_id: ConnectionId, srv_tx: ServerTx, limits: OutboxLimits) -> Self {
        Self {
            connection_id,
            state: ConnectionState::Connecting,
            srv_tx,
            outbox: Arc::new(Outbox::new(limits)),
        }
    }

    fn send_to_server(&self, command: ConnectionCommand) -> bool {
        self.srv_tx.send(ServerCommand::Connection(command)).is_ok()
    }
}

impl Actor for ConnectionActor {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let connect = ConnectionCommand::Connect {
            connection_id: self.connection_id,
            tx: self.outbox.clone(),
        };
        if !self.send_to_server(connect) {
            log::error!("Server loop is gone, refusing connection {}", self.connection_id);
            ctx.stop();
            return;
        }

        let addr = ctx.address();
        let outbox = self.outbox.clone();

        actix::spawn(async move {
            log::debug!("connection outbox drain - started");
            while let Some(event) = outbox.recv().await {
                if addr.send(ConnectionActorMessage(event)).await.is_err() {
                    break;
                }
            }
            log::debug!("connection outbox drain - terminated");
        });
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        // Also sent while connecting; the server ignores handles it never registered.
        if !matches!(self.state, ConnectionState::Disconnected) {
            let disconnect = ConnectionCommand::Disconnect {
                from: self.connection_id,
            };
            if !self.send_to_server(disconnect) {
                log::warn!(
                    "Server loop is gone, connection {} not unregistered",
                    self.connection_id
                );
            }
        }
        self.state = ConnectionState::Disconnected;
        self.outbox.close();

        Running::Stop
    }
}

/// Ingress
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ConnectionActor {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Text(text)) => {
                log::debug!("Ingress size: {}", text.len());
                // Connect went out first on the same queue, so the server
                // registers this connection before it sees the message.
                if matches!(self.state, ConnectionState::Disconnected) {
                    log::debug!(
                        "Ignoring message from closed connection {}",
                        self.connection_id
                    );
                    return;
                }
                let from = self.connection_id;
                match decode_client_message(&text) {
                    Ok(message) => {
                        let command = ConnectionCommand::ClientMessage { from, message };
                        if !self.send_to_server(command) {
                            ctx.stop();
                        }
                    }
                    Err(err) => {
                        log::warn!("Dropping message from connection {}: {}", from, err);
                    }
                }
            }
            Ok(ws::Message::Binary(bin)) => {
                log::warn!(
                    "Dropping binary frame of {} bytes from connection {}",
                    bin.len(),
                    self.connection_id
                );
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Err(err) => {
                log::warn!("Protocol error on connection {}: {}", self.connection_id, err);
                ctx.stop();
            }
            _ => (),
        }
    }
}

/// Egress
impl Handler<ConnectionActorMessage> for ConnectionActor {
    type Result = ();

    fn handle(
        &mut self,
        msg: ConnectionActorMessage,
        ctx: &mut ws::WebsocketContext<Self>,
    ) -> Self::Result {
        let connection_event = msg.0;
        log::debug!("Egress {:?}", connection_event);
        match connection_event {
            ConnectionEvent::Connected { connection_id } => {
                log::debug!("Connection {} is active", connection_id);
                self.state = ConnectionState::Active;
            }
            ConnectionEvent::Message(message) => match encode_server_message(&message) {
                Ok(text) => ctx.text(text),
                Err(err) => log::error!("Cannot encode {:?}: {}", message, err),
            },
            ConnectionEvent::Disconnected { reason } => {
                self.state = ConnectionState::Disconnected;
                ctx.close(Some(reason.into()));
                ctx.stop();
            }
        }
    }
}

pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    srv_tx: web::Data<ServerTx>,
    config: web::Data<ServerConfig>,
    connection_ids: web::Data<ConnectionIdSource>,
) -> Result<HttpResponse, Error> {
    let actor = ConnectionActor::new(
        connection_ids.next(),
        srv_tx.get_ref().clone(),
        config.outbox_limits(),
    );
    ws::WsResponseBuilder::new(actor, &req, stream)
        .frame_size(config.max_frame_bytes)
        .start()
}
