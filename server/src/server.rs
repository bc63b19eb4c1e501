use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use system::ClientMessage;

use super::connection::ConnectionCommand;
use crate::admin::AdminCommand;
use crate::allocator::{Allocate, RandomAllocator};
use crate::server_state::ServerState;

#[derive(Debug)]
pub enum ServerCommand {
    Connection(ConnectionCommand),
    Admin(AdminCommand),
}

pub type ServerTx = UnboundedSender<ServerCommand>;

struct Server<A> {
    state: ServerState<A>,
}

impl<A: Allocate> Server<A> {
    fn new(allocator: A) -> Self {
        Self {
            state: ServerState::new(allocator),
        }
    }

    fn handle_command(&mut self, command: ServerCommand) {
        match command {
            ServerCommand::Connection(command) => self.handle_connection_command(command),
            ServerCommand::Admin(command) => self.handle_admin_command(command),
        }
    }

    fn handle_connection_command(&mut self, command: ConnectionCommand) {
        match command {
            ConnectionCommand::Connect { connection_id, tx } => {
                if let Err(err) = self.state.connect(connection_id, tx) {
                    log::error!("Refusing connection {}: {}", connection_id, err);
                }
            }
            ConnectionCommand::Disconnect { from } => {
                self.state.disconnect(&from);
            }
            ConnectionCommand::ClientMessage { from, message } => match message {
                ClientMessage::VideoData(frame) => {
                    self.state.relay_video_frame(&from, frame.video_data);
                }
                ClientMessage::Drawed(command) => {
                    self.state.relay_draw_stroke(&from, command.stroke());
                }
            },
        }
    }

    fn handle_admin_command(&mut self, command: AdminCommand) {
        match command {
            AdminCommand::DescribeRoom { tx } => {
                if tx.send(self.state.describe()).is_err() {
                    log::debug!("Admin request went away before the reply");
                }
            }
        }
    }
}

pub fn spawn_server() -> ServerTx {
    spawn_server_with(RandomAllocator)
}

/// Starts the server loop. Every command is handled to completion before the
/// next one is taken from the queue.
pub fn spawn_server_with<A: Allocate + 'static>(allocator: A) -> ServerTx {
    let (srv_tx, mut srv_rx) = unbounded_channel::<ServerCommand>();

    tokio::spawn(async move {
        let mut server = Box::new(Server::new(allocator));

        while let Some(command) = srv_rx.recv().await {
            server.handle_command(command);
        }
        log::info!("Server loop terminated");
    });

    srv_tx
}
