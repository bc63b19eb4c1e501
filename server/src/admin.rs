use tokio::sync::oneshot::Sender;

use crate::server_state::RoomDescription;

#[derive(Debug)]
pub enum AdminCommand {
    DescribeRoom { tx: Sender<RoomDescription> },
}
