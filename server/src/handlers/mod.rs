use actix_cors::Cors;
use actix_web::{error, http::header, web};

use crate::admin::AdminCommand;
use crate::config::ServerConfig;
use crate::connection::ws_index;
use crate::handlers::admin::configure_admin_handlers;
use crate::handlers::participants::configure_participant_handlers;
use crate::server::{ServerCommand, ServerTx};
use crate::server_state::RoomDescription;

mod admin;
mod participants;

pub fn root(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ws").route(web::get().to(ws_index)));

    configure_participant_handlers(cfg);
    configure_admin_handlers(cfg);
}

pub fn cors(config: &ServerConfig) -> Cors {
    match &config.allowed_origin {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_header(header::CONTENT_TYPE)
            .supports_credentials(),
        None => Cors::permissive(),
    }
}

async fn describe_room(srv_tx: &ServerTx) -> actix_web::Result<RoomDescription> {
    let (tx, rx) = tokio::sync::oneshot::channel::<RoomDescription>();

    srv_tx
        .send(ServerCommand::Admin(AdminCommand::DescribeRoom { tx }))
        .map_err(|_| error::ErrorInternalServerError("Internal Server Error"))?;

    rx.await
        .map_err(|_| error::ErrorInternalServerError("Receiver await error"))
}
