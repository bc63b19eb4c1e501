use actix_web::{web, HttpResponse, Responder};

use crate::handlers::describe_room;
use crate::server::ServerTx;

pub fn configure_participant_handlers(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/participants").route(web::get().to(list_participants)));
}

async fn list_participants(srv_tx: web::Data<ServerTx>) -> actix_web::Result<impl Responder> {
    let room = describe_room(srv_tx.get_ref()).await?;
    Ok(HttpResponse::Ok().json(room.participants))
}
