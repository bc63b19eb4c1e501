use actix_web::error;
use actix_web::{web, HttpRequest, HttpResponse};
use actix_web::Result;
use askama::Template;
use system::Participant;

use crate::handlers::describe_room;
use crate::server::ServerTx;
use crate::server_state::RelayStats;

#[derive(Template)]
#[template(path = "admin-index.html")]
pub struct AdminIndexTemplate {
    participants: Vec<Participant>,
    stats: RelayStats,
    stats_url: String,
}

pub fn configure_admin_handlers(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(web::resource("").route(web::get().to(admin_index)))
            .service(
                web::resource("/stats")
                    .name("admin_stats")
                    .route(web::get().to(show_stats)),
            ),
    );
}

pub async fn admin_index(req: HttpRequest, srv_tx: web::Data<ServerTx>) -> Result<HttpResponse> {
    let room = describe_room(srv_tx.get_ref()).await?;
    let stats_url = req
        .url_for_static("admin_stats")
        .map_err(|_| error::ErrorInternalServerError("Internal Server Error"))?
        .to_string();

    let body = AdminIndexTemplate {
        participants: room.participants,
        stats: room.stats,
        stats_url,
    }
    .render()
    .map_err(error::ErrorInternalServerError)?;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}

pub async fn show_stats(srv_tx: web::Data<ServerTx>) -> Result<HttpResponse> {
    let room = describe_room(srv_tx.get_ref()).await?;
    Ok(HttpResponse::Ok().json(room.stats))
}
