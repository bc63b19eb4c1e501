use actix_web::{middleware, web, App, HttpServer};
use clap::Parser;

use pixelroom_server::config::ServerConfig;
use pixelroom_server::connection::ConnectionIdSource;
use pixelroom_server::handlers;
use pixelroom_server::server::spawn_server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let config = ServerConfig::parse();
    let bind = config.bind;
    let config = web::Data::new(config);
    let connection_ids = web::Data::new(ConnectionIdSource::new());

    let srv_tx = spawn_server();

    log::info!("Server running on http://{}", bind);
    HttpServer::new(move || {
        App::new()
            .wrap(handlers::cors(&config))
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(srv_tx.clone()))
            .app_data(config.clone())
            .app_data(connection_ids.clone())
            .configure(handlers::root)
    })
    .bind(bind)?
    .run()
    .await
}
