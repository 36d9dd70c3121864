use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use bastion_server::{config::settings, game::session::SessionRegistry, http, metrics, ws};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    // Configuration
    let cfg = settings();
    log::info!("starting with {cfg:?}");

    // Every game lives in its own session task; the registry only routes.
    let registry = web::Data::new(SessionRegistry::from_settings(cfg));

    // Start HTTP + WS server
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(metrics::METRICS.clone())
            .app_data(registry.clone())
            .configure(http::routes::init_routes)
            .configure(ws::routes::init_routes)
    })
    .bind(&cfg.server_addr)
    .with_context(|| format!("binding {}", cfg.server_addr))?
    .run()
    .await
    .context("server terminated")
}
