use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::info;

use flower_ledger::api::{self, AppState};
use flower_ledger::config::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let cfg = Config::from_env();
    info!(
        "⛓️ Starting flower ledger at http://{}:{} (difficulty {})",
        cfg.host, cfg.port, cfg.difficulty
    );

    let state = AppState::new(cfg.difficulty)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let state = web::Data::new(state);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((cfg.host.as_str(), cfg.port))?
    .run()
    .await
}
