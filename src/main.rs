use std::io;

use actix_web::{middleware::Logger, web, App, HttpServer};

use quizmaker::{app_state::AppState, config::Config, handlers};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    if cfg!(not(debug_assertions)) {
        config.validate_for_production().map_err(io::Error::other)?;
    }

    let host = config.web_server_host.clone();
    let port = config.web_server_port;

    let state = AppState::new(config).await.map_err(io::Error::other)?;
    let state = web::Data::new(state);

    log::info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(handlers::configure)
    })
    .bind((host.as_str(), port))?
    .shutdown_timeout(5)
    .run()
    .await
}
