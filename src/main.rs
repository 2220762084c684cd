use actix_web::{App, HttpServer, middleware::Logger};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use admissions_backend::{
    AppState,
    config::Config,
    database::{create_pool, run_migrations},
    middlewares::{AuthMiddleware, create_cors},
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration");

    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let state = AppState::new(&config, pool).expect("Failed to initialise services");

    if !config.email.is_configured() {
        log::warn!("SMTP is not configured, OTP emails will only be logged");
    }
    if !config.twilio.is_configured() {
        log::warn!("Twilio is not configured, OTP SMS will only be logged");
    }

    log::info!(
        "Starting HTTP server at {}:{} ({})",
        config.server.host,
        config.server.port,
        config.app.environment
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .wrap(AuthMiddleware::new(state.jwt_service.clone()))
            .configure(|cfg| state.configure(cfg))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
