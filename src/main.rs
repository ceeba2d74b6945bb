use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use dotenv::dotenv;

use crate::config::relay_config::RelayConfig;
use crate::logger::init_logger;
use crate::services::relay_service::RelayService;

mod app;
mod config;
mod errors;
mod handlers;
mod logger;
mod models;
mod services;

#[cfg(test)]
mod tests;

fn cors(allowed_origin: Option<&str>) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST"])
        .allowed_header(header::CONTENT_TYPE)
        .max_age(3600);

    match allowed_origin {
        Some(origin) => cors.allowed_origin(origin),
        None => cors.allow_any_origin(),
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    // Configuración: una sola lectura al arrancar
    let config = RelayConfig::from_env().context("Configuración inválida")?;

    log::info!(
        "Canales: email={} sms={} whatsapp={}",
        config.email_enabled(),
        config.sms_enabled(),
        config.whatsapp_enabled()
    );

    // Sin canales configurados el servidor arranca igual (dispatch queda en no-op)
    let relay = RelayService::from_config(&config)?;

    let verifier = relay.clone();
    tokio::spawn(async move { verifier.verify_transports().await });

    let relay_data = web::Data::new(relay);
    let recipients_data = web::Data::new(config.recipients.clone());
    let cors_origin = config.cors_allowed_origin.clone();

    log::info!("🚀 Relay escuchando en {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .wrap(cors(cors_origin.as_deref()))
            .wrap(Logger::default())
            .app_data(relay_data.clone())
            .app_data(recipients_data.clone())
            .configure(app::init_app)
    })
    .workers(config.workers)
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
