//! app.rs
use crate::handlers::{alert_handler, status_handler};
use actix_web::{error, web, HttpResponse};
use serde_json::json;

/// JSON mal formado -> 400 con el mismo formato que el resto de errores
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(json!({
                "success": false,
                "error": message
            })),
        )
        .into()
    })
}

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/status", web::get().to(status_handler::status_endpoint))
        .service(
            web::scope("/alerts")
                .route("/email", web::post().to(alert_handler::send_email_endpoint))
                .route("/sms", web::post().to(alert_handler::send_sms_endpoint))
                .route(
                    "/whatsapp",
                    web::post().to(alert_handler::send_whatsapp_endpoint),
                )
                .route("/fanout", web::post().to(alert_handler::fanout_endpoint))
                .route(
                    "/dispatch",
                    web::post().to(alert_handler::dispatch_endpoint),
                ),
        );
}
