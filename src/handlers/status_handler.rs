//! handlers/status_handler.rs
use actix_web::{web, HttpResponse};

use crate::services::relay_service::RelayService;

/// GET /status
/// Solo lectura: qué canales quedaron configurados al arrancar.
pub async fn status_endpoint(relay: web::Data<RelayService>) -> HttpResponse {
    HttpResponse::Ok().json(relay.status())
}
