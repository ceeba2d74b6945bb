//! handlers/alert_handler.rs
//! Endpoints de alertas: un canal (email/sms/whatsapp), fan-out de reportes de ayuda y dispatch genérico.

use std::collections::BTreeMap;

use actix_web::{http::StatusCode, web, HttpResponse};
use serde_json::json;

use crate::{
    config::relay_config::RecipientConfig,
    errors::RelayError,
    models::{
        alert_model::{AlertRequest, Channel, OutcomeKind},
        help_report_model::HelpReport,
        message_model::{
            SendEmailRequest, SendResponse, SendSmsRequest, SendWhatsAppRequest,
            DEFAULT_SMS_TEXT, DEFAULT_WHATSAPP_TEXT,
        },
    },
    services::relay_service::RelayService,
};

fn send_error(status: StatusCode, error: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(SendResponse {
        success: false,
        sid: None,
        error: Some(error.into()),
    })
}

/// Envía a un solo destinatario por un solo canal reutilizando `dispatch`.
async fn send_single(
    relay: &RelayService,
    channel: Channel,
    to: String,
    subject: String,
    text: String,
) -> HttpResponse {
    if !relay.is_available(channel) {
        return send_error(
            StatusCode::SERVICE_UNAVAILABLE,
            format!("{} channel not configured", channel),
        );
    }

    let req = AlertRequest {
        channels: Some(vec![channel]),
        recipients: BTreeMap::from([(channel, vec![to])]),
        subject,
        body: text,
    };

    let response = match relay.dispatch(req).await {
        Ok(resp) => resp,
        Err(RelayError::Validation(msg)) => return send_error(StatusCode::BAD_REQUEST, msg),
    };

    let Some(result) = response.results.into_iter().next() else {
        return send_error(StatusCode::INTERNAL_SERVER_ERROR, "no delivery result");
    };

    if result.is_sent() {
        // Email: sin sid (solo SMS/WhatsApp lo devuelven)
        let sid = match channel {
            Channel::Email => None,
            _ => result.provider_id,
        };
        return HttpResponse::Ok().json(SendResponse {
            success: true,
            sid,
            error: None,
        });
    }

    let status = match result.kind {
        Some(OutcomeKind::InvalidRecipient) => StatusCode::BAD_REQUEST,
        Some(OutcomeKind::ChannelUnavailable) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_GATEWAY,
    };
    log::error!("{} error: {:?}", channel, result.error);
    send_error(status, result.error.unwrap_or_else(|| "send failed".to_string()))
}

/// POST /alerts/email
pub async fn send_email_endpoint(
    relay: web::Data<RelayService>,
    body: web::Json<SendEmailRequest>,
) -> HttpResponse {
    let req = body.into_inner();
    send_single(&relay, Channel::Email, req.to, req.subject, req.text).await
}

/// POST /alerts/sms
pub async fn send_sms_endpoint(
    relay: web::Data<RelayService>,
    recipients: web::Data<RecipientConfig>,
    body: web::Json<SendSmsRequest>,
) -> HttpResponse {
    let req = body.into_inner();

    // Si no viene `to`, se usa el número de prueba verificado
    let to = match req.to.filter(|t| !t.trim().is_empty()) {
        Some(to) => to,
        None => match &recipients.sms_test_recipient {
            Some(fallback) => fallback.clone(),
            None => return send_error(StatusCode::BAD_REQUEST, "missing recipient 'to'"),
        },
    };
    let text = req.text.unwrap_or_else(|| DEFAULT_SMS_TEXT.to_string());

    send_single(&relay, Channel::Sms, to, String::new(), text).await
}

/// POST /alerts/whatsapp
pub async fn send_whatsapp_endpoint(
    relay: web::Data<RelayService>,
    body: web::Json<SendWhatsAppRequest>,
) -> HttpResponse {
    let req = body.into_inner();
    let text = req.text.unwrap_or_else(|| DEFAULT_WHATSAPP_TEXT.to_string());
    send_single(&relay, Channel::Whatsapp, req.to, String::new(), text).await
}

/// POST /alerts/fanout
/// Los destinatarios salen de las listas de respondedores configuradas, no del body.
pub async fn fanout_endpoint(
    relay: web::Data<RelayService>,
    recipients: web::Data<RecipientConfig>,
    body: web::Json<HelpReport>,
) -> HttpResponse {
    let report = body.into_inner();

    if report.needs.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "success": false,
            "error": "validation error: 'needs' must not be empty"
        }));
    }

    if !recipients.has_responders() {
        log::error!("Help report recibido pero no hay listas de respondedores configuradas");
        return HttpResponse::ServiceUnavailable().json(json!({
            "success": false,
            "error": "no responder lists configured"
        }));
    }

    log::info!(
        "Help report de '{}' ({}, {})",
        report.reporter_name,
        report.village,
        report.district
    );

    let req = AlertRequest {
        channels: None,
        recipients: recipients.responders.clone(),
        subject: report.subject(),
        body: report.summary(),
    };

    dispatch_response(&relay, req).await
}

/// POST /alerts/dispatch
pub async fn dispatch_endpoint(
    relay: web::Data<RelayService>,
    body: web::Json<AlertRequest>,
) -> HttpResponse {
    dispatch_response(&relay, body.into_inner()).await
}

async fn dispatch_response(relay: &RelayService, req: AlertRequest) -> HttpResponse {
    match relay.dispatch(req).await {
        Ok(resp) => HttpResponse::Ok().json(resp),
        Err(e) => HttpResponse::BadRequest().json(json!({
            "success": false,
            "error": e.to_string()
        })),
    }
}
