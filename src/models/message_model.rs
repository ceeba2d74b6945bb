//! models/message_model.rs
//! Peticiones/respuestas de los endpoints de un solo canal.

use serde::{Deserialize, Serialize};

pub const DEFAULT_SMS_TEXT: &str = "Flood Alert! 🚨 Stay safe.";
pub const DEFAULT_WHATSAPP_TEXT: &str = "Flood Alert via WhatsApp! 🚨 Stay safe.";

#[derive(Debug, Clone, Deserialize)]
pub struct SendEmailRequest {
    pub to: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub text: String,
}

/// `to` opcional: si falta se usa TEST_SMS_TO.
#[derive(Debug, Clone, Deserialize)]
pub struct SendSmsRequest {
    pub to: Option<String>,
    pub text: Option<String>,
}

/// `to` debe venir como 'whatsapp:+91XXXXXXXXXX'
#[derive(Debug, Clone, Deserialize)]
pub struct SendWhatsAppRequest {
    pub to: String,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub ok: bool,
    pub email_configured: bool,
    pub sms_configured: bool,
    pub whatsapp_configured: bool,
}
