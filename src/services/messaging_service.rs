//! services/messaging_service.rs
//! Transporte SMS/WhatsApp sobre la API REST de Twilio (reqwest).
//!
//! POST {api_base}/2010-04-01/Accounts/{sid}/Messages.json  (form: To, From, Body)

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    config::relay_config::MessagingConfig,
    services::transport::{MessagingTransport, OutboundMessage},
};

#[derive(Clone)]
pub struct TwilioMessagingTransport {
    http_client: Client,
    messages_url: String,
    account_sid: String,
    auth_token: String,
}

#[derive(Debug, Deserialize)]
struct TwilioMessage {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct TwilioError {
    message: String,
}

impl TwilioMessagingTransport {
    pub fn new(config: &MessagingConfig, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("No se pudo crear el cliente HTTP de mensajería")?;

        Ok(Self {
            http_client,
            messages_url: messages_url(&config.api_base, &config.account_sid),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
        })
    }
}

pub fn messages_url(api_base: &str, account_sid: &str) -> String {
    format!(
        "{}/2010-04-01/Accounts/{}/Messages.json",
        api_base.trim_end_matches('/'),
        account_sid
    )
}

/// Extrae el mensaje del proveedor; si el cuerpo no tiene su forma, se devuelve crudo.
fn provider_error(status: reqwest::StatusCode, body: &str) -> anyhow::Error {
    match serde_json::from_str::<TwilioError>(body) {
        Ok(err) => anyhow!(err.message),
        Err(_) => anyhow!("HTTP {}: {}", status, body),
    }
}

#[async_trait]
impl MessagingTransport for TwilioMessagingTransport {
    async fn send_message(&self, message: &OutboundMessage) -> Result<String> {
        let form = [
            ("To", message.to.as_str()),
            ("From", message.from.as_str()),
            ("Body", message.body.as_str()),
        ];

        let resp = self
            .http_client
            .post(&self.messages_url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await?;

        let status = resp.status();
        let body_txt = resp.text().await?;
        if !status.is_success() {
            return Err(provider_error(status, &body_txt));
        }

        let created: TwilioMessage = serde_json::from_str(&body_txt)
            .with_context(|| format!("Respuesta inesperada del proveedor: {}", body_txt))?;
        Ok(created.sid)
    }

    fn name(&self) -> &'static str {
        "twilio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_messages_url() {
        assert_eq!(
            messages_url("https://api.twilio.com/", "AC123"),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[test]
    fn provider_error_keeps_message_verbatim() {
        let body = r#"{"code":21211,"message":"The 'To' number +91000 is not a valid phone number.","status":400}"#;
        let err = provider_error(reqwest::StatusCode::BAD_REQUEST, body);
        assert_eq!(
            err.to_string(),
            "The 'To' number +91000 is not a valid phone number."
        );

        let err = provider_error(reqwest::StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.to_string(), "HTTP 502 Bad Gateway: upstream down");
    }
}
