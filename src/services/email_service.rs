//! services/email_service.rs
//! Transporte SMTP (lettre). Se construye una sola vez al arrancar y se comparte.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use uuid::Uuid;

use crate::{
    config::relay_config::SmtpConfig,
    services::transport::{MailTransport, OutboundEmail},
};

#[derive(Clone)]
pub struct SmtpMailTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl SmtpMailTransport {
    pub fn new(config: &SmtpConfig, timeout: Duration) -> Result<Self> {
        let tls_params = TlsParameters::new(config.host.clone())
            .context("Parámetros TLS inválidos para SMTP_HOST")?;
        let tls = if config.implicit_tls() {
            Tls::Wrapper(tls_params)
        } else {
            Tls::Required(tls_params)
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .context("No se pudo crear el transporte SMTP")?
            .port(config.port)
            .tls(tls)
            .timeout(Some(timeout));

        if let (Some(user), Some(pass)) = (&config.user, &config.pass) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            mailer: builder.build(),
            host: config.host.clone(),
        })
    }
}

/// `<uuid@dominio-del-remitente>`
fn message_id_for(from: &Mailbox) -> String {
    format!("<{}@{}>", Uuid::new_v4(), from.email.domain())
}

pub fn build_message(mail: &OutboundEmail) -> Result<(Message, String)> {
    let from: Mailbox = mail.from.parse().context("Invalid from address")?;
    let to: Mailbox = mail.to.parse().context("Invalid recipient address")?;
    let message_id = message_id_for(&from);

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(&mail.subject)
        .message_id(Some(message_id.clone()))
        .header(ContentType::TEXT_PLAIN)
        .body(mail.body.clone())
        .context("No se pudo construir el mensaje")?;

    Ok((message, message_id))
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send_mail(&self, mail: &OutboundEmail) -> Result<String> {
        let (message, message_id) = build_message(mail)?;

        // Sin context(): el error del servidor SMTP se conserva tal cual
        let response = self.mailer.send(message).await?;
        log::debug!(
            "SMTP {} aceptó {} (code={})",
            self.host,
            message_id,
            response.code()
        );

        Ok(message_id)
    }

    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn verify(&self) -> Result<()> {
        let ok = self
            .mailer
            .test_connection()
            .await
            .with_context(|| format!("SMTP {} no responde", self.host))?;
        if !ok {
            anyhow::bail!("SMTP {} rechazó la conexión de prueba", self.host);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail(from: &str, to: &str) -> OutboundEmail {
        OutboundEmail {
            from: from.to_string(),
            to: to.to_string(),
            subject: "Flood Alert".to_string(),
            body: "Evacuate now".to_string(),
        }
    }

    #[test]
    fn message_id_uses_sender_domain() {
        let (_, id) = build_message(&mail("Flood Desk <alerts@floodwatch.in>", "a@x.com")).unwrap();
        assert!(id.starts_with('<'));
        assert!(id.ends_with("@floodwatch.in>"));
    }

    #[test]
    fn invalid_sender_is_rejected() {
        let err = build_message(&mail("not an address", "a@x.com")).unwrap_err();
        assert!(err.to_string().contains("Invalid from address"));
    }

    #[test]
    fn port_465_uses_implicit_tls() {
        let mut cfg = SmtpConfig {
            host: "smtp.example.com".into(),
            port: 465,
            user: None,
            pass: None,
            from: "alerts@example.com".into(),
        };
        assert!(cfg.implicit_tls());
        cfg.port = 587;
        assert!(!cfg.implicit_tls());
    }
}
