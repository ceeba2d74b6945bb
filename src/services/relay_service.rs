//! services/relay_service.rs
//! Fan-out de una alerta a email/SMS/WhatsApp.
//!
//! Cada envío corre en su propia tarea (tokio::spawn) con un plazo máximo; luego se
//! espera a que todas terminen (join_all) y se arma un `ChannelResult` por destinatario.
//! Un fallo nunca cancela los demás envíos. Si el cliente se desconecta, las tareas
//! siguen hasta el final y dejan su resultado en el log.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::future::{join_all, BoxFuture};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::{
    config::relay_config::{RelayConfig, DEFAULT_SEND_TIMEOUT},
    errors::RelayError,
    models::{
        alert_model::{
            AlertRequest, Channel, ChannelResult, DeliveryStatus, OutcomeKind, RelayResponse, SkipReason,
            SkippedChannel,
        },
        message_model::StatusResponse,
        recipient,
    },
    services::{
        email_service::SmtpMailTransport,
        messaging_service::TwilioMessagingTransport,
        transport::{MailTransport, MessagingTransport, OutboundEmail, OutboundMessage},
    },
};

#[derive(Clone)]
struct EmailRoute {
    transport: Arc<dyn MailTransport>,
    from: String,
}

#[derive(Clone)]
struct MessagingRoute {
    transport: Arc<dyn MessagingTransport>,
    from: String,
}

enum Sender {
    Mail(EmailRoute),
    Messaging(MessagingRoute),
}

/// Resultado ya decidido (skip / destinatario inválido) o envío en vuelo.
enum Slot {
    Settled(ChannelResult),
    InFlight {
        channel: Channel,
        recipient: String,
        handle: JoinHandle<ChannelResult>,
    },
}

#[derive(Clone)]
pub struct RelayService {
    email: Option<EmailRoute>,
    sms: Option<MessagingRoute>,
    whatsapp: Option<MessagingRoute>,
    send_timeout: Duration,
}

impl Default for RelayService {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayService {
    /// Relay sin canales: todo `dispatch` termina en `ChannelUnavailable`.
    pub fn new() -> Self {
        Self {
            email: None,
            sms: None,
            whatsapp: None,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    pub fn with_email(mut self, transport: Arc<dyn MailTransport>, from: impl Into<String>) -> Self {
        self.email = Some(EmailRoute {
            transport,
            from: from.into(),
        });
        self
    }

    pub fn with_sms(
        mut self,
        transport: Arc<dyn MessagingTransport>,
        from: impl Into<String>,
    ) -> Self {
        self.sms = Some(MessagingRoute {
            transport,
            from: from.into(),
        });
        self
    }

    pub fn with_whatsapp(
        mut self,
        transport: Arc<dyn MessagingTransport>,
        from: impl Into<String>,
    ) -> Self {
        self.whatsapp = Some(MessagingRoute {
            transport,
            from: from.into(),
        });
        self
    }

    /// Arma los transportes reales a partir de la configuración de arranque.
    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        let mut relay = RelayService::new().with_send_timeout(config.send_timeout);

        if let Some(smtp) = &config.smtp {
            let transport = SmtpMailTransport::new(smtp, config.send_timeout)?;
            relay = relay.with_email(Arc::new(transport), smtp.from.clone());
            log::info!("Canal email habilitado (SMTP {}:{})", smtp.host, smtp.port);
        } else {
            log::warn!("SMTP no configurado; canal email deshabilitado");
        }

        match &config.messaging {
            Some(messaging) => {
                let transport: Arc<dyn MessagingTransport> = Arc::new(
                    TwilioMessagingTransport::new(messaging, config.send_timeout)?,
                );
                if let Some(from) = &messaging.sms_from {
                    relay = relay.with_sms(transport.clone(), from.clone());
                    log::info!("Canal sms habilitado vía {} (from={})", transport.name(), from);
                }
                if let Some(from) = &messaging.whatsapp_from {
                    log::info!("Canal whatsapp habilitado vía {} (from={})", transport.name(), from);
                    relay = relay.with_whatsapp(transport, from.clone());
                }
            }
            None => log::warn!("Twilio no configurado; canales sms/whatsapp deshabilitados"),
        }

        Ok(relay)
    }

    pub fn is_available(&self, channel: Channel) -> bool {
        match channel {
            Channel::Email => self.email.is_some(),
            Channel::Sms => self.sms.is_some(),
            Channel::Whatsapp => self.whatsapp.is_some(),
        }
    }

    pub fn status(&self) -> StatusResponse {
        StatusResponse {
            ok: true,
            email_configured: self.is_available(Channel::Email),
            sms_configured: self.is_available(Channel::Sms),
            whatsapp_configured: self.is_available(Channel::Whatsapp),
        }
    }

    /// Prueba de conectividad al arrancar. Solo deja constancia en el log.
    pub async fn verify_transports(&self) {
        if let Some(route) = &self.email {
            match route.transport.verify().await {
                Ok(()) => log::info!("{} listo", route.transport.name()),
                Err(e) => log::error!("{} error: {:#}", route.transport.name(), e),
            }
        }
    }

    fn sender_for(&self, channel: Channel) -> Option<Sender> {
        match channel {
            Channel::Email => self.email.clone().map(Sender::Mail),
            Channel::Sms => self.sms.clone().map(Sender::Messaging),
            Channel::Whatsapp => self.whatsapp.clone().map(Sender::Messaging),
        }
    }

    /// Canales a intentar: los pedidos (sin duplicados) o, si no se piden, los que traen destinatarios.
    fn resolve_channels(req: &AlertRequest) -> Result<BTreeSet<Channel>, RelayError> {
        if req.body.trim().is_empty() {
            return Err(RelayError::Validation("body must not be empty".to_string()));
        }

        let channels: BTreeSet<Channel> = match &req.channels {
            Some(list) => list.iter().copied().collect(),
            None => Channel::ALL
                .into_iter()
                .filter(|ch| !req.recipients_for(*ch).is_empty())
                .collect(),
        };

        let total: usize = channels
            .iter()
            .map(|ch| req.recipients_for(*ch).len())
            .sum();
        if total == 0 {
            return Err(RelayError::Validation(
                "no recipients for any requested channel".to_string(),
            ));
        }

        Ok(channels)
    }

    pub async fn dispatch(&self, req: AlertRequest) -> Result<RelayResponse, RelayError> {
        let request_id = Uuid::new_v4();
        let channels = Self::resolve_channels(&req).inspect_err(|e| {
            log::warn!("(dispatch {}) Petición rechazada: {}", request_id, e);
        })?;

        log::info!(
            "(dispatch {}) Iniciando fan-out a canales {:?}",
            request_id,
            channels
        );

        let mut slots = Vec::new();
        let mut skipped_channels = Vec::new();

        for channel in channels {
            let recipients = req.recipients_for(channel);
            if recipients.is_empty() {
                log::info!("(dispatch {}) Canal '{}' sin destinatarios", request_id, channel);
                skipped_channels.push(SkippedChannel {
                    channel,
                    reason: SkipReason::NoRecipients,
                });
                continue;
            }

            let Some(sender) = self.sender_for(channel) else {
                log::warn!(
                    "(dispatch {}) Canal '{}' no configurado; {} destinatarios omitidos",
                    request_id,
                    channel,
                    recipients.len()
                );
                slots.extend(
                    recipients
                        .iter()
                        .map(|r| Slot::Settled(ChannelResult::unavailable(channel, r.as_str()))),
                );
                continue;
            };

            for recip in recipients {
                if let Err(reason) = recipient::validate(channel, recip) {
                    log::warn!("(dispatch {}) {}: {}", request_id, channel, reason);
                    slots.push(Slot::Settled(ChannelResult::failed(
                        channel,
                        recip.as_str(),
                        OutcomeKind::InvalidRecipient,
                        reason,
                    )));
                    continue;
                }

                let handle = self.spawn_send(request_id, channel, &sender, recip, &req);
                slots.push(Slot::InFlight {
                    channel,
                    recipient: recip.clone(),
                    handle,
                });
            }
        }

        let results = join_all(slots.into_iter().map(|slot| async move {
            match slot {
                Slot::Settled(result) => result,
                Slot::InFlight {
                    channel,
                    recipient,
                    handle,
                } => match handle.await {
                    Ok(result) => result,
                    Err(e) => ChannelResult::failed(
                        channel,
                        recipient,
                        OutcomeKind::TransportError,
                        format!("send task aborted: {}", e),
                    ),
                },
            }
        }))
        .await;

        let response = RelayResponse::from_results(results, skipped_channels);
        log::info!(
            "(dispatch {}) Finalizado: success={}, enviados={}, fallidos={}, omitidos={}",
            request_id,
            response.success,
            response.count(DeliveryStatus::Sent),
            response.count(DeliveryStatus::Failed),
            response.count(DeliveryStatus::Skipped)
        );
        Ok(response)
    }

    fn spawn_send(
        &self,
        request_id: Uuid,
        channel: Channel,
        sender: &Sender,
        recipient: &str,
        req: &AlertRequest,
    ) -> JoinHandle<ChannelResult> {
        let send: BoxFuture<'static, Result<String>> = match sender {
            Sender::Mail(route) => {
                let transport = route.transport.clone();
                let mail = OutboundEmail {
                    from: route.from.clone(),
                    to: recipient.to_string(),
                    subject: req.subject.clone(),
                    body: req.body.clone(),
                };
                Box::pin(async move { transport.send_mail(&mail).await })
            }
            Sender::Messaging(route) => {
                let transport = route.transport.clone();
                let message = OutboundMessage {
                    from: route.from.clone(),
                    to: recipient.to_string(),
                    body: req.body.clone(),
                };
                Box::pin(async move { transport.send_message(&message).await })
            }
        };

        let deadline = self.send_timeout;
        let recipient = recipient.to_string();

        tokio::spawn(async move {
            let result = match tokio::time::timeout(deadline, send).await {
                Ok(Ok(provider_id)) => ChannelResult::sent(channel, recipient, provider_id),
                Ok(Err(e)) => ChannelResult::failed(
                    channel,
                    recipient,
                    OutcomeKind::TransportError,
                    format!("{:#}", e),
                ),
                Err(_) => ChannelResult::failed(
                    channel,
                    recipient,
                    OutcomeKind::TransportError,
                    format!("send timed out after {:?}", deadline),
                ),
            };

            // Queda registrado aunque nadie espere ya la respuesta
            match (&result.provider_id, &result.error) {
                (Some(id), _) => log::info!(
                    "(dispatch {}) {} -> {} enviado (id={})",
                    request_id,
                    channel,
                    result.recipient,
                    id
                ),
                (None, Some(e)) => log::error!(
                    "(dispatch {}) {} -> {} falló: {}",
                    request_id,
                    channel,
                    result.recipient,
                    e
                ),
                (None, None) => {}
            }
            result
        })
    }
}
