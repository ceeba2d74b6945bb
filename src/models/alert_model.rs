//! models/alert_model.rs
//! Estructuras del relay: petición de alerta, resultado por destinatario y respuesta agregada.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Canal de entrega. El orden (email < sms < whatsapp) define el orden de los resultados.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
    Whatsapp,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Email, Channel::Sms, Channel::Whatsapp];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Sms => "sms",
            Channel::Whatsapp => "whatsapp",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Petición de alerta, una por invocación de `dispatch`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertRequest {
    /// Si viene vacío (None) se intentan todos los canales con destinatarios.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<Channel>>,

    #[serde(default)]
    pub recipients: BTreeMap<Channel, Vec<String>>,

    /// Solo se usa en email
    #[serde(default)]
    pub subject: String,

    #[serde(default)]
    pub body: String,
}

impl AlertRequest {
    pub fn recipients_for(&self, channel: Channel) -> &[String] {
        self.recipients
            .get(&channel)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Failed,
    Skipped,
}

/// Clasificación del resultado cuando no es `Sent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeKind {
    ChannelUnavailable,
    InvalidRecipient,
    TransportError,
}

/// Resultado de un (canal, destinatario). Inmutable una vez creado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelResult {
    pub channel: Channel,
    pub recipient: String,
    pub status: DeliveryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<OutcomeKind>,
}

impl ChannelResult {
    pub fn sent(channel: Channel, recipient: impl Into<String>, provider_id: String) -> Self {
        Self {
            channel,
            recipient: recipient.into(),
            status: DeliveryStatus::Sent,
            provider_id: Some(provider_id),
            error: None,
            kind: None,
        }
    }

    pub fn failed(
        channel: Channel,
        recipient: impl Into<String>,
        kind: OutcomeKind,
        error: impl Into<String>,
    ) -> Self {
        Self {
            channel,
            recipient: recipient.into(),
            status: DeliveryStatus::Failed,
            provider_id: None,
            error: Some(error.into()),
            kind: Some(kind),
        }
    }

    pub fn unavailable(channel: Channel, recipient: impl Into<String>) -> Self {
        Self {
            channel,
            recipient: recipient.into(),
            status: DeliveryStatus::Skipped,
            provider_id: None,
            error: None,
            kind: Some(OutcomeKind::ChannelUnavailable),
        }
    }

    pub fn is_sent(&self) -> bool {
        self.status == DeliveryStatus::Sent
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    NoRecipients,
}

/// Canal pedido sin destinatarios: no hay a quién asociar un `ChannelResult`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedChannel {
    pub channel: Channel,
    pub reason: SkipReason,
}

/// Respuesta agregada. `success` = al menos un envío `Sent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayResponse {
    pub success: bool,
    pub results: Vec<ChannelResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_channels: Vec<SkippedChannel>,
}

impl RelayResponse {
    pub fn from_results(results: Vec<ChannelResult>, skipped_channels: Vec<SkippedChannel>) -> Self {
        Self {
            success: results.iter().any(ChannelResult::is_sent),
            results,
            skipped_channels,
        }
    }

    pub fn count(&self, status: DeliveryStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }
}
