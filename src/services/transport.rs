//! services/transport.rs
//! Contratos de los proveedores externos. El relay solo conoce estos traits,
//! así los tests pueden inyectar stubs en lugar de SMTP/Twilio.

use anyhow::Result;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mensaje SMS o WhatsApp (mismo proveedor, distinto remitente/prefijo).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub from: String,
    pub to: String,
    pub body: String,
}

/// Debe tolerar uso concurrente desde varios `dispatch` a la vez.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Devuelve un identificador del mensaje (Message-ID).
    async fn send_mail(&self, mail: &OutboundEmail) -> Result<String>;

    fn name(&self) -> &'static str;

    async fn verify(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
pub trait MessagingTransport: Send + Sync {
    /// Devuelve el id del proveedor (sid).
    async fn send_message(&self, message: &OutboundMessage) -> Result<String>;

    fn name(&self) -> &'static str;
}
