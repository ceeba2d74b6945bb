//! config/relay_config.rs
//! Configuración global del relay, leída una sola vez al arrancar (variables de entorno / .env).
//!
//! Un grupo ausente (SMTP, Twilio) desactiva su canal; nunca es error de arranque.
//! Un valor presente pero mal formado (p.ej. SMTP_PORT=abc) sí lo es.

use std::collections::BTreeMap;
use std::time::Duration;

use actix_web::http::Uri;
use anyhow::{bail, Context, Result};

use crate::models::alert_model::Channel;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";

#[derive(Debug, Clone, PartialEq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub pass: Option<String>,
    /// MAIL_FROM o, en su defecto, SMTP_USER
    pub from: String,
}

impl SmtpConfig {
    /// 465 => TLS implícito; cualquier otro => STARTTLS
    pub fn implicit_tls(&self) -> bool {
        self.port == 465
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessagingConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub api_base: String,
    pub sms_from: Option<String>,
    pub whatsapp_from: Option<String>,
}

/// Destinatarios fijos: listas de respondedores para /alerts/fanout y el número de prueba de SMS.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipientConfig {
    pub responders: BTreeMap<Channel, Vec<String>>,
    pub sms_test_recipient: Option<String>,
}

impl RecipientConfig {
    pub fn has_responders(&self) -> bool {
        self.responders.values().any(|list| !list.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub send_timeout: Duration,
    pub cors_allowed_origin: Option<String>,
    pub smtp: Option<SmtpConfig>,
    pub messaging: Option<MessagingConfig>,
    pub recipients: RecipientConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        RelayConfig {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            workers: 2,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            cors_allowed_origin: None,
            smtp: None,
            messaging: None,
            recipients: RecipientConfig::default(),
        }
    }
}

/// "a, b,,c " -> ["a", "b", "c"]. Sin deduplicar.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_num<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(v) => v
            .parse()
            .with_context(|| format!("{} tiene un valor inválido: '{}'", key, v)),
        None => Ok(default),
    }
}

/// "*" o ausente => cualquier origen (None). Si no, debe ser un origen absoluto (esquema + host).
fn parse_cors_origin(raw: Option<String>) -> Result<Option<String>> {
    let origin = match raw {
        None => return Ok(None),
        Some(v) if v == "*" => return Ok(None),
        Some(v) => v,
    };

    let uri = origin
        .parse::<Uri>()
        .with_context(|| format!("CORS_ALLOWED_ORIGIN no es una URI válida: '{}'", origin))?;
    if uri.scheme().is_none() || uri.host().is_none() {
        bail!(
            "CORS_ALLOWED_ORIGIN debe incluir esquema y host (p.ej. https://panel.example.org): '{}'",
            origin
        );
    }
    Ok(Some(origin))
}

impl RelayConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Construye la config desde cualquier fuente clave->valor (tests sin tocar el entorno).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Valores en blanco cuentan como ausentes
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let defaults = RelayConfig::default();
        let port = parse_num("PORT", get("PORT"), defaults.port)?;
        let workers = parse_num("HTTP_WORKERS", get("HTTP_WORKERS"), defaults.workers)?;
        let timeout_secs = parse_num(
            "SEND_TIMEOUT_SECS",
            get("SEND_TIMEOUT_SECS"),
            defaults.send_timeout.as_secs(),
        )?;
        // Un plazo de 0s haría fallar todos los envíos
        if timeout_secs == 0 {
            bail!("SEND_TIMEOUT_SECS debe ser mayor que 0");
        }
        let cors_allowed_origin = parse_cors_origin(get("CORS_ALLOWED_ORIGIN"))?;

        let smtp = match get("SMTP_HOST") {
            Some(host) => {
                let port = parse_num("SMTP_PORT", get("SMTP_PORT"), DEFAULT_SMTP_PORT)?;
                let user = get("SMTP_USER");
                match get("MAIL_FROM").or_else(|| user.clone()) {
                    Some(from) => Some(SmtpConfig {
                        host,
                        port,
                        user,
                        pass: get("SMTP_PASS"),
                        from,
                    }),
                    None => {
                        log::warn!("SMTP_HOST definido pero sin MAIL_FROM ni SMTP_USER; email desactivado");
                        None
                    }
                }
            }
            None => None,
        };

        let messaging = match (get("TWILIO_SID"), get("TWILIO_AUTH")) {
            (Some(account_sid), Some(auth_token)) => Some(MessagingConfig {
                account_sid,
                auth_token,
                api_base: get("TWILIO_API_BASE")
                    .unwrap_or_else(|| DEFAULT_TWILIO_API_BASE.to_string()),
                sms_from: get("TWILIO_SMS_FROM"),
                whatsapp_from: get("TWILIO_WA_FROM"),
            }),
            _ => None,
        };

        let mut responders = BTreeMap::new();
        for (channel, key) in [
            (Channel::Email, "RESPONDER_EMAILS"),
            (Channel::Sms, "RESPONDER_SMS_LIST"),
            (Channel::Whatsapp, "RESPONDER_WA_LIST"),
        ] {
            let list = get(key).map(|raw| split_list(&raw)).unwrap_or_default();
            responders.insert(channel, list);
        }

        Ok(RelayConfig {
            host: get("HOST").unwrap_or(defaults.host),
            port,
            workers,
            send_timeout: Duration::from_secs(timeout_secs),
            cors_allowed_origin,
            smtp,
            messaging,
            recipients: RecipientConfig {
                responders,
                sms_test_recipient: get("TEST_SMS_TO"),
            },
        })
    }

    pub fn email_enabled(&self) -> bool {
        self.smtp.is_some()
    }

    pub fn sms_enabled(&self) -> bool {
        self.messaging
            .as_ref()
            .is_some_and(|m| m.sms_from.is_some())
    }

    pub fn whatsapp_enabled(&self) -> bool {
        self.messaging
            .as_ref()
            .is_some_and(|m| m.whatsapp_from.is_some())
    }
}
