//! models/recipient.rs
//! Validación de destinatarios por canal, antes de tocar el transporte.

use std::sync::LazyLock;

use lettre::Address;
use regex::Regex;

use crate::models::alert_model::Channel;

pub const WHATSAPP_PREFIX: &str = "whatsapp:";

static E164: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9][0-9]{7,14}$").expect("E.164 regex is valid"));

pub fn is_e164(number: &str) -> bool {
    E164.is_match(number)
}

/// Devuelve el motivo del rechazo si la dirección no sirve para el canal.
pub fn validate(channel: Channel, recipient: &str) -> Result<(), String> {
    match channel {
        Channel::Email => recipient
            .parse::<Address>()
            .map(|_| ())
            .map_err(|e| format!("invalid email address '{}': {}", recipient, e)),
        Channel::Sms => {
            if is_e164(recipient) {
                Ok(())
            } else {
                Err(format!(
                    "invalid SMS number '{}': expected E.164 format (+<country><number>)",
                    recipient
                ))
            }
        }
        Channel::Whatsapp => match recipient.strip_prefix(WHATSAPP_PREFIX) {
            Some(number) if is_e164(number) => Ok(()),
            Some(_) => Err(format!(
                "invalid WhatsApp number '{}': expected whatsapp:+<E.164>",
                recipient
            )),
            None => Err(format!(
                "invalid WhatsApp recipient '{}': missing '{}' prefix",
                recipient, WHATSAPP_PREFIX
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_addresses() {
        assert!(validate(Channel::Email, "responder@ndrf.gov.in").is_ok());
        assert!(validate(Channel::Sms, "+919876543210").is_ok());
        assert!(validate(Channel::Whatsapp, "whatsapp:+919876543210").is_ok());
    }

    #[test]
    fn rejects_whatsapp_without_prefix() {
        let err = validate(Channel::Whatsapp, "9876543210").unwrap_err();
        assert!(err.contains("missing 'whatsapp:' prefix"));
        assert!(validate(Channel::Whatsapp, "whatsapp:9876543210").is_err());
    }

    #[test]
    fn rejects_bad_sms_and_email() {
        assert!(validate(Channel::Sms, "9876543210").is_err());
        assert!(validate(Channel::Sms, "+0123456789").is_err());
        assert!(validate(Channel::Sms, "whatsapp:+919876543210").is_err());
        assert!(validate(Channel::Email, "not-an-email").is_err());
    }
}
