//! tests/config_tests.rs
//! Lectura de configuración sin tocar el entorno real del proceso.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use crate::config::relay_config::{split_list, RelayConfig, DEFAULT_TWILIO_API_BASE};
    use crate::models::alert_model::Channel;
    use crate::services::relay_service::RelayService;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<RelayConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RelayConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_starts_with_no_channels() {
        let cfg = config_from(&[]).unwrap();

        assert_eq!(cfg, RelayConfig::from_lookup(|_| None).unwrap());
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.send_timeout, Duration::from_secs(10));
        assert!(!cfg.email_enabled() && !cfg.sms_enabled() && !cfg.whatsapp_enabled());
        assert!(!cfg.recipients.has_responders());
    }

    #[test]
    fn full_environment_enables_every_channel() {
        let cfg = config_from(&[
            ("PORT", "8080"),
            ("SEND_TIMEOUT_SECS", "3"),
            ("SMTP_HOST", "smtp.gmail.com"),
            ("SMTP_PORT", "465"),
            ("SMTP_USER", "desk@floodwatch.in"),
            ("SMTP_PASS", "secret"),
            ("TWILIO_SID", "AC123"),
            ("TWILIO_AUTH", "token"),
            ("TWILIO_SMS_FROM", "+15005550006"),
            ("TWILIO_WA_FROM", "whatsapp:+14155238886"),
            ("RESPONDER_EMAILS", "ops@ndrf.gov.in, relief@sdrf.ap.gov.in"),
            ("RESPONDER_SMS_LIST", "+919876543210,+919876543211"),
            ("RESPONDER_WA_LIST", "whatsapp:+919876543210"),
            ("TEST_SMS_TO", "+919000000000"),
        ])
        .unwrap();

        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.send_timeout, Duration::from_secs(3));

        let smtp = cfg.smtp.as_ref().unwrap();
        assert!(smtp.implicit_tls());
        // sin MAIL_FROM se usa SMTP_USER
        assert_eq!(smtp.from, "desk@floodwatch.in");

        let messaging = cfg.messaging.as_ref().unwrap();
        assert_eq!(messaging.api_base, DEFAULT_TWILIO_API_BASE);
        assert!(cfg.sms_enabled() && cfg.whatsapp_enabled());

        assert_eq!(
            cfg.recipients.responders[&Channel::Email],
            vec!["ops@ndrf.gov.in", "relief@sdrf.ap.gov.in"]
        );
        assert_eq!(cfg.recipients.responders[&Channel::Sms].len(), 2);
        assert_eq!(cfg.recipients.sms_test_recipient.as_deref(), Some("+919000000000"));
    }

    #[test]
    fn blank_values_count_as_absent() {
        let cfg = config_from(&[("SMTP_HOST", "  "), ("TWILIO_SID", "AC123"), ("TWILIO_AUTH", "")])
            .unwrap();

        assert!(cfg.smtp.is_none());
        assert!(cfg.messaging.is_none());
    }

    #[test]
    fn messaging_without_whatsapp_sender_only_enables_sms() {
        let cfg = config_from(&[
            ("TWILIO_SID", "AC123"),
            ("TWILIO_AUTH", "token"),
            ("TWILIO_SMS_FROM", "+15005550006"),
        ])
        .unwrap();

        assert!(cfg.sms_enabled());
        assert!(!cfg.whatsapp_enabled());
    }

    #[test]
    fn smtp_without_any_sender_is_disabled() {
        let cfg = config_from(&[("SMTP_HOST", "smtp.example.com")]).unwrap();
        assert!(!cfg.email_enabled());
    }

    #[test]
    fn malformed_numbers_fail_at_startup() {
        let err = config_from(&[("SMTP_HOST", "smtp.example.com"), ("SMTP_PORT", "abc")]).unwrap_err();
        assert!(err.to_string().contains("SMTP_PORT"));

        assert!(config_from(&[("SEND_TIMEOUT_SECS", "-1")]).is_err());
    }

    #[test]
    fn zero_send_timeout_is_rejected() {
        let err = config_from(&[("SEND_TIMEOUT_SECS", "0")]).unwrap_err();
        assert!(err.to_string().contains("SEND_TIMEOUT_SECS"));

        let cfg = config_from(&[("SEND_TIMEOUT_SECS", "1")]).unwrap();
        assert_eq!(cfg.send_timeout, Duration::from_secs(1));
    }

    #[test]
    fn cors_origin_is_validated_at_startup() {
        // "*" equivale a no restringir el origen
        let cfg = config_from(&[("CORS_ALLOWED_ORIGIN", "*")]).unwrap();
        assert_eq!(cfg.cors_allowed_origin, None);

        let cfg = config_from(&[("CORS_ALLOWED_ORIGIN", "http://localhost:5173")]).unwrap();
        assert_eq!(cfg.cors_allowed_origin.as_deref(), Some("http://localhost:5173"));

        let err = config_from(&[("CORS_ALLOWED_ORIGIN", "not a uri")]).unwrap_err();
        assert!(err.to_string().contains("CORS_ALLOWED_ORIGIN"));

        let err = config_from(&[("CORS_ALLOWED_ORIGIN", "localhost:5173")]).unwrap_err();
        assert!(err.to_string().contains("CORS_ALLOWED_ORIGIN"));
    }

    #[test]
    fn responder_lists_are_trimmed_and_not_deduplicated() {
        assert_eq!(
            split_list(" +911 , ,+912,+911 "),
            vec!["+911", "+912", "+911"]
        );
        assert!(split_list("").is_empty());
    }

    #[actix_rt::test]
    async fn relay_from_config_matches_enabled_channels() {
        let cfg = config_from(&[
            ("SMTP_HOST", "smtp.example.com"),
            ("MAIL_FROM", "Flood Desk <alerts@example.com>"),
            ("TWILIO_SID", "AC123"),
            ("TWILIO_AUTH", "token"),
            ("TWILIO_WA_FROM", "whatsapp:+14155238886"),
        ])
        .unwrap();

        let relay = RelayService::from_config(&cfg).unwrap();

        assert!(relay.is_available(Channel::Email));
        assert!(!relay.is_available(Channel::Sms));
        assert!(relay.is_available(Channel::Whatsapp));

        let empty = RelayService::from_config(&RelayConfig::default()).unwrap();
        let status = empty.status();
        assert!(status.ok);
        assert!(!status.email_configured && !status.sms_configured && !status.whatsapp_configured);
    }
}
