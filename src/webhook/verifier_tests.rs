//! Tests for `WebhookVerifier`.

use std::sync::{Arc, Mutex};

use super::{WebhookKind, WebhookVerifier};
use crate::config::ConfigError;
use crate::events::{Event, EventKind};

const SECRET: &str = "whsec_test";
const BODY: &[u8] =
    br#"{"type":"message_sent","message_id":"m1","timestamp":"2024-05-01T10:00:00Z"}"#;

fn verifier() -> WebhookVerifier {
    WebhookVerifier::new(SECRET).unwrap()
}

mod construction {
    use super::*;

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(
            WebhookVerifier::new(""),
            Err(ConfigError::MissingRequired { field: "webhook.secret", .. })
        ));
    }

    #[test]
    fn debug_redacts_secret() {
        assert!(!format!("{:?}", verifier()).contains(SECRET));
    }
}

mod signing {
    use super::*;

    #[test]
    fn matches_known_vector() {
        // RFC 4231 test case 2.
        let verifier = WebhookVerifier::new("Jefe").unwrap();

        assert_eq!(
            verifier.sign(b"what do ya want for nothing?"),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn accepts_prefix_and_uppercase_hex() {
        let verifier = verifier();
        let signature = verifier.sign(BODY);

        assert!(verifier.verify_signature(BODY, Some(&signature)).is_ok());
        assert!(
            verifier
                .verify_signature(BODY, Some(&format!("sha256={signature}")))
                .is_ok()
        );
        assert!(
            verifier
                .verify_signature(BODY, Some(&signature.to_uppercase()))
                .is_ok()
        );
    }

    #[test]
    fn missing_or_blank_signature_is_bad_request() {
        let verifier = verifier();

        for signature in [None, Some(""), Some("   ")] {
            let err = verifier.verify_signature(BODY, signature).unwrap_err();
            assert_eq!(err.code(), 400);
            assert_eq!(err.message(), "Missing webhook signature");
        }
    }

    #[test]
    fn any_single_byte_change_in_body_is_unauthorized() {
        let verifier = verifier();
        let signature = verifier.sign(BODY);

        for index in 0..BODY.len() {
            let mut tampered = BODY.to_vec();
            tampered[index] ^= 0x01;

            let err = verifier.verify_signature(&tampered, Some(&signature)).unwrap_err();
            assert_eq!(err.code(), 401, "byte {index}");
        }
    }

    #[test]
    fn any_single_char_change_in_signature_is_unauthorized() {
        let verifier = verifier();
        let signature = verifier.sign(BODY);

        for index in 0..signature.len() {
            let mut chars: Vec<char> = signature.chars().collect();
            chars[index] = if chars[index] == '0' { '1' } else { '0' };
            let tampered: String = chars.into_iter().collect();

            let err = verifier.verify_signature(BODY, Some(&tampered)).unwrap_err();
            assert_eq!(err.code(), 401, "char {index}");
            assert_eq!(err.message(), "Invalid webhook signature");
        }
    }

    #[test]
    fn non_hex_and_truncated_signatures_are_unauthorized() {
        let verifier = verifier();
        let signature = verifier.sign(BODY);

        for bad in ["not-hex", &signature[..10], "abc"] {
            assert_eq!(verifier.verify_signature(BODY, Some(bad)).unwrap_err().code(), 401);
        }
    }

    #[test]
    fn different_secret_is_unauthorized() {
        let other = WebhookVerifier::new("another-secret").unwrap();

        let err = verifier()
            .verify_signature(BODY, Some(&other.sign(BODY)))
            .unwrap_err();

        assert_eq!(err.code(), 401);
    }
}

mod parsing {
    use super::*;

    #[test]
    fn signature_is_checked_before_json() {
        let verifier = verifier();

        let err = verifier
            .verify_and_parse(b"{broken", Some(&verifier.sign(BODY)))
            .unwrap_err();

        assert_eq!(err.code(), 401);
    }

    #[test]
    fn signed_invalid_json_is_bad_request() {
        let verifier = verifier();
        let body = b"{broken";

        let err = verifier
            .verify_and_parse(body, Some(&verifier.sign(body)))
            .unwrap_err();

        assert_eq!(err.code(), 400);
        assert_eq!(err.message(), "Invalid JSON payload");
    }

    #[test]
    fn signed_body_without_type_is_invalid_payload() {
        let verifier = verifier();
        let body = br#"{"timestamp":"2024-05-01T10:00:00Z"}"#;

        let err = verifier
            .verify_and_parse(body, Some(&verifier.sign(body)))
            .unwrap_err();

        assert_eq!(err.code(), 400);
        assert_eq!(err.message(), "Invalid webhook payload");
    }
}

mod events {
    use super::*;

    #[test]
    fn verified_payload_is_published_scoped_and_global() {
        let verifier = verifier();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for kind in [
            EventKind::Webhook(WebhookKind::MessageSent),
            EventKind::Webhook(WebhookKind::MessageInbound),
            EventKind::AnyWebhook,
        ] {
            let sink = Arc::clone(&seen);
            verifier
                .events()
                .subscribe(kind, move |event| sink.lock().unwrap().push(event.kind()));
        }

        let payload = verifier
            .verify_and_parse(BODY, Some(&verifier.sign(BODY)))
            .unwrap();

        assert_eq!(payload.kind(), WebhookKind::MessageSent);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                EventKind::Webhook(WebhookKind::MessageSent),
                EventKind::AnyWebhook
            ]
        );
    }

    #[test]
    fn rejected_webhooks_publish_nothing() {
        let verifier = verifier();
        let count = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&count);
        verifier.events().subscribe_all(move |_| *sink.lock().unwrap() += 1);

        let _ = verifier.verify_and_parse(BODY, Some("deadbeef"));

        assert_eq!(*count.lock().unwrap(), 0);
    }
}

#[test]
fn events_carry_full_payload() {
    let verifier = verifier();
    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    verifier.events().subscribe(EventKind::AnyWebhook, move |event| {
        if let Event::AnyWebhook(payload) = event {
            *sink.lock().unwrap() = Some(payload.clone());
        }
    });

    let payload = verifier
        .verify_and_parse(BODY, Some(&verifier.sign(BODY)))
        .unwrap();

    assert_eq!(seen.lock().unwrap().as_ref(), Some(&payload));
}
