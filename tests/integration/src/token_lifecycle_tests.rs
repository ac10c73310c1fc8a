//! Token lifecycle tests
//!
//! Issuance and verification happen in different processes in production;
//! these tests model that with separately constructed codecs.

use crate::test_utils::*;
use serde_json::Value;
use turnstile_crypto::{TicketTokenCodec, TokenError, TokenSecret};

#[test]
fn test_token_issued_by_one_codec_verifies_in_another() {
    init_test_logging();

    let box_office = codec_with_secret("shared-secret");
    let door = codec_with_secret("shared-secret");

    let token = box_office.issue(&identity("reg-100", "evt-1", 3)).unwrap();
    let ticket = door.verify(&token).expect("door should accept box office token");

    assert_eq!(ticket.registration_id, "reg-100");
    assert_eq!(ticket.event_id, "evt-1");
    assert_eq!(ticket.user_id, "user-of-reg-100");
    assert_eq!(ticket.ticket_number, "TKT-reg-100");
    assert_eq!(ticket.quantity, 3);
}

#[test]
fn test_misconfigured_door_rejects_everything() {
    let box_office = codec_with_secret("shared-secret");
    let door = codec_with_secret("stale-secret");

    for i in 0..10 {
        let token = box_office
            .issue(&identity(&format!("reg-{}", i), "evt-1", 1))
            .unwrap();
        assert_eq!(door.inspect(&token), Err(TokenError::SignatureMismatch));
    }
    assert_eq!(door.metrics().signature_mismatches_total, 10);
}

#[test]
fn test_fallback_secret_codecs_interoperate() {
    let issuer = TicketTokenCodec::new(TokenSecret::dev_fallback());
    let verifier = TicketTokenCodec::new(TokenSecret::dev_fallback());
    let configured = codec_with_secret("real-secret");

    let token = issuer.issue(&identity("reg-1", "evt-1", 1)).unwrap();
    assert!(verifier.verify(&token).is_some());
    assert!(configured.verify(&token).is_none());
}

#[test]
fn test_every_data_field_is_bound() {
    let codec = codec_with_secret("shared-secret");
    let token = codec.issue(&identity("reg-1", "evt-1", 2)).unwrap();
    let original: Value = serde_json::from_str(&token).unwrap();

    for field in [
        "registrationId",
        "eventId",
        "userId",
        "ticketNumber",
        "quantity",
        "timestamp",
    ] {
        let mut forged = original.clone();
        forged[field] = match &original[field] {
            Value::String(s) => Value::from(format!("{}x", s)),
            Value::Number(n) => Value::from(n.as_u64().unwrap() + 1),
            other => panic!("unexpected field type {:?}", other),
        };
        assert!(
            codec.verify(&forged.to_string()).is_none(),
            "{} is not covered by the digest",
            field
        );
    }
}

#[test]
fn test_truncated_token_rejected() {
    let codec = codec_with_secret("shared-secret");
    let token = codec.issue(&identity("reg-1", "evt-1", 1)).unwrap();

    for cut in [1, token.len() / 2, token.len() - 1] {
        assert!(matches!(
            codec.inspect(&token[..cut]),
            Err(TokenError::Malformed { .. })
        ));
    }
}

#[test]
fn test_concurrent_verification_shares_codec() {
    let codec = std::sync::Arc::new(codec_with_secret("shared-secret"));
    let token = codec.issue(&identity("reg-1", "evt-1", 1)).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let codec = codec.clone();
            let token = token.clone();
            std::thread::spawn(move || (0..100).all(|_| codec.verify(&token).is_some()))
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
    assert_eq!(codec.metrics().tokens_verified_total, 800);
}
