//! Test vectors for token digest stability.
//!
//! Each vector pins the canonical claims string and the expected digest for
//! a fixed identity, timestamp and secret. A change in field order, key
//! naming or number formatting breaks these before it breaks deployed
//! tickets.

use crate::secret::TokenSecret;
use crate::token::{TicketIdentity, TicketTokenCodec};

/// A pinned token for digest verification.
#[derive(Debug, Clone)]
pub struct TokenTestVector {
    pub name: &'static str,
    pub registration_id: &'static str,
    pub event_id: &'static str,
    pub user_id: &'static str,
    pub ticket_number: &'static str,
    pub quantity: u32,
    pub timestamp: u64,
    pub secret: &'static str,
    pub expected_canonical: &'static str,
    pub expected_hash_hex: &'static str,
}

impl TokenTestVector {
    pub fn identity(&self) -> TicketIdentity {
        TicketIdentity {
            registration_id: self.registration_id.to_string(),
            event_id: self.event_id.to_string(),
            user_id: self.user_id.to_string(),
            ticket_number: self.ticket_number.to_string(),
            quantity: self.quantity,
        }
    }

    pub fn codec(&self) -> TicketTokenCodec {
        TicketTokenCodec::new(TokenSecret::new(self.secret).expect("vector secret is non-empty"))
    }
}

pub fn get_test_vectors() -> Vec<TokenTestVector> {
    vec![
        TokenTestVector {
            name: "vector_1_basic_ticket",
            registration_id: "r1",
            event_id: "e1",
            user_id: "u1",
            ticket_number: "TKT-001",
            quantity: 2,
            timestamp: 1700000000000,
            secret: "test-secret",
            expected_canonical: r#"{"registrationId":"r1","eventId":"e1","userId":"u1","ticketNumber":"TKT-001","quantity":2,"timestamp":1700000000000}"#,
            expected_hash_hex: "4a18c5e391576115479c52bcc801da2b93dff2de74bfcd7168c0ddae2eeb5870",
        },
        TokenTestVector {
            name: "vector_2_generated_ticket_number",
            registration_id: "reg_01HZX3",
            event_id: "evt_summit_2024",
            user_id: "user_2abcXYZ",
            ticket_number: "TKT-1712345678901-004217",
            quantity: 1,
            timestamp: 1712345678901,
            secret: "test-secret",
            expected_canonical: r#"{"registrationId":"reg_01HZX3","eventId":"evt_summit_2024","userId":"user_2abcXYZ","ticketNumber":"TKT-1712345678901-004217","quantity":1,"timestamp":1712345678901}"#,
            expected_hash_hex: "c58b433aad8f4f0ce4b4e54d6c5ec422edba3f907a308bed565eae14a8671ee7",
        },
        TokenTestVector {
            name: "vector_3_other_secret",
            registration_id: "r1",
            event_id: "e1",
            user_id: "u1",
            ticket_number: "TKT-001",
            quantity: 2,
            timestamp: 1700000000000,
            secret: "another-secret",
            expected_canonical: r#"{"registrationId":"r1","eventId":"e1","userId":"u1","ticketNumber":"TKT-001","quantity":2,"timestamp":1700000000000}"#,
            expected_hash_hex: "d7845037fcddd2c710d97a4809640bf6fefecd024cf0c6238186c34dffc34eb4",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::compute_digest;

    #[test]
    fn test_vectors_digest() {
        for vector in get_test_vectors() {
            let digest = compute_digest(vector.expected_canonical.as_bytes(), vector.secret.as_bytes());
            assert_eq!(
                hex::encode(digest),
                vector.expected_hash_hex,
                "digest mismatch for {}",
                vector.name
            );
        }
    }

    #[test]
    fn test_vectors_issue_exact_text() {
        for vector in get_test_vectors() {
            let codec = vector.codec();
            let token = codec.issue_at(&vector.identity(), vector.timestamp).unwrap();

            let expected = format!(
                "{},\"hash\":\"{}\"}}",
                vector.expected_canonical.trim_end_matches('}'),
                vector.expected_hash_hex
            );
            assert_eq!(token, expected, "token text mismatch for {}", vector.name);
        }
    }

    #[test]
    fn test_vectors_verify_pinned_text() {
        for vector in get_test_vectors() {
            let text = format!(
                "{},\"hash\":\"{}\"}}",
                vector.expected_canonical.trim_end_matches('}'),
                vector.expected_hash_hex
            );
            let claims = vector.codec().verify(&text).expect(vector.name);
            assert_eq!(claims.identity(), vector.identity());
            assert_eq!(claims.timestamp, vector.timestamp);
        }
    }

    #[test]
    fn test_vectors_differ_by_secret() {
        let vectors = get_test_vectors();
        assert_eq!(vectors[0].expected_canonical, vectors[2].expected_canonical);
        assert_ne!(vectors[0].expected_hash_hex, vectors[2].expected_hash_hex);
    }
}
