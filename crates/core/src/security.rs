//! Webhook signature utilities (HMAC-SHA256, hex encoded).

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded HMAC-SHA256 signature over the raw payload.
pub fn generate_signature(payload: &str, secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("hmac accepts keys of any length");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Timing-safe verification of a hex signature against the raw payload.
/// Missing signature or empty secret verifies false.
pub fn verify_signature(payload: &str, signature: Option<&str>, secret: &str) -> bool {
    let Some(signature) = signature else {
        return false;
    };
    if secret.is_empty() {
        return false;
    }
    let Ok(signature_bytes) = hex::decode(signature) else {
        return false;
    };

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("hmac accepts keys of any length");
    mac.update(payload.as_bytes());
    mac.verify_slice(&signature_bytes).is_ok()
}

#[cfg(test)]
mod tests {
    use super::{generate_signature, verify_signature};

    #[test]
    fn signature_round_trips() {
        let payload = r#"{"event":"lead.created","data":{"id":"lead-1"}}"#;
        let signature = generate_signature(payload, "shared-secret");

        assert!(verify_signature(payload, Some(&signature), "shared-secret"));
    }

    #[test]
    fn tampered_payload_fails_verification() {
        let signature = generate_signature("original body", "shared-secret");
        assert!(!verify_signature("tampered body", Some(&signature), "shared-secret"));
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let signature = generate_signature("body", "secret-a");
        assert!(!verify_signature("body", Some(&signature), "secret-b"));
    }

    #[test]
    fn missing_signature_or_secret_fails_closed() {
        assert!(!verify_signature("body", None, "secret"));
        assert!(!verify_signature("body", Some("deadbeef"), ""));
        assert!(!verify_signature("body", Some("not-hex!"), "secret"));
    }
}
