//! HMAC-SHA256 signing and constant-time verification (spec §4.1).

use ring::hmac;
use subtle::ConstantTimeEq;

use crate::kdf::DerivedKey;

const SIGNATURE_PREFIX: &str = "hmac-sha256:";

/// Sign `content` under `key`, returning `"hmac-sha256:<hex>"`.
pub fn sign(key: &DerivedKey, content: &[u8]) -> String {
    let hmac_key = hmac::Key::new(hmac::HMAC_SHA256, key.as_bytes());
    let tag = hmac::sign(&hmac_key, content);
    format!("{SIGNATURE_PREFIX}{}", hex::encode(tag.as_ref()))
}

/// Verify a `"hmac-sha256:<hex>"` signature against `content` under `key`.
///
/// Checks the encoded length before comparing bytes, then compares in
/// constant time — a malformed signature never short-circuits on the first
/// mismatching byte of a *valid-length* signature.
pub fn verify(key: &DerivedKey, content: &[u8], signature: &str) -> bool {
    let Some(hex_part) = signature.strip_prefix(SIGNATURE_PREFIX) else {
        return false;
    };
    let Ok(given_bytes) = hex::decode(hex_part) else {
        return false;
    };

    let hmac_key = hmac::Key::new(hmac::HMAC_SHA256, key.as_bytes());
    let expected_tag = hmac::sign(&hmac_key, content);
    let expected_bytes = expected_tag.as_ref();

    if given_bytes.len() != expected_bytes.len() {
        return false;
    }
    given_bytes.ct_eq(expected_bytes).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf::derive_key;

    #[test]
    fn signature_roundtrip() {
        let key = derive_key("sign-machine");
        let sig = sign(&key, b"canonical content");
        assert!(sig.starts_with(SIGNATURE_PREFIX));
        assert!(verify(&key, b"canonical content", &sig));
    }

    #[test]
    fn tampered_content_fails() {
        let key = derive_key("sign-machine-2");
        let sig = sign(&key, b"canonical content");
        assert!(!verify(&key, b"different content", &sig));
    }

    #[test]
    fn malformed_signature_fails_closed() {
        let key = derive_key("sign-machine-3");
        assert!(!verify(&key, b"x", "not-a-signature"));
        assert!(!verify(&key, b"x", "hmac-sha256:zz"));
    }
}
