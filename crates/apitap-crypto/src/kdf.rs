//! Key derivation: PBKDF2-HMAC-SHA512 over the machine identifier.
//!
//! Fixed app-salt, 100,000 iterations, 32-byte output — spec §4.1.

use std::num::NonZeroU32;

/// App-wide fixed salt. Not a secret: the security property comes from the
/// machine identifier being unknown to an attacker without local access,
/// not from salt secrecy.
const APP_SALT: &[u8] = b"apitap-v1-skill-store-key-derivation-salt";
const ITERATIONS: u32 = 100_000;
const KEY_LEN: usize = 32;

/// A derived 256-bit symmetric key.
#[derive(Clone)]
pub struct DerivedKey(pub(crate) [u8; KEY_LEN]);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey(..)")
    }
}

/// Derive the symmetric key used for AES-256-GCM and HMAC-SHA256 from a
/// stable machine identifier.
pub fn derive_key(machine_id: &str) -> DerivedKey {
    let mut out = [0u8; KEY_LEN];
    let iterations = NonZeroU32::new(ITERATIONS).expect("iterations is nonzero");
    ring::pbkdf2::derive(
        ring::pbkdf2::PBKDF2_HMAC_SHA512,
        iterations,
        APP_SALT,
        machine_id.as_bytes(),
        &mut out,
    );
    DerivedKey(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let a = derive_key("machine-a");
        let b = derive_key("machine-a");
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn different_machines_diverge() {
        let a = derive_key("machine-a");
        let b = derive_key("machine-b");
        assert_ne!(a.as_bytes(), b.as_bytes());
    }
}
