//! Crypto & Machine Identity (spec §4.1 / component C1).
//!
//! Three primitives, each deliberately small: derive a key from the local
//! machine identity, AES-256-GCM encrypt/decrypt with that key, and
//! HMAC-SHA256 sign/verify for skill-file provenance. Nothing here owns
//! state — callers derive a key once and pass it to every call.

pub mod aead;
pub mod hmac;
pub mod kdf;
pub mod machine_id;

pub use aead::{decrypt, encrypt, CryptoError, EncryptedEnvelope};
pub use hmac::{sign, verify};
pub use kdf::{derive_key, DerivedKey};
pub use machine_id::machine_id;
