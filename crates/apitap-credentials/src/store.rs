//! Encrypted-at-rest credential store (spec §4.3 / component C3).
//!
//! All values persist as one encrypted file (spec §6): a single AES-256-GCM
//! envelope wrapping the JSON record of per-domain entries. Writes are
//! serialized through a `parking_lot::RwLock` and replace the file
//! atomically via temp-file-then-rename (spec §5, "the credential store is
//! serialized on write via a single file replaced atomically").
//!
//! A machine-id change makes decryption fail; callers of [`CredentialStore`]
//! observe that as an empty store rather than an error — "no auth" is the
//! correct degradation, not a crash (spec §4.3).

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use apitap_core::error::ApitapError;
use apitap_crypto::{DerivedKey, EncryptedEnvelope};
use parking_lot::RwLock;

use crate::domain::fallback_candidates;
use crate::types::{CredentialRecords, DomainRecord, OAuthCredentials, StoredAuth, StoredSession, StoredToken};

const APP_SALT_LABEL: &[u8] = b"apitap-credential-store";

pub struct CredentialStore {
    path: PathBuf,
    key: DerivedKey,
    records: RwLock<CredentialRecords>,
}

impl CredentialStore {
    /// Open (or initialize) the store at `path`, deriving its key from the
    /// current machine identity. A failed decrypt — wrong machine, no file
    /// yet, or a tampered blob — yields an empty in-memory store rather
    /// than an error.
    pub fn open(path: impl Into<PathBuf>, key: DerivedKey) -> Self {
        let path = path.into();
        let records = Self::load(&path, &key).unwrap_or_default();
        Self {
            path,
            key,
            records: RwLock::new(records),
        }
    }

    fn load(path: &Path, key: &DerivedKey) -> Option<CredentialRecords> {
        let bytes = std::fs::read(path).ok()?;
        let envelope: EncryptedEnvelope = serde_json::from_slice(&bytes).ok()?;
        let plaintext = apitap_crypto::decrypt(key, &envelope).ok()?;
        serde_json::from_slice(&plaintext).ok()
    }

    fn persist(&self) -> Result<(), ApitapError> {
        let plaintext = {
            let records = self.records.read();
            serde_json::to_vec(&*records)?
        };
        let envelope = apitap_crypto::encrypt(&self.key, APP_SALT_LABEL, &plaintext)
            .map_err(|e| ApitapError::integrity(e.to_string()))?;
        let bytes = serde_json::to_vec_pretty(&envelope)?;

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| ApitapError::Io(e.error))?;
        Ok(())
    }

    pub fn store(&self, domain: &str, auth: StoredAuth) -> Result<(), ApitapError> {
        self.records.write().entry(domain.to_string()).or_default().auth = Some(auth);
        self.persist()
    }

    pub fn retrieve(&self, domain: &str) -> Option<StoredAuth> {
        self.records.read().get(domain).and_then(|r| r.auth.clone())
    }

    /// Walks parent domains (e.g. `api.a.b` → `a.b`) returning the first hit.
    pub fn retrieve_with_fallback(&self, domain: &str) -> Option<StoredAuth> {
        let records = self.records.read();
        fallback_candidates(domain)
            .into_iter()
            .find_map(|candidate| records.get(&candidate).and_then(|r| r.auth.clone()))
    }

    pub fn store_session(&self, domain: &str, session: StoredSession) -> Result<(), ApitapError> {
        self.records.write().entry(domain.to_string()).or_default().session = Some(session);
        self.persist()
    }

    /// Returns `None` if no session is stored, or if it has aged past
    /// `max_age_ms` (default 24h, spec §4.3).
    pub fn retrieve_session(&self, domain: &str) -> Option<StoredSession> {
        let records = self.records.read();
        let session = records.get(domain)?.session.clone()?;
        (!session.is_expired(apitap_core::time::now())).then_some(session)
    }

    pub fn retrieve_session_with_fallback(&self, domain: &str) -> Option<StoredSession> {
        let records = self.records.read();
        let now = apitap_core::time::now();
        fallback_candidates(domain).into_iter().find_map(|candidate| {
            records
                .get(&candidate)
                .and_then(|r| r.session.clone())
                .filter(|s| !s.is_expired(now))
        })
    }

    pub fn store_tokens(&self, domain: &str, tokens: HashMap<String, StoredToken>) -> Result<(), ApitapError> {
        self.records.write().entry(domain.to_string()).or_default().tokens.extend(tokens);
        self.persist()
    }

    pub fn retrieve_tokens(&self, domain: &str) -> HashMap<String, StoredToken> {
        self.records.read().get(domain).map(|r| r.tokens.clone()).unwrap_or_default()
    }

    pub fn store_oauth_credentials(&self, domain: &str, creds: OAuthCredentials) -> Result<(), ApitapError> {
        self.records.write().entry(domain.to_string()).or_default().oauth = Some(creds);
        self.persist()
    }

    pub fn retrieve_oauth_credentials(&self, domain: &str) -> Option<OAuthCredentials> {
        self.records.read().get(domain).and_then(|r| r.oauth.clone())
    }

    pub fn list_domains(&self) -> Vec<String> {
        let mut domains: Vec<String> = self.records.read().keys().cloned().collect();
        domains.sort();
        domains
    }

    pub fn clear(&self, domain: &str) -> Result<(), ApitapError> {
        self.records.write().remove(domain);
        self.persist()
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("path", &self.path)
            .field("domains", &self.records.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AuthKind;
    use secrecy::SecretString;

    fn store_at(dir: &Path, machine: &str) -> CredentialStore {
        CredentialStore::open(dir.join("creds.enc"), apitap_crypto::derive_key(machine))
    }

    #[test]
    fn store_and_retrieve_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(dir.path(), "cred-machine-1");
        store
            .store(
                "example.com",
                StoredAuth {
                    kind: AuthKind::Bearer,
                    header: "authorization".to_string(),
                    value: SecretString::from("Bearer abc123"),
                    expires_at: None,
                },
            )
            .unwrap();

        let reloaded = CredentialStore::open(dir.path().join("creds.enc"), apitap_crypto::derive_key("cred-machine-1"));
        let auth = reloaded.retrieve("example.com").unwrap();
        use secrecy::ExposeSecret;
        assert_eq!(auth.value.expose_secret(), "Bearer abc123");
    }

    #[test]
    fn fallback_walks_parent_domains() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(dir.path(), "cred-machine-2");
        store
            .store(
                "example.com",
                StoredAuth {
                    kind: AuthKind::Bearer,
                    header: "authorization".to_string(),
                    value: SecretString::from("Bearer root"),
                    expires_at: None,
                },
            )
            .unwrap();

        let found = store.retrieve_with_fallback("api.example.com");
        assert!(found.is_some());
        assert!(store.retrieve("api.example.com").is_none());
    }

    #[test]
    fn machine_id_change_reads_as_empty_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(dir.path(), "cred-machine-3");
        store
            .store(
                "example.com",
                StoredAuth {
                    kind: AuthKind::ApiKey,
                    header: "x-api-key".to_string(),
                    value: SecretString::from("k"),
                    expires_at: None,
                },
            )
            .unwrap();

        let reloaded = CredentialStore::open(dir.path().join("creds.enc"), apitap_crypto::derive_key("different-machine"));
        assert!(reloaded.retrieve("example.com").is_none());
        assert!(reloaded.list_domains().is_empty());
    }

    #[test]
    fn expired_session_is_not_returned() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(dir.path(), "cred-machine-4");
        let old = apitap_core::time::now() - chrono::Duration::hours(25);
        store
            .store_session(
                "example.com",
                StoredSession {
                    cookies: vec![],
                    saved_at: old,
                    max_age_ms: StoredSession::DEFAULT_MAX_AGE_MS,
                },
            )
            .unwrap();
        assert!(store.retrieve_session("example.com").is_none());
    }

    #[test]
    fn clear_removes_domain() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(dir.path(), "cred-machine-5");
        store
            .store(
                "example.com",
                StoredAuth {
                    kind: AuthKind::Bearer,
                    header: "authorization".to_string(),
                    value: SecretString::from("x"),
                    expires_at: None,
                },
            )
            .unwrap();
        store.clear("example.com").unwrap();
        assert!(store.retrieve("example.com").is_none());
        assert!(store.list_domains().is_empty());
    }
}
