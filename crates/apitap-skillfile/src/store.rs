//! Atomic, signed per-domain skill file store (spec §4.4 store half / C4).
//!
//! Each domain is one file, written atomically via a temp-file-then-rename
//! in the same directory, and carries an HMAC-SHA256 signature over its
//! canonical content.

use std::path::{Path, PathBuf};

use apitap_core::error::ApitapError;
use apitap_crypto::DerivedKey;

use crate::canonical::canonical_bytes;
use crate::types::{Provenance, SkillFile};

/// Filesystem-safe slug for a domain, used as `<slug>.json`.
fn domain_filename(domain: &str) -> String {
    let slug: String = domain
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    format!("{slug}.json")
}

/// Per-domain skill file store rooted at a single directory.
#[derive(Debug, Clone)]
pub struct SkillFileStore {
    dir: PathBuf,
}

impl SkillFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, domain: &str) -> PathBuf {
        self.dir.join(domain_filename(domain))
    }

    /// Sign `skill` as `self`-provenance under `key` and write it atomically.
    pub fn write_self(&self, skill: &mut SkillFile, key: &DerivedKey) -> Result<PathBuf, ApitapError> {
        skill.provenance = Provenance::SelfProduced;
        skill.signature = None;
        let signature = apitap_crypto::sign(key, &canonical_bytes(skill));
        skill.signature = Some(signature);
        self.write_atomic(skill)
    }

    fn write_atomic(&self, skill: &SkillFile) -> Result<PathBuf, ApitapError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&skill.domain);
        let bytes = serde_json::to_vec_pretty(skill)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        use std::io::Write;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        tmp.persist(&path)
            .map_err(|e| ApitapError::Io(e.error))?;
        Ok(path)
    }

    /// Read a skill file, verifying its signature when one is present and
    /// enforcing the provenance invariant: `self`/`imported` skill files
    /// must carry a signature that verifies under `key`, or the read fails
    /// closed with [`ApitapError::Integrity`].
    pub fn read(&self, domain: &str, key: &DerivedKey) -> Result<SkillFile, ApitapError> {
        let path = self.path_for(domain);
        self.read_path(&path, key)
    }

    pub fn read_path(&self, path: &Path, key: &DerivedKey) -> Result<SkillFile, ApitapError> {
        let bytes = std::fs::read(path)?;
        let skill: SkillFile = serde_json::from_slice(&bytes)?;
        self.verify_provenance(&skill, key)?;
        Ok(skill)
    }

    fn verify_provenance(&self, skill: &SkillFile, key: &DerivedKey) -> Result<(), ApitapError> {
        match (&skill.provenance, &skill.signature) {
            (Provenance::Unsigned, _) => Ok(()),
            (_, None) => Err(ApitapError::integrity(format!(
                "skill file for {} claims {:?} provenance but carries no signature",
                skill.domain, skill.provenance
            ))),
            (_, Some(sig)) => {
                let canonical = canonical_bytes(skill);
                if apitap_crypto::verify(key, &canonical, sig) {
                    Ok(())
                } else {
                    Err(ApitapError::integrity(format!(
                        "signature verification failed for skill file {}",
                        skill.domain
                    )))
                }
            }
        }
    }

    /// Import a skill file from raw bytes (spec §6 `import` command).
    ///
    /// If the embedded signature verifies under the *local* key already
    /// (vanishingly unlikely unless it was exported from this same
    /// machine), provenance stays whatever it was. Otherwise the file is
    /// re-signed locally as `imported` provenance — the signature now
    /// attests "this machine has seen and accepted this content", not
    /// "this machine produced this content". A structurally-invalid
    /// signature (present but garbage) downgrades to `unsigned` rather
    /// than failing the import outright, matching spec §7's
    /// integrity-category framing ("import rejects" refers to tampered
    /// *content*, not merely foreign provenance).
    pub fn import_bytes(&self, bytes: &[u8], key: &DerivedKey) -> Result<SkillFile, ApitapError> {
        let mut skill: SkillFile = serde_json::from_slice(bytes)?;

        let locally_valid = skill
            .signature
            .as_deref()
            .map(|sig| apitap_crypto::verify(key, &canonical_bytes(&skill), sig))
            .unwrap_or(false);

        if !locally_valid {
            skill.provenance = Provenance::Imported;
            skill.signature = None;
            let signature = apitap_crypto::sign(key, &canonical_bytes(&skill));
            skill.signature = Some(signature);
        }

        self.write_atomic(&skill)?;
        Ok(skill)
    }

    pub fn list_domains(&self) -> Result<Vec<String>, ApitapError> {
        if !self.dir.exists() {
            return Ok(vec![]);
        }
        let mut domains = vec![];
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if let Some(name) = entry.path().file_stem().and_then(|s| s.to_str()) {
                domains.push(name.to_string());
            }
        }
        domains.sort();
        Ok(domains)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;
    use std::collections::BTreeMap;

    fn sample(domain: &str) -> SkillFile {
        SkillFile {
            version: SKILL_FILE_VERSION.to_string(),
            domain: domain.to_string(),
            base_url: format!("https://{domain}"),
            captured_at: "2026-01-01T00:00:00Z".to_string(),
            endpoints: vec![],
            metadata: SkillMetadata {
                capture_count: 0,
                filtered_count: 0,
                tool_version: "0.1.0".to_string(),
                dom_bytes: None,
            },
            provenance: Provenance::Unsigned,
            signature: None,
            auth: None,
        }
    }

    #[test]
    fn write_then_read_roundtrips_and_verifies() {
        let dir = tempfile::tempdir().unwrap();
        let store = SkillFileStore::new(dir.path());
        let key = apitap_crypto::derive_key("store-test-machine");
        let mut skill = sample("example.com");
        store.write_self(&mut skill, &key).unwrap();

        let loaded = store.read("example.com", &key).unwrap();
        assert_eq!(loaded.domain, "example.com");
        assert_eq!(loaded.provenance, Provenance::SelfProduced);
        assert!(loaded.signature.is_some());
    }

    #[test]
    fn tampered_file_fails_closed() {
        let dir = tempfile::tempdir().unwrap();
        let store = SkillFileStore::new(dir.path());
        let key = apitap_crypto::derive_key("tamper-machine");
        let mut skill = sample("tamper.example");
        let path = store.write_self(&mut skill, &key).unwrap();

        let mut bytes = std::fs::read(&path).unwrap();
        // Flip a byte inside the domain string to corrupt signed content.
        let pos = String::from_utf8_lossy(&bytes).find("tamper.example").unwrap();
        bytes[pos] = b'X';
        std::fs::write(&path, bytes).unwrap();

        assert!(store.read("tamper.example", &key).is_err());
    }

    #[test]
    fn import_unsigned_payload_becomes_imported_and_signed() {
        let dir = tempfile::tempdir().unwrap();
        let store = SkillFileStore::new(dir.path());
        let key = apitap_crypto::derive_key("import-machine");
        let skill = sample("imported.example");
        let bytes = serde_json::to_vec(&skill).unwrap();

        let imported = store.import_bytes(&bytes, &key).unwrap();
        assert_eq!(imported.provenance, Provenance::Imported);
        assert!(imported.signature.is_some());

        let reloaded = store.read("imported.example", &key).unwrap();
        assert_eq!(reloaded.provenance, Provenance::Imported);
    }

    #[test]
    fn list_domains_reflects_store_contents() {
        let dir = tempfile::tempdir().unwrap();
        let store = SkillFileStore::new(dir.path());
        let key = apitap_crypto::derive_key("list-machine");
        for domain in ["a.example", "b.example"] {
            let mut skill = sample(domain);
            store.write_self(&mut skill, &key).unwrap();
        }
        let domains = store.list_domains().unwrap();
        assert_eq!(domains, vec!["a.example", "b.example"]);
    }

    #[test]
    fn endpoint_ids_are_unique_invariant_holds_for_sample_data() {
        let mut skill = sample("dup.example");
        skill.endpoints.push(endpoint("GET /a", "GET", "/a"));
        skill.endpoints.push(endpoint("GET /b", "GET", "/b"));
        let ids: std::collections::HashSet<_> = skill.endpoints.iter().map(|e| &e.id).collect();
        assert_eq!(ids.len(), skill.endpoints.len());
    }

    fn endpoint(id: &str, method: &str, path: &str) -> SkillEndpoint {
        SkillEndpoint {
            id: id.to_string(),
            method: method.to_string(),
            path: path.to_string(),
            query_params: BTreeMap::new(),
            headers: BTreeMap::new(),
            response_shape: ResponseShape {
                shape_type: "object".to_string(),
                fields: None,
            },
            response_schema: None,
            examples: EndpointExamples {
                request: ExampleRequest {
                    url: format!("https://dup.example{path}"),
                },
                response: None,
            },
            request_body: None,
            replayability: Replayability {
                tier: ReplayabilityTier::Green,
                verified: false,
                signals: vec![],
            },
            pagination: None,
            isolated_auth: false,
        }
    }
}
