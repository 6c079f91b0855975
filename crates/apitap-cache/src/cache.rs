//! Session cache (spec §4.8, component C9): process-lifetime domain → skill
//! file map. Entries are invalidated explicitly, never on a timer, so
//! `dashmap` carries the concurrent reads/writes here without an
//! eviction policy nothing in this cache uses (dropped dependency, see
//! DESIGN.md).

use apitap_skillfile::SkillFile;
use dashmap::DashMap;

#[derive(Default)]
pub struct SessionCache {
    entries: DashMap<String, SkillFile>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, domain: &str) -> Option<SkillFile> {
        self.entries.get(domain).map(|entry| entry.value().clone())
    }

    pub fn insert(&self, skill: SkillFile) {
        self.entries.insert(skill.domain.clone(), skill);
    }

    /// Drop a cached entry, e.g. after a new capture for that domain.
    pub fn invalidate(&self, domain: &str) {
        self.entries.remove(domain);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apitap_skillfile::{Provenance, SkillMetadata};

    fn sample(domain: &str) -> SkillFile {
        SkillFile {
            version: apitap_skillfile::SKILL_FILE_VERSION.to_string(),
            domain: domain.to_string(),
            base_url: format!("https://{domain}"),
            captured_at: "2026-01-01T00:00:00Z".to_string(),
            endpoints: vec![],
            metadata: SkillMetadata { capture_count: 0, filtered_count: 0, tool_version: "0.1.0".to_string(), dom_bytes: None },
            provenance: Provenance::Unsigned,
            signature: None,
            auth: None,
        }
    }

    #[test]
    fn insert_then_get_roundtrips() {
        let cache = SessionCache::new();
        cache.insert(sample("example.com"));
        assert!(cache.get("example.com").is_some());
    }

    #[test]
    fn invalidate_removes_entry() {
        let cache = SessionCache::new();
        cache.insert(sample("example.com"));
        cache.invalidate("example.com");
        assert!(cache.get("example.com").is_none());
    }

    #[test]
    fn miss_returns_none() {
        let cache = SessionCache::new();
        assert!(cache.get("nope.example").is_none());
    }
}
