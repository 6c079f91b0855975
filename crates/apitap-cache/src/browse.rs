//! Browse orchestrator (spec §4.8, component C10): cache → disk → discovery
//! adapter → replay, collapsed into one "fetch me data for this URL" call.

use std::sync::Arc;

use apitap_core::error::ApitapError;
use apitap_credentials::CredentialStore;
use apitap_crypto::DerivedKey;
use apitap_refresh::BrowserSession;
use apitap_replay::{ReplayEngine, ReplayOptions, ReplayResult};
use apitap_skillfile::{ReplayabilityTier, SkillEndpoint, SkillFile, SkillFileStore};
use serde::Serialize;

use crate::adapters::{DiscoveryAdapter, DiscoveryConfidence};
use crate::cache::SessionCache;

#[derive(Debug, Clone, Serialize)]
pub struct BrowseFailure {
    pub success: bool,
    pub suggestion: String,
}

impl BrowseFailure {
    fn capture_needed() -> Self {
        Self { success: false, suggestion: "capture_needed".to_string() }
    }
}

pub struct BrowseOrchestrator {
    cache: SessionCache,
    store: SkillFileStore,
    replay: ReplayEngine,
}

impl BrowseOrchestrator {
    pub fn new(store: SkillFileStore, skip_ssrf_check: bool) -> Self {
        Self { cache: SessionCache::new(), store, replay: ReplayEngine::new(skip_ssrf_check) }
    }

    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }

    pub async fn browse(
        &self,
        domain: &str,
        key: &DerivedKey,
        discovery: Option<&dyn DiscoveryAdapter>,
        credentials: Option<&CredentialStore>,
        browser: Option<Arc<dyn BrowserSession>>,
    ) -> Result<ReplayResult, BrowseFailure> {
        let skill = self.locate_skill(domain, key, discovery).await.ok_or_else(BrowseFailure::capture_needed)?;

        let Some(endpoint) = best_endpoint(&skill) else {
            return Err(BrowseFailure::capture_needed());
        };

        self.cache.insert(skill.clone());

        self.replay
            .replay(&skill, &endpoint.id, ReplayOptions::default(), credentials, browser)
            .await
            .map_err(|e| match e {
                ApitapError::Authentication { suggestion, .. } => BrowseFailure { success: false, suggestion },
                _ => BrowseFailure { success: false, suggestion: "capture_needed".to_string() },
            })
    }

    async fn locate_skill(&self, domain: &str, key: &DerivedKey, discovery: Option<&dyn DiscoveryAdapter>) -> Option<SkillFile> {
        if let Some(skill) = self.cache.get(domain) {
            return Some(skill);
        }
        if let Ok(skill) = self.store.read(domain, key) {
            self.cache.insert(skill.clone());
            return Some(skill);
        }
        let discovery = discovery?;
        let result = discovery.discover(&format!("https://{domain}")).await.ok()?;
        if result.confidence < DiscoveryConfidence::Medium {
            return None;
        }
        result.skill_file
    }
}

/// Prefer `green`, then `yellow`; GET over POST; shortest path first
/// (spec §4.8).
pub fn best_endpoint(skill: &SkillFile) -> Option<&SkillEndpoint> {
    skill
        .endpoints
        .iter()
        .filter(|e| matches!(e.replayability.tier, ReplayabilityTier::Green | ReplayabilityTier::Yellow))
        .min_by_key(|e| (tier_rank(e.replayability.tier), method_rank(&e.method), e.path.len()))
}

fn tier_rank(tier: ReplayabilityTier) -> u8 {
    match tier {
        ReplayabilityTier::Green => 0,
        ReplayabilityTier::Yellow => 1,
        ReplayabilityTier::Orange => 2,
        ReplayabilityTier::Red => 3,
        ReplayabilityTier::Unknown => 4,
    }
}

fn method_rank(method: &str) -> u8 {
    if method.eq_ignore_ascii_case("GET") {
        0
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apitap_skillfile::{
        EndpointExamples, ExampleRequest, Provenance, Replayability, ResponseShape, SkillMetadata, SKILL_FILE_VERSION,
    };
    use std::collections::BTreeMap;

    fn endpoint(id: &str, method: &str, path: &str, tier: ReplayabilityTier) -> SkillEndpoint {
        SkillEndpoint {
            id: id.to_string(),
            method: method.to_string(),
            path: path.to_string(),
            query_params: BTreeMap::new(),
            headers: BTreeMap::new(),
            response_shape: ResponseShape { shape_type: "object".to_string(), fields: None },
            response_schema: None,
            examples: EndpointExamples { request: ExampleRequest { url: format!("https://x{path}") }, response: None },
            request_body: None,
            replayability: Replayability { tier, verified: false, signals: vec![] },
            pagination: None,
            isolated_auth: false,
        }
    }

    fn skill(endpoints: Vec<SkillEndpoint>) -> SkillFile {
        SkillFile {
            version: SKILL_FILE_VERSION.to_string(),
            domain: "example.com".to_string(),
            base_url: "https://example.com".to_string(),
            captured_at: "2026-01-01T00:00:00Z".to_string(),
            endpoints,
            metadata: SkillMetadata { capture_count: 0, filtered_count: 0, tool_version: "0.1.0".to_string(), dom_bytes: None },
            provenance: Provenance::Unsigned,
            signature: None,
            auth: None,
        }
    }

    #[test]
    fn green_beats_yellow() {
        let s = skill(vec![
            endpoint("a", "GET", "/a", ReplayabilityTier::Yellow),
            endpoint("b", "GET", "/b", ReplayabilityTier::Green),
        ]);
        assert_eq!(best_endpoint(&s).unwrap().id, "b");
    }

    #[test]
    fn get_beats_post_at_same_tier() {
        let s = skill(vec![
            endpoint("a", "POST", "/a", ReplayabilityTier::Green),
            endpoint("b", "GET", "/b", ReplayabilityTier::Green),
        ]);
        assert_eq!(best_endpoint(&s).unwrap().id, "b");
    }

    #[test]
    fn shortest_path_wins_tiebreak() {
        let s = skill(vec![
            endpoint("a", "GET", "/aaaa", ReplayabilityTier::Green),
            endpoint("b", "GET", "/a", ReplayabilityTier::Green),
        ]);
        assert_eq!(best_endpoint(&s).unwrap().id, "b");
    }

    #[test]
    fn red_and_orange_are_excluded() {
        let s = skill(vec![endpoint("a", "GET", "/a", ReplayabilityTier::Red)]);
        assert!(best_endpoint(&s).is_none());
    }
}
