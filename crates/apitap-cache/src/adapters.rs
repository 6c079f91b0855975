//! Adapter contracts (spec §6): the browser, discovery, and content-reader
//! collaborators live outside this crate. These traits are the seam C10
//! drives them through — no implementation ships here.

use apitap_core::error::ApitapError;
use apitap_skillfile::SkillFile;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryConfidence {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryResult {
    pub confidence: DiscoveryConfidence,
    #[serde(default)]
    pub frameworks: Vec<String>,
    #[serde(default)]
    pub specs: Vec<String>,
    #[serde(default)]
    pub probes: Vec<String>,
    /// Built when confidence is at least `medium` (spec §4.8).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_file: Option<SkillFile>,
    #[serde(default)]
    pub hints: Vec<String>,
}

/// `discover(url) → {confidence, frameworks?, specs?, probes?, skillFile?, hints}`
#[async_trait]
pub trait DiscoveryAdapter: Send + Sync {
    async fn discover(&self, url: &str) -> Result<DiscoveryResult, ApitapError>;
}

/// `peek(url)`, `read(url, {maxBytes?})` — both must pass the URL through
/// SSRF validation before fetching, which is the caller's job here, not
/// the adapter's (spec §6: "both must pass their URLs through C2 before
/// any fetch").
#[async_trait]
pub trait ContentReaderAdapter: Send + Sync {
    async fn peek(&self, url: &str) -> Result<serde_json::Value, ApitapError>;
    async fn read(&self, url: &str, max_bytes: Option<usize>) -> Result<serde_json::Value, ApitapError>;
}
