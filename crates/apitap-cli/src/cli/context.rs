//! Shared process context: everything a command needs, resolved once.

use std::sync::Arc;

use apitap_cache::BrowseOrchestrator;
use apitap_core::ApitapConfig;
use apitap_credentials::CredentialStore;
use apitap_crypto::DerivedKey;
use apitap_refresh::{BrowserSession, RefreshOrchestrator};
use apitap_replay::ReplayEngine;
use apitap_skillfile::SkillFileStore;

pub struct Context {
    pub config: ApitapConfig,
    pub key: DerivedKey,
    pub skills: SkillFileStore,
    pub credentials: CredentialStore,
    pub replay: ReplayEngine,
    pub refresh: RefreshOrchestrator,
    pub browse: BrowseOrchestrator,
}

impl Context {
    pub fn load() -> Self {
        let config = ApitapConfig::from_env();
        let machine_id = apitap_crypto::machine_id(&config);
        let key = apitap_crypto::derive_key(&machine_id);
        let skills = SkillFileStore::new(&config.skills_dir);
        let credentials = CredentialStore::open(config.credential_store_path(), key.clone());
        let replay = ReplayEngine::new(config.skip_ssrf_check);
        let refresh = RefreshOrchestrator::new();
        let browse = BrowseOrchestrator::new(SkillFileStore::new(&config.skills_dir), config.skip_ssrf_check);

        Self {
            config,
            key,
            skills,
            credentials,
            replay,
            refresh,
            browse,
        }
    }

    /// No browser adapter ships in this build (spec §6: out-of-scope
    /// external collaborator); commands that need one degrade gracefully
    /// rather than failing to construct.
    pub fn browser(&self) -> Option<Arc<dyn BrowserSession>> {
        None
    }
}
