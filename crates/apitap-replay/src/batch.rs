//! Batch/concurrent replay variant (spec §4.7 step 15): reads each skill
//! file once, shares one credential-store handle, dispatches concurrently,
//! and isolates per-request failures into a uniform result array.

use std::collections::BTreeMap;
use std::sync::Arc;

use apitap_core::error::ApitapError;
use apitap_credentials::CredentialStore;
use apitap_crypto::DerivedKey;
use apitap_refresh::BrowserSession;
use apitap_skillfile::{SkillFile, SkillFileStore};
use futures::future::join_all;

use crate::engine::{ReplayEngine, ReplayOptions, ReplayResult};

#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub domain: String,
    pub endpoint_id: String,
    pub params: BTreeMap<String, String>,
}

pub struct BatchOutcome {
    pub request: BatchRequest,
    pub result: Result<ReplayResult, ApitapError>,
}

pub async fn replay_batch(
    engine: &ReplayEngine,
    store: &SkillFileStore,
    key: &DerivedKey,
    requests: Vec<BatchRequest>,
    credentials: Option<&CredentialStore>,
    browser: Option<Arc<dyn BrowserSession>>,
) -> Vec<BatchOutcome> {
    let mut skills: BTreeMap<String, Result<SkillFile, ApitapError>> = BTreeMap::new();
    for request in &requests {
        skills.entry(request.domain.clone()).or_insert_with(|| store.read(&request.domain, key));
    }

    let futures = requests.into_iter().map(|request| {
        let skill_result = skills.get(&request.domain).expect("just inserted above");
        let browser = browser.clone();
        async move {
            let result = match skill_result {
                Ok(skill) => {
                    let options = ReplayOptions { params: request.params.clone(), fresh: false, max_bytes: None };
                    engine.replay(skill, &request.endpoint_id, options, credentials, browser).await
                }
                Err(e) => Err(ApitapError::not_found(request.domain.clone(), vec![e.to_string()])),
            };
            BatchOutcome { request, result }
        }
    });

    join_all(futures).await
}
