//! Replay engine (spec §4.7, component C8): resolves a captured endpoint
//! into a live request, dispatches it with SSRF re-validation at every hop,
//! and reconciles the response against what was captured.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use apitap_core::error::ApitapError;
use apitap_credentials::CredentialStore;
use apitap_refresh::{BrowserSession, RefreshOrchestrator};
use apitap_skillfile::SkillFile;
use apitap_ssrf::SsrfValidator;
use reqwest::{redirect::Policy, Client, Method};
use secrecy::ExposeSecret;
use serde_json::Value;

use crate::decode::{self, DecodedBody};
use crate::diff::{self, DriftEntry};
use crate::resolve;
use crate::truncate;

const DISPATCH_TIMEOUT: Duration = Duration::from_secs(30);
const PROACTIVE_REFRESH_HORIZON: chrono::Duration = chrono::Duration::seconds(30);

#[derive(Debug, Clone, Default)]
pub struct ReplayOptions {
    pub params: BTreeMap<String, String>,
    pub fresh: bool,
    pub max_bytes: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub status: u16,
    pub body: Value,
    pub truncated: bool,
    pub drift: Vec<DriftEntry>,
    pub auth_error: bool,
}

pub struct ReplayEngine {
    http: Client,
    ssrf: SsrfValidator,
    refresh: RefreshOrchestrator,
}

impl ReplayEngine {
    pub fn new(skip_ssrf_check: bool) -> Self {
        let http = Client::builder()
            .timeout(DISPATCH_TIMEOUT)
            .redirect(Policy::none())
            .build()
            .expect("reqwest client with a static config always builds");
        Self {
            http,
            ssrf: SsrfValidator::new(skip_ssrf_check),
            refresh: RefreshOrchestrator::new(),
        }
    }

    pub async fn replay(
        &self,
        skill: &SkillFile,
        endpoint_id: &str,
        options: ReplayOptions,
        credentials: Option<&CredentialStore>,
        browser: Option<Arc<dyn BrowserSession>>,
    ) -> Result<ReplayResult, ApitapError> {
        let endpoint = skill
            .endpoints
            .iter()
            .find(|e| e.id == endpoint_id)
            .ok_or_else(|| {
                ApitapError::not_found(
                    format!("endpoint {endpoint_id} in {}", skill.domain),
                    skill.endpoints.iter().map(|e| e.id.clone()).collect(),
                )
            })?;

        let path = resolve::resolve_path(endpoint, &options.params)?;
        let path_params = resolve::path_placeholder_names(endpoint);
        let query = resolve::resolve_query(endpoint, &options.params, &path_params);
        let mut headers = resolve::resolve_headers(endpoint, &skill.domain, credentials);
        let body = resolve::resolve_body(endpoint, &skill.domain, &options.params, credentials);

        self.preflight_refresh(skill, &options, credentials, browser.clone()).await;
        if options.fresh || credentials.is_some() {
            // Auth may have rotated during preflight; re-resolve headers.
            headers = resolve::resolve_headers(endpoint, &skill.domain, credentials);
        }

        let url = format!("{}{path}", skill.base_url);
        self.ssrf.try_validate(&url)?;

        let method: Method = endpoint.method.parse().map_err(|_| ApitapError::validation(format!("bad method {}", endpoint.method)))?;
        let mut response = self.dispatch(method.clone(), &url, &query, &headers, body.as_ref()).await?;

        if let Some(redirect_url) = redirect_target(&response) {
            self.ssrf.try_validate(&redirect_url)?;
            response = self.dispatch(Method::GET, &redirect_url, &[], &headers, None).await?;
        }

        let mut refreshed = false;
        if matches!(response.status().as_u16(), 401 | 403) && !refreshed && credentials.is_some() {
            refreshed = true;
            let outcome = self.refresh.refresh(skill, credentials.unwrap(), browser).await;
            if matches!(outcome, apitap_refresh::RefreshOutcome::Refreshed { .. }) {
                let refreshed_headers = resolve::resolve_headers(endpoint, &skill.domain, credentials);
                response = self.dispatch(method, &url, &query, &refreshed_headers, body.as_ref()).await?;
                if let Some(redirect_url) = redirect_target(&response) {
                    self.ssrf.try_validate(&redirect_url)?;
                    response = self.dispatch(Method::GET, &redirect_url, &[], &refreshed_headers, None).await?;
                }
            }
        }

        let status = response.status().as_u16();
        let content_type = response.headers().get(reqwest::header::CONTENT_TYPE).and_then(|v| v.to_str().ok()).map(str::to_string);
        let bytes = response.bytes().await.map_err(|e| ApitapError::transient(e.to_string()))?;
        let decoded = decode::decode(content_type.as_deref(), &bytes);

        let auth_error = matches!(status, 401 | 403);
        let mut value = match &decoded {
            DecodedBody::Json(v) => v.clone(),
            DecodedBody::Text(t) => Value::String(t.clone()),
            DecodedBody::Empty => Value::Null,
        };
        if auth_error {
            value = decode::auth_error_envelope(
                &skill.domain,
                &decoded,
                &format!("run `apitap auth {}` to refresh credentials", skill.domain),
            );
        }

        let drift = match (&endpoint.response_schema, &value) {
            (Some(schema), Value::Object(_)) if !auth_error => diff::diff(schema, &value),
            _ => Vec::new(),
        };

        let truncation = match options.max_bytes {
            Some(max_bytes) => truncate::truncate_to_budget(value, max_bytes),
            None => truncate::TruncationResult { value, truncated: false },
        };

        Ok(ReplayResult {
            status,
            body: truncation.value,
            truncated: truncation.truncated,
            drift,
            auth_error,
        })
    }

    async fn preflight_refresh(
        &self,
        skill: &SkillFile,
        options: &ReplayOptions,
        credentials: Option<&CredentialStore>,
        browser: Option<Arc<dyn BrowserSession>>,
    ) {
        let Some(store) = credentials else { return };

        if options.fresh {
            self.refresh.refresh(skill, store, browser).await;
            return;
        }

        let Some(auth) = store.retrieve_with_fallback(&skill.domain) else { return };
        let needs_refresh = match auth.expires_at {
            Some(deadline) => apitap_core::time::within_horizon(deadline, PROACTIVE_REFRESH_HORIZON),
            None => {
                let bearer = auth.value.expose_secret();
                apitap_generator::auth::parse_jwt_exp(bearer)
                    .is_some_and(|exp| apitap_core::time::within_horizon(exp, PROACTIVE_REFRESH_HORIZON))
            }
        };
        if needs_refresh {
            self.refresh.refresh(skill, store, browser).await;
        }
    }

    async fn dispatch(
        &self,
        method: Method,
        url: &str,
        query: &[(String, String)],
        headers: &BTreeMap<String, String>,
        body: Option<&Value>,
    ) -> Result<reqwest::Response, ApitapError> {
        let mut request = self.http.request(method, url).query(query);
        for (name, value) in headers {
            request = request.header(name, value);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await.map_err(|e| ApitapError::transient(format!("request to {url} failed: {e}")))
    }
}

fn redirect_target(response: &reqwest::Response) -> Option<String> {
    let status = response.status().as_u16();
    if !(300..400).contains(&status) {
        return None;
    }
    let location = response.headers().get(reqwest::header::LOCATION)?.to_str().ok()?;
    let resolved = url::Url::parse(response.url().as_str()).ok()?.join(location).ok()?;
    Some(resolved.to_string())
}
