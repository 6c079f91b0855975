//! Ties the OAuth flow, browser flow, and captcha escalation together
//! behind the per-domain guard (spec §4.6).

use std::sync::Arc;

use apitap_core::error::ApitapError;
use apitap_credentials::{AuthKind, CookieEntry, CredentialStore, OAuthCredentials, StoredAuth, StoredSession};
use apitap_generator::captcha;
use apitap_skillfile::SkillFile;
use reqwest::Client;
use secrecy::SecretString;

use crate::browser::{extract_declared_tokens, BrowserSession};
use crate::guard::RefreshGuard;
use crate::oauth;

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Refreshed { signals: Vec<String> },
    CaptchaBlocked { kind: &'static str },
    NotApplicable,
    Failed(String),
}

pub struct RefreshOrchestrator {
    guard: RefreshGuard,
    http: Client,
}

impl Default for RefreshOrchestrator {
    fn default() -> Self {
        Self {
            guard: RefreshGuard::new(),
            http: Client::new(),
        }
    }
}

impl RefreshOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the full refresh flow for `skill`, writing results into
    /// `credentials`. `browser` is optional: when `None` and the OAuth step
    /// doesn't satisfy the need, the browser step is skipped rather than
    /// failing (matching spec §6's "browser is an out-of-scope adapter").
    pub async fn refresh(
        &self,
        skill: &SkillFile,
        credentials: &CredentialStore,
        browser: Option<Arc<dyn BrowserSession>>,
    ) -> RefreshOutcome {
        let domain = skill.domain.clone();
        self.guard
            .run(&domain, || async { self.refresh_locked(skill, credentials, browser).await })
            .await
    }

    async fn refresh_locked(
        &self,
        skill: &SkillFile,
        credentials: &CredentialStore,
        browser: Option<Arc<dyn BrowserSession>>,
    ) -> RefreshOutcome {
        let mut oauth_satisfied = false;

        if let Some(auth_config) = &skill.auth {
            if let Some(oauth_config) = &auth_config.oauth_config {
                let stored = credentials.retrieve_oauth_credentials(&skill.domain).unwrap_or_default();
                match oauth::refresh(&self.http, oauth_config, stored.refresh_token.as_ref(), stored.client_secret.as_ref())
                    .await
                {
                    Ok(result) => {
                        let rotated = OAuthCredentials {
                            client_secret: stored.client_secret.clone(),
                            refresh_token: result.rotated_refresh_token.or(stored.refresh_token),
                        };
                        if let Err(e) = credentials.store_oauth_credentials(&skill.domain, rotated) {
                            return RefreshOutcome::Failed(e.to_string());
                        }
                        let new_auth = StoredAuth {
                            kind: AuthKind::Bearer,
                            header: "authorization".to_string(),
                            value: SecretString::from(format!("Bearer {}", secrecy::ExposeSecret::expose_secret(&result.access_token))),
                            expires_at: result.expires_at,
                        };
                        if let Err(e) = credentials.store(&skill.domain, new_auth) {
                            return RefreshOutcome::Failed(e.to_string());
                        }
                        oauth_satisfied = true;
                    }
                    Err(ApitapError::Authentication { .. }) => {
                        // No usable refresh_token/client_secret yet — fall through to
                        // the browser step rather than treating it as fatal.
                    }
                    Err(e) => return RefreshOutcome::Failed(e.to_string()),
                }
            }
        }

        if oauth_satisfied {
            return RefreshOutcome::Refreshed { signals: vec!["oauth".to_string()] };
        }

        let needs_browser = skill
            .endpoints
            .iter()
            .any(|e| e.request_body.as_ref().is_some_and(|b| !b.refreshable_tokens.is_empty()))
            || skill.auth.as_ref().is_some_and(|a| a.refresh_url.is_some());

        if !needs_browser {
            return RefreshOutcome::NotApplicable;
        }

        let Some(browser) = browser else {
            return RefreshOutcome::NotApplicable;
        };

        let captcha_risk = skill.auth.as_ref().is_some_and(|a| a.captcha_risk);
        let target = skill
            .auth
            .as_ref()
            .and_then(|a| a.refresh_url.clone())
            .unwrap_or_else(|| skill.base_url.clone());

        if let Err(e) = browser.navigate(&target, !captcha_risk).await {
            return RefreshOutcome::Failed(e.to_string());
        }

        let page_text = browser.page_text().await;
        if let Some(kind) = captcha::detect(&page_text) {
            return RefreshOutcome::CaptchaBlocked { kind };
        }

        let declared_paths: Vec<String> = skill
            .endpoints
            .iter()
            .filter_map(|e| e.request_body.as_ref())
            .flat_map(|b| b.refreshable_tokens.clone())
            .collect();

        let intercepted = browser.intercepted_requests().await;
        let tokens = extract_declared_tokens(&intercepted, &declared_paths);
        if !tokens.is_empty() {
            let stored_tokens = tokens
                .into_iter()
                .map(|(path, value)| (path, apitap_credentials::StoredToken { value, refreshed_at: apitap_core::time::now() }))
                .collect();
            if let Err(e) = credentials.store_tokens(&skill.domain, stored_tokens) {
                return RefreshOutcome::Failed(e.to_string());
            }
        }

        let cookies = browser.cookies().await;
        if !cookies.is_empty() {
            let session = StoredSession {
                cookies: cookies
                    .into_iter()
                    .map(|c| CookieEntry {
                        name: c.name,
                        value: SecretString::from(c.value),
                        domain: c.domain,
                        path: c.path,
                    })
                    .collect(),
                saved_at: apitap_core::time::now(),
                max_age_ms: StoredSession::DEFAULT_MAX_AGE_MS,
            };
            if let Err(e) = credentials.store_session(&skill.domain, session) {
                return RefreshOutcome::Failed(e.to_string());
            }
        }

        RefreshOutcome::Refreshed { signals: vec!["browser".to_string()] }
    }
}
