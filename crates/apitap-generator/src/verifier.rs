//! Endpoint verifier (spec §4.5, component C6): one optional live call per
//! endpoint during finalize, comparing the response against the captured
//! sample and adjusting the replayability tier accordingly.

use apitap_skillfile::{ReplayabilityTier, SkillEndpoint};
use reqwest::Client;

use crate::schema_snapshot;

#[derive(Debug, Clone, PartialEq)]
pub struct VerificationOutcome {
    pub tier: ReplayabilityTier,
    pub verified: bool,
    pub signals: Vec<String>,
}

/// Issues one live request for `endpoint` against `base_url` and compares
/// status/shape against the captured sample. `verify_posts` must be set to
/// allow a POST verification call, since it may have side effects; without
/// it, POST endpoints fall back untouched to their heuristic classification.
pub async fn verify(client: &Client, base_url: &str, endpoint: &SkillEndpoint, verify_posts: bool) -> VerificationOutcome {
    if endpoint.method != "GET" && (!verify_posts || endpoint.request_body.is_none()) {
        return VerificationOutcome {
            tier: endpoint.replayability.tier,
            verified: false,
            signals: vec!["unverified".to_string()],
        };
    }

    let url = format!("{base_url}{}", example_path(endpoint));
    let mut request = client.request(
        endpoint.method.parse().unwrap_or(reqwest::Method::GET),
        &url,
    );
    if endpoint.method == "POST" {
        if let Some(body) = &endpoint.request_body {
            request = request.json(&body.template_as_json());
        }
    }

    match request.send().await {
        Ok(response) => {
            let status = response.status();
            let mut signals = Vec::new();

            if status.as_u16() == 401 || status.as_u16() == 403 {
                return VerificationOutcome {
                    tier: ReplayabilityTier::Yellow,
                    verified: true,
                    signals: vec!["auth-required".to_string()],
                };
            }
            if status.is_server_error() {
                return VerificationOutcome {
                    tier: ReplayabilityTier::Orange,
                    verified: true,
                    signals: vec!["server-error".to_string()],
                };
            }

            let captured_class = endpoint
                .examples
                .response
                .as_ref()
                .map(|_| 200 / 100)
                .unwrap_or(2);
            if status.as_u16() / 100 == captured_class {
                signals.push("status-class-match".to_string());
            }

            let body = response.json::<serde_json::Value>().await.ok();
            match (&body, &endpoint.response_schema) {
                (Some(value), Some(expected)) => {
                    let actual = schema_snapshot::snapshot(value);
                    if actual.node_type == expected.node_type {
                        signals.push("shape-match".to_string());
                    }
                }
                (None, _) => signals.push("empty-body".to_string()),
                _ => {}
            }

            let demoted = signals.is_empty();
            VerificationOutcome {
                tier: if demoted { ReplayabilityTier::Orange } else { endpoint.replayability.tier },
                verified: true,
                signals,
            }
        }
        Err(_) => VerificationOutcome {
            tier: ReplayabilityTier::Orange,
            verified: true,
            signals: vec!["network-error".to_string()],
        },
    }
}

fn example_path(endpoint: &SkillEndpoint) -> String {
    url::Url::parse(&endpoint.examples.request.url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| endpoint.path.clone())
}

trait AsJsonTemplate {
    fn template_as_json(&self) -> serde_json::Value;
}

impl AsJsonTemplate for apitap_skillfile::RequestBodySpec {
    fn template_as_json(&self) -> serde_json::Value {
        body_template_to_json(&self.template)
    }
}

fn body_template_to_json(template: &apitap_skillfile::BodyTemplate) -> serde_json::Value {
    match template {
        apitap_skillfile::BodyTemplate::Object(map) => {
            serde_json::Value::Object(map.iter().map(|(k, v)| (k.clone(), body_template_to_json(v))).collect())
        }
        apitap_skillfile::BodyTemplate::Array(items) => {
            serde_json::Value::Array(items.iter().map(body_template_to_json).collect())
        }
        apitap_skillfile::BodyTemplate::Scalar(value) => value.clone(),
    }
}
