//! Skill generation orchestration (spec §4.4): turns a batch of accepted
//! exchanges into one [`SkillFile`] per hostname.

use std::collections::BTreeMap;

use apitap_core::error::ApitapError;
use apitap_skillfile::{
    DomainAuthConfig, EndpointExamples, ExampleRequest, ExampleResponse, HeaderValue, OAuthConfig, OAuthGrantType,
    QueryParamSpec, RequestBodySpec, ResponseShape, SkillEndpoint, SkillFile, SkillMetadata,
};

use crate::auth::{self, AuthCandidateKind};
use crate::body_template;
use crate::body_vars;
use crate::exchange::Exchange;
use crate::pagination;
use crate::parameterize::parameterize_path;
use crate::replayability;
use crate::schema_snapshot;

const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

struct EndpointAccumulator {
    method: String,
    path: String,
    query_params: BTreeMap<String, QueryParamSpec>,
    headers: BTreeMap<String, HeaderValue>,
    auth_header: Option<(String, bool)>,
    request_samples: Vec<serde_json::Value>,
    content_type: Option<String>,
    first_response: Option<serde_json::Value>,
    first_request_url: String,
    captcha_risk: bool,
}

/// Groups exchanges by hostname and produces one [`SkillFile`] per host.
pub fn generate(exchanges: &[Exchange]) -> Result<Vec<SkillFile>, ApitapError> {
    let mut by_host: BTreeMap<String, Vec<&Exchange>> = BTreeMap::new();
    for exchange in exchanges {
        let parsed = url::Url::parse(&exchange.url)
            .map_err(|e| ApitapError::validation(format!("invalid exchange URL {}: {e}", exchange.url)))?;
        let host = parsed.host_str().ok_or_else(|| ApitapError::validation("URL has no host"))?;
        by_host.entry(host.to_string()).or_default().push(exchange);
    }

    by_host.into_iter().map(|(domain, group)| generate_for_domain(&domain, &group)).collect()
}

fn generate_for_domain(domain: &str, exchanges: &[&Exchange]) -> Result<SkillFile, ApitapError> {
    let base_url = {
        let first = url::Url::parse(&exchanges[0].url).map_err(|e| ApitapError::validation(e.to_string()))?;
        format!("{}://{}", first.scheme(), first.authority())
    };

    let mut accumulators: BTreeMap<(String, String), EndpointAccumulator> = BTreeMap::new();
    let mut oauth_config: Option<OAuthConfig> = None;
    let mut filtered_count = 0u32;

    for exchange in exchanges {
        let parsed = match url::Url::parse(&exchange.url) {
            Ok(u) => u,
            Err(_) => {
                filtered_count += 1;
                continue;
            }
        };
        let (param_path, _captured) = parameterize_path(parsed.path());
        let key = (exchange.method_upper(), param_path.clone());

        if let Some(signal) = auth::detect_oauth(&exchange.url, exchange.request_body.as_ref(), exchange.response_body.as_ref()) {
            oauth_config.get_or_insert(OAuthConfig {
                token_endpoint: signal.token_endpoint,
                client_id: signal.client_id.unwrap_or_default(),
                grant_type: OAuthGrantType::RefreshToken,
                scope: None,
            });
        }

        let entry = accumulators.entry(key).or_insert_with(|| EndpointAccumulator {
            method: exchange.method_upper(),
            path: param_path.clone(),
            query_params: BTreeMap::new(),
            headers: BTreeMap::new(),
            auth_header: None,
            request_samples: Vec::new(),
            content_type: exchange.request_headers.get("content-type").or_else(|| exchange.request_headers.get("Content-Type")).cloned(),
            first_response: exchange.response_body.clone(),
            first_request_url: exchange.url.clone(),
            captcha_risk: false,
        });

        entry.captcha_risk |= exchange.captcha_risk;

        for (name, value) in parsed.query_pairs() {
            entry.query_params.entry(name.to_string()).or_insert(QueryParamSpec {
                param_type: "string".to_string(),
                example: value.to_string(),
            });
        }

        for candidate in auth::extract_canonical(&exchange.request_headers) {
            if matches!(candidate.kind, AuthCandidateKind::Bearer | AuthCandidateKind::ApiKey) {
                entry.headers.insert(candidate.header.clone(), HeaderValue::Stored);
                entry.auth_header.get_or_insert((candidate.header, false));
            }
        }
        for candidate in auth::extract_high_entropy(&exchange.request_headers) {
            entry.headers.insert(candidate.header.clone(), HeaderValue::Stored);
        }

        if let Some(body) = &exchange.request_body {
            entry.request_samples.push(body.clone());
        }
    }

    let mut endpoints: Vec<SkillEndpoint> = accumulators
        .into_values()
        .map(|acc| build_endpoint(acc))
        .collect::<Result<Vec<_>, _>>()?;
    endpoints.sort_by(|a, b| a.id.cmp(&b.id));

    let metadata = SkillMetadata {
        capture_count: exchanges.len() as u32,
        filtered_count,
        tool_version: TOOL_VERSION.to_string(),
        dom_bytes: None,
    };

    let auth = oauth_config.map(|config| DomainAuthConfig {
        captcha_risk: exchanges.iter().any(|e| e.captcha_risk),
        browser_mode: None,
        refresh_url: None,
        oauth_config: Some(config),
    });

    Ok(SkillFile {
        version: apitap_skillfile::SKILL_FILE_VERSION.to_string(),
        domain: domain.to_string(),
        base_url,
        captured_at: apitap_core::time::now_iso8601(),
        endpoints,
        metadata,
        provenance: apitap_skillfile::Provenance::SelfProduced,
        signature: None,
        auth,
    })
}

fn build_endpoint(acc: EndpointAccumulator) -> Result<SkillEndpoint, ApitapError> {
    let id = format!("{}:{}", acc.method.to_lowercase(), acc.path);

    let variables = body_vars::detect_variables(&acc.request_samples);
    let request_body = acc.request_samples.first().map(|sample| {
        let template = body_template::build(sample, &variables);
        RequestBodySpec {
            content_type: acc.content_type.clone().unwrap_or_else(|| "application/json".to_string()),
            template,
            variables: variables.iter().cloned().collect(),
            refreshable_tokens: Vec::new(),
        }
    });

    let response_schema = acc.first_response.as_ref().map(schema_snapshot::snapshot);
    let response_shape = ResponseShape {
        shape_type: acc
            .first_response
            .as_ref()
            .map(|v| match v {
                serde_json::Value::Array(_) => "array",
                serde_json::Value::Object(_) => "object",
                _ => "scalar",
            })
            .unwrap_or("unknown")
            .to_string(),
        fields: acc
            .first_response
            .as_ref()
            .and_then(|v| v.as_object())
            .map(|obj| obj.keys().cloned().collect()),
    };

    let query_param_strings: BTreeMap<String, String> =
        acc.query_params.iter().map(|(k, v)| (k.clone(), v.example.clone())).collect();
    let pagination = pagination::detect(&query_param_strings, acc.first_response.as_ref());

    let replayability = replayability::classify(&acc.headers, acc.captcha_risk);

    Ok(SkillEndpoint {
        id,
        method: acc.method,
        path: acc.path,
        query_params: acc.query_params,
        headers: acc.headers,
        response_shape,
        response_schema,
        examples: EndpointExamples {
            request: ExampleRequest { url: acc.first_request_url },
            response: acc.first_response.map(|preview| ExampleResponse { preview }),
        },
        request_body,
        replayability,
        pagination,
        isolated_auth: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::Exchange;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn exchange(method: &str, url: &str, auth: Option<&str>) -> Exchange {
        let mut headers = BTreeMap::new();
        if let Some(value) = auth {
            headers.insert("authorization".to_string(), value.to_string());
        }
        Exchange {
            method: method.to_string(),
            url: url.to_string(),
            request_headers: headers,
            request_body: None,
            status: 200,
            response_headers: BTreeMap::new(),
            response_body: Some(json!({"id": 1, "name": "alice"})),
            captcha_risk: false,
        }
    }

    #[test]
    fn groups_exchanges_by_host_and_parameterizes_path() {
        let exchanges = vec![
            exchange("GET", "https://api.example.com/users/1", Some("Bearer tok")),
            exchange("GET", "https://api.example.com/users/2", Some("Bearer tok")),
        ];
        let skills = generate(&exchanges).unwrap();
        assert_eq!(skills.len(), 1);
        let skill = &skills[0];
        assert_eq!(skill.domain, "api.example.com");
        assert_eq!(skill.endpoints.len(), 1);
        assert_eq!(skill.endpoints[0].path, "/users/:id");
    }

    #[test]
    fn auth_header_is_rewritten_to_stored_sentinel() {
        let exchanges = vec![exchange("GET", "https://api.example.com/users/1", Some("Bearer tok"))];
        let skills = generate(&exchanges).unwrap();
        let endpoint = &skills[0].endpoints[0];
        assert_eq!(endpoint.headers.get("authorization"), Some(&HeaderValue::Stored));
        assert_eq!(endpoint.replayability.tier, apitap_skillfile::ReplayabilityTier::Yellow);
    }

    #[test]
    fn different_hosts_produce_different_skill_files() {
        let exchanges = vec![
            exchange("GET", "https://a.example.com/users/1", None),
            exchange("GET", "https://b.example.com/users/1", None),
        ];
        let skills = generate(&exchanges).unwrap();
        assert_eq!(skills.len(), 2);
    }
}
