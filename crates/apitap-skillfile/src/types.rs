//! The skill file data model (spec §3).
//!
//! `SkillFile` is the unit of persistence: one JSON document per captured
//! domain. Every tagged-union field here (auth kind, header value kind,
//! replayability tier, body-template node) is a closed set represented as a
//! Rust enum rather than a class hierarchy, per spec §9's design note.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-domain JSON catalog of replayable endpoints plus auth config and
/// provenance — the unit of persistence (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillFile {
    pub version: String,
    pub domain: String,
    #[serde(rename = "baseUrl")]
    pub base_url: String,
    #[serde(rename = "capturedAt")]
    pub captured_at: String,
    /// Invariant: sorted by `id`, and every `id` is unique (spec §3, §6).
    pub endpoints: Vec<SkillEndpoint>,
    pub metadata: SkillMetadata,
    pub provenance: Provenance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<DomainAuthConfig>,
}

pub const SKILL_FILE_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkillMetadata {
    #[serde(rename = "captureCount")]
    pub capture_count: u32,
    #[serde(rename = "filteredCount")]
    pub filtered_count: u32,
    #[serde(rename = "toolVersion")]
    pub tool_version: String,
    #[serde(rename = "domBytes", default, skip_serializing_if = "Option::is_none")]
    pub dom_bytes: Option<u64>,
}

/// Whether a skill file was produced locally and signed (`self`), imported
/// and re-signed (`imported`), or carries no valid signature (`unsigned`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    #[serde(rename = "self")]
    SelfProduced,
    Imported,
    Unsigned,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainAuthConfig {
    #[serde(rename = "captchaRisk", default)]
    pub captcha_risk: bool,
    #[serde(rename = "browserMode", default, skip_serializing_if = "Option::is_none")]
    pub browser_mode: Option<String>,
    #[serde(rename = "refreshUrl", default, skip_serializing_if = "Option::is_none")]
    pub refresh_url: Option<String>,
    #[serde(rename = "oauthConfig", default, skip_serializing_if = "Option::is_none")]
    pub oauth_config: Option<OAuthConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OAuthConfig {
    #[serde(rename = "tokenEndpoint")]
    pub token_endpoint: String,
    #[serde(rename = "clientId")]
    pub client_id: String,
    #[serde(rename = "grantType")]
    pub grant_type: OAuthGrantType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OAuthGrantType {
    RefreshToken,
    ClientCredentials,
}

/// One captured-and-parameterized endpoint (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillEndpoint {
    /// Slug of `method + path`, unique within the file.
    pub id: String,
    pub method: String,
    /// May contain `:name` placeholders.
    pub path: String,
    #[serde(rename = "queryParams", default)]
    pub query_params: BTreeMap<String, QueryParamSpec>,
    /// Value is either a concrete string or the sentinel `[stored]`.
    #[serde(default)]
    pub headers: BTreeMap<String, HeaderValue>,
    #[serde(rename = "responseShape")]
    pub response_shape: ResponseShape,
    #[serde(rename = "responseSchema", default, skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<SchemaNode>,
    pub examples: EndpointExamples,
    #[serde(rename = "requestBody", default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBodySpec>,
    pub replayability: Replayability,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationSpec>,
    /// When set, disables parent-domain credential fallback for this
    /// endpoint (spec §3, §4.7.4).
    #[serde(rename = "isolatedAuth", default, skip_serializing_if = "std::ops::Not::not")]
    pub isolated_auth: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryParamSpec {
    #[serde(rename = "type")]
    pub param_type: String,
    pub example: String,
}

/// The sentinel `[stored]` marks "fill from the credential store at replay
/// time"; any other value is sent as-is. Header safety (spec §8) requires
/// the literal string `[stored]` is never sent on the wire — only this
/// enum's `Stored` variant ever maps to it, and replay always resolves or
/// drops it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Concrete(String),
    Stored,
}

const STORED_SENTINEL: &str = "[stored]";

impl Serialize for HeaderValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            HeaderValue::Concrete(s) => serializer.serialize_str(s),
            HeaderValue::Stored => serializer.serialize_str(STORED_SENTINEL),
        }
    }
}

impl<'de> Deserialize<'de> for HeaderValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(if s == STORED_SENTINEL {
            HeaderValue::Stored
        } else {
            HeaderValue::Concrete(s)
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseShape {
    #[serde(rename = "type")]
    pub shape_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

/// Recursive response-schema snapshot (spec §4.4.7). Depth is capped to 5
/// at generation time by the generator; the type itself is unbounded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaNode {
    #[serde(rename = "type")]
    pub node_type: SchemaType,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, SchemaNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointExamples {
    pub request: ExampleRequest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ExampleResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExampleRequest {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExampleResponse {
    pub preview: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequestBodySpec {
    #[serde(rename = "contentType")]
    pub content_type: String,
    pub template: BodyTemplate,
    /// Dotted paths of substitutable fields.
    #[serde(default)]
    pub variables: Vec<String>,
    /// Dotted paths of tokens to refresh before replay.
    #[serde(rename = "refreshableTokens", default)]
    pub refreshable_tokens: Vec<String>,
}

/// Tagged-variant tree mixing literals and placeholders (spec §9): built
/// once at skill load, substituted at replay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum BodyTemplate {
    Object(BTreeMap<String, BodyTemplate>),
    Array(Vec<BodyTemplate>),
    /// `Var(path)` placeholders are encoded as the string `"{{path}}"` so
    /// the template survives plain JSON round-trips without a custom tag.
    Scalar(serde_json::Value),
}

impl BodyTemplate {
    /// A literal body template (string form) for content types that are
    /// templated as opaque text (e.g. `multipart/form-data`, `text/*`).
    pub fn literal_string(template: impl Into<String>) -> Self {
        BodyTemplate::Scalar(serde_json::Value::String(template.into()))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ReplayabilityTier {
    Green,
    Yellow,
    Orange,
    Red,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Replayability {
    pub tier: ReplayabilityTier,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub signals: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaginationStyle {
    Offset,
    Cursor,
    Page,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaginationSpec {
    pub style: PaginationStyle,
    #[serde(rename = "paramName")]
    pub param_name: String,
    #[serde(rename = "responseField", default, skip_serializing_if = "Option::is_none")]
    pub response_field: Option<String>,
}
