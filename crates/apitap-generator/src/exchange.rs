//! Input shape the generator consumes: one already-accepted HTTP exchange.
//!
//! Filtering (spec §4.4 step 1) is the capture adapter's job — by the time an
//! [`Exchange`] reaches this crate it has already passed that scorer, so
//! nothing here re-evaluates whether an exchange is worth keeping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exchange {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub request_headers: BTreeMap<String, String>,
    #[serde(default)]
    pub request_body: Option<Value>,
    pub status: u16,
    #[serde(default)]
    pub response_headers: BTreeMap<String, String>,
    #[serde(default)]
    pub response_body: Option<Value>,
    /// Set by the capture adapter when the enclosing page tripped a
    /// captcha challenge (spec §4.4 step 8, §4.6 step 3).
    #[serde(default)]
    pub captcha_risk: bool,
}

impl Exchange {
    pub fn method_upper(&self) -> String {
        self.method.to_uppercase()
    }
}
