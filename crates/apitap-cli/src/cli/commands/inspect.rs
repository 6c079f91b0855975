//! `apitap inspect <url>` (spec §6): a safe, adapter-free diagnostic —
//! reports SSRF safety for the target plus whatever is already known about
//! its domain from capture, without requiring capture/discovery adapters.

use apitap_core::error::ApitapError;
use apitap_ssrf::SsrfValidator;
use clap::Args;
use url::Url;

use crate::cli::context::Context;

#[derive(Debug, Args)]
pub struct InspectCommand {
    pub url: String,
}

impl InspectCommand {
    pub async fn execute(self, ctx: &Context) -> Result<serde_json::Value, ApitapError> {
        let parsed = Url::parse(&self.url).map_err(|e| ApitapError::validation(format!("invalid URL {}: {e}", self.url)))?;
        let domain = parsed.host_str().ok_or_else(|| ApitapError::validation("URL has no host"))?.to_string();

        let validator = SsrfValidator::new(ctx.config.skip_ssrf_check);
        let ssrf = validator.validate(&self.url);

        let skill = ctx.skills.read(&domain, &ctx.key).ok();

        Ok(serde_json::json!({
            "url": self.url,
            "domain": domain,
            "ssrfSafe": ssrf.safe,
            "ssrfReason": ssrf.reason,
            "captured": skill.is_some(),
            "endpointCount": skill.as_ref().map(|s| s.endpoints.len()),
        }))
    }
}
