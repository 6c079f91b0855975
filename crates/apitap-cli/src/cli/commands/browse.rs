//! `apitap browse <url>` (spec §4.8, §6): cache → disk → discovery →
//! replay fallback chain, collapsed into one call.

use apitap_core::error::ApitapError;
use clap::Args;
use url::Url;

use crate::cli::context::Context;

#[derive(Debug, Args)]
pub struct BrowseCommand {
    pub url: String,

    #[arg(long)]
    pub all_domains: bool,
}

impl BrowseCommand {
    pub async fn execute(self, ctx: &Context) -> Result<serde_json::Value, ApitapError> {
        let parsed = Url::parse(&self.url).map_err(|e| ApitapError::validation(format!("invalid URL {}: {e}", self.url)))?;
        let domain = parsed.host_str().ok_or_else(|| ApitapError::validation("URL has no host"))?.to_string();

        let result = ctx
            .browse
            .browse(&domain, &ctx.key, None, Some(&ctx.credentials), ctx.browser())
            .await
            .map_err(|failure| ApitapError::not_found(domain.clone(), vec![failure.suggestion]))?;

        Ok(serde_json::json!({
            "status": result.status,
            "body": result.body,
            "truncated": result.truncated,
            "contractWarnings": result.drift,
        }))
    }
}
