//! `apitap read <url>` (spec §6 content-reader adapter: `read(url, {maxBytes?})`).

use apitap_core::error::ApitapError;
use apitap_ssrf::SsrfValidator;
use clap::Args;

use crate::cli::context::Context;

#[derive(Debug, Args)]
pub struct ReadCommand {
    pub url: String,

    #[arg(long)]
    pub max_bytes: Option<usize>,
}

impl ReadCommand {
    pub async fn execute(self, ctx: &Context) -> Result<serde_json::Value, ApitapError> {
        let validator = SsrfValidator::new(ctx.config.skip_ssrf_check);
        validator.try_validate(&self.url).map_err(|e| ApitapError::validation(e.to_string()))?;
        Err(ApitapError::capacity(
            "no content-reader adapter is wired into this build (spec §6 adapter contract)",
        ))
    }
}
