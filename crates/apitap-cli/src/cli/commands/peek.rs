//! `apitap peek <url>` (spec §6 content-reader adapter: `peek(url)`).
//! No content-reader adapter ships in this build; the SSRF check still
//! runs so a blocked target is reported before anyone asks "what adapter".

use apitap_core::error::ApitapError;
use apitap_ssrf::SsrfValidator;
use clap::Args;

use crate::cli::context::Context;

#[derive(Debug, Args)]
pub struct PeekCommand {
    pub url: String,
}

impl PeekCommand {
    pub async fn execute(self, ctx: &Context) -> Result<serde_json::Value, ApitapError> {
        let validator = SsrfValidator::new(ctx.config.skip_ssrf_check);
        validator.try_validate(&self.url).map_err(|e| ApitapError::validation(e.to_string()))?;
        Err(ApitapError::capacity(
            "no content-reader adapter is wired into this build (spec §6 adapter contract)",
        ))
    }
}
