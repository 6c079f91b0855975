//! `apitap show <domain>` — the full skill file for a domain.

use apitap_core::error::ApitapError;
use clap::Args;

use crate::cli::context::Context;

#[derive(Debug, Args)]
pub struct ShowCommand {
    pub domain: String,
}

impl ShowCommand {
    pub async fn execute(self, ctx: &Context) -> Result<serde_json::Value, ApitapError> {
        let skill = ctx.skills.read(&self.domain, &ctx.key)?;
        serde_json::to_value(&skill).map_err(ApitapError::from)
    }
}
