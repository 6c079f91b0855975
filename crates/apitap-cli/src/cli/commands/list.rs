//! `apitap list` — every domain with a skill file on disk.

use apitap_core::error::ApitapError;
use clap::Args;

use crate::cli::context::Context;

#[derive(Debug, Args)]
pub struct ListCommand;

impl ListCommand {
    pub async fn execute(self, ctx: &Context) -> Result<serde_json::Value, ApitapError> {
        let domains = ctx.skills.list_domains()?;
        Ok(serde_json::json!({ "domains": domains }))
    }
}
