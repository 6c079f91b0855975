//! `apitap import <file>` (spec §4.4 store half, §6): accept a foreign skill
//! file, fail closed on tampered content, re-sign as `imported`.

use apitap_core::error::ApitapError;
use clap::Args;

use crate::cli::context::Context;

#[derive(Debug, Args)]
pub struct ImportCommand {
    pub file: std::path::PathBuf,
}

impl ImportCommand {
    pub async fn execute(self, ctx: &Context) -> Result<serde_json::Value, ApitapError> {
        let bytes = std::fs::read(&self.file)?;
        let skill = ctx.skills.import_bytes(&bytes, &ctx.key)?;
        Ok(serde_json::json!({
            "domain": skill.domain,
            "provenance": skill.provenance,
            "endpointCount": skill.endpoints.len(),
        }))
    }
}
