//! `apitap replay <domain> <endpointId> [k=v...]` (spec §4.7, §6).

use std::collections::BTreeMap;

use apitap_core::error::ApitapError;
use apitap_replay::ReplayOptions;
use clap::Args;

use crate::cli::args::{parse_key_value, ReplayArgs};
use crate::cli::context::Context;

#[derive(Debug, Args)]
pub struct ReplayCommand {
    pub domain: String,
    pub endpoint_id: String,

    /// `name=value` pairs substituted into the path, query, or body.
    #[arg(value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    #[command(flatten)]
    pub options: ReplayArgs,
}

impl ReplayCommand {
    pub async fn execute(self, ctx: &Context) -> Result<serde_json::Value, ApitapError> {
        let skill = ctx.skills.read(&self.domain, &ctx.key)?;
        let params: BTreeMap<String, String> = self.params.into_iter().collect();
        let options = ReplayOptions { params, fresh: self.options.fresh, max_bytes: self.options.max_bytes };

        let result = ctx
            .replay
            .replay(&skill, &self.endpoint_id, options, Some(&ctx.credentials), ctx.browser())
            .await?;

        Ok(serde_json::json!({
            "status": result.status,
            "body": result.body,
            "truncated": result.truncated,
            "authError": result.auth_error,
            "contractWarnings": result.drift,
        }))
    }
}
