//! `apitap serve <domain>` (spec §6): keep a domain's skill file warm in
//! the session cache for `--duration` seconds so repeated MCP-tool-dispatch
//! calls avoid the disk read. The dispatch shell itself is an external,
//! out-of-scope adapter (spec §1); this command only owns the cache
//! lifecycle it would sit on top of.

use apitap_core::error::ApitapError;
use clap::Args;

use crate::cli::context::Context;

#[derive(Debug, Args)]
pub struct ServeCommand {
    pub domain: String,

    #[arg(long, default_value_t = 60)]
    pub duration: u64,
}

impl ServeCommand {
    pub async fn execute(self, ctx: &Context) -> Result<serde_json::Value, ApitapError> {
        let skill = ctx.skills.read(&self.domain, &ctx.key)?;
        let endpoint_count = skill.endpoints.len();
        ctx.browse.cache().insert(skill);

        tracing::info!(domain = %self.domain, duration = self.duration, "serving domain from cache");
        tokio::time::sleep(std::time::Duration::from_secs(self.duration)).await;
        ctx.browse.cache().invalidate(&self.domain);

        Ok(serde_json::json!({
            "domain": self.domain,
            "servedSeconds": self.duration,
            "endpointCount": endpoint_count,
        }))
    }
}
