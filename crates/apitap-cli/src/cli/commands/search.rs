//! `apitap search <query>` — substring match over every stored domain's
//! endpoint ids and paths.

use apitap_core::error::ApitapError;
use clap::Args;

use crate::cli::context::Context;

#[derive(Debug, Args)]
pub struct SearchCommand {
    pub query: String,
}

impl SearchCommand {
    pub async fn execute(self, ctx: &Context) -> Result<serde_json::Value, ApitapError> {
        let needle = self.query.to_lowercase();
        let mut hits = Vec::new();

        for domain in ctx.skills.list_domains()? {
            let Ok(skill) = ctx.skills.read(&domain, &ctx.key) else { continue };
            for endpoint in &skill.endpoints {
                if endpoint.id.to_lowercase().contains(&needle) || endpoint.path.to_lowercase().contains(&needle) {
                    hits.push(serde_json::json!({
                        "domain": domain,
                        "endpointId": endpoint.id,
                        "method": endpoint.method,
                        "path": endpoint.path,
                        "tier": endpoint.replayability.tier,
                    }));
                }
            }
        }

        Ok(serde_json::json!({ "query": self.query, "results": hits }))
    }
}
