//! `apitap stats` (spec §6): aggregate counts across every stored domain.

use apitap_core::error::ApitapError;
use apitap_skillfile::ReplayabilityTier;
use clap::Args;

use crate::cli::context::Context;

#[derive(Debug, Args)]
pub struct StatsCommand;

impl StatsCommand {
    pub async fn execute(self, ctx: &Context) -> Result<serde_json::Value, ApitapError> {
        let domains = ctx.skills.list_domains()?;
        let mut endpoint_count = 0usize;
        let mut green = 0usize;
        let mut yellow = 0usize;
        let mut orange = 0usize;
        let mut red = 0usize;

        for domain in &domains {
            let Ok(skill) = ctx.skills.read(domain, &ctx.key) else { continue };
            endpoint_count += skill.endpoints.len();
            for endpoint in &skill.endpoints {
                match endpoint.replayability.tier {
                    ReplayabilityTier::Green => green += 1,
                    ReplayabilityTier::Yellow => yellow += 1,
                    ReplayabilityTier::Orange => orange += 1,
                    ReplayabilityTier::Red | ReplayabilityTier::Unknown => red += 1,
                }
            }
        }

        Ok(serde_json::json!({
            "domainCount": domains.len(),
            "endpointCount": endpoint_count,
            "tiers": { "green": green, "yellow": yellow, "orange": orange, "red": red },
            "cachedDomains": ctx.browse.cache().len(),
        }))
    }
}
