//! `apitap discover <url>` — framework/OpenAPI discovery probes (spec §6
//! discovery adapter). No probe implementation ships in this build; the
//! command exists so the surface matches spec §6 and so a discovery
//! adapter can be wired in without changing the CLI shape.

use apitap_core::error::ApitapError;
use clap::Args;

use crate::cli::context::Context;

#[derive(Debug, Args)]
pub struct DiscoverCommand {
    pub url: String,
}

impl DiscoverCommand {
    pub async fn execute(self, _ctx: &Context) -> Result<serde_json::Value, ApitapError> {
        Err(ApitapError::capacity(
            "no discovery adapter is wired into this build (spec §6 adapter contract)",
        ))
    }
}
