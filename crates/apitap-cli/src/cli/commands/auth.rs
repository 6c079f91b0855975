//! `apitap auth <domain>|--list|--clear` (spec §4.3, §6): inspect or clear
//! stored credentials without ever printing a secret value.

use apitap_core::error::ApitapError;
use clap::Args;

use crate::cli::context::Context;

#[derive(Debug, Args)]
pub struct AuthCommand {
    pub domain: Option<String>,

    #[arg(long)]
    pub list: bool,

    #[arg(long)]
    pub clear: bool,
}

impl AuthCommand {
    pub async fn execute(self, ctx: &Context) -> Result<serde_json::Value, ApitapError> {
        if self.list {
            return Ok(serde_json::json!({ "domains": ctx.credentials.list_domains() }));
        }

        let domain = self
            .domain
            .ok_or_else(|| ApitapError::validation("auth requires a domain, or --list"))?;

        if self.clear {
            ctx.credentials.clear(&domain)?;
            return Ok(serde_json::json!({ "domain": domain, "cleared": true }));
        }

        let auth = ctx.credentials.retrieve(&domain);
        let has_session = ctx.credentials.retrieve_session(&domain).is_some();
        let has_oauth = ctx.credentials.retrieve_oauth_credentials(&domain).is_some();

        Ok(serde_json::json!({
            "domain": domain,
            "authKind": auth.map(|a| a.kind),
            "hasSession": has_session,
            "hasOAuthCredentials": has_oauth,
        }))
    }
}
