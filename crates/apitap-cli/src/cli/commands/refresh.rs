//! `apitap refresh <domain>` (spec §4.6, §6): manually trigger the refresh
//! orchestrator outside the replay engine's reactive 401/403 path.

use apitap_core::error::ApitapError;
use apitap_refresh::RefreshOutcome;
use clap::Args;

use crate::cli::context::Context;

#[derive(Debug, Args)]
pub struct RefreshCommand {
    pub domain: String,
}

impl RefreshCommand {
    pub async fn execute(self, ctx: &Context) -> Result<serde_json::Value, ApitapError> {
        let skill = ctx.skills.read(&self.domain, &ctx.key)?;
        let outcome = ctx.refresh.refresh(&skill, &ctx.credentials, ctx.browser()).await;

        let (success, detail) = match outcome {
            RefreshOutcome::Refreshed { signals } => (true, signals.join(",")),
            RefreshOutcome::NotApplicable => (true, "not_applicable".to_string()),
            RefreshOutcome::CaptchaBlocked { kind } => (false, format!("captcha_blocked:{kind}")),
            RefreshOutcome::Failed(reason) => (false, reason),
        };

        Ok(serde_json::json!({ "success": success, "detail": detail }))
    }
}
