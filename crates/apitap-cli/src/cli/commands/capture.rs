//! `apitap capture <url>` — drive a browser session and distill traffic into
//! a skill file (spec §4.4, §6).
//!
//! The browser adapter is an external collaborator (spec §1: "out of scope
//! ... thin adapter over the core"); this build ships the core only, so
//! capture degrades to a clear capacity error rather than pretending to
//! drive a browser it doesn't have.

use apitap_core::error::ApitapError;
use clap::Args;

use crate::cli::context::Context;

#[derive(Debug, Args)]
pub struct CaptureCommand {
    pub url: String,

    #[arg(long)]
    pub duration: Option<u64>,
}

impl CaptureCommand {
    pub async fn execute(self, ctx: &Context) -> Result<serde_json::Value, ApitapError> {
        if ctx.browser().is_none() {
            return Err(ApitapError::capacity(
                "no browser adapter is wired into this build; capture requires an external BrowserSession \
                 implementation (spec §6 adapter contract)",
            ));
        }
        unreachable!("browser() always returns None in this build")
    }
}
