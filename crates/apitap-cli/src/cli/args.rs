//! Shared CLI argument types (spec §6 global flags), flattened into the
//! commands that need them via `#[command(flatten)]`.

use clap::Args;

pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected `name=value`, got `{s}`"))
}

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Force a refresh before dispatching, bypassing the expiry heuristic.
    #[arg(long)]
    pub fresh: bool,

    /// Truncate the response body to this many bytes.
    #[arg(long)]
    pub max_bytes: Option<usize>,
}
