//! CLI command implementations (spec §6 command surface).
//!
//! Each command is a small `#[derive(Args)]` struct with its own
//! `execute(ctx)`.

pub mod auth;
pub mod browse;
pub mod capture;
pub mod discover;
pub mod import;
pub mod inspect;
pub mod list;
pub mod peek;
pub mod read;
pub mod refresh;
pub mod replay;
pub mod search;
pub mod serve;
pub mod show;
pub mod stats;

use apitap_core::error::ApitapError;
use clap::Subcommand;

use crate::cli::context::Context;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Drive a browser session and distill its traffic into a skill file
    Capture(capture::CaptureCommand),
    /// Run framework/OpenAPI discovery probes against a URL
    Discover(discover::DiscoverCommand),
    /// List every domain with a stored skill file
    List(list::ListCommand),
    /// Print the full skill file for a domain
    Show(show::ShowCommand),
    /// Search endpoint ids and paths across every stored domain
    Search(search::SearchCommand),
    /// Replay a captured endpoint
    Replay(replay::ReplayCommand),
    /// Import a skill file from disk
    Import(import::ImportCommand),
    /// Manually trigger the refresh orchestrator for a domain
    Refresh(refresh::RefreshCommand),
    /// Inspect, clear, or list stored credentials
    Auth(auth::AuthCommand),
    /// Keep a domain's skill file warm in the session cache
    Serve(serve::ServeCommand),
    /// Cache → disk → discovery → replay fallback chain for a URL
    Browse(browse::BrowseCommand),
    /// Peek at a URL via the content-reader adapter
    Peek(peek::PeekCommand),
    /// Read a URL via the content-reader adapter
    Read(read::ReadCommand),
    /// SSRF-safe, adapter-free diagnostic for a URL
    Inspect(inspect::InspectCommand),
    /// Aggregate counts across every stored domain
    Stats(stats::StatsCommand),
}

impl Command {
    pub async fn execute(self, ctx: &Context) -> Result<serde_json::Value, ApitapError> {
        match self {
            Command::Capture(cmd) => cmd.execute(ctx).await,
            Command::Discover(cmd) => cmd.execute(ctx).await,
            Command::List(cmd) => cmd.execute(ctx).await,
            Command::Show(cmd) => cmd.execute(ctx).await,
            Command::Search(cmd) => cmd.execute(ctx).await,
            Command::Replay(cmd) => cmd.execute(ctx).await,
            Command::Import(cmd) => cmd.execute(ctx).await,
            Command::Refresh(cmd) => cmd.execute(ctx).await,
            Command::Auth(cmd) => cmd.execute(ctx).await,
            Command::Serve(cmd) => cmd.execute(ctx).await,
            Command::Browse(cmd) => cmd.execute(ctx).await,
            Command::Peek(cmd) => cmd.execute(ctx).await,
            Command::Read(cmd) => cmd.execute(ctx).await,
            Command::Inspect(cmd) => cmd.execute(ctx).await,
            Command::Stats(cmd) => cmd.execute(ctx).await,
        }
    }
}
