//! CLI interface for apitap (spec §6).
//!
//! ```text
//! cli/
//! ├── args.rs       # shared argument types
//! ├── commands/     # command implementations
//! ├── context.rs    # resolved config, stores, engines shared by commands
//! ├── output/       # output formatters
//! └── error.rs      # error-to-exit-code mapping
//! ```

pub mod args;
pub mod commands;
pub mod context;
pub mod error;
pub mod output;

use std::io::IsTerminal;

use clap::Parser;
use tracing::Level;

use context::Context;
use output::OutputFormat;

/// apitap - capture, store, and replay an API surface without a browser
#[derive(Parser, Debug)]
#[command(name = "apitap", version, about = "Capture, store, and replay web API traffic without a browser")]
pub struct Cli {
    #[command(subcommand)]
    pub command: commands::Command,

    /// Enable verbose logging (-v, -vv, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[arg(short = 'f', long = "format", value_enum, default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Always emit the JSON envelope, regardless of `--format`
    #[arg(long, global = true)]
    pub json: bool,

    #[arg(long, global = true)]
    pub no_color: bool,
}

impl Cli {
    /// Runs the selected command and returns the process exit code.
    pub async fn execute(self) -> i32 {
        self.init_tracing();
        if self.no_color || !std::io::stdout().is_terminal() {
            colored::control::set_override(false);
        }

        let json = self.json || self.format.is_json();
        let ctx = Context::load();

        match self.command.execute(&ctx).await {
            Ok(value) => {
                if json {
                    println!("{}", output::json::render(&value));
                } else {
                    output::human::print_success("done");
                    println!("{}", output::json::render(&value));
                }
                0
            }
            Err(e) => error::display_error(&e, json),
        }
    }

    fn init_tracing(&self) {
        let level = if self.quiet {
            Level::ERROR
        } else {
            match self.verbose {
                0 => Level::WARN,
                1 => Level::INFO,
                2 => Level::DEBUG,
                _ => Level::TRACE,
            }
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .init();
    }
}
