//! apitap CLI entry point.

use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = apitap_cli::Cli::parse();
    let exit_code = cli.execute().await;
    std::process::exit(exit_code);
}
