//! Maps `ApitapError` to an exit code and, under `--json`, a structured
//! error envelope (spec §6: exit 0/1, SPEC_FULL §B).

use apitap_core::error::ApitapError;
use colored::Colorize;

/// Prints `error` in the format the caller asked for and returns the
/// process exit code (always 1 — success is always 0, per spec §6).
pub fn display_error(error: &ApitapError, json: bool) -> i32 {
    if json {
        let envelope = serde_json::json!({
            "success": false,
            "category": error.category(),
            "message": error.to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&envelope).unwrap_or_default());
    } else {
        eprintln!("{} {}", "error:".red().bold(), error);
    }
    1
}
