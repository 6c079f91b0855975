//! Human-readable rendering for the common result shapes.

use colored::Colorize;

pub fn print_domains(domains: &[String]) {
    if domains.is_empty() {
        println!("{}", "no captured domains".dimmed());
        return;
    }
    for domain in domains {
        println!("{domain}");
    }
}

pub fn print_endpoint_summary(method: &str, path: &str, tier: &str) {
    let tier_colored = match tier {
        "green" => tier.green(),
        "yellow" => tier.yellow(),
        "orange" => tier.truecolor(255, 165, 0),
        "red" => tier.red(),
        _ => tier.normal(),
    };
    println!("{:<7} {:<40} [{}]", method.bold(), path, tier_colored);
}

pub fn print_success(message: &str) {
    println!("{} {message}", "ok:".green().bold());
}
