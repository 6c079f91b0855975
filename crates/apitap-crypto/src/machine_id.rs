//! Stable machine identifier.
//!
//! Read from a platform-stable source; `APITAP_MACHINE_ID` overrides for
//! tests (spec §6). A real cross-platform implementation would add a
//! Windows registry / macOS IOPlatformUUID reader; this is intentionally
//! scoped to what can be sourced without spawning external processes.

use apitap_core::ApitapConfig;

const LINUX_MACHINE_ID_PATHS: &[&str] = &["/etc/machine-id", "/var/lib/dbus/machine-id"];

/// Resolve the stable machine identifier used by [`crate::kdf::derive_key`].
///
/// Precedence: `config.machine_id_override` (test-only), then the first
/// readable platform source, then a hostname-derived fallback so key
/// derivation never fails outright — a fallback machine id just means the
/// derived key (and therefore the credential store) won't survive a
/// hostname change, which is acceptable degradation, not data loss, since
/// the store is local-only per spec §1 non-goals.
pub fn machine_id(config: &ApitapConfig) -> String {
    if let Some(id) = &config.machine_id_override {
        return id.clone();
    }

    for path in LINUX_MACHINE_ID_PATHS {
        if let Ok(contents) = std::fs::read_to_string(path) {
            let trimmed = contents.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }

    tracing::warn!("no platform machine-id found; falling back to hostname-derived identifier");
    hostname_fallback()
}

fn hostname_fallback() -> String {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "apitap-unknown-host".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_takes_precedence() {
        let mut cfg = ApitapConfig::from_env();
        cfg.machine_id_override = Some("fixed-test-id".to_string());
        assert_eq!(machine_id(&cfg), "fixed-test-id");
    }
}
