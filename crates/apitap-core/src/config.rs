//! Process-level configuration.
//!
//! There is no config file format: spec §6 names environment variables as
//! the only external surface. This struct resolves them once and is passed
//! by reference to the crates that need it — there is no ambient global
//! beyond the process-wide root directory spec §9 allows.

use std::path::PathBuf;

/// Resolved runtime configuration for a single apitap process.
#[derive(Debug, Clone)]
pub struct ApitapConfig {
    /// State root. `APITAP_DIR`, default `~/.apitap`.
    pub state_dir: PathBuf,
    /// Skill file directory. `APITAP_SKILLS_DIR`, default `<state_dir>/skills`.
    pub skills_dir: PathBuf,
    /// Test-only override for the machine identifier used by key derivation.
    pub machine_id_override: Option<String>,
    /// Test-only bypass for SSRF validation against hermetic test servers.
    pub skip_ssrf_check: bool,
}

impl ApitapConfig {
    /// Resolve configuration from the environment, following spec §6.
    pub fn from_env() -> Self {
        let state_dir = std::env::var_os("APITAP_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_state_dir);
        let skills_dir = std::env::var_os("APITAP_SKILLS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| state_dir.join("skills"));
        let machine_id_override = std::env::var("APITAP_MACHINE_ID").ok();
        let skip_ssrf_check = std::env::var("APITAP_SKIP_SSRF_CHECK")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            state_dir,
            skills_dir,
            machine_id_override,
            skip_ssrf_check,
        }
    }

    fn default_state_dir() -> PathBuf {
        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".apitap"))
            .unwrap_or_else(|| PathBuf::from(".apitap"))
    }

    pub fn credential_store_path(&self) -> PathBuf {
        self.state_dir.join("credentials.enc")
    }

    pub fn signing_key_path(&self) -> PathBuf {
        self.state_dir.join("signing.key")
    }
}

impl Default for ApitapConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn resolves_overrides_from_env() {
        // SAFETY: serialized by `#[serial]` — no other test observes these vars concurrently.
        unsafe {
            std::env::set_var("APITAP_DIR", "/tmp/apitap-test-state");
            std::env::set_var("APITAP_MACHINE_ID", "test-machine");
            std::env::set_var("APITAP_SKIP_SSRF_CHECK", "true");
        }
        let cfg = ApitapConfig::from_env();
        assert_eq!(cfg.state_dir, PathBuf::from("/tmp/apitap-test-state"));
        assert_eq!(cfg.skills_dir, PathBuf::from("/tmp/apitap-test-state/skills"));
        assert_eq!(cfg.machine_id_override.as_deref(), Some("test-machine"));
        assert!(cfg.skip_ssrf_check);
        unsafe {
            std::env::remove_var("APITAP_DIR");
            std::env::remove_var("APITAP_MACHINE_ID");
            std::env::remove_var("APITAP_SKIP_SSRF_CHECK");
        }
    }

    #[test]
    #[serial]
    fn defaults_when_unset() {
        unsafe {
            std::env::remove_var("APITAP_DIR");
            std::env::remove_var("APITAP_SKILLS_DIR");
        }
        let cfg = ApitapConfig::from_env();
        assert!(cfg.state_dir.ends_with(".apitap"));
        assert!(cfg.skills_dir.ends_with("skills"));
    }
}
