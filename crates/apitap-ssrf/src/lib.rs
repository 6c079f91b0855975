//! SSRF Validator (spec §4.2 / component C2).
//!
//! Parses a URL, requires `http`/`https`, resolves DNS, and rejects
//! private/loopback/link-local/multicast/reserved ranges plus the cloud
//! metadata address. Reused unmodified at import time, at replay dispatch,
//! and again after every redirect — the single follow is re-validated just
//! like the initial request (spec §4.2, §4.7.9, §8 "SSRF closure").
//!
//! No response-size/rate-limit policy here: that belongs to the replay
//! engine's own `maxBytes` truncation (spec §4.7.14). `http` is allowed
//! alongside `https` since captured traffic is not always TLS.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, ToSocketAddrs};

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum SsrfError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("URL scheme not allowed: {0} (only http/https permitted)")]
    InvalidScheme(String),
    #[error("URL has no host")]
    NoHost,
    #[error("failed to resolve hostname: {0}")]
    ResolutionFailed(String),
    #[error("IP address blocked: {0} ({1})")]
    BlockedIpAddress(IpAddr, &'static str),
    #[error("access to cloud metadata endpoint blocked: {0}")]
    CloudMetadataBlocked(IpAddr),
}

/// Outcome of a validation call, matching spec §4.2's `{safe, reason?}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub safe: bool,
    pub reason: Option<String>,
}

impl ValidationOutcome {
    fn ok() -> Self {
        Self {
            safe: true,
            reason: None,
        }
    }

    fn blocked(reason: impl Into<String>) -> Self {
        Self {
            safe: false,
            reason: Some(reason.into()),
        }
    }
}

/// Validates URLs before they are dispatched.
#[derive(Debug, Clone, Default)]
pub struct SsrfValidator {
    /// Test-only bypass for hermetic test servers (`APITAP_SKIP_SSRF_CHECK`).
    skip_check: bool,
}

impl SsrfValidator {
    pub fn new(skip_check: bool) -> Self {
        Self { skip_check }
    }

    /// Validate a URL string, returning `{safe, reason?}` rather than
    /// propagating an error — callers (replay, import) decide how to
    /// surface an unsafe verdict.
    pub fn validate(&self, url_str: &str) -> ValidationOutcome {
        match self.try_validate(url_str) {
            Ok(()) => ValidationOutcome::ok(),
            Err(e) => ValidationOutcome::blocked(e.to_string()),
        }
    }

    /// Same check as [`Self::validate`] but propagating [`SsrfError`], for
    /// call sites (replay engine) that want `?`-style control flow.
    pub fn try_validate(&self, url_str: &str) -> Result<(), SsrfError> {
        if self.skip_check {
            tracing::debug!("SSRF check bypassed via APITAP_SKIP_SSRF_CHECK");
            return Ok(());
        }

        let url = Url::parse(url_str).map_err(|e| SsrfError::InvalidUrl(e.to_string()))?;

        match url.scheme() {
            "http" | "https" => {}
            other => return Err(SsrfError::InvalidScheme(other.to_string())),
        }

        let host = url.host_str().ok_or(SsrfError::NoHost)?;
        self.validate_hostname(host)
    }

    fn validate_hostname(&self, hostname: &str) -> Result<(), SsrfError> {
        // If the host is itself a literal IP, to_socket_addrs resolves it
        // without a DNS round-trip, which is exactly what we want.
        let addr_str = format!("{hostname}:443");
        let addrs: Vec<IpAddr> = addr_str
            .to_socket_addrs()
            .map_err(|e| SsrfError::ResolutionFailed(format!("{hostname}: {e}")))?
            .map(|sa| sa.ip())
            .collect();

        if addrs.is_empty() {
            return Err(SsrfError::ResolutionFailed(format!(
                "no addresses resolved for {hostname}"
            )));
        }

        for ip in addrs {
            validate_ip(ip)?;
        }
        Ok(())
    }
}

/// Validate a single resolved IP address against the blocked ranges.
pub fn validate_ip(ip: IpAddr) -> Result<(), SsrfError> {
    if let IpAddr::V4(v4) = ip {
        if v4 == Ipv4Addr::new(169, 254, 169, 254) {
            return Err(SsrfError::CloudMetadataBlocked(ip));
        }
    }

    match ip {
        IpAddr::V4(v4) => validate_ipv4(v4),
        IpAddr::V6(v6) => validate_ipv6(v6),
    }
}

fn validate_ipv4(ip: Ipv4Addr) -> Result<(), SsrfError> {
    if ip.is_loopback() {
        return Err(SsrfError::BlockedIpAddress(IpAddr::V4(ip), "loopback"));
    }
    if ip.is_private() {
        return Err(SsrfError::BlockedIpAddress(IpAddr::V4(ip), "private (RFC 1918)"));
    }
    if ip.is_link_local() {
        return Err(SsrfError::BlockedIpAddress(IpAddr::V4(ip), "link-local"));
    }
    if ip.is_multicast() {
        return Err(SsrfError::BlockedIpAddress(IpAddr::V4(ip), "multicast"));
    }
    if ip.is_unspecified() {
        return Err(SsrfError::BlockedIpAddress(IpAddr::V4(ip), "unspecified (0.0.0.0)"));
    }
    if ip.is_broadcast() {
        return Err(SsrfError::BlockedIpAddress(IpAddr::V4(ip), "broadcast"));
    }
    if ip.is_documentation() {
        return Err(SsrfError::BlockedIpAddress(IpAddr::V4(ip), "documentation range"));
    }
    if is_reserved_ipv4(ip) {
        return Err(SsrfError::BlockedIpAddress(IpAddr::V4(ip), "reserved"));
    }
    Ok(())
}

fn is_reserved_ipv4(ip: Ipv4Addr) -> bool {
    let octets = ip.octets();
    matches!(octets[0], 240..=255) // 240.0.0.0/4 "reserved for future use", includes 255.255.255.255
        || (octets[0] == 100 && (64..=127).contains(&octets[1])) // 100.64.0.0/10 CGNAT
        || (octets[0] == 192 && octets[1] == 0 && octets[2] == 0) // 192.0.0.0/24 IETF protocol assignments
        || (octets[0] == 198 && (18..=19).contains(&octets[1])) // 198.18.0.0/15 benchmarking
}

fn validate_ipv6(ip: Ipv6Addr) -> Result<(), SsrfError> {
    if ip.is_loopback() {
        return Err(SsrfError::BlockedIpAddress(IpAddr::V6(ip), "loopback (::1)"));
    }
    if ip.is_unspecified() {
        return Err(SsrfError::BlockedIpAddress(IpAddr::V6(ip), "unspecified (::)"));
    }
    if ip.is_multicast() {
        return Err(SsrfError::BlockedIpAddress(IpAddr::V6(ip), "multicast"));
    }
    let segments = ip.segments();
    // Unique local addresses, fc00::/7
    if segments[0] & 0xfe00 == 0xfc00 {
        return Err(SsrfError::BlockedIpAddress(IpAddr::V6(ip), "unique local (fc00::/7)"));
    }
    // Link-local, fe80::/10
    if segments[0] & 0xffc0 == 0xfe80 {
        return Err(SsrfError::BlockedIpAddress(IpAddr::V6(ip), "link-local (fe80::/10)"));
    }
    // IPv4-mapped addresses (::ffff:a.b.c.d) inherit the IPv4 policy.
    if let Some(v4) = ip.to_ipv4_mapped() {
        return validate_ipv4(v4);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_schemes() {
        let v = SsrfValidator::new(false);
        for scheme in ["file:///etc/passwd", "javascript:alert(1)", "data:text/plain;base64,x", "ftp://example.com"] {
            let outcome = v.validate(scheme);
            assert!(!outcome.safe, "{scheme} should be rejected");
        }
    }

    #[test]
    fn rejects_loopback_and_private_literals() {
        let v = SsrfValidator::new(false);
        assert!(!v.validate("http://127.0.0.1/").safe);
        assert!(!v.validate("http://10.0.0.5/").safe);
        assert!(!v.validate("http://192.168.1.1/").safe);
        assert!(!v.validate("http://172.16.0.1/").safe);
        assert!(!v.validate("http://[::1]/").safe);
    }

    #[test]
    fn rejects_cloud_metadata() {
        let v = SsrfValidator::new(false);
        let outcome = v.validate("http://169.254.169.254/latest/meta-data/");
        assert!(!outcome.safe);
        assert!(outcome.reason.unwrap().contains("metadata"));
    }

    #[test]
    fn skip_flag_bypasses_everything() {
        let v = SsrfValidator::new(true);
        assert!(v.validate("http://127.0.0.1:1/").safe);
        assert!(v.validate("file:///etc/passwd").safe);
    }

    #[test]
    fn validate_ip_blocks_link_local_v6() {
        let ip: IpAddr = "fe80::1".parse().unwrap();
        assert!(validate_ip(ip).is_err());
    }

    #[test]
    fn validate_ip_allows_public_v4() {
        let ip: IpAddr = "93.184.216.34".parse().unwrap();
        assert!(validate_ip(ip).is_ok());
    }
}
