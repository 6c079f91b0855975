//! Pre-verification replayability heuristic (spec §4.4 step 8).

use apitap_skillfile::{Replayability, ReplayabilityTier};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static CSRF_HEADER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)x-csrf|csrf-token|x-xsrf").unwrap());

pub fn classify(headers: &BTreeMap<String, apitap_skillfile::HeaderValue>, captcha_risk: bool) -> Replayability {
    let mut signals = Vec::new();

    if captcha_risk {
        signals.push("captcha-risk".to_string());
        return Replayability { tier: ReplayabilityTier::Red, verified: false, signals };
    }

    let has_csrf = headers.keys().any(|name| CSRF_HEADER_RE.is_match(name));
    if has_csrf {
        signals.push("csrf-header".to_string());
        return Replayability { tier: ReplayabilityTier::Orange, verified: false, signals };
    }

    let has_auth = headers.keys().any(|name| {
        let lower = name.to_lowercase();
        lower == "authorization" || lower == "cookie" || lower == "x-api-key"
    });
    if has_auth {
        signals.push("auth-header".to_string());
        return Replayability { tier: ReplayabilityTier::Yellow, verified: false, signals };
    }

    Replayability { tier: ReplayabilityTier::Green, verified: false, signals }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apitap_skillfile::HeaderValue;

    #[test]
    fn captcha_risk_wins_over_everything() {
        let mut headers = BTreeMap::new();
        headers.insert("authorization".to_string(), HeaderValue::Stored);
        let r = classify(&headers, true);
        assert_eq!(r.tier, ReplayabilityTier::Red);
    }

    #[test]
    fn csrf_header_is_orange() {
        let mut headers = BTreeMap::new();
        headers.insert("x-csrf-token".to_string(), HeaderValue::Concrete("abc".to_string()));
        let r = classify(&headers, false);
        assert_eq!(r.tier, ReplayabilityTier::Orange);
    }

    #[test]
    fn auth_header_is_yellow() {
        let mut headers = BTreeMap::new();
        headers.insert("authorization".to_string(), HeaderValue::Stored);
        let r = classify(&headers, false);
        assert_eq!(r.tier, ReplayabilityTier::Yellow);
    }

    #[test]
    fn no_signals_is_green() {
        let headers = BTreeMap::new();
        let r = classify(&headers, false);
        assert_eq!(r.tier, ReplayabilityTier::Green);
    }
}
