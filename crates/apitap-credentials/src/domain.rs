//! Parent-domain fallback walk (spec §4.3, SPEC_FULL §C.2).
//!
//! `api.a.b` → `a.b`, stopping before a bare single-label host (so we never
//! end up querying a plain TLD). No public-suffix list is consulted: this
//! is a conservative approximation of eTLD+1 resolution, not a
//! PSL-correct one (see DESIGN.md).

/// Candidate domains to check, most specific first, starting with `domain`
/// itself.
pub fn fallback_candidates(domain: &str) -> Vec<String> {
    let mut candidates = vec![domain.to_string()];
    let mut labels: Vec<&str> = domain.split('.').collect();
    while labels.len() > 2 {
        labels.remove(0);
        candidates.push(labels.join("."));
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_up_to_two_labels() {
        assert_eq!(
            fallback_candidates("api.a.b.example.com"),
            vec!["api.a.b.example.com", "a.b.example.com", "b.example.com", "example.com"]
        );
    }

    #[test]
    fn stops_before_bare_tld() {
        assert_eq!(fallback_candidates("example.com"), vec!["example.com"]);
    }

    #[test]
    fn single_label_is_unchanged() {
        assert_eq!(fallback_candidates("localhost"), vec!["localhost"]);
    }
}
