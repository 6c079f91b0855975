//! Shannon entropy over bytes (spec §4.4 step 6, SPEC_FULL §C.3).

use std::collections::HashMap;

pub const HIGH_ENTROPY_THRESHOLD: f64 = 3.5;
pub const HIGH_ENTROPY_MIN_LEN: usize = 32;

pub fn shannon_entropy(bytes: &[u8]) -> f64 {
    if bytes.is_empty() {
        return 0.0;
    }
    let mut counts: HashMap<u8, u32> = HashMap::new();
    for &b in bytes {
        *counts.entry(b).or_insert(0) += 1;
    }
    let len = bytes.len() as f64;
    counts.values().fold(0.0, |acc, &count| {
        let p = count as f64 / len;
        acc - p * p.log2()
    })
}

pub fn is_high_entropy(value: &str) -> bool {
    value.len() >= HIGH_ENTROPY_MIN_LEN && shannon_entropy(value.as_bytes()) >= HIGH_ENTROPY_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_byte_has_zero_entropy() {
        assert_eq!(shannon_entropy(b"aaaaaaaaaa"), 0.0);
    }

    #[test]
    fn random_looking_token_is_high_entropy() {
        let token = "aZ9kLmN3pQrS7tUvWxYz01bC2dE4fG6h";
        assert!(is_high_entropy(token));
    }

    #[test]
    fn short_token_is_not_high_entropy_regardless_of_shape() {
        assert!(!is_high_entropy("aZ9kLmN3"));
    }

    #[test]
    fn prose_is_not_high_entropy() {
        assert!(!is_high_entropy(&"the quick brown fox jumps over lazy dogs again".repeat(1)));
    }
}
