//! Random short code generation.

use rand::{distr::Alphanumeric, Rng};

/// Length of generated codes when the caller does not pick one.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Generates a random code of `length` characters from `[A-Za-z0-9]`.
///
/// Each character is drawn uniformly and independently from the 62-symbol
/// alphabet using the thread-local generator, which is a periodically
/// reseeded ChaCha CSPRNG, so codes cannot be predicted from earlier ones.
///
/// The generator knows nothing about existing codes; callers handle collisions.
pub fn generate_code(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_length() {
        assert_eq!(generate_code(DEFAULT_CODE_LENGTH).len(), 6);
    }

    #[test]
    fn test_requested_length() {
        for length in [0, 1, 4, 10, 32] {
            assert_eq!(generate_code(length).len(), length);
        }
    }

    #[test]
    fn test_only_alphanumeric() {
        for _ in 0..200 {
            let code = generate_code(DEFAULT_CODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_alphanumeric()), "{code}");
        }
    }

    #[test]
    fn test_codes_are_not_repeated() {
        let codes: HashSet<String> = (0..1000).map(|_| generate_code(DEFAULT_CODE_LENGTH)).collect();
        assert_eq!(codes.len(), 1000);
    }

    #[test]
    fn test_alphabet_coverage() {
        let seen: HashSet<char> = (0..500).flat_map(|_| generate_code(16).into_bytes()).map(char::from).collect();
        assert!(seen.iter().any(|c| c.is_ascii_uppercase()));
        assert!(seen.iter().any(|c| c.is_ascii_lowercase()));
        assert!(seen.iter().any(|c| c.is_ascii_digit()));
    }
}
