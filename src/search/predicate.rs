//! Verification predicates for decrypted candidates.

/// Decides whether a decrypted buffer "looks correct".
///
/// All variants are pure functions of the plaintext bytes, safe to evaluate
/// concurrently from every worker. Predicate matching is probabilistic for
/// short patterns: more than one key in the space may satisfy it, which is
/// why the coordinator resolves conflicting claims (first announced wins).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchPredicate {
    /// Full equality with the expected plaintext.
    Exact(Vec<u8>),
    /// Byte-level containment of a literal pattern.
    Substring(Vec<u8>),
    /// Containment of a keyword in the lossy-UTF-8 decoding of the buffer.
    /// Tolerant of invalid bytes around the keyword, which wrong-length
    /// buffers carry routinely.
    Keyword(String),
}

impl MatchPredicate {
    /// Evaluate the predicate against a decrypted byte sequence.
    pub fn matches(&self, plaintext: &[u8]) -> bool {
        match self {
            MatchPredicate::Exact(expected) => plaintext == &expected[..],
            MatchPredicate::Substring(needle) => {
                !needle.is_empty()
                    && plaintext
                        .windows(needle.len())
                        .any(|window| window == &needle[..])
            }
            MatchPredicate::Keyword(word) => {
                !word.is_empty() && String::from_utf8_lossy(plaintext).contains(word.as_str())
            }
        }
    }
}

impl std::fmt::Display for MatchPredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchPredicate::Exact(_) => write!(f, "exact"),
            MatchPredicate::Substring(_) => write!(f, "substring"),
            MatchPredicate::Keyword(_) => write!(f, "keyword"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let predicate = MatchPredicate::Exact(b"Secreto muy importante!".to_vec());
        assert!(predicate.matches(b"Secreto muy importante!"));
        assert!(!predicate.matches(b"Secreto muy importante"));
        assert!(!predicate.matches(b"Secreto muy importante!\x01"));
    }

    #[test]
    fn test_substring_match() {
        let predicate = MatchPredicate::Substring(b" the ".to_vec());
        assert!(predicate.matches(b"this is the message"));
        assert!(!predicate.matches(b"no article here"));
        assert!(!predicate.matches(b""));
    }

    #[test]
    fn test_substring_longer_than_input() {
        let predicate = MatchPredicate::Substring(b"longer than input".to_vec());
        assert!(!predicate.matches(b"short"));
    }

    #[test]
    fn test_keyword_match() {
        let predicate = MatchPredicate::Keyword("es una prueba de".into());
        assert!(predicate.matches(b"este mensaje es una prueba de concepto"));
        assert!(!predicate.matches(b"otro mensaje cualquiera"));
    }

    #[test]
    fn test_keyword_tolerates_invalid_utf8() {
        let predicate = MatchPredicate::Keyword("prueba".into());
        let mut buffer = vec![0xff, 0xfe, 0x80];
        buffer.extend_from_slice(b"una prueba");
        buffer.extend_from_slice(&[0xc3, 0x28]);
        assert!(predicate.matches(&buffer));
    }

    #[test]
    fn test_empty_patterns_never_match() {
        assert!(!MatchPredicate::Substring(Vec::new()).matches(b"anything"));
        assert!(!MatchPredicate::Keyword(String::new()).matches(b"anything"));
    }
}
