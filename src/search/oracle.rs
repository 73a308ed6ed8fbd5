//! Candidate testing: decrypt under a trial key and apply the predicate.

use std::sync::Arc;

use crate::cipher::{padding, CipherOracle};
use crate::search::predicate::MatchPredicate;

/// Stateless candidate tester shared by all workers.
///
/// Wraps the opaque cipher, the read-only ciphertext, and the verification
/// predicate. `test` is a pure function of the key; the ciphertext is never
/// mutated, so concurrent calls need no synchronization.
pub struct CandidateOracle {
    cipher: Arc<dyn CipherOracle>,
    ciphertext: Arc<[u8]>,
    predicate: MatchPredicate,
    padded: bool,
}

impl CandidateOracle {
    pub fn new(
        cipher: Arc<dyn CipherOracle>,
        ciphertext: Arc<[u8]>,
        predicate: MatchPredicate,
        padded: bool,
    ) -> Self {
        Self {
            cipher,
            ciphertext,
            predicate,
            padded,
        }
    }

    /// Decrypt the full ciphertext with `key` and evaluate the predicate.
    ///
    /// In padded mode the trailing pad is stripped first; a malformed pad is
    /// the expected byproduct of a wrong key and degrades to evaluating the
    /// predicate on the raw buffer, never to an error.
    pub fn test(&self, key: u64) -> bool {
        let plaintext = self.cipher.decrypt_blocks(key, &self.ciphertext);
        let view = if self.padded {
            padding::unpad(&plaintext, self.cipher.block_size())
        } else {
            &plaintext[..]
        };
        self.predicate.matches(view)
    }

    /// Decrypt with the resolved key for final reporting.
    pub fn recover(&self, key: u64) -> Vec<u8> {
        let plaintext = self.cipher.decrypt_blocks(key, &self.ciphertext);
        if self.padded {
            padding::unpad(&plaintext, self.cipher.block_size()).to_vec()
        } else {
            plaintext
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::{padding, DesEcb};

    fn oracle_for(plaintext: &[u8], key: u64, predicate: MatchPredicate) -> CandidateOracle {
        let cipher = DesEcb;
        let padded = padding::pad(plaintext, cipher.block_size());
        let ciphertext = cipher.encrypt_blocks(key, &padded);
        CandidateOracle::new(Arc::new(cipher), ciphertext.into(), predicate, true)
    }

    #[test]
    fn test_correct_key_matches() {
        let oracle = oracle_for(
            b"Secreto muy importante!",
            6789,
            MatchPredicate::Exact(b"Secreto muy importante!".to_vec()),
        );
        assert!(oracle.test(6789));
    }

    #[test]
    fn test_wrong_keys_do_not_match() {
        let oracle = oracle_for(
            b"Secreto muy importante!",
            6789,
            MatchPredicate::Exact(b"Secreto muy importante!".to_vec()),
        );
        for key in 0..100 {
            assert!(!oracle.test(key));
        }
    }

    #[test]
    fn test_recover_round_trip() {
        let oracle = oracle_for(
            b"este mensaje es una prueba de concepto",
            4321,
            MatchPredicate::Keyword("es una prueba de".into()),
        );
        assert!(oracle.test(4321));
        assert_eq!(
            oracle.recover(4321),
            b"este mensaje es una prueba de concepto"
        );
    }

    #[test]
    fn test_unpadded_mode() {
        let cipher = DesEcb;
        let plaintext = b"exactly 16 bytes";
        let ciphertext = cipher.encrypt_blocks(99, plaintext);
        let oracle = CandidateOracle::new(
            Arc::new(cipher),
            ciphertext.into(),
            MatchPredicate::Exact(plaintext.to_vec()),
            false,
        );
        assert!(oracle.test(99));
        assert_eq!(oracle.recover(99), plaintext);
    }
}
