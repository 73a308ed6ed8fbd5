//! Block-cipher collaborators for the key search
//!
//! The search core treats the cipher as an opaque oracle: give it a key and
//! a block-aligned buffer, get the transformed buffer back. The concrete
//! cipher lives behind the `CipherOracle` trait so the search protocol never
//! depends on DES specifics.

pub mod des;
pub mod padding;

pub use des::DesEcb;

/// Opaque block-cipher oracle used by the search core.
///
/// Implementations must be stateless per call: `encrypt_blocks` and
/// `decrypt_blocks` derive the key schedule from `key` on every invocation,
/// so a single oracle instance is safe to share across worker threads.
/// Callers guarantee that `data.len()` is a multiple of `block_size()`;
/// alignment is validated as a configuration error before any worker starts.
pub trait CipherOracle: Send + Sync {
    /// Cipher block size in bytes.
    fn block_size(&self) -> usize;

    /// Encrypt a block-aligned buffer under the key derived from `key`.
    fn encrypt_blocks(&self, key: u64, data: &[u8]) -> Vec<u8>;

    /// Decrypt a block-aligned buffer under the key derived from `key`.
    fn decrypt_blocks(&self, key: u64, data: &[u8]) -> Vec<u8>;
}

/// Derive cipher key material from a single integer by splitting it into the
/// cipher's native 8-byte key width, low chunks first.
///
/// DES ignores the low (parity) bit of every key byte, so a plain byte split
/// would make adjacent integers collide onto one key schedule and the sweep
/// would resolve a neighbor of the planted key. Each 7-bit chunk is shifted
/// off the parity bit instead, the same trick OpenSSL's `DES_string_to_key`
/// uses, which makes the mapping injective over the effective 2^56 key
/// space. Bits 56..64 of `key` are ignored.
pub fn key_bytes(key: u64) -> [u8; 8] {
    let mut bytes = [0u8; 8];
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = (((key >> (7 * i)) & 0x7f) << 1) as u8;
    }
    bytes
}
