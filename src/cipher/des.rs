//! DES/ECB implementation of the cipher oracle.

use des::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use des::Des;

use super::{key_bytes, CipherOracle};

/// DES block size in bytes.
pub const DES_BLOCK_SIZE: usize = 8;

/// DES in ECB mode, one independent transform per 8-byte block.
///
/// Key material comes from `key_bytes`, which keeps distinct integers on
/// distinct key schedules; no parity fixup is needed because no derived byte
/// carries anything in its parity bit.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesEcb;

impl CipherOracle for DesEcb {
    fn block_size(&self) -> usize {
        DES_BLOCK_SIZE
    }

    fn encrypt_blocks(&self, key: u64, data: &[u8]) -> Vec<u8> {
        debug_assert_eq!(data.len() % DES_BLOCK_SIZE, 0);
        let schedule = Des::new(&GenericArray::from(key_bytes(key)));
        let mut out = Vec::with_capacity(data.len());
        for chunk in data.chunks_exact(DES_BLOCK_SIZE) {
            let mut block = GenericArray::clone_from_slice(chunk);
            schedule.encrypt_block(&mut block);
            out.extend_from_slice(&block);
        }
        out
    }

    fn decrypt_blocks(&self, key: u64, data: &[u8]) -> Vec<u8> {
        debug_assert_eq!(data.len() % DES_BLOCK_SIZE, 0);
        let schedule = Des::new(&GenericArray::from(key_bytes(key)));
        let mut out = Vec::with_capacity(data.len());
        for chunk in data.chunks_exact(DES_BLOCK_SIZE) {
            let mut block = GenericArray::clone_from_slice(chunk);
            schedule.decrypt_block(&mut block);
            out.extend_from_slice(&block);
        }
        out
    }
}
