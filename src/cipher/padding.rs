//! PKCS#7-style block padding.
//!
//! `unpad` never fails: wrong-key decryption produces malformed trailing
//! bytes constantly, and the candidate oracle treats those as "no match"
//! rather than an error. An invalid pad returns the input unchanged.

/// Pad `data` up to a multiple of `block_size`. Always appends between 1 and
/// `block_size` bytes, each holding the pad length, so already-aligned input
/// gains a full block.
pub fn pad(data: &[u8], block_size: usize) -> Vec<u8> {
    let pad_len = block_size - data.len() % block_size;
    let mut out = Vec::with_capacity(data.len() + pad_len);
    out.extend_from_slice(data);
    out.resize(data.len() + pad_len, pad_len as u8);
    out
}

/// Strip a valid trailing pad from `data`. Fails safe: if the trailing byte
/// is outside `[1, block_size]`, claims more bytes than are present, or the
/// pad bytes disagree, the input is returned unchanged.
pub fn unpad<'a>(data: &'a [u8], block_size: usize) -> &'a [u8] {
    let Some(&last) = data.last() else {
        return data;
    };
    let pad_len = last as usize;
    if pad_len == 0 || pad_len > block_size || pad_len > data.len() {
        return data;
    }
    let (body, tail) = data.split_at(data.len() - pad_len);
    if tail.iter().all(|&b| b == last) {
        body
    } else {
        data
    }
}
