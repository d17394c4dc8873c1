//! Blowfish block decryption with the non-standard trailing-remainder
//! passthrough described in §4.2.

use blowfish::cipher::{BlockDecrypt, InvalidLength, KeyInit};
use blowfish::Blowfish;

use crate::error::HpsError;

const BLOCK_SIZE: usize = 8;

/// Decrypt `ciphertext` under `key` using standard 64-bit-block, 16-round
/// Blowfish in ECB mode, except that any trailing 1-7 bytes that do not form
/// a complete block are copied to the output unchanged rather than rejected
/// or padded (§4.2: "the implementer reproduces the exact mapping").
///
/// If `original_size` is `Some`, the output is truncated to that many bytes
/// after decryption, matching the `EncryptedBlob.original_size` field.
pub(crate) fn decrypt(
    key: &[u8],
    ciphertext: &[u8],
    original_size: Option<usize>,
) -> Result<Vec<u8>, HpsError> {
    let cipher = Blowfish::new_from_slice(key)
        .map_err(|InvalidLength| HpsError::Cryptography("invalid Blowfish key length".into()))?;

    let full_blocks = ciphertext.len() / BLOCK_SIZE;
    let tail_start = full_blocks * BLOCK_SIZE;

    let mut out = Vec::with_capacity(ciphertext.len());
    for chunk in ciphertext[..tail_start].chunks_exact(BLOCK_SIZE) {
        let mut block = blowfish::cipher::generic_array::GenericArray::clone_from_slice(chunk);
        cipher.decrypt_block(&mut block);
        out.extend_from_slice(&block);
    }
    out.extend_from_slice(&ciphertext[tail_start..]);

    if let Some(size) = original_size {
        out.truncate(size);
    }

    Ok(out)
}
