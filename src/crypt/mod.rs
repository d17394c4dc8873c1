//! Shared hashing and checksum helpers for key derivation and integrity checks

pub(crate) mod blowfish;
pub(crate) mod key_scramble;

use md5::{Digest, Md5};

/// Uppercase hex MD5 digest of `data` (§4.8, package-lock-list hash)
pub(crate) fn md5_hex_upper(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    let digest = hasher.finalize();

    let mut out = String::with_capacity(32);
    for byte in digest {
        out.push_str(&format!("{byte:02X}"));
    }
    out
}

/// Adler-32 checksum, as specified by RFC 1950
pub(crate) fn adler32(data: &[u8]) -> u32 {
    const MOD_ADLER: u32 = 65521;

    let mut a: u32 = 1;
    let mut b: u32 = 0;

    for &byte in data {
        a = (a + byte as u32) % MOD_ADLER;
        b = (b + a) % MOD_ADLER;
    }

    (b << 16) | a
}

/// Byte-reverse a 32-bit integer's little-endian serialization, interpreted as
/// a big-endian integer (§4.7, §9 "Endianness quirk in Adler-32 check")
pub(crate) fn reverse_u32_bytes(value: u32) -> u32 {
    u32::from_be_bytes(value.to_le_bytes())
}
