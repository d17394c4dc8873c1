//! Base-key sourcing and key derivation (§4.8)

use std::collections::BTreeMap;
use std::env;

use crate::crypt::md5_hex_upper;
use crate::error::HpsError;

/// A well-known property name carrying a `;`-separated list of package locks
/// that feeds into key derivation
const PACKAGE_LOCK_LIST: &str = "PackageLockList";

/// A well-known property name selecting how the package hash is combined
/// with the base key
const EKID: &str = "EKID";

/// Supplies the base Blowfish key used before any per-blob derivation
/// (§4.8: "static bytes, an environment variable lookup, or a caller-provided
/// provider consulted with the properties map").
pub trait KeyProvider {
    /// Return the base key, given the envelope's property map
    fn base_key(&self, properties: &BTreeMap<String, String>) -> Result<Vec<u8>, HpsError>;
}

/// A fixed, caller-supplied key
pub struct StaticKeyProvider {
    key: Vec<u8>,
}

impl StaticKeyProvider {
    /// Use `key` verbatim as the base key
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        StaticKeyProvider { key: key.into() }
    }
}

impl KeyProvider for StaticKeyProvider {
    fn base_key(&self, _properties: &BTreeMap<String, String>) -> Result<Vec<u8>, HpsError> {
        Ok(self.key.clone())
    }
}

/// Reads the base key from an environment variable, decoding it with
/// [`decode_key_string`]
pub struct EnvKeyProvider {
    var_name: String,
}

impl EnvKeyProvider {
    /// Read the base key from the environment variable `var_name` at
    /// resolution time
    pub fn new(var_name: impl Into<String>) -> Self {
        EnvKeyProvider {
            var_name: var_name.into(),
        }
    }
}

impl KeyProvider for EnvKeyProvider {
    fn base_key(&self, _properties: &BTreeMap<String, String>) -> Result<Vec<u8>, HpsError> {
        let raw = env::var(&self.var_name).map_err(|_| {
            HpsError::Cryptography(format!(
                "environment variable {} is not set",
                self.var_name
            ))
        })?;
        Ok(decode_key_string(&raw))
    }
}

/// Adapts any closure `Fn(&properties) -> Result<Vec<u8>, HpsError>` into a
/// [`KeyProvider`]
pub struct ClosureKeyProvider<F>(pub F)
where
    F: Fn(&BTreeMap<String, String>) -> Result<Vec<u8>, HpsError>;

impl<F> KeyProvider for ClosureKeyProvider<F>
where
    F: Fn(&BTreeMap<String, String>) -> Result<Vec<u8>, HpsError>,
{
    fn base_key(&self, properties: &BTreeMap<String, String>) -> Result<Vec<u8>, HpsError> {
        (self.0)(properties)
    }
}

/// Decode a user-supplied key string, trying comma-separated decimal bytes,
/// then hex (optionally `0x`-prefixed), then falling back to the string's
/// raw ISO-8859-1 (Latin-1) bytes (§4.8, mirrors the original CLI's
/// `load_encryption_key`)
pub fn decode_key_string(raw: &str) -> Vec<u8> {
    if let Some(bytes) = decode_comma_decimal(raw) {
        return bytes;
    }

    if let Some(bytes) = decode_hex(raw) {
        return bytes;
    }

    raw.chars().map(|c| c as u32 as u8).collect()
}

fn decode_comma_decimal(raw: &str) -> Option<Vec<u8>> {
    if !raw.contains(',') {
        return None;
    }

    raw.split(',')
        .map(|part| part.trim().parse::<u8>().ok())
        .collect()
}

fn decode_hex(raw: &str) -> Option<Vec<u8>> {
    let trimmed = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")).unwrap_or(raw);

    if trimmed.is_empty() || trimmed.len() % 2 != 0 || !trimmed.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let mut out = Vec::with_capacity(trimmed.len() / 2);
    for i in (0..trimmed.len()).step_by(2) {
        let byte = u8::from_str_radix(&trimmed[i..i + 2], 16).ok()?;
        out.push(byte);
    }
    Some(out)
}

/// Fold `PackageLockList` (deduplicated, sorted, `;`-joined with a trailing
/// `;`, MD5'd, uppercase hex) into the base key according to `EKID` (§4.8)
pub(crate) fn derive_key(
    base_key: &[u8],
    properties: &BTreeMap<String, String>,
) -> Vec<u8> {
    let package_hash = properties
        .get(PACKAGE_LOCK_LIST)
        .map(String::as_str)
        .and_then(package_hash_of);

    match (properties.get(EKID).map(String::as_str), package_hash) {
        (None, Some(hash)) => hash.into_bytes(),
        (None, None) => base_key.to_vec(),
        (Some("1"), Some(hash)) => {
            let mut combined = base_key.to_vec();
            combined.extend_from_slice(hash.as_bytes());
            combined
        }
        (Some(_), _) => base_key.to_vec(),
    }
}

fn package_hash_of(package_lock_list: &str) -> Option<String> {
    if package_lock_list.is_empty() {
        return None;
    }

    let mut locks: Vec<&str> = package_lock_list.split(';').filter(|s| !s.is_empty()).collect();
    if locks.is_empty() {
        return None;
    }

    locks.sort_unstable();
    locks.dedup();

    let mut joined = locks.join(";");
    joined.push(';');

    Some(md5_hex_upper(joined.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn decode_key_string_comma_decimal() {
        assert_eq!(decode_key_string("1,2,3,255"), vec![1, 2, 3, 255]);
    }

    #[test]
    fn decode_key_string_hex_with_prefix() {
        assert_eq!(decode_key_string("0xDEADBEEF"), vec![0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn decode_key_string_hex_without_prefix() {
        assert_eq!(decode_key_string("cafe"), vec![0xCA, 0xFE]);
    }

    #[test]
    fn decode_key_string_latin1_fallback() {
        assert_eq!(decode_key_string("hello"), b"hello".to_vec());
    }

    #[test]
    fn derive_key_no_ekid_no_lock_list_is_base_key() {
        let props = props(&[]);
        assert_eq!(derive_key(b"base", &props), b"base".to_vec());
    }

    #[test]
    fn derive_key_no_ekid_with_lock_list_is_package_hash() {
        let props = props(&[(PACKAGE_LOCK_LIST, "b;a;a")]);
        let hash = package_hash_of("b;a;a").unwrap();
        assert_eq!(derive_key(b"base", &props), hash.into_bytes());
    }

    #[test]
    fn derive_key_ekid_1_concatenates() {
        let props = props(&[(PACKAGE_LOCK_LIST, "lock1"), (EKID, "1")]);
        let hash = package_hash_of("lock1").unwrap();
        let mut expected = b"base".to_vec();
        expected.extend_from_slice(hash.as_bytes());
        assert_eq!(derive_key(b"base", &props), expected);
    }

    #[test]
    fn derive_key_other_ekid_is_base_key() {
        let props = props(&[(PACKAGE_LOCK_LIST, "lock1"), (EKID, "2")]);
        assert_eq!(derive_key(b"base", &props), b"base".to_vec());
    }

    #[test]
    fn package_hash_dedupes_and_sorts() {
        assert_eq!(
            package_hash_of("b;a;b;a"),
            package_hash_of("a;b"),
        );
    }

    #[test]
    fn package_hash_empty_list_is_none() {
        assert_eq!(package_hash_of(""), None);
        assert_eq!(package_hash_of(";;;"), None);
    }
}
