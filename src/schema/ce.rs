//! `CE` decoder: `CC` composed with a Blowfish decryption pre-pass (§4.7)

use super::{cc, DecodeTrace};
use crate::context::{MaybeEncrypted, ParseContext};
use crate::crypt::blowfish as blowfish_decrypt;
use crate::crypt::{adler32, key_scramble, reverse_u32_bytes};
use crate::error::{HpsError, IntegrityError};
use crate::key;
use crate::mesh::Mesh;

pub(super) fn decode(context: &ParseContext) -> Result<(Mesh, DecodeTrace), HpsError> {
    let base_key = key::decode_key_string(
        &std::env::var("HPS_ENCRYPTION_KEY").unwrap_or_default(),
    );
    decode_with_base_key(context, &base_key)
}

/// Decode a `CE`-schema context given an externally supplied base key,
/// bypassing the `HPS_ENCRYPTION_KEY` environment lookup (used by
/// [`crate::key::KeyProvider`]-driven callers)
pub(crate) fn decode_with_base_key(
    context: &ParseContext,
    base_key: &[u8],
) -> Result<(Mesh, DecodeTrace), HpsError> {
    let key = key::derive_key(base_key, &context.properties);

    let vertex_bytes = decrypt_blob(&context.vertex_blob, &key)?;

    if let Some(expected) = context.check_value {
        let actual = reverse_u32_bytes(adler32(&vertex_bytes));
        if actual != expected {
            return Err(IntegrityError::IntegrityCheckFailed { expected, actual }.into());
        }
    }

    let texture_coords_blob = context
        .texture_coords_blob
        .as_ref()
        .map(|blob| decrypt_blob(blob, &key))
        .transpose()?
        .map(MaybeEncrypted::Plain);

    let vertex_colors_blob = context
        .vertex_colors_blob
        .as_ref()
        .map(|blob| decrypt_blob(blob, &key))
        .transpose()?
        .map(MaybeEncrypted::Plain);

    let texture_images = context
        .texture_images
        .iter()
        .map(|blob| decrypt_blob(blob, &key).map(MaybeEncrypted::Plain))
        .collect::<Result<Vec<_>, _>>()?;

    let decrypted_context = ParseContext {
        schema: crate::context::Schema::Cc,
        vertex_blob: MaybeEncrypted::Plain(vertex_bytes),
        face_blob: context.face_blob.clone(),
        vertex_count: context.vertex_count,
        face_count: context.face_count,
        default_vertex_color: context.default_vertex_color,
        default_face_color: context.default_face_color,
        vertex_colors_blob,
        texture_coords_blob,
        texture_images,
        splines: context.splines.clone(),
        check_value: None,
        properties: context.properties.clone(),
    };

    cc::decode(&decrypted_context)
}

fn decrypt_blob(blob: &MaybeEncrypted, base_key: &[u8]) -> Result<Vec<u8>, HpsError> {
    match blob {
        MaybeEncrypted::Plain(bytes) => Ok(bytes.clone()),
        MaybeEncrypted::Encrypted(encrypted) => {
            let key = if encrypted.use_scrambled_key {
                key_scramble::scramble_key(base_key)
            } else {
                base_key.to_vec()
            };
            blowfish_decrypt::decrypt(&key, &encrypted.bytes, encrypted.original_size)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{EncryptedBlob, Schema};
    use std::collections::BTreeMap;

    fn encrypt(key: &[u8], plaintext: &[u8]) -> Vec<u8> {
        use blowfish::cipher::{BlockEncrypt, KeyInit};
        use blowfish::cipher::generic_array::GenericArray;

        let cipher = blowfish::Blowfish::new_from_slice(key).unwrap();
        let mut out = Vec::with_capacity(plaintext.len());
        for chunk in plaintext.chunks(8) {
            if chunk.len() == 8 {
                let mut block = GenericArray::clone_from_slice(chunk);
                cipher.encrypt_block(&mut block);
                out.extend_from_slice(&block);
            } else {
                out.extend_from_slice(chunk);
            }
        }
        out
    }

    fn base_context() -> ParseContext {
        ParseContext {
            schema: Schema::Ce,
            vertex_blob: MaybeEncrypted::Plain(Vec::new()),
            face_blob: vec![0],
            vertex_count: 0,
            face_count: 0,
            default_vertex_color: None,
            default_face_color: None,
            vertex_colors_blob: None,
            texture_coords_blob: None,
            texture_images: Vec::new(),
            splines: Vec::new(),
            check_value: None,
            properties: BTreeMap::new(),
        }
    }

    #[test]
    fn wrong_key_fails_integrity_check() {
        let real_key = b"the-real-key";
        let mut plaintext = Vec::new();
        plaintext.extend_from_slice(&0.0f32.to_le_bytes());
        plaintext.extend_from_slice(&0.0f32.to_le_bytes());
        plaintext.extend_from_slice(&0.0f32.to_le_bytes());
        plaintext.extend_from_slice(&1.0f32.to_le_bytes());
        plaintext.extend_from_slice(&1.0f32.to_le_bytes());
        plaintext.extend_from_slice(&1.0f32.to_le_bytes());
        plaintext.push(8);
        plaintext.push(8);
        plaintext.push(8);
        plaintext.push(0);

        let ciphertext = encrypt(real_key, &plaintext);

        let mut context = base_context();
        context.vertex_count = 0;
        context.vertex_blob = MaybeEncrypted::Encrypted(EncryptedBlob::new(ciphertext, None, false));
        context.check_value = Some(reverse_u32_bytes(adler32(&plaintext)));

        let err = decode_with_base_key(&context, b"a-wrong-key-xx").unwrap_err();
        assert!(matches!(
            err,
            HpsError::Integrity(IntegrityError::IntegrityCheckFailed { .. })
        ));
    }

    #[test]
    fn correct_key_passes_integrity_check_and_decodes() {
        let real_key = b"the-real-key";
        let mut plaintext = Vec::new();
        plaintext.extend_from_slice(&0.0f32.to_le_bytes());
        plaintext.extend_from_slice(&0.0f32.to_le_bytes());
        plaintext.extend_from_slice(&0.0f32.to_le_bytes());
        plaintext.extend_from_slice(&1.0f32.to_le_bytes());
        plaintext.extend_from_slice(&1.0f32.to_le_bytes());
        plaintext.extend_from_slice(&1.0f32.to_le_bytes());
        plaintext.push(8);
        plaintext.push(8);
        plaintext.push(8);
        plaintext.push(0);

        let ciphertext = encrypt(real_key, &plaintext);

        let mut context = base_context();
        context.vertex_count = 0;
        context.vertex_blob = MaybeEncrypted::Encrypted(EncryptedBlob::new(ciphertext, Some(plaintext.len()), false));
        context.check_value = Some(reverse_u32_bytes(adler32(&plaintext)));

        let (mesh, _trace) = decode_with_base_key(&context, real_key).unwrap();
        assert_eq!(mesh.vertices.len(), 0);
    }
}
