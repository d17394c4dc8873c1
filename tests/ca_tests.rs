//! End-to-end `CA` schema scenarios (spec §8, scenario 1)

use std::collections::BTreeMap;

use hpsdecode::context::{MaybeEncrypted, Schema};
use hpsdecode::{decode, ParseContext};

/// Pack `(value, width)` bit groups MSB-first into bytes, zero-padding the tail.
fn bit_writer(groups: &[(u32, u32)]) -> Vec<u8> {
    let mut bitbuf: u128 = 0;
    let mut nbits: u32 = 0;
    for &(value, width) in groups {
        bitbuf = (bitbuf << width) | value as u128;
        nbits += width;
    }
    let pad = (8 - nbits % 8) % 8;
    bitbuf <<= pad;
    nbits += pad;

    let mut bytes = Vec::new();
    for i in (0..nbits).step_by(8).rev() {
        bytes.push(((bitbuf >> i) & 0xFF) as u8);
    }
    bytes
}

fn base_context(vertex_bytes: Vec<u8>, face_bytes: Vec<u8>, vertex_count: usize, face_count: usize) -> ParseContext {
    ParseContext {
        schema: Schema::Ca,
        vertex_blob: MaybeEncrypted::Plain(vertex_bytes),
        face_blob: face_bytes,
        vertex_count,
        face_count,
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
fn minimal_triangle() {
    let mut vertex_bytes = Vec::new();
    for v in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
        for component in v {
            vertex_bytes.extend_from_slice(&component.to_le_bytes());
        }
    }

    // three brand-new face-index reads: width opcode 0 (8 bits), raw = 1 each
    let face_bits = bit_writer(&[(0b00, 2), (1, 8), (0b00, 2), (1, 8), (0b00, 2), (1, 8)]);

    let context = base_context(vertex_bytes, face_bits, 3, 1);
    let (mesh, _trace) = decode(&context).unwrap();

    assert_eq!(mesh.vertices, vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    assert_eq!(mesh.faces, vec![[0, 1, 2]]);
}

#[test]
fn count_mismatch_is_rejected() {
    let mut vertex_bytes = Vec::new();
    for _ in 0..3 {
        vertex_bytes.extend_from_slice(&0.0f32.to_le_bytes());
        vertex_bytes.extend_from_slice(&0.0f32.to_le_bytes());
        vertex_bytes.extend_from_slice(&0.0f32.to_le_bytes());
    }
    let face_bits = bit_writer(&[(0b00, 2), (1, 8), (0b00, 2), (1, 8), (0b00, 2), (1, 8)]);

    // envelope declares 5 vertices but the blob only decodes to 3
    let context = base_context(vertex_bytes, face_bits, 5, 1);
    let err = decode(&context).unwrap_err();

    match err {
        hpsdecode::HpsError::Schema(hpsdecode::error::SchemaError::CountMismatch {
            kind,
            expected,
            actual,
        }) => {
            assert_eq!(kind, "vertex");
            assert_eq!(expected, 5);
            assert_eq!(actual, 3);
        }
        other => panic!("expected CountMismatch, got {other:?}"),
    }
}
