//! Schema dispatch: selects and runs the right decoder for a [`ParseContext`] (§1, §4.5-4.7)

mod ca;
mod cb;
mod cc;
mod ce;

use crate::command::{FaceCommand, VertexCommand};
use crate::context::{ParseContext, Schema};
use crate::error::{HpsError, ReaderError, SchemaError};
use crate::key::KeyProvider;
use crate::mesh::Mesh;
use crate::reader::BitReader;

/// The opcode sequence a decoder executed, returned alongside its [`Mesh`] so
/// that tests and forensic tooling can assert on decoder decisions (§2, §4.4)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeTrace {
    /// Vertex-stream commands, in stream order
    pub vertex_commands: Vec<VertexCommand>,
    /// Face-stream commands, in stream order
    pub face_commands: Vec<FaceCommand>,
}

/// Decode `context` with the decoder selected by `context.schema`. For `CE`,
/// the Blowfish base key is read from the `HPS_ENCRYPTION_KEY` environment
/// variable; use [`decode_with_key_provider`] to source it elsewhere.
pub fn decode(context: &ParseContext) -> Result<(Mesh, DecodeTrace), HpsError> {
    let (mesh, trace) = match context.schema {
        Schema::Ca => ca::decode(context)?,
        Schema::Cb => cb::decode(context)?,
        Schema::Cc => cc::decode(context)?,
        Schema::Ce => ce::decode(context)?,
    };

    validate_counts(&mesh, context)?;
    validate_indices(&mesh)?;

    Ok((mesh, trace))
}

/// Decode `context`, sourcing the `CE` Blowfish base key from `key_provider`
/// instead of the environment. Schemas other than `CE` ignore `key_provider`.
pub fn decode_with_key_provider(
    context: &ParseContext,
    key_provider: &dyn KeyProvider,
) -> Result<(Mesh, DecodeTrace), HpsError> {
    let (mesh, trace) = match context.schema {
        Schema::Ca => ca::decode(context)?,
        Schema::Cb => cb::decode(context)?,
        Schema::Cc => cc::decode(context)?,
        Schema::Ce => {
            let base_key = key_provider.base_key(&context.properties)?;
            ce::decode_with_base_key(context, &base_key)?
        }
    };

    validate_counts(&mesh, context)?;
    validate_indices(&mesh)?;

    Ok((mesh, trace))
}

fn validate_counts(mesh: &Mesh, context: &ParseContext) -> Result<(), SchemaError> {
    if mesh.vertices.len() != context.vertex_count {
        return Err(SchemaError::CountMismatch {
            kind: "vertex",
            expected: context.vertex_count,
            actual: mesh.vertices.len(),
        });
    }

    if mesh.faces.len() != context.face_count {
        return Err(SchemaError::CountMismatch {
            kind: "face",
            expected: context.face_count,
            actual: mesh.faces.len(),
        });
    }

    Ok(())
}

/// Widths, in bits, selected by the 2-bit opcode prefixing each raw face
/// index in both the `CA` and `CC` face streams (§4.5, §13: the producer's
/// exact width table is unrecoverable without reference files; this is the
/// simplest table consistent with the documented high-water-mark scheme).
const FACE_INDEX_WIDTHS: [u32; 4] = [8, 16, 24, 32];

/// Read one high-water-mark-relative face index: a 2-bit width opcode, then
/// a raw unsigned value of that width. Returns the resolved vertex index.
///
/// `raw == 1` introduces a brand-new vertex (one past the current high-water
/// mark); any other `raw` references an already-emitted vertex,
/// `hwm + 1 - raw` (§4.6). `hwm` is the count of vertices introduced so far,
/// i.e. one past the highest index currently in use; the caller passes it by
/// `&mut` so it can be bumped when a new vertex is introduced.
pub(crate) fn read_face_index(reader: &mut BitReader<'_>, hwm: &mut u32) -> Result<(u32, u32), HpsError> {
    let width_opcode = reader.read_bits(2)?;
    let width = FACE_INDEX_WIDTHS
        .get(width_opcode as usize)
        .copied()
        .ok_or_else(|| ReaderError::InvalidArgument(format!("bad face index width opcode {width_opcode}")))?;

    let raw = reader.read_bits(width)?;
    if raw == 0 {
        return Err(ReaderError::InvalidArgument("face index delta of 0 is invalid".into()).into());
    }
    if raw > *hwm + 1 {
        return Err(ReaderError::InvalidArgument(format!(
            "face index delta {raw} exceeds high-water mark {hwm} + 1"
        ))
        .into());
    }

    let index = *hwm + 1 - raw;
    if raw == 1 {
        *hwm += 1;
    }

    Ok((index, raw))
}

/// Read a `width`-bit two's-complement signed integer (1 ≤ `width` ≤ 32)
pub(crate) fn read_signed_bits(reader: &mut BitReader<'_>, width: u32) -> Result<i32, HpsError> {
    let raw = reader.read_bits(width)?;
    let sign_bit = 1u32 << (width - 1);

    let value = if raw & sign_bit != 0 {
        raw as i64 - (1i64 << width)
    } else {
        raw as i64
    };

    Ok(value as i32)
}

fn validate_indices(mesh: &Mesh) -> Result<(), SchemaError> {
    let max = mesh.vertices.len() as u32;

    for (face_idx, face) in mesh.faces.iter().enumerate() {
        for (corner, &value) in face.iter().enumerate() {
            if value >= max {
                return Err(SchemaError::InvalidIndex {
                    face: face_idx,
                    corner: corner as u8,
                    value,
                    max,
                });
            }
        }
    }

    Ok(())
}
