//! `CC` decoder: delta-quantized vertex stream, triangle-strip face stream (§4.6)

use super::{read_face_index, read_signed_bits, DecodeTrace};
use crate::command::{FaceCommand, VertexCommand};
use crate::context::ParseContext;
use crate::error::{HpsError, ReaderError};
use crate::mesh::Mesh;
use crate::reader::BitReader;
use crate::uv;

/// Bits subtracted from each axis's width for `DELTA_SHORT` (§13: assumption,
/// the producer's exact reduction constant is unrecoverable without
/// reference files)
const DELTA_SHORT_REDUCTION: u32 = 4;

/// Bits subtracted from each axis's width for `DELTA_LONG` (§13: assumption)
const DELTA_LONG_REDUCTION: u32 = 1;

/// Header flag bit: a `3*vertex_count`-byte BGR color sub-stream follows the
/// vertex stream
const FLAG_HAS_VERTEX_COLORS: u8 = 0b01;

/// Header flag bit: per-vertex UVs are present in `texture_coords_blob`, to
/// be resolved against the decoded face topology once it is known
const FLAG_HAS_PER_VERTEX_UV: u8 = 0b10;

/// Face-blob header flag bit: a run-length-encoded BGR color stream follows
/// the face opcode stream
const FLAG_HAS_FACE_COLORS: u8 = 0b01;

struct VertexHeader {
    min: [f32; 3],
    max: [f32; 3],
    bits: [u32; 3],
    has_vertex_colors: bool,
    has_per_vertex_uv: bool,
}

fn read_vertex_header(reader: &mut BitReader<'_>) -> Result<VertexHeader, HpsError> {
    let min = [
        reader.read_f32_le()?,
        reader.read_f32_le()?,
        reader.read_f32_le()?,
    ];
    let max = [
        reader.read_f32_le()?,
        reader.read_f32_le()?,
        reader.read_f32_le()?,
    ];
    let bits = [
        reader.read_u8()? as u32,
        reader.read_u8()? as u32,
        reader.read_u8()? as u32,
    ];
    let flags = reader.read_u8()?;

    Ok(VertexHeader {
        min,
        max,
        bits,
        has_vertex_colors: flags & FLAG_HAS_VERTEX_COLORS != 0,
        has_per_vertex_uv: flags & FLAG_HAS_PER_VERTEX_UV != 0,
    })
}

fn dequantize(min: f32, max: f32, bits: u32, raw: u32) -> f32 {
    let levels = (1u64 << bits) - 1;
    if levels == 0 {
        return min;
    }
    min + (raw as f32) * (max - min) / (levels as f32)
}

pub(super) fn decode(context: &ParseContext) -> Result<(Mesh, DecodeTrace), HpsError> {
    let vertex_bytes = context
        .vertex_blob
        .as_plain()
        .ok_or_else(|| HpsError::Cryptography("CC vertex blob is not plaintext".into()))?;

    let mut reader = BitReader::new(vertex_bytes);
    let header = read_vertex_header(&mut reader)?;

    let mut vertices = Vec::with_capacity(context.vertex_count);
    let mut vertex_commands = Vec::with_capacity(context.vertex_count);
    let mut raw_state = [0u32; 3];

    for _ in 0..context.vertex_count {
        let opcode = reader.read_bits(2)?;
        match opcode {
            0 => {
                // ABSOLUTE
                let mut raw = [0u32; 3];
                for axis in 0..3 {
                    raw[axis] = reader.read_bits(header.bits[axis])?;
                }
                raw_state = raw;
                vertex_commands.push(VertexCommand::Absolute { raw });
            }
            1 => {
                // DELTA_SHORT
                let mut delta = [0i32; 3];
                for axis in 0..3 {
                    let width = header.bits[axis].saturating_sub(DELTA_SHORT_REDUCTION).max(1);
                    delta[axis] = read_signed_bits(&mut reader, width)?;
                    raw_state[axis] = (raw_state[axis] as i64 + delta[axis] as i64).max(0) as u32;
                }
                vertex_commands.push(VertexCommand::DeltaShort { delta });
            }
            2 => {
                // DELTA_LONG
                let mut delta = [0i32; 3];
                for axis in 0..3 {
                    let width = header.bits[axis].saturating_sub(DELTA_LONG_REDUCTION).max(1);
                    delta[axis] = read_signed_bits(&mut reader, width)?;
                    raw_state[axis] = (raw_state[axis] as i64 + delta[axis] as i64).max(0) as u32;
                }
                vertex_commands.push(VertexCommand::DeltaLong { delta });
            }
            _ => {
                // REPEAT (opcode == 3)
                vertex_commands.push(VertexCommand::Repeat);
            }
        }

        vertices.push([
            dequantize(header.min[0], header.max[0], header.bits[0], raw_state[0]),
            dequantize(header.min[1], header.max[1], header.bits[1], raw_state[1]),
            dequantize(header.min[2], header.max[2], header.bits[2], raw_state[2]),
        ]);
    }

    let vertex_colors = if header.has_vertex_colors {
        let mut colors = Vec::with_capacity(context.vertex_count);
        for _ in 0..context.vertex_count {
            let b = reader.read_u8()?;
            let g = reader.read_u8()?;
            let r = reader.read_u8()?;
            colors.push([r, g, b]);
        }
        colors
    } else {
        Vec::new()
    };

    let (faces, face_commands, face_colors) = decode_faces(context)?;

    let uv = if header.has_per_vertex_uv {
        match &context.texture_coords_blob {
            Some(blob) => {
                let bytes = blob
                    .as_plain()
                    .ok_or_else(|| HpsError::Cryptography("texture coords blob is not plaintext".into()))?;
                let mut uv_reader = BitReader::new(bytes);
                uv::parse_texture_coords(&mut uv_reader, context.vertex_count, &faces)?
            }
            None => Vec::new(),
        }
    } else {
        Vec::new()
    };

    let face_colors = if face_colors.is_empty() {
        match context.default_face_color {
            Some(color) => vec![unpack_rgb(color); faces.len()],
            None => Vec::new(),
        }
    } else {
        face_colors
    };

    let vertex_colors = if vertex_colors.is_empty() {
        match context.default_vertex_color {
            Some(color) => vec![unpack_rgb(color); vertices.len()],
            None => Vec::new(),
        }
    } else {
        vertex_colors
    };

    let mesh = Mesh {
        vertices,
        faces,
        vertex_colors,
        face_colors,
        uv,
        texture_images: Vec::new(),
        splines: context.splines.clone(),
    };

    Ok((
        mesh,
        DecodeTrace {
            vertex_commands,
            face_commands,
        },
    ))
}

fn unpack_rgb(packed: u32) -> [u8; 3] {
    [
        ((packed >> 16) & 0xFF) as u8,
        ((packed >> 8) & 0xFF) as u8,
        (packed & 0xFF) as u8,
    ]
}

fn decode_faces(
    context: &ParseContext,
) -> Result<(Vec<[u32; 3]>, Vec<FaceCommand>, Vec<[u8; 3]>), HpsError> {
    let mut reader = BitReader::new(&context.face_blob);
    let header_flags = reader.read_u8()?;
    let has_face_colors = header_flags & FLAG_HAS_FACE_COLORS != 0;

    let mut faces = Vec::with_capacity(context.face_count);
    let mut commands = Vec::new();
    let mut hwm: u32 = 0;

    let mut strip: Option<(u32, u32, bool)> = None; // (a, b, parity)
    let mut expect_new_strip = true;

    while faces.len() < context.face_count {
        if expect_new_strip {
            let (v0, r0) = read_face_index(&mut reader, &mut hwm)?;
            let (v1, r1) = read_face_index(&mut reader, &mut hwm)?;
            let (v2, r2) = read_face_index(&mut reader, &mut hwm)?;
            faces.push([v0, v1, v2]);
            commands.push(FaceCommand::NewStrip { raw: [r0, r1, r2] });
            strip = Some((v1, v2, false));
            expect_new_strip = false;
            continue;
        }

        let opcode = reader.read_bits(2)?;
        match opcode {
            0 => {
                // EXTEND
                let (v, raw) = read_face_index(&mut reader, &mut hwm)?;
                let (a, b, parity) = strip.ok_or_else(|| {
                    ReaderError::InvalidArgument("EXTEND with no active strip".into())
                })?;
                let face = if parity { [b, a, v] } else { [a, b, v] };
                faces.push(face);
                commands.push(FaceCommand::Extend { raw });
                strip = Some((b, v, !parity));
            }
            1 => {
                // RESTART
                commands.push(FaceCommand::Restart);
                strip = None;
                expect_new_strip = true;
            }
            _ => {
                return Err(ReaderError::InvalidArgument(format!(
                    "unrecognized face opcode {opcode}"
                ))
                .into());
            }
        }
    }

    let face_colors = if has_face_colors {
        let mut colors = Vec::with_capacity(context.face_count);
        while colors.len() < context.face_count {
            let run_length = reader.read_u8()? as usize;
            let b = reader.read_u8()?;
            let g = reader.read_u8()?;
            let r = reader.read_u8()?;
            for _ in 0..run_length {
                colors.push([r, g, b]);
            }
        }
        colors.truncate(context.face_count);
        colors
    } else {
        Vec::new()
    };

    Ok((faces, commands, face_colors))
}
