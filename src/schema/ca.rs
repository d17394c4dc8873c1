//! `CA` decoder: raw float-triple vertex stream, high-water-mark face stream (§4.5)

use super::{read_face_index, DecodeTrace};
use crate::command::FaceCommand;
use crate::context::ParseContext;
use crate::error::HpsError;
use crate::mesh::Mesh;
use crate::reader::BitReader;

pub(super) fn decode(context: &ParseContext) -> Result<(Mesh, DecodeTrace), HpsError> {
    let vertex_bytes = context
        .vertex_blob
        .as_plain()
        .ok_or_else(|| HpsError::Cryptography("CA vertex blob is not plaintext".into()))?;

    // The vertex count actually present is derived from the blob's own
    // length rather than trusted from the envelope, so a declared/actual
    // mismatch surfaces as `SchemaError::CountMismatch` (§8, scenario 6)
    // instead of a spurious end-of-stream error.
    let actual_vertex_count = vertex_bytes.len() / 12;

    let mut vertex_reader = BitReader::new(vertex_bytes);
    let mut vertices = Vec::with_capacity(actual_vertex_count);
    for _ in 0..actual_vertex_count {
        let x = vertex_reader.read_f32_le()?;
        let y = vertex_reader.read_f32_le()?;
        let z = vertex_reader.read_f32_le()?;
        vertices.push([x, y, z]);
    }

    let mut face_reader = BitReader::new(&context.face_blob);
    let mut faces = Vec::with_capacity(context.face_count);
    let mut face_commands = Vec::with_capacity(context.face_count);
    let mut hwm: u32 = 0;

    for _ in 0..context.face_count {
        let mut raw = [0u32; 3];
        let mut corner = [0u32; 3];
        for i in 0..3 {
            let (index, raw_value) = read_face_index(&mut face_reader, &mut hwm)?;
            corner[i] = index;
            raw[i] = raw_value;
        }
        faces.push(corner);
        face_commands.push(FaceCommand::NewStrip { raw });
    }

    let vertex_colors = match context.default_vertex_color {
        Some(color) => vec![unpack_rgb(color); vertices.len()],
        None => Vec::new(),
    };
    let face_colors = match context.default_face_color {
        Some(color) => vec![unpack_rgb(color); faces.len()],
        None => Vec::new(),
    };

    let mesh = Mesh {
        vertices,
        faces,
        vertex_colors,
        face_colors,
        uv: Vec::new(),
        texture_images: Vec::new(),
        splines: context.splines.clone(),
    };

    Ok((
        mesh,
        DecodeTrace {
            vertex_commands: Vec::new(),
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
