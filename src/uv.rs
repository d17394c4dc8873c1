//! Per-corner texture coordinate (UV) codec (§4.3)

use crate::error::{HpsError, UvError};
use crate::reader::BitReader;

/// Bit 15 of each 16-bit component: 0 = value lies in `[0, 1]`, 1 = `[-256, 256]`
const OUTSIDE_RANGE_BIT: u16 = 0x8000;

/// Mask for the lower 15 bits of a 16-bit component
const COORD_MASK: u16 = 0x7FFF;

/// Scale factor mapping `[0, 32767]` onto `[0, 1]`
const SCALE_INSIDE: f32 = 1.0 / 32767.0;

/// Scale factor mapping `[0, 32767]` onto `[-256, 256]`
const SCALE_OUTSIDE: f32 = 512.0 / 32767.0;

/// Sentinel 32-bit value meaning "no texture coordinate at this corner"
const NO_UV_MARKER: u32 = 0xFFFF_FFFF;

/// Flag byte meaning "one UV shared by every corner touching this vertex"
const FLAG_SHARED: u8 = 1;

/// Flag byte meaning "one UV per corner, count not pre-validated against degree"
const FLAG_PER_CORNER: u8 = 0xFF;

/// Decompress one 32-bit packed (U, V) pair into floating-point texture
/// coordinates.
///
/// Each 16-bit half stores a range flag in bit 15 and a 15-bit magnitude in
/// the low bits: `0` selects `[0, 1]`, `1` selects `[-256, 256]`.
pub fn decompress_texture_coord(compressed: u32) -> (f32, f32) {
    let u_bits = (compressed & 0xFFFF) as u16;
    let v_bits = ((compressed >> 16) & 0xFFFF) as u16;
    (decompress_component(u_bits), decompress_component(v_bits))
}

fn decompress_component(bits: u16) -> f32 {
    let value = (bits & COORD_MASK) as f32;
    if bits & OUTSIDE_RANGE_BIT != 0 {
        (value * SCALE_OUTSIDE) - 256.0
    } else {
        value * SCALE_INSIDE
    }
}

/// Parse per-corner UV coordinates for a mesh with `num_vertices` vertices and
/// `faces` (each a `[vertex_index; 3]` triple), returning one `(u, v)` pair
/// per corner in `faces.len() * 3` order (face-major, then corner 0/1/2).
///
/// For each vertex, in ascending vertex-index order, a flag byte selects how
/// many packed UVs follow: `1` means a single UV shared by every corner
/// touching that vertex, `0xFF` means one UV per touching corner (read in
/// ascending face-index order) without validating the count, and any other
/// value must equal the vertex's corner degree or [`UvError::UvCountMismatch`]
/// is returned. `0xFFFFFFFF` marks an absent coordinate and leaves the
/// corresponding corner(s) at `(0.0, 0.0)`.
pub fn parse_texture_coords(
    reader: &mut BitReader<'_>,
    num_vertices: usize,
    faces: &[[u32; 3]],
) -> Result<Vec<(f32, f32)>, HpsError> {
    let mut uvs = vec![(0.0f32, 0.0f32); faces.len() * 3];

    let mut vertex_corners: Vec<Vec<usize>> = vec![Vec::new(); num_vertices];
    for (face_idx, face) in faces.iter().enumerate() {
        for (corner_in_face, &vertex_idx) in face.iter().enumerate() {
            if let Some(corners) = vertex_corners.get_mut(vertex_idx as usize) {
                corners.push(face_idx * 3 + corner_in_face);
            }
        }
    }

    for (vertex_idx, corners) in vertex_corners.iter().enumerate() {
        let flag = reader.read_u8()?;

        if flag == FLAG_SHARED {
            let compressed = reader.read_u32_le()?;
            if compressed != NO_UV_MARKER {
                let uv = decompress_texture_coord(compressed);
                for &corner in corners {
                    uvs[corner] = uv;
                }
            }
            continue;
        }

        if flag != FLAG_PER_CORNER && flag as usize != corners.len() {
            return Err(UvError::UvCountMismatch {
                vertex: vertex_idx,
                flag,
                degree: corners.len(),
            }
            .into());
        }

        let mut corners_sorted = corners.clone();
        corners_sorted.sort_unstable_by_key(|&corner| corner / 3);

        for corner in corners_sorted {
            let compressed = reader.read_u32_le()?;
            if compressed != NO_UV_MARKER {
                uvs[corner] = decompress_texture_coord(compressed);
            }
        }
    }

    Ok(uvs)
}
