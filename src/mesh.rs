//! Decoded mesh output and its derived views (§3, §6)

/// Decoded 3D mesh (decoder output)
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Vertex positions, `(x, y, z)` per vertex
    pub vertices: Vec<[f32; 3]>,
    /// Triangle face indices into `vertices`, each strictly less than `vertices.len()`
    pub faces: Vec<[u32; 3]>,
    /// Per-vertex RGB colors, or empty if not present
    pub vertex_colors: Vec<[u8; 3]>,
    /// Per-face RGB colors, or empty if not present
    pub face_colors: Vec<[u8; 3]>,
    /// Per-corner texture coordinates, length `3 * faces.len()`, or empty
    pub uv: Vec<(f32, f32)>,
    /// Opaque decoded texture image blobs, in envelope order
    pub texture_images: Vec<Vec<u8>>,
    /// Passthrough spline annotations
    pub splines: Vec<crate::context::Spline>,
}

/// An already-decoded RGB(ish) pixel buffer sampled by [`texture_to_vertex_colors`].
///
/// Decoding the image codec (JPEG/PNG/...) that produced this buffer is not
/// this crate's concern; `pixels` is expected to already be plain BGR bytes,
/// matching how this format stores texture images (§9: "Texture BGR↔RGB").
pub struct DecodedTexture<'a> {
    /// Pixel width
    pub width: u32,
    /// Pixel height
    pub height: u32,
    /// `width * height * 3` BGR bytes, row-major, top-to-bottom
    pub pixels: &'a [u8],
}

impl Mesh {
    /// Derive a per-vertex color for every vertex by averaging the color of
    /// each face that touches it (area-independent mean), per §6's exporter
    /// contract. Vertices touched by no face keep `(0, 0, 0)`.
    pub fn face_colors_to_vertex_colors(&self) -> Vec<[u8; 3]> {
        let mut sums = vec![[0u32; 3]; self.vertices.len()];
        let mut counts = vec![0u32; self.vertices.len()];

        for (face, color) in self.faces.iter().zip(self.face_colors.iter()) {
            for &vertex_idx in face {
                if let (Some(sum), Some(count)) = (
                    sums.get_mut(vertex_idx as usize),
                    counts.get_mut(vertex_idx as usize),
                ) {
                    for channel in 0..3 {
                        sum[channel] += color[channel] as u32;
                    }
                    *count += 1;
                }
            }
        }

        sums.iter()
            .zip(counts.iter())
            .map(|(sum, &count)| {
                if count == 0 {
                    [0, 0, 0]
                } else {
                    let mut out = [0u8; 3];
                    for channel in 0..3 {
                        out[channel] = (sum[channel] / count) as u8;
                    }
                    out
                }
            })
            .collect()
    }

    /// Derive a per-vertex color by sampling `texture` at each corner's UV
    /// coordinate and averaging over corners touching that vertex, per §6's
    /// exporter contract. Vertices touched by no textured corner fall back to
    /// `(128, 128, 128)`. Coordinates outside `[0, 1]` are clamped to the
    /// texture edge.
    pub fn texture_to_vertex_colors(&self, texture: &DecodedTexture<'_>) -> Result<Vec<[u8; 3]>, crate::error::HpsError> {
        if self.uv.is_empty() {
            return Err(crate::error::MeshError::MissingUvCoordinates.into());
        }
        if texture.pixels.is_empty() || texture.width == 0 || texture.height == 0 {
            return Err(crate::error::MeshError::NoTextureImage.into());
        }

        let mut sums = vec![[0u32; 3]; self.vertices.len()];
        let mut counts = vec![0u32; self.vertices.len()];

        for (face, corners) in self.faces.iter().zip(self.uv.chunks_exact(3)) {
            for (&vertex_idx, &(u, v)) in face.iter().zip(corners.iter()) {
                let bgr = sample_texture(texture, u, v);
                if let (Some(sum), Some(count)) = (
                    sums.get_mut(vertex_idx as usize),
                    counts.get_mut(vertex_idx as usize),
                ) {
                    // texture bytes are BGR; swap to RGB on accumulation
                    sum[0] += bgr[2] as u32;
                    sum[1] += bgr[1] as u32;
                    sum[2] += bgr[0] as u32;
                    *count += 1;
                }
            }
        }

        Ok(sums
            .iter()
            .zip(counts.iter())
            .map(|(sum, &count)| {
                if count == 0 {
                    [128, 128, 128]
                } else {
                    let mut out = [0u8; 3];
                    for channel in 0..3 {
                        out[channel] = (sum[channel] / count) as u8;
                    }
                    out
                }
            })
            .collect())
    }
}

fn sample_texture(texture: &DecodedTexture<'_>, u: f32, v: f32) -> [u8; 3] {
    let x = (u.clamp(0.0, 1.0) * (texture.width.saturating_sub(1)) as f32).round() as u32;
    let y = (v.clamp(0.0, 1.0) * (texture.height.saturating_sub(1)) as f32).round() as u32;

    let offset = ((y * texture.width + x) as usize) * 3;
    match texture.pixels.get(offset..offset + 3) {
        Some(px) => [px[0], px[1], px[2]],
        None => [0, 0, 0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_mesh() -> Mesh {
        Mesh {
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            faces: vec![[0, 1, 2]],
            vertex_colors: Vec::new(),
            face_colors: vec![[255, 128, 64]],
            uv: Vec::new(),
            texture_images: Vec::new(),
            splines: Vec::new(),
        }
    }

    #[test]
    fn face_colors_single_face_per_vertex() {
        let mesh = triangle_mesh();
        let result = mesh.face_colors_to_vertex_colors();
        assert_eq!(result, vec![[255, 128, 64]; 3]);
    }

    #[test]
    fn face_colors_averages_across_shared_vertices() {
        let mesh = Mesh {
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
            faces: vec![[0, 1, 2], [1, 3, 2]],
            vertex_colors: Vec::new(),
            face_colors: vec![[100, 0, 0], [200, 0, 0]],
            uv: Vec::new(),
            texture_images: Vec::new(),
            splines: Vec::new(),
        };

        let result = mesh.face_colors_to_vertex_colors();
        assert_eq!(result[0][0], 100);
        assert_eq!(result[1][0], 150);
        assert_eq!(result[2][0], 150);
        assert_eq!(result[3][0], 200);
    }

    #[test]
    fn texture_sampling_swaps_bgr_to_rgb() {
        let mut mesh = triangle_mesh();
        mesh.uv = vec![(0.0, 0.0), (0.0, 0.0), (0.0, 0.0)];

        // single BGR pixel: blue=255, green=128, red=64
        let pixels = [255u8, 128, 64];
        let texture = DecodedTexture {
            width: 1,
            height: 1,
            pixels: &pixels,
        };

        let result = mesh.texture_to_vertex_colors(&texture).unwrap();
        assert_eq!(result[0], [64, 128, 255]);
    }

    #[test]
    fn texture_sampling_defaults_untouched_vertices() {
        let mesh = Mesh {
            vertices: vec![[0.0, 0.0, 0.0]],
            faces: Vec::new(),
            vertex_colors: Vec::new(),
            face_colors: Vec::new(),
            uv: vec![(0.0, 0.0), (0.0, 0.0), (0.0, 0.0)],
            texture_images: Vec::new(),
            splines: Vec::new(),
        };

        let pixels = [10u8, 20, 30];
        let texture = DecodedTexture {
            width: 1,
            height: 1,
            pixels: &pixels,
        };

        let result = mesh.texture_to_vertex_colors(&texture).unwrap();
        assert_eq!(result[0], [128, 128, 128]);
    }

    #[test]
    fn texture_sampling_without_uv_errors() {
        let mesh = triangle_mesh();
        let pixels = [10u8, 20, 30];
        let texture = DecodedTexture {
            width: 1,
            height: 1,
            pixels: &pixels,
        };
        let err = mesh.texture_to_vertex_colors(&texture).unwrap_err();
        assert!(matches!(
            err,
            crate::error::HpsError::Mesh(crate::error::MeshError::MissingUvCoordinates)
        ));
    }

    #[test]
    fn texture_sampling_without_texture_errors() {
        let mut mesh = triangle_mesh();
        mesh.uv = vec![(0.0, 0.0), (0.0, 0.0), (0.0, 0.0)];
        let pixels: [u8; 0] = [];
        let texture = DecodedTexture {
            width: 0,
            height: 0,
            pixels: &pixels,
        };
        let err = mesh.texture_to_vertex_colors(&texture).unwrap_err();
        assert!(matches!(
            err,
            crate::error::HpsError::Mesh(crate::error::MeshError::NoTextureImage)
        ));
    }
}
