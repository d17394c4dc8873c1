//! Error types that this crate can return

use thiserror::Error;

/// Errors from the bit/byte reader (§4.1)
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ReaderError {
    /// A read requested more bits/bytes than remained in the stream
    #[error("unexpected end of {stream}: wanted {wanted} byte(s), have {have}")]
    UnexpectedEof {
        /// Which logical stream was being read (e.g. "vertex stream")
        stream: &'static str,
        /// How many bytes/bits were requested
        wanted: usize,
        /// How many bytes/bits actually remained
        have: usize,
    },

    /// A caller passed an out-of-range argument, e.g. `read_bits(33)`
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Errors from the UV per-corner codec (§4.3)
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum UvError {
    /// A vertex's UV record flag disagreed with its corner degree
    #[error("UV count mismatch at vertex {vertex}: flag {flag:#04x}, corner degree {degree}")]
    UvCountMismatch {
        /// Index of the offending vertex
        vertex: usize,
        /// The flag byte that was read
        flag: u8,
        /// The vertex's actual corner degree
        degree: usize,
    },
}

/// Errors from the `CE` decryption pre-pass (§4.7)
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum IntegrityError {
    /// The reversed Adler-32 of the decrypted vertex stream did not match `check_value`
    #[error("vertex data integrity check failed: expected {expected:#010x}, got {actual:#010x}")]
    IntegrityCheckFailed {
        /// The `check_value` recorded in the envelope
        expected: u32,
        /// The Adler-32 (byte-reversed) actually computed
        actual: u32,
    },
}

/// Errors from mesh-derived views (§6)
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum MeshError {
    /// [`crate::mesh::Mesh::texture_to_vertex_colors`] was called on a mesh with no UV coordinates
    #[error("mesh has no texture coordinates to sample")]
    MissingUvCoordinates,

    /// [`crate::mesh::Mesh::texture_to_vertex_colors`] was given an empty or zero-sized texture
    #[error("no texture images available to sample")]
    NoTextureImage,
}

/// Errors from schema dispatch and structural validation
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SchemaError {
    /// The schema identifier was not one of `CA`/`CB`/`CC`/`CE`, or is recognized
    /// but not implemented (`CB`)
    #[error("unsupported schema: {0}")]
    UnsupportedSchema(String),

    /// A required piece of the parse context was missing or malformed
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// The decoded vertex or face count did not match the envelope's declared count
    #[error("{kind} count mismatch: expected {expected}, got {actual}")]
    CountMismatch {
        /// What was being counted ("vertex" or "face")
        kind: &'static str,
        /// The count declared by the envelope
        expected: usize,
        /// The count actually produced by the decoder
        actual: usize,
    },

    /// A face referenced a vertex index outside `[0, vertex_count)`
    #[error("face {face} corner {corner} has out-of-range index {value} (vertex_count={max})")]
    InvalidIndex {
        /// Index of the offending face
        face: usize,
        /// Which corner of the face (0, 1, or 2)
        corner: u8,
        /// The out-of-range vertex index read from the stream
        value: u32,
        /// The exclusive upper bound (`vertex_count`)
        max: u32,
    },
}

/// Top-level error returned by a schema decoder
#[derive(Debug, Error)]
pub enum HpsError {
    /// Bit/byte reader error
    #[error(transparent)]
    Reader(#[from] ReaderError),

    /// UV codec error
    #[error(transparent)]
    Uv(#[from] UvError),

    /// Decryption integrity-check error
    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    /// Schema-level structural error
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Mesh-derived-view error
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// A cryptographic primitive rejected its input (e.g. bad key length)
    #[error("cryptography error: {0}")]
    Cryptography(String),
}
