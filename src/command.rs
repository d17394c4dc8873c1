//! Tagged opcodes describing the decoder's vertex- and face-stream decisions
//! (§4.4). A schema decoder returns these alongside the decoded [`crate::mesh::Mesh`]
//! so that tests can assert on decoder behavior without re-deriving it.

/// One decision made while decoding the vertex stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VertexCommand {
    /// A full-precision vertex, dequantized from `bx + by + bz` bits
    Absolute {
        /// Quantized position, in `[0, 2^b - 1]` per axis
        raw: [u32; 3],
    },
    /// A vertex encoded as a small signed delta from the previous one
    DeltaShort {
        /// Signed per-axis delta, in the reduced `b - k` bit width
        delta: [i32; 3],
    },
    /// A vertex encoded as a wider signed delta from the previous one
    DeltaLong {
        /// Signed per-axis delta, in the reduced `b - k` bit width
        delta: [i32; 3],
    },
    /// The previous vertex, unchanged
    Repeat,
}

/// One decision made while decoding the face stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FaceCommand {
    /// Begin a new triangle strip with three indices, each a delta from the
    /// high-water mark
    NewStrip {
        /// Raw (pre-resolution) deltas for the three corner indices
        raw: [u32; 3],
    },
    /// Extend the current strip with one new index, a delta from the
    /// high-water mark
    Extend {
        /// Raw (pre-resolution) delta for the new corner index
        raw: u32,
    },
    /// End the current strip; the next command must be [`FaceCommand::NewStrip`]
    Restart,
}
