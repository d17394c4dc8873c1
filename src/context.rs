//! Decoder input types: [`ParseContext`], [`EncryptedBlob`], and [`Spline`] (§3, §6)

use std::collections::BTreeMap;

/// A byte blob that may require Blowfish decryption before use (§3, §4.2)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedBlob {
    /// The on-disk bytes, still encrypted
    pub bytes: Vec<u8>,
    /// The pre-encryption length, when the envelope records it. The decrypted
    /// output is truncated to this length.
    pub original_size: Option<usize>,
    /// Whether this element's XML carried a `Key` attribute, selecting the
    /// scrambled key over the base key (§4.2)
    pub use_scrambled_key: bool,
}

impl EncryptedBlob {
    /// Construct a blob from its raw encrypted bytes
    pub fn new(bytes: impl Into<Vec<u8>>, original_size: Option<usize>, use_scrambled_key: bool) -> Self {
        EncryptedBlob {
            bytes: bytes.into(),
            original_size,
            use_scrambled_key,
        }
    }
}

/// Either plaintext bytes or an [`EncryptedBlob`] awaiting decryption,
/// depending on schema (§3: "for `CE`, `vertex_blob` is an `EncryptedBlob`")
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaybeEncrypted {
    /// Already-decrypted (or never-encrypted) bytes
    Plain(Vec<u8>),
    /// Bytes requiring decryption before use
    Encrypted(EncryptedBlob),
}

impl MaybeEncrypted {
    /// Return the plaintext bytes, if this is already [`MaybeEncrypted::Plain`]
    pub fn as_plain(&self) -> Option<&[u8]> {
        match self {
            MaybeEncrypted::Plain(bytes) => Some(bytes),
            MaybeEncrypted::Encrypted(_) => None,
        }
    }
}

/// A tubular spline annotation, passed through unchanged from the envelope (§6)
#[derive(Debug, Clone, PartialEq)]
pub struct Spline {
    /// The spline's display name
    pub name: String,
    /// Tube radius
    pub radius: f32,
    /// Whether the spline forms a closed loop
    pub is_cyclic: bool,
    /// Packed 24-bit RGB color
    pub color: i32,
    /// Opaque producer-specific metadata (`iMisc1`)
    pub misc: i32,
    /// Control points, `(x, y, z)` triples, in order
    pub control_points: Vec<[f32; 3]>,
}

/// The compression/encryption schema identifier (§1, GLOSSARY)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    /// Raw, uncompressed vertex/face streams
    Ca,
    /// Recognized but unimplemented
    Cb,
    /// Delta-quantized vertex stream plus triangle-strip face stream
    Cc,
    /// `Cc` plus a Blowfish decryption pre-pass
    Ce,
}

impl Schema {
    /// Parse a schema identifier from its XML text form
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "CA" => Some(Schema::Ca),
            "CB" => Some(Schema::Cb),
            "CC" => Some(Schema::Cc),
            "CE" => Some(Schema::Ce),
            _ => None,
        }
    }

    /// The schema's canonical XML name
    pub fn name(self) -> &'static str {
        match self {
            Schema::Ca => "CA",
            Schema::Cb => "CB",
            Schema::Cc => "CC",
            Schema::Ce => "CE",
        }
    }

    /// Whether this schema's blobs may require decryption (only `CE` today)
    pub fn is_encrypted(self) -> bool {
        matches!(self, Schema::Ce)
    }
}

/// Decoder input, assembled by the (out-of-scope) XML envelope parser (§3)
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// Which decoder to dispatch to
    pub schema: Schema,
    /// The vertex-stream payload
    pub vertex_blob: MaybeEncrypted,
    /// The face-stream payload
    pub face_blob: Vec<u8>,
    /// Authoritative vertex count; the decoder must produce exactly this many
    pub vertex_count: usize,
    /// Authoritative face count; the decoder must produce exactly this many
    pub face_count: usize,
    /// Fallback 24-bit packed RGB vertex color, broadcast when no per-vertex
    /// color stream is present
    pub default_vertex_color: Option<u32>,
    /// Fallback 24-bit packed RGB face color, broadcast when no per-face
    /// color stream is present
    pub default_face_color: Option<u32>,
    /// Optional per-vertex color payload
    pub vertex_colors_blob: Option<MaybeEncrypted>,
    /// Optional per-corner texture coordinate payload
    pub texture_coords_blob: Option<MaybeEncrypted>,
    /// Ordered, opaque texture image blobs (possibly encrypted)
    pub texture_images: Vec<MaybeEncrypted>,
    /// Already-parsed spline annotations, passed through
    pub splines: Vec<Spline>,
    /// Adler-32 integrity value for the decrypted vertex stream, `CE` only
    pub check_value: Option<u32>,
    /// String properties from the envelope, consulted for key derivation
    pub properties: BTreeMap<String, String>,
}
