//! Decoder for the HIMSA Packed Standard (HPS) dental scan mesh container.
//!
//! This crate decodes the binary vertex/face/texture streams embedded inside
//! an HPS file's `CA`, `CC`, or `CE` schema once the surrounding XML envelope
//! has already been parsed into a [`context::ParseContext`] (parsing that
//! envelope is out of scope here, matching the original's split between
//! envelope and binary decoding). Call [`schema::decode`] to turn a context
//! into a [`mesh::Mesh`].

#![warn(missing_docs)]

pub mod command;
pub mod context;
mod crypt;
pub mod error;
pub mod key;
pub mod mesh;
pub mod reader;
pub mod schema;
pub mod uv;

pub use context::{EncryptedBlob, MaybeEncrypted, ParseContext, Schema, Spline};
pub use error::HpsError;
pub use key::{ClosureKeyProvider, EnvKeyProvider, KeyProvider, StaticKeyProvider};
pub use mesh::{DecodedTexture, Mesh};
pub use schema::{decode, decode_with_key_provider, DecodeTrace};
