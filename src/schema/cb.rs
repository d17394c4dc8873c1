//! `CB` schema: recognized but not implemented (§1, §11)

use super::DecodeTrace;
use crate::context::ParseContext;
use crate::error::{HpsError, SchemaError};
use crate::mesh::Mesh;

pub(super) fn decode(_context: &ParseContext) -> Result<(Mesh, DecodeTrace), HpsError> {
    Err(SchemaError::UnsupportedSchema("CB".into()).into())
}
