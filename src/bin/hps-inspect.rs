/// utility to decode a separated HPS binary payload and print a mesh summary
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use hpsdecode::context::{MaybeEncrypted, Schema, Spline};
use hpsdecode::key::StaticKeyProvider;
use hpsdecode::{decode, decode_with_key_provider, EncryptedBlob, ParseContext};

/// Decode an HPS binary payload (vertex and face streams already separated
/// from their XML envelope) and print a summary of the resulting mesh
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Schema of the payload: CA, CC, or CE
    #[arg(long)]
    schema: String,

    /// Path to the raw vertex stream
    #[arg(long)]
    vertex_blob: PathBuf,

    /// Path to the raw face stream
    #[arg(long)]
    face_blob: PathBuf,

    /// Number of vertices the envelope declares
    #[arg(long)]
    vertex_count: usize,

    /// Number of faces the envelope declares
    #[arg(long)]
    face_count: usize,

    /// Whether `vertex_blob` is still Blowfish-encrypted (`CE` only)
    #[arg(long)]
    encrypted: bool,

    /// Pre-encryption length of `vertex_blob`, if known (`CE` only)
    #[arg(long)]
    original_size: Option<usize>,

    /// Blowfish base key, accepting the same encodings as the original CLI:
    /// comma-separated decimal bytes, hex (optionally `0x`-prefixed), or a
    /// raw string. Falls back to the `HPS_ENCRYPTION_KEY` environment
    /// variable when omitted.
    #[arg(short = 'k', long)]
    key: Option<String>,
}

pub fn main() -> Result<()> {
    let args = Args::parse();

    let schema = Schema::from_name(&args.schema.to_uppercase())
        .with_context(|| format!("unrecognized schema: {}", args.schema))?;

    let vertex_bytes =
        fs::read(&args.vertex_blob).with_context(|| format!("reading {}", args.vertex_blob.display()))?;
    let face_blob =
        fs::read(&args.face_blob).with_context(|| format!("reading {}", args.face_blob.display()))?;

    let vertex_blob = if args.encrypted {
        MaybeEncrypted::Encrypted(EncryptedBlob::new(vertex_bytes, args.original_size, false))
    } else {
        MaybeEncrypted::Plain(vertex_bytes)
    };

    let context = ParseContext {
        schema,
        vertex_blob,
        face_blob,
        vertex_count: args.vertex_count,
        face_count: args.face_count,
        default_vertex_color: None,
        default_face_color: None,
        vertex_colors_blob: None,
        texture_coords_blob: None,
        texture_images: Vec::new(),
        splines: Vec::<Spline>::new(),
        check_value: None,
        properties: Default::default(),
    };

    let result = match args.key {
        Some(raw_key) => {
            let provider = StaticKeyProvider::new(hpsdecode::key::decode_key_string(&raw_key));
            decode_with_key_provider(&context, &provider)
        }
        None => decode(&context),
    };

    let (mesh, _trace) = match result {
        Ok(decoded) => decoded,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };

    println!("vertices:        {}", mesh.vertices.len());
    println!("faces:            {}", mesh.faces.len());
    println!("vertex colors:    {}", mesh.vertex_colors.len());
    println!("face colors:      {}", mesh.face_colors.len());
    println!("texture coords:   {}", mesh.uv.len());
    println!("texture images:   {}", mesh.texture_images.len());
    println!("splines:          {}", mesh.splines.len());

    Ok(())
}
