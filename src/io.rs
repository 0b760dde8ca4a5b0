//! Snapshot codecs and the `.clq` project file format.
//!
//! The persisted representation of canvas content is raster-only: one
//! PNG-encoded snapshot per project, no stroke-replay log.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, ImageError, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::project::{now_unix, Project};

/// Magic bytes at the start of every `.clq` file.
const CLQ_MAGIC: &[u8; 4] = b"CLQ\x01";

const CLQ_VERSION: u16 = 1;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug)]
pub enum ClqError {
    Io(std::io::Error),
    Serialize(bincode::Error),
    Image(ImageError),
    InvalidFormat(String),
}

impl std::fmt::Display for ClqError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClqError::Io(e) => write!(f, "I/O error: {}", e),
            ClqError::Serialize(e) => write!(f, "serialization error: {}", e),
            ClqError::Image(e) => write!(f, "image error: {}", e),
            ClqError::InvalidFormat(e) => write!(f, "invalid format: {}", e),
        }
    }
}

impl std::error::Error for ClqError {}

impl From<std::io::Error> for ClqError {
    fn from(e: std::io::Error) -> Self {
        ClqError::Io(e)
    }
}

impl From<bincode::Error> for ClqError {
    fn from(e: bincode::Error) -> Self {
        ClqError::Serialize(e)
    }
}

impl From<ImageError> for ClqError {
    fn from(e: ImageError) -> Self {
        ClqError::Image(e)
    }
}

// ============================================================================
// RASTER SNAPSHOT CODECS
// ============================================================================

/// Encode the buffer as PNG bytes.
pub fn encode_png(buffer: &RgbaImage) -> Result<Vec<u8>, ImageError> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out).write_image(
        buffer.as_raw(),
        buffer.width(),
        buffer.height(),
        ColorType::Rgba8,
    )?;
    Ok(out)
}

/// Decode PNG bytes back into an RGBA buffer.
pub fn decode_png(bytes: &[u8]) -> Result<RgbaImage, ImageError> {
    let img = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)?;
    Ok(img.to_rgba8())
}

/// Encode as JPEG at the given quality (clamped to 1–100). JPEG has no
/// transparency, so alpha is flattened onto white first.
pub fn encode_jpeg(buffer: &RgbaImage, quality: u8) -> Result<Vec<u8>, ImageError> {
    let (w, h) = (buffer.width(), buffer.height());
    let mut rgb = RgbImage::new(w, h);
    for (x, y, px) in buffer.enumerate_pixels() {
        let a = px[3] as f32 / 255.0;
        let flatten = |c: u8| (c as f32 * a + 255.0 * (1.0 - a)).round() as u8;
        rgb.put_pixel(x, y, image::Rgb([flatten(px[0]), flatten(px[1]), flatten(px[2])]));
    }
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100)).encode(
        rgb.as_raw(),
        w,
        h,
        ColorType::Rgb8,
    )?;
    Ok(out)
}

// ============================================================================
// .CLQ PROJECT FILES
// ============================================================================

/// On-disk body of a `.clq` file (bincode, after the magic).
#[derive(Serialize, Deserialize)]
struct ClqFileV1 {
    version: u16,
    id: String,
    name: String,
    created_unix: u64,
    modified_unix: u64,
    /// PNG-encoded canvas snapshot.
    snapshot_png: Vec<u8>,
}

/// Write a project and its current canvas snapshot to `path`.
pub fn save_clq(project: &Project, snapshot_png: &[u8], path: &Path) -> Result<(), ClqError> {
    let body = ClqFileV1 {
        version: CLQ_VERSION,
        id: project.id.to_string(),
        name: project.name.clone(),
        created_unix: project.created_unix,
        modified_unix: now_unix(),
        snapshot_png: snapshot_png.to_vec(),
    };

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(CLQ_MAGIC)?;
    bincode::serialize_into(&mut writer, &body)?;
    writer.flush()?;
    Ok(())
}

/// Read a project and its snapshot bytes back from `path`.
pub fn load_clq(path: &Path) -> Result<(Project, Vec<u8>), ClqError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != CLQ_MAGIC {
        return Err(ClqError::InvalidFormat(format!(
            "not a .clq file (magic {:02X?})",
            magic
        )));
    }

    let body: ClqFileV1 = bincode::deserialize_from(&mut reader)?;
    if body.version != CLQ_VERSION {
        return Err(ClqError::InvalidFormat(format!(
            "unsupported .clq version {}",
            body.version
        )));
    }

    let id = Uuid::parse_str(&body.id)
        .map_err(|_| ClqError::InvalidFormat(format!("bad project id {:?}", body.id)))?;
    let project = Project::restored(
        id,
        body.name,
        Some(path.to_path_buf()),
        body.created_unix,
        body.modified_unix,
    );
    Ok((project, body.snapshot_png))
}

// ============================================================================
// TESTS
// ============================================================================
