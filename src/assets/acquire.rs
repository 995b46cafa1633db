use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::error::{StageError, StageResult};
use crate::scene::node::CompositionId;

/// Maximum accepted upload size.
pub const MAX_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

/// A decoded image in premultiplied RGBA8, cheap to clone and share.
///
/// Frame swap re-applies the photo by handle, never by re-reading storage.
#[derive(Clone, Debug)]
pub struct ImageHandle {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl ImageHandle {
    /// Wrap raw premultiplied RGBA8 pixels.
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> StageResult<Self> {
        if width == 0 || height == 0 {
            return Err(StageError::acquisition("image dimensions must be > 0"));
        }
        if rgba8_premul.len() != (width as usize) * (height as usize) * 4 {
            return Err(StageError::acquisition("image buffer length mismatch"));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// Premultiplied pixel at `(x, y)`; transparent outside the image.
    pub fn pixel(&self, x: i64, y: i64) -> [u8; 4] {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return [0, 0, 0, 0];
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let px = &self.rgba8_premul[idx..idx + 4];
        [px[0], px[1], px[2], px[3]]
    }
}

/// A file handed over by the host's file picker.
#[derive(Clone, Debug)]
pub struct UploadedFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Read a file from disk, deriving the MIME type from its extension.
    /// Project loading and the CLI use this; interactive hosts hand over
    /// picker results directly.
    pub fn from_path(path: &std::path::Path) -> StageResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read upload '{}'", path.display()))
            .map_err(StageError::from)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime = match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            Some("bmp") => "image/bmp",
            _ => "application/octet-stream",
        }
        .to_string();
        Ok(Self { name, mime, bytes })
    }
}

/// Gate an upload before any decoding or state mutation happens.
///
/// Rejections are [`StageError::Validation`] and leave every composition
/// untouched.
pub fn validate_upload(file: &UploadedFile) -> StageResult<()> {
    if !file.mime.starts_with("image/") {
        return Err(StageError::validation(format!(
            "'{}' is not an image (type '{}')",
            file.name, file.mime
        )));
    }
    if file.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(StageError::validation(format!(
            "'{}' exceeds the 8MB upload limit",
            file.name
        )));
    }
    Ok(())
}

/// Decode an already-validated upload into a premultiplied [`ImageHandle`].
pub fn decode_upload(file: &UploadedFile) -> StageResult<ImageHandle> {
    let dyn_img = image::load_from_memory(&file.bytes)
        .with_context(|| format!("decode image '{}'", file.name))
        .map_err(|e| StageError::acquisition(e.to_string()))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    ImageHandle::from_premul(width, height, rgba8_premul)
}

/// One in-flight image acquisition, tagged with its target composition's
/// generation at issue time.
///
/// Acquisitions are single-shot deferred computations with exactly one
/// success or failure outcome and no cancellation. A newer acquisition bumps
/// the generation, so a slower older one completes stale and is discarded
/// instead of clobbering the newer photo.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AcquisitionTicket {
    pub composition: CompositionId,
    pub generation: u64,
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/acquire.rs"]
mod tests;
