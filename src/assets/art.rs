use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use kurbo::{Point, RoundedRect, Shape as _};

use crate::assets::acquire::{ImageHandle, premultiply_rgba8_in_place};
use crate::catalog::{FrameArt, FrameCatalog, FrameTemplate};
use crate::foundation::core::{Rgba8Premul, parse_hex_color};
use crate::foundation::error::{StageError, StageResult};
use crate::geometry::scaled_region;

/// Prepared frame artwork for the whole catalog.
///
/// Raster sources are read and decoded once up front, so adding a
/// composition later never performs IO.
#[derive(Clone, Debug, Default)]
pub struct ArtStore {
    rasters: HashMap<String, ImageHandle>,
}

impl ArtStore {
    /// Store for catalogs whose templates are all flat artwork (the builtin
    /// catalog). Looking up a raster template through this store is a
    /// resolution error.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Front-load IO for every raster art source in `catalog`, resolving
    /// relative paths against `root`.
    pub fn prepare(catalog: &FrameCatalog, root: impl Into<PathBuf>) -> StageResult<Self> {
        let root = root.into();
        let mut rasters = HashMap::new();

        for frame in &catalog.frames {
            let FrameArt::Raster { source } = &frame.art else {
                continue;
            };
            let path = root.join(Path::new(source));
            let bytes = std::fs::read(&path)
                .with_context(|| format!("read frame art '{}'", path.display()))
                .map_err(StageError::from)?;
            let handle = decode_art(&frame.id, &bytes)?;
            if f64::from(handle.width) != frame.native_width
                || f64::from(handle.height) != frame.native_height
            {
                return Err(StageError::validation(format!(
                    "frame '{}' art is {}x{} but the template declares {}x{}",
                    frame.id, handle.width, handle.height, frame.native_width, frame.native_height
                )));
            }
            rasters.insert(frame.id.clone(), handle);
        }

        Ok(Self { rasters })
    }

    /// Artwork for one template at the given frame scale.
    ///
    /// Raster art is returned at native resolution (the image node scales it
    /// at draw time); flat art is synthesized directly at the rendered size.
    pub fn art_for(&self, template: &FrameTemplate, scale: f64) -> StageResult<ImageHandle> {
        match &template.art {
            FrameArt::Raster { .. } => self.rasters.get(&template.id).cloned().ok_or_else(|| {
                StageError::resolution(format!("frame art for '{}' was not prepared", template.id))
            }),
            FrameArt::Flat {
                bezel,
                corner_radius,
            } => {
                let bezel = parse_hex_color(bezel)?;
                Ok(flat_frame_art(template, scale, bezel, *corner_radius))
            }
        }
    }
}

fn decode_art(frame_id: &str, bytes: &[u8]) -> StageResult<ImageHandle> {
    let dyn_img = image::load_from_memory(bytes)
        .with_context(|| format!("decode frame art for '{frame_id}'"))
        .map_err(|e| StageError::acquisition(e.to_string()))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);
    ImageHandle::from_premul(width, height, rgba8_premul)
}

/// Rasterize a flat bezel plate at the rendered size: the outer rounded
/// rectangle in the bezel color, with the screen region punched out and the
/// island (if any) filled back in, matching the clip mask's cutout exactly.
fn flat_frame_art(
    template: &FrameTemplate,
    scale: f64,
    bezel: Rgba8Premul,
    corner_radius: f64,
) -> ImageHandle {
    let width = (template.native_width * scale).round().max(1.0) as u32;
    let height = (template.native_height * scale).round().max(1.0) as u32;

    let outer = RoundedRect::new(
        0.0,
        0.0,
        f64::from(width),
        f64::from(height),
        corner_radius * scale,
    );
    let region = scaled_region(&template.screen, scale);
    let screen = region.rounded();
    let island = template.screen.island.map(|i| {
        RoundedRect::new(
            i.x * scale,
            i.y * scale,
            (i.x + i.width) * scale,
            (i.y + i.height) * scale,
            i.corner_radius * scale,
        )
    });

    let bezel_px = [bezel.r, bezel.g, bezel.b, bezel.a];
    let mut rgba8_premul = vec![0u8; width as usize * height as usize * 4];
    for y in 0..height {
        for x in 0..width {
            let p = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            let in_screen = screen.contains(p) && !island.is_some_and(|i| i.contains(p));
            if outer.contains(p) && !in_screen {
                let idx = (y as usize * width as usize + x as usize) * 4;
                rgba8_premul[idx..idx + 4].copy_from_slice(&bezel_px);
            }
        }
    }

    ImageHandle {
        width,
        height,
        rgba8_premul: std::sync::Arc::new(rgba8_premul),
    }
}
