//! Pure geometry for scaled screen regions and their clip masks.
//!
//! Screen regions and islands are authored in frame-native pixel space; at
//! runtime a composition renders its frame at `scale = rendered width /
//! native width`. Everything here is a pure function of validated input;
//! callers guarantee `scale > 0`.

use kurbo::{Point, Rect, RoundedRect, Shape as _};

use crate::catalog::{IslandRegion, ScreenRegion};
use crate::foundation::core::BezPath;

/// A screen or island rectangle after applying the runtime scale factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaledRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub corner_radius: f64,
}

impl ScaledRect {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn rounded(&self) -> RoundedRect {
        RoundedRect::from_rect(self.rect(), self.corner_radius)
    }
}

/// Scale every linear field of the screen region.
pub fn scaled_region(screen: &ScreenRegion, scale: f64) -> ScaledRect {
    ScaledRect {
        x: screen.x * scale,
        y: screen.y * scale,
        width: screen.width * scale,
        height: screen.height * scale,
        corner_radius: screen.corner_radius * scale,
    }
}

/// Scale the island and re-base its origin to the screen region's origin.
///
/// Islands are authored in frame-native absolute coordinates but are drawn
/// inside the region's local clip space, so the origin subtraction happens
/// before scaling: `island_local = (island.pos - screen.pos) * scale`.
pub fn scaled_island_rect(island: &IslandRegion, screen: &ScreenRegion, scale: f64) -> ScaledRect {
    ScaledRect {
        x: (island.x - screen.x) * scale,
        y: (island.y - screen.y) * scale,
        width: island.width * scale,
        height: island.height * scale,
        corner_radius: island.corner_radius * scale,
    }
}

/// Clip mask for a screen region at the given scale, in region-local
/// coordinates (origin at the region's top-left corner).
///
/// A rounded rectangle covering the full scaled region; when an island is
/// declared, a second rounded-rect subpath is appended so an even-odd fill
/// rule cuts it out. The same mask clips both the upload placeholder and the
/// photo layer, so the cutout is pixel-identical before and after upload.
pub fn screen_clip_path(screen: &ScreenRegion, scale: f64) -> BezPath {
    let region = scaled_region(screen, scale);
    let outer = RoundedRect::new(0.0, 0.0, region.width, region.height, region.corner_radius);

    let mut path = outer.to_path(1e-3);
    if let Some(island) = &screen.island {
        let local = scaled_island_rect(island, screen, scale);
        for el in local.rounded().to_path(1e-3).elements() {
            path.push(*el);
        }
    }
    path
}

/// Even-odd containment test for a clip mask produced by
/// [`screen_clip_path`]: inside the region, outside any island subpath.
pub fn clip_contains(clip: &BezPath, point: Point) -> bool {
    clip.winding(point) % 2 != 0
}

#[cfg(test)]
#[path = "../tests/unit/geometry.rs"]
mod tests;
