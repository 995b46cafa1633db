use crate::foundation::core::{Affine, Point, Vec2};

/// Lower zoom clamp for the whole-canvas viewport.
pub const MIN_SCALE: f64 = 0.1;
/// Upper zoom clamp for the whole-canvas viewport.
pub const MAX_SCALE: f64 = 4.0;

/// Global pan/zoom applied to the whole canvas surface.
///
/// Independent of any composition's own transform: it repositions the canvas
/// container, not individual nodes. Initialized to `{1, 0, 0}` and mutated
/// only by the viewport controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportTransform {
    pub scale: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

impl ViewportTransform {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Zoom by `factor` keeping the canvas point under `anchor` (view
    /// coordinates) fixed.
    ///
    /// The requested scale is clamped to `[MIN_SCALE, MAX_SCALE]` *before*
    /// the pan correction, so the anchor math uses the scale delta that was
    /// actually applied, not the requested one.
    pub fn zoom_about(&mut self, anchor: Point, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let old_scale = self.scale;
        let new_scale = (old_scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        if new_scale == old_scale {
            return;
        }

        let ratio = new_scale / old_scale - 1.0;
        self.pan_x -= (anchor.x - self.pan_x) * ratio;
        self.pan_y -= (anchor.y - self.pan_y) * ratio;
        self.scale = new_scale;
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan_x += delta.x;
        self.pan_y += delta.y;
    }

    /// Map a point from view/device space into canvas space.
    pub fn view_to_canvas(&self, p: Point) -> Point {
        Point::new((p.x - self.pan_x) / self.scale, (p.y - self.pan_y) / self.scale)
    }

    /// Map a point from canvas space into view/device space.
    pub fn canvas_to_view(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.pan_x, p.y * self.scale + self.pan_y)
    }

    pub fn to_affine(&self) -> Affine {
        Affine::translate((self.pan_x, self.pan_y)) * Affine::scale(self.scale)
    }
}
