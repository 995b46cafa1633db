use crate::foundation::core::{CanvasSize, NodeTransform};
use crate::foundation::error::{StageError, StageResult};
use crate::render::backend::{ExportImage, RenderBackend, SurfaceId};
use crate::scene::manager::SceneManager;

/// Side length of the square the selected composition is fitted into when
/// exported on its own.
pub const FRAME_EXPORT_SIZE: f64 = 1500.0;

/// Export the whole canvas at `pixel_ratio`, with selection handles hidden
/// for the readback and restored afterwards on every path.
#[tracing::instrument(skip(backend))]
pub fn export_scene(
    backend: &mut dyn RenderBackend,
    pixel_ratio: f64,
) -> StageResult<ExportImage> {
    let overlay = backend.selection_overlay();
    backend.set_selection_overlay(None);
    let result = backend.export_canvas(pixel_ratio, None);
    backend.set_selection_overlay(overlay);
    result
}

/// Export the selected composition alone, on a transparent background, at a
/// clean high resolution independent of its on-canvas transform.
///
/// The subtree is cloned onto a temporary off-screen surface, its transform
/// reset and rescaled to fit [`FRAME_EXPORT_SIZE`]. Returns `Ok(None)` when
/// nothing is selected. The temporary surface is released on every exit
/// path.
#[tracing::instrument(skip(backend, scene))]
pub fn export_composition(
    backend: &mut dyn RenderBackend,
    scene: &SceneManager,
) -> StageResult<Option<ExportImage>> {
    let Some(comp) = scene.selected_composition() else {
        return Ok(None);
    };
    let root = comp.root;

    let bounds = backend.node_bounds(root);
    if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
        return Err(StageError::validation("selected composition has no extent"));
    }

    let square = CanvasSize::new(FRAME_EXPORT_SIZE as u32, FRAME_EXPORT_SIZE as u32)?;
    let mut guard = OffscreenGuard::create(backend, square);

    let scale = FRAME_EXPORT_SIZE / bounds.width().max(bounds.height());
    let fitted = CanvasSize::new(
        (bounds.width() * scale).round().max(1.0) as u32,
        (bounds.height() * scale).round().max(1.0) as u32,
    )?;

    let image = {
        let (backend, surface) = guard.parts();
        backend.resize_offscreen(surface, fitted)?;
        let clone = backend.clone_subtree_to(root, surface)?;
        // Strip the on-canvas position/rotation/scale; only the fit scale
        // remains, with the subtree's own origin moved to the surface origin.
        backend.set_transform(
            clone,
            NodeTransform {
                x: -bounds.x0 * scale,
                y: -bounds.y0 * scale,
                scale_x: scale,
                scale_y: scale,
                rotation_deg: 0.0,
            },
        );
        backend.export_surface(surface, 1.0, None)?
    };

    drop(guard);
    Ok(Some(image))
}

/// Releases the temporary export surface when dropped, so every exit path
/// (errors included) cleans up.
struct OffscreenGuard<'a> {
    backend: &'a mut dyn RenderBackend,
    surface: SurfaceId,
}

impl<'a> OffscreenGuard<'a> {
    fn create(backend: &'a mut dyn RenderBackend, size: CanvasSize) -> Self {
        let surface = backend.create_offscreen(size);
        Self { backend, surface }
    }

    fn parts(&mut self) -> (&mut dyn RenderBackend, SurfaceId) {
        (&mut *self.backend, self.surface)
    }
}

impl Drop for OffscreenGuard<'_> {
    fn drop(&mut self) {
        self.backend.release_offscreen(self.surface);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/export.rs"]
mod tests;
