use crate::assets::acquire::{AcquisitionTicket, ImageHandle};
use crate::assets::art::ArtStore;
use crate::catalog::{FrameCatalog, FrameTemplate};
use crate::foundation::core::{CanvasSize, NodeTransform, Point, Rgba8Premul};
use crate::foundation::error::{StageError, StageResult};
use crate::geometry::{scaled_region, screen_clip_path};
use crate::layout::fit::cover_fit;
use crate::render::backend::{NodeId, RenderBackend};
use crate::scene::node::{Composition, CompositionId, Content, PhotoNode, PlaceholderNode};

/// New compositions are sized so the tallest catalog frame fills this share
/// of the stage's native height; everything else scales proportionally so
/// devices stay visually comparable.
const STAGE_HEIGHT_SHARE: f64 = 0.8;

const PLACEHOLDER_TINT: Rgba8Premul = Rgba8Premul {
    r: 214,
    g: 214,
    b: 214,
    a: 255,
};

/// Lucide-style upload glyph drawn inside the placeholder.
const UPLOAD_ICON: &str = "M21 15v4a2 2 0 0 1-2 2H5a2 2 0 0 1-2-2v-4 M17 8l-5-5-5 5 M12 3v12";

/// Enable/disable signals for the UI affordances that depend on a selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UiAffordances {
    pub can_delete: bool,
    pub can_export_frame: bool,
    pub can_swap: bool,
}

/// Owns the list of live compositions and the exclusive selection, and wires
/// placeholder-to-photo replacement against the render backend.
#[derive(Debug)]
pub struct SceneManager {
    catalog: FrameCatalog,
    art: ArtStore,
    /// Stage height captured at startup; the display-scale rule keeps using
    /// it even after canvas resizes, so existing and future compositions
    /// stay comparable.
    initial_height: f64,
    compositions: Vec<Composition>,
    selected: Option<CompositionId>,
    last_added: Option<CompositionId>,
    next_id: u64,
}

impl SceneManager {
    pub fn new(catalog: FrameCatalog, art: ArtStore, stage: CanvasSize) -> Self {
        Self {
            catalog,
            art,
            initial_height: f64::from(stage.height),
            compositions: Vec::new(),
            selected: None,
            last_added: None,
            next_id: 1,
        }
    }

    pub fn catalog(&self) -> &FrameCatalog {
        &self.catalog
    }

    pub fn compositions(&self) -> &[Composition] {
        &self.compositions
    }

    pub fn get(&self, id: CompositionId) -> Option<&Composition> {
        self.compositions.iter().find(|c| c.id == id)
    }

    pub fn selected(&self) -> Option<CompositionId> {
        self.selected
    }

    pub fn selected_composition(&self) -> Option<&Composition> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn has_selection(&self) -> bool {
        self.selected.is_some()
    }

    pub fn affordances(&self) -> UiAffordances {
        let on = self.has_selection();
        UiAffordances {
            can_delete: on,
            can_export_frame: on,
            can_swap: on,
        }
    }

    /// Place a new composition for `frame_id`, centered on the canvas, with
    /// an upload placeholder clipped to the frame's screen region. The new
    /// composition becomes the selection.
    #[tracing::instrument(skip(self, backend))]
    pub fn add_composition(
        &mut self,
        backend: &mut dyn RenderBackend,
        frame_id: &str,
    ) -> StageResult<CompositionId> {
        let template = self
            .catalog
            .get(frame_id)
            .ok_or_else(|| StageError::resolution(format!("unknown frame id '{frame_id}'")))?
            .clone();

        // Height proportional to the tallest frame in the catalog, relative
        // to 80% of the stage's native height.
        let max_canvas_height = self.initial_height * STAGE_HEIGHT_SHARE;
        let desired_height = template.native_height / self.catalog.max_native_height()
            * max_canvas_height;
        let frame_scale = desired_height / template.native_height;
        let frame_width = template.native_width * frame_scale;

        let root = backend.create_group(backend.root());

        let placeholder = build_placeholder(backend, root, &template, frame_scale);

        let art = self.art.art_for(&template, frame_scale)?;
        let frame_art = backend.create_image(root, art, frame_width, desired_height);
        backend.set_listening(frame_art, false);

        let canvas = backend.canvas_size();
        let transform = NodeTransform::at(
            f64::from(canvas.width) / 2.0 - frame_width / 2.0,
            f64::from(canvas.height) / 2.0 - desired_height / 2.0,
        );
        backend.set_transform(root, transform);

        let id = CompositionId(self.next_id);
        self.next_id += 1;
        self.compositions.push(Composition {
            id,
            frame_id: template.id.clone(),
            transform,
            frame_scale,
            root,
            frame_art,
            content: Content::Placeholder(placeholder),
            acquire_gen: 0,
        });
        self.last_added = Some(id);
        self.select_composition(backend, Some(id))?;

        tracing::debug!(frame = %template.id, scale = frame_scale, "added composition");
        Ok(id)
    }

    /// Replace the composition's content with `image`, cover-fitted into the
    /// scaled screen region and clipped by the same mask as the placeholder.
    ///
    /// Idempotent replace: any existing placeholder or prior photo subtree
    /// is destroyed first, and the photo layer is inserted below the
    /// frame-art overlay so bezels render on top.
    #[tracing::instrument(skip(self, backend, image))]
    pub fn attach_image(
        &mut self,
        backend: &mut dyn RenderBackend,
        id: CompositionId,
        image: ImageHandle,
    ) -> StageResult<()> {
        let idx = self
            .index_of(id)
            .ok_or_else(|| StageError::resolution("attach target no longer exists"))?;
        let template = self
            .catalog
            .get(&self.compositions[idx].frame_id)
            .ok_or_else(|| StageError::resolution("composition frame left the catalog"))?;
        let screen = template.screen;
        let frame_scale = self.compositions[idx].frame_scale;
        let root = self.compositions[idx].root;

        backend.remove_node(self.compositions[idx].content.group());

        let region = scaled_region(&screen, frame_scale);
        let fit = cover_fit(
            region.width,
            region.height,
            f64::from(image.width),
            f64::from(image.height),
        );

        let group = backend.create_group(root);
        backend.set_transform(group, NodeTransform::at(region.x, region.y));
        backend.set_clip(group, Some(screen_clip_path(&screen, frame_scale)));

        let image_node = backend.create_image(group, image.clone(), fit.width, fit.height);
        backend.set_transform(image_node, NodeTransform::at(fit.offset_x, fit.offset_y));

        // Below the frame-art overlay.
        backend.move_to_bottom(group);

        self.compositions[idx].content = Content::Photo(PhotoNode {
            group,
            image: image_node,
            source: image,
        });
        Ok(())
    }

    /// Attach to the current selection, falling back to the most recently
    /// added composition when nothing is selected.
    pub fn attach_to_selected_or_last(
        &mut self,
        backend: &mut dyn RenderBackend,
        image: ImageHandle,
    ) -> StageResult<CompositionId> {
        let target = self.attach_target()?;
        self.attach_image(backend, target, image)?;
        Ok(target)
    }

    /// Delete semantics are intentionally asymmetric: a composition holding
    /// a photo reverts to its placeholder (the frame graphic survives, the
    /// photo is cleared); only a placeholder-state composition is removed
    /// from the canvas and the tracking list.
    #[tracing::instrument(skip(self, backend))]
    pub fn delete_composition(
        &mut self,
        backend: &mut dyn RenderBackend,
        id: CompositionId,
    ) -> StageResult<()> {
        let idx = self
            .index_of(id)
            .ok_or_else(|| StageError::resolution("delete target no longer exists"))?;

        if self.compositions[idx].content.is_placeholder() {
            backend.remove_node(self.compositions[idx].root);
            self.compositions.remove(idx);
            if self.last_added == Some(id) {
                self.last_added = None;
            }
            if self.selected == Some(id) {
                self.select_composition(backend, None)?;
            }
            return Ok(());
        }

        let template = self
            .catalog
            .get(&self.compositions[idx].frame_id)
            .ok_or_else(|| StageError::resolution("composition frame left the catalog"))?
            .clone();
        let frame_scale = self.compositions[idx].frame_scale;
        let root = self.compositions[idx].root;
        let frame_art = self.compositions[idx].frame_art;

        backend.remove_node(self.compositions[idx].content.group());
        let placeholder = build_placeholder(backend, root, &template, frame_scale);
        backend.move_to_top(frame_art);

        self.compositions[idx].content = Content::Placeholder(placeholder);
        Ok(())
    }

    /// Delete the selected composition; quietly does nothing without a
    /// selection (the delete affordance is disabled then anyway).
    pub fn delete_selected(&mut self, backend: &mut dyn RenderBackend) -> StageResult<()> {
        match self.selected {
            Some(id) => self.delete_composition(backend, id),
            None => Ok(()),
        }
    }

    /// Exclusive selection: selecting a composition deselects the previous
    /// one and raises the new one to the top; `None` clears the selection
    /// (clicking empty canvas space).
    pub fn select_composition(
        &mut self,
        backend: &mut dyn RenderBackend,
        id: Option<CompositionId>,
    ) -> StageResult<()> {
        match id {
            Some(id) => {
                let comp = self
                    .get(id)
                    .ok_or_else(|| StageError::resolution("selection target no longer exists"))?;
                let root = comp.root;
                self.selected = Some(id);
                backend.move_to_top(root);
                backend.set_selection_overlay(Some(root));
            }
            None => {
                self.selected = None;
                backend.set_selection_overlay(None);
            }
        }
        Ok(())
    }

    /// Composition owning the topmost node at `point` (canvas coordinates).
    pub fn composition_at(
        &self,
        backend: &dyn RenderBackend,
        point: Point,
    ) -> Option<CompositionId> {
        let hit = backend.hit_test(point)?;
        self.compositions
            .iter()
            .find(|c| backend.node_is_within(hit, c.root))
            .map(|c| c.id)
    }

    /// Overwrite a composition's transform (frame swap and project loading
    /// bypass the default auto-centering through this).
    pub fn set_transform(
        &mut self,
        backend: &mut dyn RenderBackend,
        id: CompositionId,
        transform: NodeTransform,
    ) -> StageResult<()> {
        let idx = self
            .index_of(id)
            .ok_or_else(|| StageError::resolution("transform target no longer exists"))?;
        self.compositions[idx].transform = transform;
        backend.set_transform(self.compositions[idx].root, transform);
        Ok(())
    }

    /// Issue a ticket for a deferred image acquisition against the current
    /// attach target. Bumps the target's generation so any older in-flight
    /// acquisition completes stale.
    pub fn begin_acquisition(&mut self) -> StageResult<AcquisitionTicket> {
        let target = self.attach_target()?;
        let idx = self
            .index_of(target)
            .ok_or_else(|| StageError::resolution("attach target no longer exists"))?;
        self.compositions[idx].acquire_gen += 1;
        Ok(AcquisitionTicket {
            composition: target,
            generation: self.compositions[idx].acquire_gen,
        })
    }

    /// Complete a deferred acquisition. Returns `Ok(true)` when the image
    /// was attached, `Ok(false)` when the ticket went stale (superseded by a
    /// newer acquisition, or its composition was deleted mid-flight).
    ///
    /// A decode failure propagates without touching the composition, so the
    /// prior content stays attached.
    pub fn complete_acquisition(
        &mut self,
        backend: &mut dyn RenderBackend,
        ticket: AcquisitionTicket,
        result: StageResult<ImageHandle>,
    ) -> StageResult<bool> {
        let Some(idx) = self.index_of(ticket.composition) else {
            tracing::debug!("acquisition target deleted while in flight");
            return Ok(false);
        };
        if self.compositions[idx].acquire_gen != ticket.generation {
            tracing::debug!("discarding stale acquisition");
            return Ok(false);
        }
        let image = result?;
        self.attach_image(backend, ticket.composition, image)?;
        Ok(true)
    }

    /// Full removal regardless of content state; the frame-swap path uses
    /// this instead of the delete-revert semantics.
    pub(crate) fn destroy_composition(
        &mut self,
        backend: &mut dyn RenderBackend,
        id: CompositionId,
    ) -> StageResult<()> {
        let idx = self
            .index_of(id)
            .ok_or_else(|| StageError::resolution("destroy target no longer exists"))?;
        backend.remove_node(self.compositions[idx].root);
        self.compositions.remove(idx);
        if self.last_added == Some(id) {
            self.last_added = None;
        }
        if self.selected == Some(id) {
            self.select_composition(backend, None)?;
        }
        Ok(())
    }

    fn attach_target(&self) -> StageResult<CompositionId> {
        self.selected
            .or(self.last_added.filter(|id| self.get(*id).is_some()))
            .ok_or_else(|| {
                StageError::resolution("add or select a frame to place the image in")
            })
    }

    fn index_of(&self, id: CompositionId) -> Option<usize> {
        self.compositions.iter().position(|c| c.id == id)
    }
}

/// Build the upload-placeholder subtree: a group clipped by the screen mask
/// holding an invisible clickable rect, the upload glyph and a label.
fn build_placeholder(
    backend: &mut dyn RenderBackend,
    root: NodeId,
    template: &FrameTemplate,
    frame_scale: f64,
) -> PlaceholderNode {
    let region = scaled_region(&template.screen, frame_scale);

    let group = backend.create_group(root);
    backend.set_transform(group, NodeTransform::at(region.x, region.y));
    backend.set_clip(group, Some(screen_clip_path(&template.screen, frame_scale)));

    let hit_rect = backend.create_rect(group, region.width, region.height, None);

    let icon_path = kurbo::BezPath::from_svg(UPLOAD_ICON).unwrap_or_default();
    let icon = backend.create_path(group, icon_path, PLACEHOLDER_TINT, 1.5);
    // 24px glyph at 2.5x, anchored on its center, slightly above the middle.
    backend.set_transform(
        icon,
        NodeTransform {
            x: region.width / 2.0 - 30.0,
            y: region.height / 2.0 - 40.0,
            scale_x: 2.5,
            scale_y: 2.5,
            rotation_deg: 0.0,
        },
    );

    let label = backend.create_text(group, "Upload an Image", 18.0, PLACEHOLDER_TINT);
    backend.set_transform(
        label,
        NodeTransform::at(region.width / 2.0, region.height / 2.0 + 40.0),
    );

    PlaceholderNode {
        group,
        hit_rect,
        icon,
        label,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/manager.rs"]
mod tests;
