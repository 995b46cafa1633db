use crate::assets::acquire::{
    AcquisitionTicket, ImageHandle, UploadedFile, decode_upload, validate_upload,
};
use crate::assets::art::ArtStore;
use crate::catalog::FrameCatalog;
use crate::foundation::core::{CanvasSize, NodeTransform, Point, Vec2, parse_hex_color};
use crate::foundation::error::StageResult;
use crate::input::{InputEvent, Key};
use crate::render::backend::{ExportImage, RenderBackend};
use crate::render::export;
use crate::scene::manager::{SceneManager, UiAffordances};
use crate::scene::node::CompositionId;
use crate::scene::swap;
use crate::viewport::controller::{CursorHint, ViewportController};
use crate::viewport::transform::ViewportTransform;

fn default_canvas() -> CanvasSize {
    CanvasSize {
        width: 900,
        height: 600,
    }
}

fn default_background() -> String {
    "#ffffff".to_string()
}

/// Form-driven configuration: canvas logical size and background color.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StudioConfig {
    #[serde(default = "default_canvas")]
    pub canvas: CanvasSize,
    #[serde(default = "default_background")]
    pub background: String,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            canvas: default_canvas(),
            background: default_background(),
        }
    }
}

/// The explicit application-state object: catalog, scene manager, viewport
/// controller and config, wired against one render backend. All state lives
/// here; there are no ambient globals.
#[derive(Debug)]
pub struct Studio<B: RenderBackend> {
    backend: B,
    scene: SceneManager,
    viewport: ViewportController,
    config: StudioConfig,
}

impl<B: RenderBackend> Studio<B> {
    pub fn new(
        mut backend: B,
        catalog: FrameCatalog,
        art: ArtStore,
        config: StudioConfig,
    ) -> StageResult<Self> {
        catalog.validate()?;
        let canvas = CanvasSize::new(config.canvas.width, config.canvas.height)?;
        backend.resize_canvas(canvas);
        backend.set_background(parse_hex_color(&config.background)?);

        Ok(Self {
            scene: SceneManager::new(catalog, art, canvas),
            viewport: ViewportController::new(),
            backend,
            config,
        })
    }

    pub fn scene(&self) -> &SceneManager {
        &self.scene
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // --- composition operations -----------------------------------------

    pub fn add_composition(&mut self, frame_id: &str) -> StageResult<CompositionId> {
        self.scene.add_composition(&mut self.backend, frame_id)
    }

    pub fn attach_image(&mut self, id: CompositionId, image: ImageHandle) -> StageResult<()> {
        self.scene.attach_image(&mut self.backend, id, image)
    }

    /// Validate, decode and place an upload on the selected composition
    /// (falling back to the most recently added one).
    pub fn upload(&mut self, file: &UploadedFile) -> StageResult<CompositionId> {
        validate_upload(file)?;
        let image = decode_upload(file)?;
        self.scene
            .attach_to_selected_or_last(&mut self.backend, image)
    }

    /// Start a deferred upload: validates eagerly, then hands back a ticket
    /// the host completes once its file read / decode resolves.
    pub fn begin_acquisition(&mut self, file: &UploadedFile) -> StageResult<AcquisitionTicket> {
        validate_upload(file)?;
        self.scene.begin_acquisition()
    }

    pub fn complete_acquisition(
        &mut self,
        ticket: AcquisitionTicket,
        result: StageResult<ImageHandle>,
    ) -> StageResult<bool> {
        self.scene
            .complete_acquisition(&mut self.backend, ticket, result)
    }

    pub fn delete_composition(&mut self, id: CompositionId) -> StageResult<()> {
        self.scene.delete_composition(&mut self.backend, id)
    }

    pub fn delete_selected(&mut self) -> StageResult<()> {
        self.scene.delete_selected(&mut self.backend)
    }

    pub fn select_composition(&mut self, id: Option<CompositionId>) -> StageResult<()> {
        self.scene.select_composition(&mut self.backend, id)
    }

    pub fn set_composition_transform(
        &mut self,
        id: CompositionId,
        transform: NodeTransform,
    ) -> StageResult<()> {
        self.scene.set_transform(&mut self.backend, id, transform)
    }

    pub fn swap_frame(&mut self, new_frame_id: &str) -> StageResult<Option<CompositionId>> {
        swap::swap_frame(&mut self.scene, &mut self.backend, new_frame_id)
    }

    pub fn has_selection(&self) -> bool {
        self.scene.has_selection()
    }

    pub fn affordances(&self) -> UiAffordances {
        self.scene.affordances()
    }

    // --- viewport -------------------------------------------------------

    pub fn viewport(&self) -> &ViewportTransform {
        self.viewport.transform()
    }

    pub fn reset_viewport(&mut self) {
        self.viewport.reset();
    }

    pub fn zoom_viewport(&mut self, anchor: Point, factor: f64) {
        self.viewport.zoom(anchor, factor);
    }

    pub fn pan_viewport(&mut self, delta: Vec2) {
        self.viewport.pan(delta);
    }

    pub fn cursor_hint(&self) -> CursorHint {
        self.viewport.cursor_hint()
    }

    // --- config ---------------------------------------------------------

    pub fn set_background(&mut self, color: &str) -> StageResult<()> {
        self.backend.set_background(parse_hex_color(color)?);
        self.config.background = color.to_string();
        Ok(())
    }

    pub fn resize_canvas(&mut self, width: u32, height: u32) -> StageResult<()> {
        let canvas = CanvasSize::new(width, height)?;
        self.backend.resize_canvas(canvas);
        self.config.canvas = canvas;
        Ok(())
    }

    // --- export ---------------------------------------------------------

    pub fn export_scene(&mut self, pixel_ratio: f64) -> StageResult<ExportImage> {
        export::export_scene(&mut self.backend, pixel_ratio)
    }

    pub fn export_selected_frame(&mut self) -> StageResult<Option<ExportImage>> {
        export::export_composition(&mut self.backend, &self.scene)
    }

    // --- input routing --------------------------------------------------

    /// Single dispatch point for host input. Viewport gestures and scene
    /// selection are routed from here; nothing else registers handlers.
    pub fn dispatch(&mut self, event: InputEvent) -> StageResult<()> {
        match event {
            InputEvent::Wheel(ev) => self.viewport.on_wheel(ev),
            InputEvent::KeyDown {
                key,
                text_input_focused,
            } => {
                if text_input_focused {
                    return Ok(());
                }
                match key {
                    Key::Delete | Key::Backspace => {
                        self.scene.delete_selected(&mut self.backend)?;
                    }
                    _ => self.viewport.on_key_down(key, false),
                }
            }
            InputEvent::KeyUp { key } => self.viewport.on_key_up(key),
            InputEvent::PointerDown { position } => {
                self.viewport.on_pointer_down(position);
            }
            InputEvent::PointerMove { position } => self.viewport.on_pointer_move(position),
            InputEvent::PointerUp => self.viewport.on_pointer_up(),
            InputEvent::Tap { position } => {
                let canvas_point = self.viewport.transform().view_to_canvas(position);
                let hit = self.scene.composition_at(&self.backend, canvas_point);
                self.scene.select_composition(&mut self.backend, hit)?;
            }
            InputEvent::TouchStart { touches } => {
                let on_composition = touches.len() == 1 && {
                    let canvas_point = self.viewport.transform().view_to_canvas(touches[0]);
                    self.scene
                        .composition_at(&self.backend, canvas_point)
                        .is_some()
                };
                self.viewport.on_touch_start(&touches, on_composition);
            }
            InputEvent::TouchMove { touches } => self.viewport.on_touch_move(&touches),
            InputEvent::TouchEnd { remaining } => self.viewport.on_touch_end(&remaining),
        }
        Ok(())
    }
}
