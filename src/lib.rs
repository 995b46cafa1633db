//! Mockstage is a device-mockup composition engine.
//!
//! It places screenshots inside device-frame illustrations (phone/tablet
//! mockups), arranges any number of those compositions on a canvas with a
//! global pan/zoom viewport, and exports the result as a raster image.
//!
//! # Architecture
//!
//! 1. **Catalog**: immutable [`FrameTemplate`] descriptors declare each
//!    device's native geometry, screen region and optional camera island.
//! 2. **Geometry**: [`scaled_region`] / [`screen_clip_path`] derive the
//!    runtime screen rectangle and its clip mask from a template and the
//!    composition's frame scale.
//! 3. **Scene**: [`SceneManager`] owns the live compositions, the exclusive
//!    selection, and the placeholder-to-photo replacement ([`cover_fit`]).
//! 4. **Viewport**: [`ViewportController`] owns the whole-canvas pan/zoom
//!    state and its wheel/keyboard/pointer/pinch gestures.
//! 5. **Render**: everything draws through the [`RenderBackend`] trait; the
//!    crate ships the deterministic [`SoftwareRenderer`], richer backends
//!    plug in from outside.
//!
//! [`Studio`] ties these together behind one application-state object with a
//! single input [`Studio::dispatch`] entry point, and [`Project`] builds a
//! studio from a JSON file for headless use (see the `mockstage` CLI).
//!
//! The design constraints throughout:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single logical thread**: handlers run to completion; the only
//!   deferred work is image acquisition, completed explicitly with
//!   supersession tickets.
//! - **No IO past setup**: catalogs, frame art and project images are
//!   front-loaded; scene operations never touch the filesystem.
#![forbid(unsafe_code)]

mod assets;
mod catalog;
mod foundation;
mod geometry;
mod input;
mod layout;
mod project;
mod render;
mod scene;
mod studio;
mod viewport;

pub use assets::acquire::{
    AcquisitionTicket, ImageHandle, MAX_UPLOAD_BYTES, UploadedFile, decode_upload, validate_upload,
};
pub use assets::art::ArtStore;
pub use catalog::{FrameArt, FrameCatalog, FrameTemplate, IslandRegion, ScreenRegion};
pub use foundation::core::{
    Affine, BezPath, CanvasSize, NodeTransform, Point, Rect, Rgba8Premul, Vec2, parse_hex_color,
};
pub use foundation::error::{StageError, StageResult};
pub use geometry::{ScaledRect, clip_contains, scaled_island_rect, scaled_region, screen_clip_path};
pub use input::{InputEvent, Key, WheelEvent};
pub use layout::fit::{CoverFit, cover_fit};
pub use project::{Project, ProjectComposition};
pub use render::backend::{ExportImage, NodeId, RenderBackend, SurfaceId};
pub use render::export::{FRAME_EXPORT_SIZE, export_composition, export_scene};
pub use render::software::SoftwareRenderer;
pub use scene::manager::{SceneManager, UiAffordances};
pub use scene::node::{Composition, CompositionId, Content, PhotoNode, PlaceholderNode};
pub use scene::swap::swap_frame;
pub use studio::{Studio, StudioConfig};
pub use viewport::controller::{CursorHint, ViewportController, WHEEL_ZOOM_STEP};
pub use viewport::transform::{MAX_SCALE, MIN_SCALE, ViewportTransform};
