use crate::assets::acquire::ImageHandle;
use crate::foundation::core::{BezPath, CanvasSize, NodeTransform, Point, Rect, Rgba8Premul};
use crate::foundation::error::StageResult;

/// Identifier for a retained node in the backend's scene tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

/// Identifier for an off-screen surface used by isolated export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u32);

/// Raster readback from a canvas or surface, premultiplied RGBA8.
#[derive(Clone, Debug)]
pub struct ExportImage {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Vec<u8>,
}

impl ExportImage {
    /// Convert to straight (non-premultiplied) RGBA8 for file encoding.
    pub fn into_straight_rgba(mut self) -> Vec<u8> {
        for px in self.rgba8_premul.chunks_exact_mut(4) {
            let a = px[3] as u16;
            if a == 0 || a == 255 {
                continue;
            }
            px[0] = ((u16::from(px[0]) * 255 + a / 2) / a).min(255) as u8;
            px[1] = ((u16::from(px[1]) * 255 + a / 2) / a).min(255) as u8;
            px[2] = ((u16::from(px[2]) * 255 + a / 2) / a).min(255) as u8;
        }
        self.rgba8_premul
    }
}

/// The retained-mode renderer the core drives.
///
/// The scene manager and export code are written against this trait; the
/// crate ships [`crate::render::software::SoftwareRenderer`] as a
/// deterministic implementation, and richer backends (GPU, browser canvas)
/// can be swapped in by the host.
///
/// Node tree semantics: children paint in insertion order (first child at
/// the bottom); clips use the even-odd rule and apply to both painting and
/// hit-testing; `listening` excludes a subtree from hit-testing only.
pub trait RenderBackend {
    /// Root group of the main canvas.
    fn root(&self) -> NodeId;

    fn canvas_size(&self) -> CanvasSize;

    fn resize_canvas(&mut self, size: CanvasSize);

    /// Background color composited under the whole canvas.
    fn set_background(&mut self, color: Rgba8Premul);

    fn create_group(&mut self, parent: NodeId) -> NodeId;

    fn create_rect(
        &mut self,
        parent: NodeId,
        width: f64,
        height: f64,
        fill: Option<Rgba8Premul>,
    ) -> NodeId;

    fn create_image(
        &mut self,
        parent: NodeId,
        image: ImageHandle,
        dst_width: f64,
        dst_height: f64,
    ) -> NodeId;

    /// Stroked vector path. Reference backends may skip rasterizing these;
    /// they still occupy layout space and participate in hit-testing.
    fn create_path(
        &mut self,
        parent: NodeId,
        path: BezPath,
        stroke: Rgba8Premul,
        stroke_width: f64,
    ) -> NodeId;

    /// Text label. Shaping and rasterization are a rich-backend concern.
    fn create_text(&mut self, parent: NodeId, text: &str, size_px: f64, fill: Rgba8Premul)
    -> NodeId;

    fn set_transform(&mut self, node: NodeId, transform: NodeTransform);

    fn transform(&self, node: NodeId) -> NodeTransform;

    /// Clip the node's subtree by a path in the node's local space
    /// (even-odd rule), or remove the clip.
    fn set_clip(&mut self, node: NodeId, clip: Option<BezPath>);

    fn set_listening(&mut self, node: NodeId, listening: bool);

    fn move_to_top(&mut self, node: NodeId);

    fn move_to_bottom(&mut self, node: NodeId);

    /// Remove a node and its whole subtree.
    fn remove_node(&mut self, node: NodeId);

    fn node_is_within(&self, node: NodeId, ancestor: NodeId) -> bool;

    /// Untransformed bounds of a node's own geometry plus its subtree.
    fn node_bounds(&self, node: NodeId) -> Rect;

    /// The node currently decorated with selection handles, if any. The
    /// overlay never participates in export readbacks.
    fn set_selection_overlay(&mut self, node: Option<NodeId>);

    fn selection_overlay(&self) -> Option<NodeId>;

    /// Topmost listening shape at `point` in canvas coordinates.
    fn hit_test(&self, point: Point) -> Option<NodeId>;

    fn create_offscreen(&mut self, size: CanvasSize) -> SurfaceId;

    fn resize_offscreen(&mut self, surface: SurfaceId, size: CanvasSize) -> StageResult<()>;

    /// Release an off-screen surface and everything attached to it.
    fn release_offscreen(&mut self, surface: SurfaceId);

    /// Deep-copy a subtree onto an off-screen surface, returning the clone's
    /// root on that surface.
    fn clone_subtree_to(&mut self, node: NodeId, surface: SurfaceId) -> StageResult<NodeId>;

    fn export_canvas(
        &mut self,
        pixel_ratio: f64,
        background: Option<Rgba8Premul>,
    ) -> StageResult<ExportImage>;

    fn export_surface(
        &mut self,
        surface: SurfaceId,
        pixel_ratio: f64,
        background: Option<Rgba8Premul>,
    ) -> StageResult<ExportImage>;
}
