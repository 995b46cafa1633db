use std::collections::HashMap;

use kurbo::{Affine, Shape as _};

use crate::assets::acquire::ImageHandle;
use crate::foundation::core::{BezPath, CanvasSize, NodeTransform, Point, Rect, Rgba8Premul};
use crate::foundation::error::{StageError, StageResult};
use crate::geometry::clip_contains;
use crate::render::backend::{ExportImage, NodeId, RenderBackend, SurfaceId};

/// Deterministic CPU implementation of [`RenderBackend`].
///
/// Retained node tree, premultiplied `over` compositing, bilinear image
/// sampling under affine transforms, even-odd clip evaluation straight from
/// the clip paths. Path and text nodes occupy layout space and hit-test, but
/// are not rasterized; vector stroking and text shaping belong to richer
/// backends.
#[derive(Debug)]
pub struct SoftwareRenderer {
    nodes: HashMap<NodeId, NodeData>,
    surfaces: HashMap<SurfaceId, Surface>,
    root: NodeId,
    canvas: CanvasSize,
    background: Rgba8Premul,
    overlay: Option<NodeId>,
    next_node: u64,
    next_surface: u32,
}

#[derive(Debug)]
struct NodeData {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    transform: NodeTransform,
    clip: Option<BezPath>,
    listening: bool,
    kind: NodeKind,
}

#[derive(Clone, Debug)]
enum NodeKind {
    Group,
    Rect {
        width: f64,
        height: f64,
        fill: Option<Rgba8Premul>,
    },
    Image {
        image: ImageHandle,
        dst_width: f64,
        dst_height: f64,
    },
    Path {
        path: BezPath,
        stroke_width: f64,
    },
    Text {
        text: String,
        size_px: f64,
    },
}

/// Rough metrics box for a text node; real shaping belongs to richer
/// backends, but layout and hit-testing still need an extent.
fn text_extent(text: &str, size_px: f64) -> Rect {
    let width = text.chars().count() as f64 * size_px * 0.6;
    Rect::new(0.0, 0.0, width, size_px * 1.2)
}

#[derive(Debug)]
struct Surface {
    root: NodeId,
    size: CanvasSize,
}

impl SoftwareRenderer {
    pub fn new(canvas: CanvasSize) -> Self {
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            NodeData {
                parent: None,
                children: Vec::new(),
                transform: NodeTransform::default(),
                clip: None,
                listening: true,
                kind: NodeKind::Group,
            },
        );
        Self {
            nodes,
            surfaces: HashMap::new(),
            root,
            canvas,
            background: Rgba8Premul::from_straight_rgba(255, 255, 255, 255),
            overlay: None,
            next_node: 1,
            next_surface: 0,
        }
    }

    /// Number of live nodes, root and surface roots included. Tests use this
    /// to account for subtree destruction.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Text content of a node, if it is a text node. Lets tests assert on
    /// placeholder labels without rasterizing them.
    pub fn text_of(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(&node)?.kind {
            NodeKind::Text { text, .. } => Some(text.as_str()),
            _ => None,
        }
    }

    fn alloc(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.insert(
            id,
            NodeData {
                parent: Some(parent),
                children: Vec::new(),
                transform: NodeTransform::default(),
                clip: None,
                listening: true,
                kind,
            },
        );
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(id);
        } else {
            tracing::warn!(parent = parent.0, "created node under unknown parent");
        }
        id
    }

    fn remove_recursive(&mut self, node: NodeId) {
        if let Some(data) = self.nodes.remove(&node) {
            for child in data.children {
                self.remove_recursive(child);
            }
        }
    }

    fn render_tree(
        &self,
        root: NodeId,
        size: CanvasSize,
        pixel_ratio: f64,
        background: Option<Rgba8Premul>,
    ) -> StageResult<ExportImage> {
        if pixel_ratio <= 0.0 || !pixel_ratio.is_finite() {
            return Err(StageError::validation("pixel ratio must be finite and > 0"));
        }
        let width = (f64::from(size.width) * pixel_ratio).round().max(1.0) as u32;
        let height = (f64::from(size.height) * pixel_ratio).round().max(1.0) as u32;

        let mut buf = vec![0u8; width as usize * height as usize * 4];
        if let Some(bg) = background {
            for px in buf.chunks_exact_mut(4) {
                px.copy_from_slice(&[bg.r, bg.g, bg.b, bg.a]);
            }
        }

        let mut clips = Vec::new();
        self.paint(
            root,
            Affine::scale(pixel_ratio),
            &mut clips,
            &mut buf,
            width,
            height,
        );

        Ok(ExportImage {
            width,
            height,
            rgba8_premul: buf,
        })
    }

    fn paint(
        &self,
        node: NodeId,
        parent_affine: Affine,
        clips: &mut Vec<(Affine, BezPath)>,
        buf: &mut [u8],
        width: u32,
        height: u32,
    ) {
        let Some(data) = self.nodes.get(&node) else {
            return;
        };
        let affine = parent_affine * data.transform.to_affine();

        let pushed = if let Some(clip) = &data.clip {
            clips.push((affine.inverse(), clip.clone()));
            true
        } else {
            false
        };

        match &data.kind {
            NodeKind::Rect {
                width: w,
                height: h,
                fill: Some(fill),
            } => {
                self.fill_region(buf, width, height, affine, *w, *h, clips, |_, _| {
                    [fill.r, fill.g, fill.b, fill.a]
                });
            }
            NodeKind::Image {
                image,
                dst_width,
                dst_height,
            } => {
                let sx = f64::from(image.width) / dst_width;
                let sy = f64::from(image.height) / dst_height;
                self.fill_region(
                    buf,
                    width,
                    height,
                    affine,
                    *dst_width,
                    *dst_height,
                    clips,
                    |lx, ly| sample_bilinear(image, lx * sx, ly * sy),
                );
            }
            // Vector strokes and text are not rasterized by this backend.
            NodeKind::Rect { fill: None, .. }
            | NodeKind::Path { .. }
            | NodeKind::Text { .. }
            | NodeKind::Group => {}
        }

        for child in &data.children {
            self.paint(*child, affine, clips, buf, width, height);
        }

        if pushed {
            clips.pop();
        }
    }

    /// Composite a local `(0,0)..(w,h)` region through `affine` into the
    /// buffer, sourcing each covered pixel from `src(local_x, local_y)`.
    #[allow(clippy::too_many_arguments)]
    fn fill_region(
        &self,
        buf: &mut [u8],
        buf_width: u32,
        buf_height: u32,
        affine: Affine,
        local_width: f64,
        local_height: f64,
        clips: &[(Affine, BezPath)],
        src: impl Fn(f64, f64) -> [u8; 4],
    ) {
        let bbox = affine.transform_rect_bbox(Rect::new(0.0, 0.0, local_width, local_height));
        let x0 = bbox.x0.floor().max(0.0) as u32;
        let y0 = bbox.y0.floor().max(0.0) as u32;
        let x1 = (bbox.x1.ceil().min(f64::from(buf_width))).max(0.0) as u32;
        let y1 = (bbox.y1.ceil().min(f64::from(buf_height))).max(0.0) as u32;

        let inv = affine.inverse();
        for y in y0..y1 {
            for x in x0..x1 {
                let p = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                let local = inv * p;
                if local.x < 0.0
                    || local.y < 0.0
                    || local.x >= local_width
                    || local.y >= local_height
                {
                    continue;
                }
                if !clips
                    .iter()
                    .all(|(clip_inv, clip)| clip_contains(clip, *clip_inv * p))
                {
                    continue;
                }
                let px = src(local.x, local.y);
                if px[3] == 0 {
                    continue;
                }
                let idx = (y as usize * buf_width as usize + x as usize) * 4;
                let dst = [buf[idx], buf[idx + 1], buf[idx + 2], buf[idx + 3]];
                buf[idx..idx + 4].copy_from_slice(&over(dst, px));
            }
        }
    }

    fn hit_node(&self, node: NodeId, parent_affine: Affine, point: Point) -> Option<NodeId> {
        let data = self.nodes.get(&node)?;
        if !data.listening {
            return None;
        }
        let affine = parent_affine * data.transform.to_affine();
        let local = affine.inverse() * point;

        if let Some(clip) = &data.clip
            && !clip_contains(clip, local)
        {
            return None;
        }

        // Topmost child first.
        for child in data.children.iter().rev() {
            if let Some(hit) = self.hit_node(*child, affine, point) {
                return Some(hit);
            }
        }

        let own_hit = match &data.kind {
            NodeKind::Group => false,
            NodeKind::Rect { width, height, .. } => {
                local.x >= 0.0 && local.y >= 0.0 && local.x < *width && local.y < *height
            }
            NodeKind::Image {
                dst_width,
                dst_height,
                ..
            } => local.x >= 0.0 && local.y >= 0.0 && local.x < *dst_width && local.y < *dst_height,
            NodeKind::Path { path, stroke_width } => path
                .bounding_box()
                .inflate(stroke_width / 2.0, stroke_width / 2.0)
                .contains(local),
            NodeKind::Text { text, size_px } => text_extent(text, *size_px).contains(local),
        };
        own_hit.then_some(node)
    }

    fn local_bounds(&self, node: NodeId) -> Option<Rect> {
        let data = self.nodes.get(&node)?;
        let mut bounds = match &data.kind {
            NodeKind::Group => None,
            NodeKind::Rect { width, height, .. } => Some(Rect::new(0.0, 0.0, *width, *height)),
            NodeKind::Image {
                dst_width,
                dst_height,
                ..
            } => Some(Rect::new(0.0, 0.0, *dst_width, *dst_height)),
            NodeKind::Path { path, stroke_width } => Some(
                path.bounding_box()
                    .inflate(stroke_width / 2.0, stroke_width / 2.0),
            ),
            NodeKind::Text { text, size_px } => Some(text_extent(text, *size_px)),
        };

        for child in &data.children {
            let Some(child_bounds) = self.local_bounds(*child) else {
                continue;
            };
            let child_data = &self.nodes[child];
            let transformed = child_data
                .transform
                .to_affine()
                .transform_rect_bbox(child_bounds);
            bounds = Some(match bounds {
                Some(b) => b.union(transformed),
                None => transformed,
            });
        }
        bounds
    }

    fn clone_into(&mut self, node: NodeId, parent: NodeId) -> StageResult<NodeId> {
        let data = self
            .nodes
            .get(&node)
            .ok_or_else(|| StageError::resolution("clone of unknown node"))?;
        let kind = data.kind.clone();
        let transform = data.transform;
        let clip = data.clip.clone();
        let listening = data.listening;
        let children = data.children.clone();

        let id = self.alloc(parent, kind);
        if let Some(n) = self.nodes.get_mut(&id) {
            n.transform = transform;
            n.clip = clip;
            n.listening = listening;
        }
        for child in children {
            self.clone_into(child, id)?;
        }
        Ok(id)
    }
}

impl RenderBackend for SoftwareRenderer {
    fn root(&self) -> NodeId {
        self.root
    }

    fn canvas_size(&self) -> CanvasSize {
        self.canvas
    }

    fn resize_canvas(&mut self, size: CanvasSize) {
        self.canvas = size;
    }

    fn set_background(&mut self, color: Rgba8Premul) {
        self.background = color;
    }

    fn create_group(&mut self, parent: NodeId) -> NodeId {
        self.alloc(parent, NodeKind::Group)
    }

    fn create_rect(
        &mut self,
        parent: NodeId,
        width: f64,
        height: f64,
        fill: Option<Rgba8Premul>,
    ) -> NodeId {
        self.alloc(
            parent,
            NodeKind::Rect {
                width,
                height,
                fill,
            },
        )
    }

    fn create_image(
        &mut self,
        parent: NodeId,
        image: ImageHandle,
        dst_width: f64,
        dst_height: f64,
    ) -> NodeId {
        self.alloc(
            parent,
            NodeKind::Image {
                image,
                dst_width,
                dst_height,
            },
        )
    }

    fn create_path(
        &mut self,
        parent: NodeId,
        path: BezPath,
        _stroke: Rgba8Premul,
        stroke_width: f64,
    ) -> NodeId {
        self.alloc(parent, NodeKind::Path { path, stroke_width })
    }

    fn create_text(
        &mut self,
        parent: NodeId,
        text: &str,
        size_px: f64,
        _fill: Rgba8Premul,
    ) -> NodeId {
        self.alloc(
            parent,
            NodeKind::Text {
                text: text.to_string(),
                size_px,
            },
        )
    }

    fn set_transform(&mut self, node: NodeId, transform: NodeTransform) {
        if let Some(data) = self.nodes.get_mut(&node) {
            data.transform = transform;
        }
    }

    fn transform(&self, node: NodeId) -> NodeTransform {
        self.nodes
            .get(&node)
            .map(|d| d.transform)
            .unwrap_or_default()
    }

    fn set_clip(&mut self, node: NodeId, clip: Option<BezPath>) {
        if let Some(data) = self.nodes.get_mut(&node) {
            data.clip = clip;
        }
    }

    fn set_listening(&mut self, node: NodeId, listening: bool) {
        if let Some(data) = self.nodes.get_mut(&node) {
            data.listening = listening;
        }
    }

    fn move_to_top(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(&node).and_then(|d| d.parent) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.retain(|c| *c != node);
            p.children.push(node);
        }
    }

    fn move_to_bottom(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(&node).and_then(|d| d.parent) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.retain(|c| *c != node);
            p.children.insert(0, node);
        }
    }

    fn remove_node(&mut self, node: NodeId) {
        if let Some(overlay) = self.overlay
            && self.node_is_within(overlay, node)
        {
            self.overlay = None;
        }
        if let Some(parent) = self.nodes.get(&node).and_then(|d| d.parent)
            && let Some(p) = self.nodes.get_mut(&parent)
        {
            p.children.retain(|c| *c != node);
        }
        self.remove_recursive(node);
    }

    fn node_is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(&id).and_then(|d| d.parent);
        }
        false
    }

    fn node_bounds(&self, node: NodeId) -> Rect {
        self.local_bounds(node).unwrap_or(Rect::ZERO)
    }

    fn set_selection_overlay(&mut self, node: Option<NodeId>) {
        self.overlay = node;
    }

    fn selection_overlay(&self) -> Option<NodeId> {
        self.overlay
    }

    fn hit_test(&self, point: Point) -> Option<NodeId> {
        self.hit_node(self.root, Affine::IDENTITY, point)
    }

    fn create_offscreen(&mut self, size: CanvasSize) -> SurfaceId {
        let root = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.insert(
            root,
            NodeData {
                parent: None,
                children: Vec::new(),
                transform: NodeTransform::default(),
                clip: None,
                listening: true,
                kind: NodeKind::Group,
            },
        );
        let id = SurfaceId(self.next_surface);
        self.next_surface += 1;
        self.surfaces.insert(id, Surface { root, size });
        id
    }

    fn resize_offscreen(&mut self, surface: SurfaceId, size: CanvasSize) -> StageResult<()> {
        let s = self
            .surfaces
            .get_mut(&surface)
            .ok_or_else(|| StageError::resolution("resize of unknown surface"))?;
        s.size = size;
        Ok(())
    }

    fn release_offscreen(&mut self, surface: SurfaceId) {
        if let Some(s) = self.surfaces.remove(&surface) {
            self.remove_recursive(s.root);
        }
    }

    fn clone_subtree_to(&mut self, node: NodeId, surface: SurfaceId) -> StageResult<NodeId> {
        let root = self
            .surfaces
            .get(&surface)
            .map(|s| s.root)
            .ok_or_else(|| StageError::resolution("clone onto unknown surface"))?;
        self.clone_into(node, root)
    }

    fn export_canvas(
        &mut self,
        pixel_ratio: f64,
        background: Option<Rgba8Premul>,
    ) -> StageResult<ExportImage> {
        let background = background.unwrap_or(self.background);
        self.render_tree(self.root, self.canvas, pixel_ratio, Some(background))
    }

    fn export_surface(
        &mut self,
        surface: SurfaceId,
        pixel_ratio: f64,
        background: Option<Rgba8Premul>,
    ) -> StageResult<ExportImage> {
        let s = self
            .surfaces
            .get(&surface)
            .ok_or_else(|| StageError::resolution("export of unknown surface"))?;
        self.render_tree(s.root, s.size, pixel_ratio, background)
    }
}

/// Premultiplied source-over.
fn over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }
    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = (u16::from(src[i]) + mul_div255(u16::from(dst[i]), inv)).min(255) as u8;
    }
    out
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

fn sample_bilinear(image: &ImageHandle, x: f64, y: f64) -> [u8; 4] {
    let fx = x - 0.5;
    let fy = y - 0.5;
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = fx - x0;
    let ty = fy - y0;
    let x0 = x0 as i64;
    let y0 = y0 as i64;

    let p00 = image.pixel(x0, y0);
    let p10 = image.pixel(x0 + 1, y0);
    let p01 = image.pixel(x0, y0 + 1);
    let p11 = image.pixel(x0 + 1, y0 + 1);

    let mut out = [0u8; 4];
    for i in 0..4 {
        let top = f64::from(p00[i]) * (1.0 - tx) + f64::from(p10[i]) * tx;
        let bottom = f64::from(p01[i]) * (1.0 - tx) + f64::from(p11[i]) * tx;
        out[i] = (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/software.rs"]
mod tests;
