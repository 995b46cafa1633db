use crate::assets::acquire::ImageHandle;
use crate::foundation::core::NodeTransform;
use crate::render::backend::NodeId;

/// Stable identifier of one placed mockup instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CompositionId(pub u64);

/// What currently fills a composition's screen region. Exactly one variant
/// is attached at any time; switching destroys the old subtree first.
#[derive(Clone, Debug)]
pub enum Content {
    Placeholder(PlaceholderNode),
    Photo(PhotoNode),
}

impl Content {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    pub fn photo(&self) -> Option<&PhotoNode> {
        match self {
            Self::Photo(p) => Some(p),
            Self::Placeholder(_) => None,
        }
    }

    /// Root of the content subtree in the backend's node tree.
    pub fn group(&self) -> NodeId {
        match self {
            Self::Placeholder(p) => p.group,
            Self::Photo(p) => p.group,
        }
    }
}

/// Typed references into the upload-placeholder subtree: a clipped group
/// holding an invisible clickable rect, the upload icon and a label.
#[derive(Clone, Copy, Debug)]
pub struct PlaceholderNode {
    pub group: NodeId,
    pub hit_rect: NodeId,
    pub icon: NodeId,
    pub label: NodeId,
}

/// Typed references into the fitted photo subtree. The decoded image rides
/// along by handle so frame swap can re-apply it without re-reading storage.
#[derive(Clone, Debug)]
pub struct PhotoNode {
    pub group: NodeId,
    pub image: NodeId,
    pub source: ImageHandle,
}

/// One placed device-frame instance on the canvas.
///
/// `frame_scale` is `rendered frame width / template native width` and is
/// fixed for the composition's lifetime; changing frames goes through a full
/// swap, never an in-place scale mutation.
#[derive(Clone, Debug)]
pub struct Composition {
    pub id: CompositionId,
    pub frame_id: String,
    pub transform: NodeTransform,
    pub frame_scale: f64,
    pub root: NodeId,
    pub frame_art: NodeId,
    pub content: Content,
    /// Bumped whenever a new acquisition targets this composition; stale
    /// completions are discarded by comparing against this.
    pub(crate) acquire_gen: u64,
}
