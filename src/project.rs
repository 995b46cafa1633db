use std::path::Path;

use anyhow::Context as _;

use crate::assets::acquire::{UploadedFile, decode_upload, validate_upload};
use crate::assets::art::ArtStore;
use crate::catalog::FrameCatalog;
use crate::foundation::core::NodeTransform;
use crate::foundation::error::{StageError, StageResult};
use crate::render::backend::RenderBackend;
use crate::studio::{Studio, StudioConfig};

/// One composition entry in a project file.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ProjectComposition {
    /// Frame template id from the catalog.
    pub frame: String,
    /// Placement override; omitted entries stay auto-centered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<NodeTransform>,
    /// Screenshot path relative to the project file, placed with cover fit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A serializable studio setup: config plus compositions to place.
///
/// This is how headless hosts (the CLI) drive the engine; interactive hosts
/// build the same state through [`Studio`] calls instead.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Project {
    #[serde(default)]
    pub config: Option<StudioConfig>,
    #[serde(default)]
    pub compositions: Vec<ProjectComposition>,
}

impl Project {
    pub fn from_json(s: &str) -> StageResult<Self> {
        serde_json::from_str(s).map_err(|e| StageError::validation(format!("parse project: {e}")))
    }

    pub fn from_path(path: &Path) -> StageResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read project '{}'", path.display()))
            .map_err(StageError::from)?;
        Self::from_json(&s)
    }

    /// Build a studio from this project, resolving image and raster-art
    /// paths against `assets_root`. IO is front-loaded here; the returned
    /// studio performs none.
    pub fn build<B: RenderBackend>(
        self,
        backend: B,
        catalog: FrameCatalog,
        assets_root: &Path,
    ) -> StageResult<Studio<B>> {
        let art = ArtStore::prepare(&catalog, assets_root)?;
        let config = self.config.unwrap_or_default();
        let mut studio = Studio::new(backend, catalog, art, config)?;

        for entry in self.compositions {
            let id = studio.add_composition(&entry.frame)?;
            if let Some(transform) = entry.transform {
                studio.set_composition_transform(id, transform)?;
            }
            if let Some(image_path) = entry.image {
                let file = UploadedFile::from_path(&assets_root.join(image_path))?;
                validate_upload(&file)?;
                let image = decode_upload(&file)?;
                studio.attach_image(id, image)?;
            }
        }

        Ok(studio)
    }
}
