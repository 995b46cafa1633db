use std::collections::BTreeMap;

use crate::foundation::error::{StageError, StageResult};

/// The rectangular area of a frame template where user content is visible,
/// in the frame's native (unscaled) pixel space.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScreenRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub corner_radius: f64,
    /// Camera-island cutout, if the device has one. Authored in the same
    /// frame-native absolute coordinates as the screen region itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub island: Option<IslandRegion>,
}

/// A cutout within a screen region (e.g. a camera notch) excluded from
/// content.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IslandRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub corner_radius: f64,
}

/// The frame illustration drawn on top of the photo layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameArt {
    /// Raster artwork on disk, relative to the catalog/assets root. The
    /// decoded image must match the template's native dimensions.
    Raster { source: String },
    /// Flat synthesized artwork: a rounded bezel plate in a solid color.
    /// Lets the builtin catalog render without any asset files.
    Flat { bezel: String, corner_radius: f64 },
}

/// Immutable descriptor of one device template. Loaded once from a catalog;
/// never mutated.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameTemplate {
    pub id: String,
    pub name: String,
    pub group: String,
    pub art: FrameArt,
    pub native_width: f64,
    pub native_height: f64,
    pub screen: ScreenRegion,
}

/// Ordered collection of frame templates.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct FrameCatalog {
    pub frames: Vec<FrameTemplate>,
}

impl FrameCatalog {
    /// Built-in device templates with synthesized flat artwork.
    pub fn builtin() -> Self {
        fn flat(bezel: &str, corner_radius: f64) -> FrameArt {
            FrameArt::Flat {
                bezel: bezel.to_string(),
                corner_radius,
            }
        }

        let frames = vec![
            FrameTemplate {
                id: "iphone-15-pro".to_string(),
                name: "iPhone 15 Pro".to_string(),
                group: "Phones".to_string(),
                art: flat("#1f2937", 70.0),
                native_width: 460.0,
                native_height: 940.0,
                screen: ScreenRegion {
                    x: 30.0,
                    y: 30.0,
                    width: 400.0,
                    height: 880.0,
                    corner_radius: 55.0,
                    island: Some(IslandRegion {
                        x: 160.0,
                        y: 50.0,
                        width: 140.0,
                        height: 42.0,
                        corner_radius: 21.0,
                    }),
                },
            },
            FrameTemplate {
                id: "pixel-9".to_string(),
                name: "Pixel 9".to_string(),
                group: "Phones".to_string(),
                art: flat("#111827", 55.0),
                native_width: 450.0,
                native_height: 930.0,
                screen: ScreenRegion {
                    x: 28.0,
                    y: 28.0,
                    width: 394.0,
                    height: 874.0,
                    corner_radius: 40.0,
                    island: Some(IslandRegion {
                        x: 205.0,
                        y: 46.0,
                        width: 40.0,
                        height: 40.0,
                        corner_radius: 20.0,
                    }),
                },
            },
            FrameTemplate {
                id: "iphone-se".to_string(),
                name: "iPhone SE".to_string(),
                group: "Phones".to_string(),
                art: flat("#374151", 60.0),
                native_width: 420.0,
                native_height: 860.0,
                screen: ScreenRegion {
                    x: 35.0,
                    y: 120.0,
                    width: 350.0,
                    height: 620.0,
                    corner_radius: 0.0,
                    island: None,
                },
            },
            FrameTemplate {
                id: "ipad-air".to_string(),
                name: "iPad Air".to_string(),
                group: "Tablets".to_string(),
                art: flat("#1f2937", 40.0),
                native_width: 840.0,
                native_height: 1180.0,
                screen: ScreenRegion {
                    x: 45.0,
                    y: 45.0,
                    width: 750.0,
                    height: 1090.0,
                    corner_radius: 24.0,
                    island: None,
                },
            },
            FrameTemplate {
                id: "macbook-air".to_string(),
                name: "MacBook Air".to_string(),
                group: "Laptops".to_string(),
                art: flat("#111827", 26.0),
                native_width: 1440.0,
                native_height: 940.0,
                screen: ScreenRegion {
                    x: 120.0,
                    y: 40.0,
                    width: 1200.0,
                    height: 750.0,
                    corner_radius: 12.0,
                    island: None,
                },
            },
        ];

        let catalog = Self { frames };
        debug_assert!(catalog.validate().is_ok());
        catalog
    }

    pub fn from_json(s: &str) -> StageResult<Self> {
        let catalog: Self = serde_json::from_str(s)
            .map_err(|e| StageError::validation(format!("parse frame catalog: {e}")))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_path(path: &std::path::Path) -> StageResult<Self> {
        use anyhow::Context as _;
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read frame catalog '{}'", path.display()))
            .map_err(StageError::from)?;
        Self::from_json(&s)
    }

    pub fn validate(&self) -> StageResult<()> {
        if self.frames.is_empty() {
            return Err(StageError::validation("catalog must contain frames"));
        }

        let mut seen = std::collections::HashSet::new();
        for frame in &self.frames {
            if frame.id.trim().is_empty() {
                return Err(StageError::validation("frame id must be non-empty"));
            }
            if !seen.insert(frame.id.as_str()) {
                return Err(StageError::validation(format!(
                    "duplicate frame id '{}'",
                    frame.id
                )));
            }
            if frame.group.trim().is_empty() {
                return Err(StageError::validation(format!(
                    "frame '{}' group must be non-empty",
                    frame.id
                )));
            }
            if frame.native_width <= 0.0 || frame.native_height <= 0.0 {
                return Err(StageError::validation(format!(
                    "frame '{}' native dimensions must be > 0",
                    frame.id
                )));
            }

            let s = &frame.screen;
            if s.width <= 0.0 || s.height <= 0.0 || s.corner_radius < 0.0 {
                return Err(StageError::validation(format!(
                    "frame '{}' screen region is degenerate",
                    frame.id
                )));
            }
            if s.x < 0.0
                || s.y < 0.0
                || s.x + s.width > frame.native_width
                || s.y + s.height > frame.native_height
            {
                return Err(StageError::validation(format!(
                    "frame '{}' screen region escapes the frame",
                    frame.id
                )));
            }

            if let Some(island) = &s.island {
                if island.width <= 0.0 || island.height <= 0.0 || island.corner_radius < 0.0 {
                    return Err(StageError::validation(format!(
                        "frame '{}' island is degenerate",
                        frame.id
                    )));
                }
                // Strictly inside the screen region, never touching its edge.
                if island.x <= s.x
                    || island.y <= s.y
                    || island.x + island.width >= s.x + s.width
                    || island.y + island.height >= s.y + s.height
                {
                    return Err(StageError::validation(format!(
                        "frame '{}' island must lie strictly inside the screen region",
                        frame.id
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&FrameTemplate> {
        self.frames.iter().find(|f| f.id == id)
    }

    /// Templates in catalog order, grouped by `group` (group order follows
    /// first appearance). This is the ordered-by-group list the UI shell
    /// renders as a frame selector.
    pub fn grouped(&self) -> Vec<(&str, Vec<&FrameTemplate>)> {
        let mut order = Vec::<&str>::new();
        let mut by_group = BTreeMap::<&str, Vec<&FrameTemplate>>::new();
        for frame in &self.frames {
            let entry = by_group.entry(frame.group.as_str()).or_default();
            if entry.is_empty() {
                order.push(frame.group.as_str());
            }
            entry.push(frame);
        }
        order
            .into_iter()
            .map(|g| (g, by_group.remove(g).unwrap_or_default()))
            .collect()
    }

    /// Tallest native height in the catalog; the display-scale rule sizes
    /// every new composition relative to this.
    pub fn max_native_height(&self) -> f64 {
        self.frames
            .iter()
            .map(|f| f.native_height)
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
#[path = "../tests/unit/catalog.rs"]
mod tests;
