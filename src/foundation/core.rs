use crate::foundation::error::{StageError, StageResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> StageResult<Self> {
        if width == 0 || height == 0 {
            return Err(StageError::validation("canvas width/height must be > 0"));
        }
        Ok(Self { width, height })
    }

    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }
}

/// A composition's own transform on the canvas, independent of the global
/// viewport transform.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NodeTransform {
    pub x: f64,
    pub y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub rotation_deg: f64,
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation_deg: 0.0,
        }
    }
}

impl NodeTransform {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    pub fn to_affine(self) -> Affine {
        let t_translate = Affine::translate((self.x, self.y));
        let t_rotate = Affine::rotate(self.rotation_deg.to_radians());
        let t_scale = Affine::scale_non_uniform(self.scale_x, self.scale_y);

        // Canonical order, pivot at the node origin:
        // T(translate) * R(rot) * S(scale)
        t_translate * t_rotate * t_scale
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }
}

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` into a premultiplied color.
pub fn parse_hex_color(s: &str) -> StageResult<Rgba8Premul> {
    let hex = s
        .strip_prefix('#')
        .ok_or_else(|| StageError::validation(format!("color '{s}' must start with '#'")))?;

    let nibble = |c: u8| -> StageResult<u8> {
        match c {
            b'0'..=b'9' => Ok(c - b'0'),
            b'a'..=b'f' => Ok(c - b'a' + 10),
            b'A'..=b'F' => Ok(c - b'A' + 10),
            _ => Err(StageError::validation(format!(
                "color '{s}' has a non-hex digit"
            ))),
        }
    };

    let bytes = hex.as_bytes();
    let (r, g, b, a) = match bytes.len() {
        3 => {
            let r = nibble(bytes[0])?;
            let g = nibble(bytes[1])?;
            let b = nibble(bytes[2])?;
            (r * 17, g * 17, b * 17, 255)
        }
        6 | 8 => {
            let byte = |i: usize| -> StageResult<u8> {
                Ok(nibble(bytes[i])? * 16 + nibble(bytes[i + 1])?)
            };
            let a = if bytes.len() == 8 { byte(6)? } else { 255 };
            (byte(0)?, byte(2)?, byte(4)?, a)
        }
        _ => {
            return Err(StageError::validation(format!(
                "color '{s}' must be #rgb, #rrggbb or #rrggbbaa"
            )));
        }
    };

    Ok(Rgba8Premul::from_straight_rgba(r, g, b, a))
}
