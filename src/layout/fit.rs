/// Size and position that "cover"-fit a piece of content into a container.
///
/// One axis matches the container exactly; the other meets or exceeds it and
/// is centered, so the clip mask crops the overflow instead of letterboxing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverFit {
    pub width: f64,
    pub height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Compute the cover fit of `content` into `container`.
///
/// Callers guarantee strictly positive dimensions on both sides; acquisition
/// rejects zero-dimension images and the catalog rejects zero-dimension
/// screen regions before this is ever reached.
pub fn cover_fit(
    container_width: f64,
    container_height: f64,
    content_width: f64,
    content_height: f64,
) -> CoverFit {
    let container_aspect = container_width / container_height;
    let content_aspect = content_width / content_height;

    let (width, height) = if content_aspect > container_aspect {
        // Content relatively wider: pin height, overflow horizontally.
        (container_height * content_aspect, container_height)
    } else {
        // Content relatively taller (or equal): pin width, overflow vertically.
        (container_width, container_width / content_aspect)
    };

    CoverFit {
        width,
        height,
        offset_x: (container_width - width) / 2.0,
        offset_y: (container_height - height) / 2.0,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/fit.rs"]
mod tests;
