use crate::foundation::error::{StageError, StageResult};
use crate::render::backend::RenderBackend;
use crate::scene::manager::SceneManager;
use crate::scene::node::CompositionId;

/// Swap the selected composition's frame template while exactly preserving
/// its transform and re-applying any placed photo.
///
/// The composition node is destroyed and rebuilt (never mutated in place)
/// because `frame_scale` is fixed for a composition's lifetime. The captured
/// transform overwrites the rebuild's auto-centering, and a captured photo
/// is re-fitted against the new frame's (possibly different) screen region.
/// Selection lands on the new composition. Without a selection this is a
/// no-op returning `None`.
#[tracing::instrument(skip(scene, backend))]
pub fn swap_frame(
    scene: &mut SceneManager,
    backend: &mut dyn RenderBackend,
    new_frame_id: &str,
) -> StageResult<Option<CompositionId>> {
    let Some(old_id) = scene.selected() else {
        return Ok(None);
    };
    // Validate the target frame before destroying anything, so a bad id
    // leaves the prior composition intact.
    if scene.catalog().get(new_frame_id).is_none() {
        return Err(StageError::resolution(format!(
            "unknown frame id '{new_frame_id}'"
        )));
    }

    let (transform, image) = {
        let comp = scene
            .get(old_id)
            .ok_or_else(|| StageError::resolution("selected composition no longer exists"))?;
        (
            comp.transform,
            comp.content.photo().map(|p| p.source.clone()),
        )
    };

    scene.destroy_composition(backend, old_id)?;

    let new_id = scene.add_composition(backend, new_frame_id)?;
    scene.set_transform(backend, new_id, transform)?;
    if let Some(image) = image {
        scene.attach_image(backend, new_id, image)?;
    }
    scene.select_composition(backend, Some(new_id))?;

    tracing::debug!(from = old_id.0, to = new_id.0, "swapped frame");
    Ok(Some(new_id))
}

#[cfg(test)]
#[path = "../../tests/unit/scene/swap.rs"]
mod tests;
