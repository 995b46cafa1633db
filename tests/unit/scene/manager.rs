use super::*;
use crate::render::software::SoftwareRenderer;

fn canvas() -> CanvasSize {
    CanvasSize {
        width: 900,
        height: 600,
    }
}

fn setup() -> (SoftwareRenderer, SceneManager) {
    let backend = SoftwareRenderer::new(canvas());
    let scene = SceneManager::new(FrameCatalog::builtin(), ArtStore::empty(), canvas());
    (backend, scene)
}

fn test_image(width: u32, height: u32) -> ImageHandle {
    ImageHandle::from_premul(
        width,
        height,
        vec![255; width as usize * height as usize * 4],
    )
    .unwrap()
}

#[test]
fn add_uses_the_catalog_relative_display_scale() {
    let (mut backend, mut scene) = setup();
    let id = scene.add_composition(&mut backend, "iphone-15-pro").unwrap();
    let comp = scene.get(id).unwrap();

    // desired_height / native_height reduces to 0.8 * stage_height / tallest
    // native height, identical for every template in the catalog.
    let expected = 0.8 * 600.0 / 1180.0;
    assert!((comp.frame_scale - expected).abs() < 1e-12);

    let other = scene.add_composition(&mut backend, "macbook-air").unwrap();
    assert!((scene.get(other).unwrap().frame_scale - expected).abs() < 1e-12);
}

#[test]
fn add_centers_the_composition_and_selects_it() {
    let (mut backend, mut scene) = setup();
    let id = scene.add_composition(&mut backend, "pixel-9").unwrap();
    let comp = scene.get(id).unwrap();

    let width = 450.0 * comp.frame_scale;
    let height = 930.0 * comp.frame_scale;
    assert!((comp.transform.x - (450.0 - width / 2.0)).abs() < 1e-9);
    assert!((comp.transform.y - (300.0 - height / 2.0)).abs() < 1e-9);

    assert_eq!(scene.selected(), Some(id));
    assert_eq!(
        scene.affordances(),
        UiAffordances {
            can_delete: true,
            can_export_frame: true,
            can_swap: true,
        }
    );
    assert_eq!(backend.selection_overlay(), Some(comp.root));
}

#[test]
fn unknown_frame_id_adds_nothing() {
    let (mut backend, mut scene) = setup();
    let before = backend.node_count();
    let err = scene.add_composition(&mut backend, "no-such-frame").unwrap_err();
    assert!(matches!(err, StageError::Resolution(_)));
    assert!(scene.compositions().is_empty());
    assert_eq!(backend.node_count(), before);
}

#[test]
fn placeholder_carries_its_upload_affordance() {
    let (mut backend, mut scene) = setup();
    let id = scene.add_composition(&mut backend, "iphone-15-pro").unwrap();
    let Content::Placeholder(placeholder) = &scene.get(id).unwrap().content else {
        panic!("fresh composition should hold a placeholder");
    };
    assert_eq!(backend.text_of(placeholder.label), Some("Upload an Image"));
    assert!(backend.node_is_within(placeholder.hit_rect, placeholder.group));
}

#[test]
fn attach_replaces_the_placeholder_atomically() {
    let (mut backend, mut scene) = setup();
    let id = scene.add_composition(&mut backend, "iphone-15-pro").unwrap();
    assert!(scene.get(id).unwrap().content.is_placeholder());
    let with_placeholder = backend.node_count();

    scene
        .attach_image(&mut backend, id, test_image(1920, 1080))
        .unwrap();
    let comp = scene.get(id).unwrap();
    assert!(!comp.content.is_placeholder());
    // Placeholder subtree (group + rect + icon + label) traded for the
    // photo subtree (group + image).
    assert_eq!(backend.node_count(), with_placeholder - 4 + 2);

    // Idempotent replace: attaching again swaps the photo subtree in place.
    let with_photo = backend.node_count();
    scene
        .attach_image(&mut backend, id, test_image(640, 1136))
        .unwrap();
    assert_eq!(backend.node_count(), with_photo);
    assert_eq!(
        scene.get(id).unwrap().content.photo().unwrap().source.width,
        640
    );
}

#[test]
fn delete_with_photo_reverts_to_placeholder() {
    let (mut backend, mut scene) = setup();
    let id = scene.add_composition(&mut backend, "iphone-15-pro").unwrap();
    scene
        .attach_image(&mut backend, id, test_image(100, 100))
        .unwrap();

    scene.delete_composition(&mut backend, id).unwrap();

    // Still tracked, back in placeholder state, still selected.
    let comp = scene.get(id).unwrap();
    assert!(comp.content.is_placeholder());
    assert_eq!(scene.compositions().len(), 1);
    assert_eq!(scene.selected(), Some(id));
}

#[test]
fn delete_with_placeholder_removes_entirely() {
    let (mut backend, mut scene) = setup();
    let empty_count = backend.node_count();
    let id = scene.add_composition(&mut backend, "ipad-air").unwrap();

    scene.delete_composition(&mut backend, id).unwrap();

    assert!(scene.compositions().is_empty());
    assert!(!scene.has_selection());
    assert_eq!(backend.selection_overlay(), None);
    assert_eq!(backend.node_count(), empty_count);
}

#[test]
fn selection_is_exclusive() {
    let (mut backend, mut scene) = setup();
    let a = scene.add_composition(&mut backend, "iphone-15-pro").unwrap();
    let b = scene.add_composition(&mut backend, "pixel-9").unwrap();
    assert_eq!(scene.selected(), Some(b));

    scene.select_composition(&mut backend, Some(a)).unwrap();
    assert_eq!(scene.selected(), Some(a));
    assert_eq!(backend.selection_overlay(), Some(scene.get(a).unwrap().root));

    scene.select_composition(&mut backend, None).unwrap();
    assert!(!scene.has_selection());
    assert!(!scene.affordances().can_swap);
}

#[test]
fn composition_at_resolves_hits_through_the_subtree() {
    let (mut backend, mut scene) = setup();
    let id = scene.add_composition(&mut backend, "iphone-15-pro").unwrap();

    // Center of the screen lands on the placeholder's clickable rect.
    let center = Point::new(450.0, 300.0);
    assert_eq!(scene.composition_at(&backend, center), Some(id));

    // Far off-canvas point hits nothing.
    assert_eq!(scene.composition_at(&backend, Point::new(-500.0, -500.0)), None);
}

#[test]
fn attach_falls_back_to_the_last_added_composition() {
    let (mut backend, mut scene) = setup();
    let id = scene.add_composition(&mut backend, "iphone-15-pro").unwrap();
    scene.select_composition(&mut backend, None).unwrap();

    let target = scene
        .attach_to_selected_or_last(&mut backend, test_image(10, 10))
        .unwrap();
    assert_eq!(target, id);

    // With no compositions at all the operation cannot resolve a target.
    let (mut backend2, mut scene2) = setup();
    assert!(matches!(
        scene2.attach_to_selected_or_last(&mut backend2, test_image(10, 10)),
        Err(StageError::Resolution(_))
    ));
}

#[test]
fn newer_acquisition_wins_regardless_of_completion_order() {
    let (mut backend, mut scene) = setup();
    let id = scene.add_composition(&mut backend, "iphone-15-pro").unwrap();

    // Two uploads race and the older one completes last. Generation tagging
    // makes "newest issued wins" hold regardless of completion order, so the
    // outcome never depends on which read finishes first.
    let older = scene.begin_acquisition().unwrap();
    let newer = scene.begin_acquisition().unwrap();
    assert_eq!(older.composition, id);
    assert!(newer.generation > older.generation);

    let attached = scene
        .complete_acquisition(&mut backend, newer, Ok(test_image(20, 20)))
        .unwrap();
    assert!(attached);

    let discarded = scene
        .complete_acquisition(&mut backend, older, Ok(test_image(99, 99)))
        .unwrap();
    assert!(!discarded);
    assert_eq!(
        scene.get(id).unwrap().content.photo().unwrap().source.width,
        20
    );
}

#[test]
fn acquisition_against_a_deleted_composition_is_discarded() {
    let (mut backend, mut scene) = setup();
    scene.add_composition(&mut backend, "iphone-15-pro").unwrap();
    let ticket = scene.begin_acquisition().unwrap();
    scene
        .delete_composition(&mut backend, ticket.composition)
        .unwrap();

    let attached = scene
        .complete_acquisition(&mut backend, ticket, Ok(test_image(8, 8)))
        .unwrap();
    assert!(!attached);
}

#[test]
fn failed_acquisition_leaves_content_untouched() {
    let (mut backend, mut scene) = setup();
    let id = scene.add_composition(&mut backend, "iphone-15-pro").unwrap();
    let ticket = scene.begin_acquisition().unwrap();

    let result = scene.complete_acquisition(
        &mut backend,
        ticket,
        Err(StageError::acquisition("file could not be read")),
    );
    assert!(matches!(result, Err(StageError::Acquisition(_))));
    assert!(scene.get(id).unwrap().content.is_placeholder());
}
