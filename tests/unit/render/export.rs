use super::*;
use crate::assets::acquire::ImageHandle;
use crate::assets::art::ArtStore;
use crate::catalog::FrameCatalog;
use crate::render::software::SoftwareRenderer;

fn setup() -> (SoftwareRenderer, SceneManager) {
    let canvas = CanvasSize {
        width: 900,
        height: 600,
    };
    (
        SoftwareRenderer::new(canvas),
        SceneManager::new(FrameCatalog::builtin(), ArtStore::empty(), canvas),
    )
}

#[test]
fn scene_export_hides_and_restores_the_selection_overlay() {
    let (mut backend, mut scene) = setup();
    let id = scene.add_composition(&mut backend, "iphone-15-pro").unwrap();
    let root = scene.get(id).unwrap().root;
    assert_eq!(backend.selection_overlay(), Some(root));

    let img = export_scene(&mut backend, 2.0).unwrap();
    assert_eq!((img.width, img.height), (1800, 1200));
    assert_eq!(backend.selection_overlay(), Some(root));
}

#[test]
fn frame_export_without_selection_is_a_noop_with_no_leaked_surface() {
    let (mut backend, mut scene) = setup();
    scene.add_composition(&mut backend, "iphone-15-pro").unwrap();
    scene.select_composition(&mut backend, None).unwrap();
    let before = backend.node_count();

    let result = export_composition(&mut backend, &scene).unwrap();
    assert!(result.is_none());
    assert_eq!(backend.node_count(), before);
}

#[test]
fn frame_export_fits_the_square_and_releases_the_surface() {
    let (mut backend, mut scene) = setup();
    let id = scene.add_composition(&mut backend, "iphone-15-pro").unwrap();
    scene
        .attach_image(
            &mut backend,
            id,
            ImageHandle::from_premul(4, 4, vec![255; 64]).unwrap(),
        )
        .unwrap();

    // Give it a placement the export must ignore.
    let placed = NodeTransform {
        x: 300.0,
        y: 100.0,
        scale_x: 0.5,
        scale_y: 0.5,
        rotation_deg: 30.0,
    };
    scene.set_transform(&mut backend, id, placed).unwrap();
    let before = backend.node_count();

    let img = export_composition(&mut backend, &scene).unwrap().unwrap();

    // Portrait frame: height pins to the export square.
    assert_eq!(img.height, FRAME_EXPORT_SIZE as u32);
    assert!(img.width < img.height);

    // The live composition is untouched and the temp surface is gone.
    assert_eq!(scene.get(id).unwrap().transform, placed);
    assert_eq!(backend.transform(scene.get(id).unwrap().root), placed);
    assert_eq!(backend.node_count(), before);

    // Bezel pixels land in the readback (frame art drawn over the photo).
    let center = ((img.height / 2) as usize * img.width as usize + (img.width / 2) as usize) * 4;
    assert_ne!(img.rgba8_premul[center + 3], 0);
}
