use super::*;
use crate::catalog::{IslandRegion, ScreenRegion};
use crate::geometry::screen_clip_path;

const RED: Rgba8Premul = Rgba8Premul {
    r: 255,
    g: 0,
    b: 0,
    a: 255,
};
const BLUE: Rgba8Premul = Rgba8Premul {
    r: 0,
    g: 0,
    b: 255,
    a: 255,
};

fn canvas(width: u32, height: u32) -> CanvasSize {
    CanvasSize { width, height }
}

fn pixel(img: &ExportImage, x: u32, y: u32) -> [u8; 4] {
    let idx = (y as usize * img.width as usize + x as usize) * 4;
    let px = &img.rgba8_premul[idx..idx + 4];
    [px[0], px[1], px[2], px[3]]
}

#[test]
fn opaque_rect_replaces_the_background() {
    let mut r = SoftwareRenderer::new(canvas(20, 20));
    r.set_background(Rgba8Premul::from_straight_rgba(255, 255, 255, 255));
    let rect = r.create_rect(r.root(), 10.0, 10.0, Some(RED));
    r.set_transform(rect, NodeTransform::at(5.0, 5.0));

    let img = r.export_canvas(1.0, None).unwrap();
    assert_eq!(pixel(&img, 10, 10), [255, 0, 0, 255]);
    assert_eq!(pixel(&img, 1, 1), [255, 255, 255, 255]);
}

#[test]
fn transparent_fill_draws_nothing_but_still_hits() {
    let mut r = SoftwareRenderer::new(canvas(20, 20));
    let rect = r.create_rect(r.root(), 20.0, 20.0, None);

    let img = r.export_canvas(1.0, None).unwrap();
    assert_eq!(pixel(&img, 10, 10)[0], 255); // untouched white background
    assert_eq!(r.hit_test(Point::new(10.0, 10.0)), Some(rect));
}

#[test]
fn children_paint_in_insertion_order_and_reorder() {
    let mut r = SoftwareRenderer::new(canvas(10, 10));
    let red = r.create_rect(r.root(), 10.0, 10.0, Some(RED));
    let blue = r.create_rect(r.root(), 10.0, 10.0, Some(BLUE));

    let img = r.export_canvas(1.0, None).unwrap();
    assert_eq!(pixel(&img, 5, 5), [0, 0, 255, 255]);

    r.move_to_bottom(blue);
    let img = r.export_canvas(1.0, None).unwrap();
    assert_eq!(pixel(&img, 5, 5), [255, 0, 0, 255]);

    r.move_to_top(blue);
    let img = r.export_canvas(1.0, None).unwrap();
    assert_eq!(pixel(&img, 5, 5), [0, 0, 255, 255]);
    let _ = red;
}

#[test]
fn image_nodes_scale_to_their_destination_size() {
    let mut r = SoftwareRenderer::new(canvas(16, 16));
    let handle = ImageHandle::from_premul(1, 1, vec![0, 255, 0, 255]).unwrap();
    r.create_image(r.root(), handle, 16.0, 16.0);

    let img = r.export_canvas(1.0, None).unwrap();
    assert_eq!(pixel(&img, 8, 8), [0, 255, 0, 255]);
    assert_eq!(pixel(&img, 1, 14), [0, 255, 0, 255]);
}

#[test]
fn clip_masks_painting_with_the_island_cut_out() {
    let screen = ScreenRegion {
        x: 0.0,
        y: 0.0,
        width: 100.0,
        height: 100.0,
        corner_radius: 0.0,
        island: Some(IslandRegion {
            x: 40.0,
            y: 10.0,
            width: 20.0,
            height: 10.0,
            corner_radius: 0.0,
        }),
    };

    let mut r = SoftwareRenderer::new(canvas(100, 100));
    let group = r.create_group(r.root());
    r.set_clip(group, Some(screen_clip_path(&screen, 1.0)));
    r.create_rect(group, 100.0, 100.0, Some(RED));

    let img = r.export_canvas(1.0, None).unwrap();
    // Inside the screen, outside the island: painted.
    assert_eq!(pixel(&img, 20, 50), [255, 0, 0, 255]);
    // Inside the island: background shows through.
    assert_eq!(pixel(&img, 50, 15), [255, 255, 255, 255]);
}

#[test]
fn clip_gates_hit_testing_too() {
    let screen = ScreenRegion {
        x: 0.0,
        y: 0.0,
        width: 50.0,
        height: 50.0,
        corner_radius: 0.0,
        island: Some(IslandRegion {
            x: 20.0,
            y: 20.0,
            width: 10.0,
            height: 10.0,
            corner_radius: 0.0,
        }),
    };

    let mut r = SoftwareRenderer::new(canvas(100, 100));
    let group = r.create_group(r.root());
    r.set_clip(group, Some(screen_clip_path(&screen, 1.0)));
    let rect = r.create_rect(group, 50.0, 50.0, Some(RED));

    assert_eq!(r.hit_test(Point::new(10.0, 10.0)), Some(rect));
    assert_eq!(r.hit_test(Point::new(25.0, 25.0)), None); // island hole
    assert_eq!(r.hit_test(Point::new(80.0, 80.0)), None); // outside clip
}

#[test]
fn non_listening_subtrees_are_invisible_to_hit_testing() {
    let mut r = SoftwareRenderer::new(canvas(40, 40));
    let below = r.create_rect(r.root(), 40.0, 40.0, Some(RED));
    let above = r.create_rect(r.root(), 40.0, 40.0, Some(BLUE));

    assert_eq!(r.hit_test(Point::new(20.0, 20.0)), Some(above));
    r.set_listening(above, false);
    assert_eq!(r.hit_test(Point::new(20.0, 20.0)), Some(below));
}

#[test]
fn transforms_compose_through_groups() {
    let mut r = SoftwareRenderer::new(canvas(40, 40));
    let group = r.create_group(r.root());
    r.set_transform(group, NodeTransform::at(10.0, 10.0));
    let rect = r.create_rect(group, 10.0, 10.0, Some(RED));
    r.set_transform(
        rect,
        NodeTransform {
            x: 0.0,
            y: 0.0,
            scale_x: 2.0,
            scale_y: 2.0,
            rotation_deg: 0.0,
        },
    );

    let img = r.export_canvas(1.0, None).unwrap();
    assert_eq!(pixel(&img, 15, 15), [255, 0, 0, 255]);
    assert_eq!(pixel(&img, 29, 29), [255, 0, 0, 255]);
    assert_eq!(pixel(&img, 31, 31), [255, 255, 255, 255]);

    assert_eq!(r.hit_test(Point::new(29.0, 29.0)), Some(rect));
}

#[test]
fn node_bounds_unions_children_through_their_transforms() {
    let mut r = SoftwareRenderer::new(canvas(40, 40));
    let group = r.create_group(r.root());
    let a = r.create_rect(group, 10.0, 10.0, Some(RED));
    let b = r.create_rect(group, 10.0, 10.0, Some(BLUE));
    r.set_transform(b, NodeTransform::at(30.0, 5.0));

    let bounds = r.node_bounds(group);
    assert_eq!(bounds, Rect::new(0.0, 0.0, 40.0, 15.0));
    let _ = a;
}

#[test]
fn remove_node_drops_the_whole_subtree() {
    let mut r = SoftwareRenderer::new(canvas(10, 10));
    let before = r.node_count();
    let group = r.create_group(r.root());
    r.create_rect(group, 5.0, 5.0, Some(RED));
    r.create_rect(group, 5.0, 5.0, Some(BLUE));

    r.remove_node(group);
    assert_eq!(r.node_count(), before);
    assert_eq!(r.hit_test(Point::new(2.0, 2.0)), None);
}

#[test]
fn removing_a_selected_subtree_clears_the_overlay() {
    let mut r = SoftwareRenderer::new(canvas(10, 10));
    let group = r.create_group(r.root());
    r.set_selection_overlay(Some(group));
    r.remove_node(group);
    assert_eq!(r.selection_overlay(), None);
}

#[test]
fn pixel_ratio_multiplies_the_readback_resolution() {
    let mut r = SoftwareRenderer::new(canvas(30, 20));
    let img = r.export_canvas(4.0, None).unwrap();
    assert_eq!((img.width, img.height), (120, 80));

    assert!(r.export_canvas(0.0, None).is_err());
}

#[test]
fn offscreen_surfaces_clone_render_and_release() {
    let mut r = SoftwareRenderer::new(canvas(50, 50));
    let group = r.create_group(r.root());
    r.set_transform(
        group,
        NodeTransform {
            x: 10.0,
            y: 10.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation_deg: 45.0,
        },
    );
    r.create_rect(group, 12.0, 12.0, Some(RED));
    let before = r.node_count();

    let surface = r.create_offscreen(canvas(20, 20));
    let clone = r.clone_subtree_to(group, surface).unwrap();
    // The clone is independent: resetting its transform leaves the original.
    r.set_transform(clone, NodeTransform::default());

    let img = r.export_surface(surface, 1.0, None).unwrap();
    assert_eq!(pixel(&img, 6, 6), [255, 0, 0, 255]);
    assert_eq!(img.rgba8_premul.len(), 20 * 20 * 4);
    // Surface exports default to a transparent background.
    assert_eq!(pixel(&img, 18, 18), [0, 0, 0, 0]);
    assert_eq!(r.transform(group).rotation_deg, 45.0);

    r.release_offscreen(surface);
    assert_eq!(r.node_count(), before);
    assert!(r.export_surface(surface, 1.0, None).is_err());
}

#[test]
fn over_opaque_src_replaces_and_transparent_src_is_noop() {
    let dst = [10, 20, 30, 40];
    assert_eq!(over(dst, [255, 0, 0, 255]), [255, 0, 0, 255]);
    assert_eq!(over(dst, [0, 0, 0, 0]), dst);
}

#[test]
fn over_blends_premultiplied_halves() {
    let out = over([0, 0, 0, 255], [128, 0, 0, 128]);
    assert_eq!(out[0], 128);
    assert_eq!(out[3], 255);
    assert_eq!(mul_div255(255, 255), 255);
    assert_eq!(mul_div255(255, 0), 0);
}

#[test]
fn straight_rgba_conversion_unpremultiplies() {
    let img = ExportImage {
        width: 1,
        height: 1,
        rgba8_premul: vec![64, 32, 16, 128],
    };
    let straight = img.into_straight_rgba();
    assert_eq!(straight[3], 128);
    assert_eq!(straight[0], 128); // 64 * 255 / 128, rounded
}
