use super::*;
use crate::viewport::transform::{MAX_SCALE, MIN_SCALE};

fn wheel_zoom(position: Point, delta_y: f64) -> WheelEvent {
    WheelEvent {
        position,
        delta_x: 0.0,
        delta_y,
        zoom_modifier: true,
    }
}

#[test]
fn modifier_wheel_zooms_toward_the_cursor() {
    let mut vc = ViewportController::new();
    let cursor = Point::new(320.0, 200.0);
    let before = vc.transform().view_to_canvas(cursor);

    for _ in 0..50 {
        vc.on_wheel(wheel_zoom(cursor, -1.0));
    }
    assert!((vc.transform().scale - WHEEL_ZOOM_STEP.powi(50)).abs() < 1e-9);

    let after = vc.transform().view_to_canvas(cursor);
    assert!((before.x - after.x).abs() < 1e-9);
    assert!((before.y - after.y).abs() < 1e-9);
}

#[test]
fn plain_wheel_pans_instead_of_zooming() {
    let mut vc = ViewportController::new();
    vc.on_wheel(WheelEvent {
        position: Point::new(10.0, 10.0),
        delta_x: 30.0,
        delta_y: -12.0,
        zoom_modifier: false,
    });
    assert_eq!(vc.transform().scale, 1.0);
    assert_eq!(vc.transform().pan_x, -30.0);
    assert_eq!(vc.transform().pan_y, 12.0);
}

#[test]
fn scale_stays_clamped_under_any_gesture_sequence() {
    let mut vc = ViewportController::new();
    let cursor = Point::new(50.0, 50.0);

    for _ in 0..5000 {
        vc.on_wheel(wheel_zoom(cursor, -1.0));
    }
    assert!(vc.transform().scale <= MAX_SCALE);

    for _ in 0..10000 {
        vc.on_wheel(wheel_zoom(cursor, 1.0));
    }
    assert!(vc.transform().scale >= MIN_SCALE);

    // A violent pinch cannot escape the clamp either.
    vc.on_touch_start(&[Point::new(0.0, 0.0), Point::new(1.0, 0.0)], false);
    vc.on_touch_move(&[Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
    vc.on_touch_move(&[Point::new(0.0, 0.0), Point::new(5000.0, 0.0)]);
    assert!(vc.transform().scale <= MAX_SCALE);
    assert!(vc.transform().scale >= MIN_SCALE);
}

#[test]
fn zero_key_resets_scale_and_pan() {
    let mut vc = ViewportController::new();
    vc.on_wheel(wheel_zoom(Point::new(99.0, 1.0), -1.0));
    vc.pan(Vec2::new(40.0, -3.0));

    vc.on_key_down(Key::Digit0, false);
    assert_eq!(*vc.transform(), ViewportTransform::default());
}

#[test]
fn shortcuts_are_suppressed_while_a_text_input_has_focus() {
    let mut vc = ViewportController::new();
    vc.on_wheel(wheel_zoom(Point::new(0.0, 0.0), -1.0));
    let before = *vc.transform();

    vc.on_key_down(Key::Digit0, true);
    assert_eq!(*vc.transform(), before);

    vc.on_key_down(Key::Space, true);
    assert!(!vc.on_pointer_down(Point::new(5.0, 5.0)));
    assert_eq!(vc.cursor_hint(), CursorHint::Default);
}

#[test]
fn space_drag_pans_with_cursor_hints() {
    let mut vc = ViewportController::new();
    assert_eq!(vc.cursor_hint(), CursorHint::Default);

    vc.on_key_down(Key::Space, false);
    assert_eq!(vc.cursor_hint(), CursorHint::Grab);

    assert!(vc.on_pointer_down(Point::new(100.0, 100.0)));
    assert_eq!(vc.cursor_hint(), CursorHint::Grabbing);

    vc.on_pointer_move(Point::new(130.0, 90.0));
    assert_eq!(vc.transform().pan_x, 30.0);
    assert_eq!(vc.transform().pan_y, -10.0);

    // Releasing space mid-drag keeps the drag until pointer-up.
    vc.on_key_up(Key::Space);
    vc.on_pointer_move(Point::new(140.0, 90.0));
    assert_eq!(vc.transform().pan_x, 40.0);
    assert_eq!(vc.cursor_hint(), CursorHint::Grabbing);

    vc.on_pointer_up();
    assert_eq!(vc.cursor_hint(), CursorHint::Default);
}

#[test]
fn pointer_without_space_is_not_captured() {
    let mut vc = ViewportController::new();
    assert!(!vc.on_pointer_down(Point::new(10.0, 10.0)));
    vc.on_pointer_move(Point::new(50.0, 50.0));
    assert_eq!(vc.transform().pan_x, 0.0);
}

#[test]
fn single_finger_pans_only_from_empty_canvas() {
    let mut vc = ViewportController::new();

    // Starting on a composition passes through untouched.
    vc.on_touch_start(&[Point::new(10.0, 10.0)], true);
    vc.on_touch_move(&[Point::new(60.0, 10.0)]);
    assert_eq!(vc.transform().pan_x, 0.0);

    vc.on_touch_end(&[]);
    vc.on_touch_start(&[Point::new(10.0, 10.0)], false);
    vc.on_touch_move(&[Point::new(60.0, 25.0)]);
    assert_eq!(vc.transform().pan_x, 50.0);
    assert_eq!(vc.transform().pan_y, 15.0);
}

#[test]
fn pinch_zooms_with_the_wheel_anchor_math() {
    let mut vc = ViewportController::new();
    let a = Point::new(100.0, 200.0);
    let b = Point::new(200.0, 200.0);
    let midpoint = a.midpoint(b);
    let anchored = vc.transform().view_to_canvas(midpoint);

    vc.on_touch_start(&[a, b], false);
    // Fingers spread symmetrically around a static midpoint: pure zoom.
    vc.on_touch_move(&[Point::new(50.0, 200.0), Point::new(250.0, 200.0)]);

    assert!((vc.transform().scale - 2.0).abs() < 1e-9);
    let after = vc.transform().view_to_canvas(midpoint);
    assert!((anchored.x - after.x).abs() < 1e-9);
    assert!((anchored.y - after.y).abs() < 1e-9);
}

#[test]
fn pinch_pans_by_the_midpoint_motion() {
    let mut vc = ViewportController::new();
    let a = Point::new(100.0, 100.0);
    let b = Point::new(200.0, 100.0);
    vc.on_touch_start(&[a, b], false);

    // Same spread, midpoint translated 40px right: pure pan.
    vc.on_touch_move(&[Point::new(140.0, 100.0), Point::new(240.0, 100.0)]);
    assert!((vc.transform().scale - 1.0).abs() < 1e-9);
    assert!((vc.transform().pan_x - 40.0).abs() < 1e-9);
}

#[test]
fn lifting_below_two_fingers_clears_pinch_tracking() {
    let mut vc = ViewportController::new();
    vc.on_touch_start(&[Point::new(0.0, 0.0), Point::new(100.0, 0.0)], false);
    vc.on_touch_move(&[Point::new(0.0, 0.0), Point::new(150.0, 0.0)]);
    let scale_after_pinch = vc.transform().scale;

    vc.on_touch_end(&[Point::new(0.0, 0.0)]);

    // A fresh two-finger contact re-seeds tracking instead of comparing
    // against the dead gesture's distance.
    vc.on_touch_start(&[Point::new(0.0, 0.0), Point::new(10.0, 0.0)], false);
    vc.on_touch_move(&[Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
    assert!((vc.transform().scale - scale_after_pinch).abs() < 1e-9);
}
