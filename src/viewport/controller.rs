use crate::foundation::core::{Point, Vec2};
use crate::input::{Key, WheelEvent};
use crate::viewport::transform::ViewportTransform;

/// Per-tick wheel zoom factor; direction comes from the wheel delta sign.
pub const WHEEL_ZOOM_STEP: f64 = 1.01;

/// Cursor shape the host should show for the current pan state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CursorHint {
    #[default]
    Default,
    /// Space held, ready to drag-pan.
    Grab,
    /// Actively drag-panning.
    Grabbing,
}

/// Tracks an active drag: where it started and the last seen position.
#[derive(Clone, Copy, Debug, Default)]
struct DragState {
    start: Option<Point>,
    last: Option<Point>,
}

impl DragState {
    fn start(&mut self, pos: Point) {
        self.start = Some(pos);
        self.last = Some(pos);
    }

    fn update(&mut self, pos: Point) -> Option<Vec2> {
        self.start?;
        let delta = self.last.map(|last| pos - last);
        self.last = Some(pos);
        delta
    }

    fn end(&mut self) {
        self.start = None;
        self.last = None;
    }

    fn is_active(&self) -> bool {
        self.start.is_some()
    }
}

/// Two-finger pinch tracking: last inter-finger distance and midpoint.
#[derive(Clone, Copy, Debug)]
struct PinchState {
    last_dist: f64,
    last_center: Point,
}

/// State machine over pointer/wheel (desktop) and touch (mobile) input, both
/// mutating the single [`ViewportTransform`].
///
/// Gesture state is scoped to this controller and reset between independent
/// sequences: lifting below two fingers clears pinch tracking, releasing the
/// pointer ends a drag-pan.
#[derive(Debug, Default)]
pub struct ViewportController {
    transform: ViewportTransform,
    space_down: bool,
    pointer_pan: DragState,
    touch_pan: DragState,
    pinch: Option<PinchState>,
}

impl ViewportController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transform(&self) -> &ViewportTransform {
        &self.transform
    }

    /// Reset scale to 1 and pan to the origin.
    pub fn reset(&mut self) {
        self.transform.reset();
    }

    /// Programmatic zoom entry point, same anchor math as the gestures.
    pub fn zoom(&mut self, anchor: Point, factor: f64) {
        self.transform.zoom_about(anchor, factor);
    }

    /// Programmatic pan entry point.
    pub fn pan(&mut self, delta: Vec2) {
        self.transform.pan_by(delta);
    }

    pub fn cursor_hint(&self) -> CursorHint {
        if self.pointer_pan.is_active() {
            CursorHint::Grabbing
        } else if self.space_down {
            CursorHint::Grab
        } else {
            CursorHint::Default
        }
    }

    /// Modifier held: zoom one multiplicative step toward the cursor.
    /// Otherwise the wheel deltas translate pan directly.
    pub fn on_wheel(&mut self, ev: WheelEvent) {
        if ev.zoom_modifier {
            let factor = if ev.delta_y < 0.0 {
                WHEEL_ZOOM_STEP
            } else {
                1.0 / WHEEL_ZOOM_STEP
            };
            self.transform.zoom_about(ev.position, factor);
        } else {
            self.transform.pan_by(Vec2::new(-ev.delta_x, -ev.delta_y));
        }
    }

    pub fn on_key_down(&mut self, key: Key, text_input_focused: bool) {
        if text_input_focused {
            return;
        }
        match key {
            Key::Space => self.space_down = true,
            Key::Digit0 => self.transform.reset(),
            _ => {}
        }
    }

    pub fn on_key_up(&mut self, key: Key) {
        if key == Key::Space {
            self.space_down = false;
        }
    }

    /// Returns whether the controller captured the pointer for a drag-pan
    /// (space held); otherwise the pointer belongs to composition handling.
    pub fn on_pointer_down(&mut self, position: Point) -> bool {
        if self.space_down {
            self.pointer_pan.start(position);
            true
        } else {
            false
        }
    }

    pub fn on_pointer_move(&mut self, position: Point) {
        if let Some(delta) = self.pointer_pan.update(position) {
            self.transform.pan_by(delta);
        }
    }

    pub fn on_pointer_up(&mut self) {
        self.pointer_pan.end();
    }

    /// `on_composition` is decided by the dispatcher via hit-testing: a
    /// single finger landing on a composition or its selection handles must
    /// pass through to composition manipulation, not start a canvas pan.
    pub fn on_touch_start(&mut self, touches: &[Point], on_composition: bool) {
        match touches {
            [single] => {
                self.pinch = None;
                if on_composition {
                    self.touch_pan.end();
                } else {
                    self.touch_pan.start(*single);
                }
            }
            [a, b, ..] => {
                self.touch_pan.end();
                self.pinch = Some(PinchState {
                    last_dist: (*b - *a).hypot(),
                    last_center: a.midpoint(*b),
                });
            }
            [] => {}
        }
    }

    pub fn on_touch_move(&mut self, touches: &[Point]) {
        match touches {
            [single] => {
                if let Some(delta) = self.touch_pan.update(*single) {
                    self.transform.pan_by(delta);
                }
            }
            [a, b, ..] => {
                self.touch_pan.end();
                let dist = (*b - *a).hypot();
                let center = a.midpoint(*b);

                match &mut self.pinch {
                    Some(pinch) if pinch.last_dist > 0.0 => {
                        // Same anchor formula as wheel zoom, anchored at the
                        // previous midpoint, then pan by the midpoint motion.
                        let factor = dist / pinch.last_dist;
                        let anchor = pinch.last_center;
                        let motion = center - pinch.last_center;
                        self.transform.zoom_about(anchor, factor);
                        self.transform.pan_by(motion);
                        pinch.last_dist = dist;
                        pinch.last_center = center;
                    }
                    _ => {
                        self.pinch = Some(PinchState {
                            last_dist: dist,
                            last_center: center,
                        });
                    }
                }
            }
            [] => {}
        }
    }

    pub fn on_touch_end(&mut self, remaining: &[Point]) {
        self.touch_pan.end();
        if remaining.len() < 2 {
            self.pinch = None;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/viewport/controller.rs"]
mod tests;
