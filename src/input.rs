use winit::{dpi::PhysicalPosition, event as ev};

pub use ev::MouseButton;

// a scroll "line" converted to pixels,
// so mice and touchpads produce comparable values
const PIXELS_PER_LINE: f32 = 10.0;

/// Track the state of the pointer so that it can be looked up from a single
/// location instead of moving window events around.
///
/// Deltas accumulate over a frame and are cleared by [`tick`][Self::tick],
/// which the frame loop calls after everything has had a chance to read them.
#[derive(Clone, Default)]
pub struct Input {
    buttons: MouseButtonState,
    last_cursor_pos: Option<PhysicalPosition<f64>>,
    cursor_delta: (f32, f32),
    scroll_delta: f32,
}

#[derive(Clone, Copy, Default)]
struct MouseButtonState {
    left: bool,
    middle: bool,
    right: bool,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the deltas accumulated during the frame.
    /// Call this at the end of every frame.
    pub fn tick(&mut self) {
        self.cursor_delta = (0.0, 0.0);
        self.scroll_delta = 0.0;
    }

    //
    // getters
    //

    /// True while the given mouse button is held down.
    /// Buttons other than left, middle and right are not tracked.
    pub fn button_held(&self, button: MouseButton) -> bool {
        match button {
            MouseButton::Left => self.buttons.left,
            MouseButton::Middle => self.buttons.middle,
            MouseButton::Right => self.buttons.right,
            _ => false,
        }
    }

    /// Cursor movement since the start of the frame, in physical pixels.
    pub fn cursor_delta(&self) -> (f32, f32) {
        self.cursor_delta
    }

    /// Vertical scroll distance since the start of the frame, in pixels.
    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    //
    // trackers
    //

    /// Perform whatever tracking is available for the given window event.
    pub fn track_window_event(&mut self, event: &ev::WindowEvent) {
        use ev::WindowEvent::*;
        match event {
            MouseInput { button, state, .. } => self.track_mouse_button(*button, *state),
            CursorMoved { position, .. } => self.track_cursor_movement(*position),
            MouseWheel { delta, .. } => self.track_mouse_wheel(*delta),
            // a cursor that left the window may re-enter anywhere;
            // don't produce a delta spanning the window when it does
            CursorLeft { .. } => self.last_cursor_pos = None,
            _ => (),
        }
    }

    fn track_mouse_button(&mut self, button: ev::MouseButton, state: ev::ElementState) {
        let held = state == ev::ElementState::Pressed;
        match button {
            MouseButton::Left => self.buttons.left = held,
            MouseButton::Middle => self.buttons.middle = held,
            MouseButton::Right => self.buttons.right = held,
            _ => (),
        }
    }

    fn track_cursor_movement(&mut self, position: PhysicalPosition<f64>) {
        if let Some(last) = self.last_cursor_pos {
            self.cursor_delta.0 += (position.x - last.x) as f32;
            self.cursor_delta.1 += (position.y - last.y) as f32;
        }
        self.last_cursor_pos = Some(position);
    }

    fn track_mouse_wheel(&mut self, delta: ev::MouseScrollDelta) {
        match delta {
            ev::MouseScrollDelta::LineDelta(_, y) => self.scroll_delta += PIXELS_PER_LINE * y,
            ev::MouseScrollDelta::PixelDelta(pos) => self.scroll_delta += pos.y as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_deltas_accumulate_within_a_frame_and_reset_on_tick() {
        let mut input = Input::new();
        input.track_cursor_movement(PhysicalPosition::new(10.0, 10.0));
        input.track_cursor_movement(PhysicalPosition::new(15.0, 12.0));
        input.track_cursor_movement(PhysicalPosition::new(18.0, 11.0));
        assert_eq!(input.cursor_delta(), (8.0, 1.0));
        input.tick();
        assert_eq!(input.cursor_delta(), (0.0, 0.0));
    }

    #[test]
    fn first_cursor_event_produces_no_delta() {
        let mut input = Input::new();
        input.track_cursor_movement(PhysicalPosition::new(500.0, 300.0));
        assert_eq!(input.cursor_delta(), (0.0, 0.0));
    }

    #[test]
    fn cursor_re_entry_does_not_produce_a_jump() {
        let mut input = Input::new();
        input.track_cursor_movement(PhysicalPosition::new(10.0, 10.0));
        input.track_cursor_movement(PhysicalPosition::new(12.0, 10.0));
        input.tick();
        // the cursor left the window and re-entered somewhere else
        input.last_cursor_pos = None;
        input.track_cursor_movement(PhysicalPosition::new(700.0, 500.0));
        assert_eq!(input.cursor_delta(), (0.0, 0.0));
    }

    #[test]
    fn line_scrolls_are_converted_to_pixels() {
        let mut input = Input::new();
        input.track_mouse_wheel(ev::MouseScrollDelta::LineDelta(0.0, 2.0));
        assert_eq!(input.scroll_delta(), 2.0 * PIXELS_PER_LINE);
    }
}
