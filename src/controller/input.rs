/// Platform-agnostic input handling system
use std::f32::consts::PI;

/// Radians of orbit per pixel of drag
pub const ORBIT_SENSITIVITY: f32 = 0.005;
/// Zoom units per wheel delta unit
pub const ZOOM_SENSITIVITY: f32 = 0.02;
/// Pitch limits keep the view looking down at the document
pub const ANGLE_X_MIN: f32 = -PI * 0.49;
pub const ANGLE_X_MAX: f32 = -PI * 0.10;
pub const DISTANCE_MIN: f32 = 8.0;
pub const DISTANCE_MAX: f32 = 30.0;

pub const INITIAL_ANGLE_X: f32 = -1.3;
pub const INITIAL_DISTANCE: f32 = 15.0;

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    // Keyboard events, carrying DOM `KeyboardEvent.code` names
    KeyDown(String),
    KeyUp(String),

    // Mouse events
    MouseDown { button: MouseButton, x: f32, y: f32 },
    MouseUp { button: MouseButton },
    MouseMove { x: f32, y: f32 },
    MouseWheel { delta_y: f32 },

    // Window events
    FocusLost,
    VisibilityChanged { visible: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(i16),
}

impl MouseButton {
    pub fn from_web_button(button: i16) -> Self {
        match button {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            other => MouseButton::Other(other),
        }
    }
}

/// One of the four ground-plane movement directions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
}

/// Key mapping configuration (letter and arrow codes both accepted)
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub forward: Vec<String>,
    pub backward: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: vec!["KeyW".to_string(), "ArrowUp".to_string()],
            backward: vec!["KeyS".to_string(), "ArrowDown".to_string()],
            left: vec!["KeyA".to_string(), "ArrowLeft".to_string()],
            right: vec!["KeyD".to_string(), "ArrowRight".to_string()],
        }
    }
}

impl KeyBindings {
    pub fn direction_for(&self, code: &str) -> Option<Direction> {
        let hit = |codes: &[String]| codes.iter().any(|c| c == code);
        if hit(&self.forward) {
            Some(Direction::Forward)
        } else if hit(&self.backward) {
            Some(Direction::Backward)
        } else if hit(&self.left) {
            Some(Direction::Left)
        } else if hit(&self.right) {
            Some(Direction::Right)
        } else {
            None
        }
    }
}

/// Keyboard flags, mouse drag, and orbit/zoom state read once per frame
#[derive(Debug, Clone)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,

    pub is_down: bool,
    pub last_x: f32,
    pub last_y: f32,

    /// Pitch, always within [ANGLE_X_MIN, ANGLE_X_MAX]
    pub angle_x: f32,
    /// Yaw
    pub angle_y: f32,

    /// Zoom the camera rig follows, always within [DISTANCE_MIN, DISTANCE_MAX]
    pub distance_target: f32,

    pub bindings: KeyBindings,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    pub fn new() -> Self {
        Self {
            forward: false,
            backward: false,
            left: false,
            right: false,
            is_down: false,
            last_x: 0.0,
            last_y: 0.0,
            angle_x: INITIAL_ANGLE_X,
            angle_y: 0.0,
            distance_target: INITIAL_DISTANCE,
            bindings: KeyBindings::default(),
        }
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(code) => {
                self.set_key(code, true);
            }
            InputEvent::KeyUp(code) => {
                self.set_key(code, false);
            }
            InputEvent::MouseDown { button: MouseButton::Left, x, y } => {
                self.begin_drag(*x, *y);
            }
            InputEvent::MouseUp { button: MouseButton::Left } => {
                self.end_drag();
            }
            InputEvent::MouseMove { x, y } => {
                self.on_mouse_move(*x, *y);
            }
            InputEvent::MouseWheel { delta_y } => {
                self.on_wheel(*delta_y);
            }
            InputEvent::FocusLost | InputEvent::VisibilityChanged { .. } => {
                self.clear_keys();
            }
            _ => {}
        }
    }

    /// Returns false when the code is not bound to a direction
    pub fn set_key(&mut self, code: &str, pressed: bool) -> bool {
        match self.bindings.direction_for(code) {
            Some(Direction::Forward) => self.forward = pressed,
            Some(Direction::Backward) => self.backward = pressed,
            Some(Direction::Left) => self.left = pressed,
            Some(Direction::Right) => self.right = pressed,
            None => return false,
        }
        true
    }

    pub fn clear_keys(&mut self) {
        self.forward = false;
        self.backward = false;
        self.left = false;
        self.right = false;
    }

    pub fn begin_drag(&mut self, x: f32, y: f32) {
        self.is_down = true;
        self.last_x = x;
        self.last_y = y;
    }

    pub fn end_drag(&mut self) {
        self.is_down = false;
    }

    pub fn on_drag(&mut self, delta_x: f32, delta_y: f32) {
        self.angle_y -= delta_x * ORBIT_SENSITIVITY;
        self.angle_x -= delta_y * ORBIT_SENSITIVITY;
        self.angle_x = self.angle_x.clamp(ANGLE_X_MIN, ANGLE_X_MAX);
    }

    /// Orbits while dragging; the last cursor position is tracked either way
    pub fn on_mouse_move(&mut self, x: f32, y: f32) {
        if self.is_down {
            self.on_drag(x - self.last_x, y - self.last_y);
        }
        self.last_x = x;
        self.last_y = y;
    }

    pub fn on_wheel(&mut self, delta_y: f32) {
        self.distance_target =
            (self.distance_target + delta_y * ZOOM_SENSITIVITY).clamp(DISTANCE_MIN, DISTANCE_MAX);
    }
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::*;
    use web_sys::{Event, KeyboardEvent, MouseEvent};

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let code = e.code();
        if is_down {
            InputEvent::KeyDown(code)
        } else {
            InputEvent::KeyUp(code)
        }
    }

    pub fn mouse_down_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::MouseDown {
            button: MouseButton::from_web_button(e.button()),
            x: e.client_x() as f32,
            y: e.client_y() as f32,
        }
    }

    pub fn mouse_up_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::MouseUp {
            button: MouseButton::from_web_button(e.button()),
        }
    }

    pub fn mouse_move_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::MouseMove {
            x: e.client_x() as f32,
            y: e.client_y() as f32,
        }
    }

    pub fn mouse_wheel_to_input(e: &Event) -> Option<InputEvent> {
        let js_val = wasm_bindgen::JsValue::from(e.clone());
        if let Ok(delta_y) = js_sys::Reflect::get(&js_val, &wasm_bindgen::JsValue::from_str("deltaY")) {
            if let Some(dy) = delta_y.as_f64() {
                return Some(InputEvent::MouseWheel { delta_y: dy as f32 });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_and_arrow_codes_drive_the_same_flag() {
        let mut input = InputState::new();
        assert!(input.set_key("KeyW", true));
        assert!(input.forward);
        assert!(input.set_key("ArrowUp", false));
        assert!(!input.forward);

        assert!(input.set_key("ArrowRight", true));
        assert!(input.right);
        assert!(!input.set_key("KeyQ", true));
    }

    #[test]
    fn angle_x_stays_clamped_for_extreme_drags() {
        let mut input = InputState::new();
        for delta in [-1.0e6_f32, -250.0, -3.0, 0.0, 1.0, 40.0, 1.0e6] {
            input.on_drag(0.0, delta);
            assert!(input.angle_x >= ANGLE_X_MIN && input.angle_x <= ANGLE_X_MAX, "angle_x {}", input.angle_x);
        }
    }

    #[test]
    fn drag_updates_yaw_with_sensitivity() {
        let mut input = InputState::new();
        input.on_drag(100.0, 0.0);
        assert!((input.angle_y - (-0.5)).abs() < 1e-6);
    }

    #[test]
    fn mouse_move_only_orbits_while_down() {
        let mut input = InputState::new();
        input.on_mouse_move(10.0, 10.0);
        assert_eq!(input.angle_y, 0.0);
        assert_eq!((input.last_x, input.last_y), (10.0, 10.0));

        input.process_event(&InputEvent::MouseDown { button: MouseButton::Left, x: 10.0, y: 10.0 });
        input.process_event(&InputEvent::MouseMove { x: 30.0, y: 10.0 });
        assert!((input.angle_y - (-0.1)).abs() < 1e-6);

        input.process_event(&InputEvent::MouseUp { button: MouseButton::Left });
        assert!(!input.is_down);
    }

    #[test]
    fn right_button_does_not_start_a_drag() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::MouseDown { button: MouseButton::Right, x: 0.0, y: 0.0 });
        assert!(!input.is_down);
    }

    #[test]
    fn wheel_clamps_distance_target() {
        let mut input = InputState::new();
        input.on_wheel(1000.0);
        assert_eq!(input.distance_target, DISTANCE_MAX);
        input.on_wheel(-1000.0);
        assert_eq!(input.distance_target, DISTANCE_MIN);
        input.on_wheel(50.0);
        assert!((input.distance_target - 9.0).abs() < 1e-5);
    }

    #[test]
    fn zoom_starts_at_the_initial_distance() {
        let input = InputState::new();
        assert_eq!(input.distance_target, INITIAL_DISTANCE);
        assert_eq!(input.angle_x, INITIAL_ANGLE_X);
    }

    #[test]
    fn focus_loss_clears_keys() {
        let mut input = InputState::new();
        input.set_key("KeyA", true);
        input.set_key("KeyS", true);
        input.process_event(&InputEvent::FocusLost);
        assert!(!input.left && !input.backward);
    }
}
