//! Input state tracking
//!
//! Fed by `winit` window events and read once per frame by the camera.
//! Pointer motion only turns into look delta while the look button is held.

use glam::Vec2;
use std::collections::HashSet;
use tracing::trace;
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Held keys and buttons plus the pointer motion of the current frame
#[derive(Debug, Clone)]
pub struct InputState {
    keys: HashSet<KeyCode>,
    buttons: HashSet<MouseButton>,
    pointer: Option<Vec2>,
    pointer_delta: Vec2,
    look_button: MouseButton,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            keys: HashSet::new(),
            buttons: HashSet::new(),
            pointer: None,
            pointer_delta: Vec2::ZERO,
            look_button: MouseButton::Left,
        }
    }

    /// Accumulate look delta while `button` is held instead of the left one
    pub fn with_look_button(mut self, button: MouseButton) -> Self {
        self.look_button = button;
        self
    }

    /// Fold a window event into the state, returning whether it was input
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput { event, .. } => self.handle_key_event(event),
            WindowEvent::MouseInput { button, state, .. } => {
                self.set_button(*button, *state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => self.pointer = None,
            WindowEvent::Focused(false) => self.release_all(),
            _ => return false,
        }
        true
    }

    fn handle_key_event(&mut self, event: &KeyEvent) {
        if let PhysicalKey::Code(code) = event.physical_key {
            self.set_key(code, event.state == ElementState::Pressed);
        }
    }

    pub fn set_key(&mut self, code: KeyCode, pressed: bool) {
        if pressed {
            self.keys.insert(code);
        } else {
            self.keys.remove(&code);
        }
        trace!(key = ?code, pressed, "Key");
    }

    pub fn set_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.buttons.insert(button);
        } else {
            self.buttons.remove(&button);
        }
        trace!(?button, pressed, "Mouse button");
    }

    /// Record a new pointer position; motion counts as look delta only while
    /// the look button is held
    pub fn pointer_moved(&mut self, position: Vec2) {
        if let Some(previous) = self.pointer {
            if self.is_button_pressed(self.look_button) {
                self.add_pointer_delta(position - previous);
            }
        }
        self.pointer = Some(position);
    }

    pub fn add_pointer_delta(&mut self, delta: Vec2) {
        self.pointer_delta += delta;
        trace!(dx = delta.x, dy = delta.y, "Pointer delta");
    }

    /// Look delta accumulated since the last [`end_frame`](Self::end_frame)
    pub fn pointer_delta(&self) -> Vec2 {
        self.pointer_delta
    }

    pub fn pointer_position(&self) -> Option<Vec2> {
        self.pointer
    }

    /// Drop per-frame data once the frame has consumed it
    pub fn end_frame(&mut self) {
        self.pointer_delta = Vec2::ZERO;
    }

    pub fn is_key_pressed(&self, code: KeyCode) -> bool {
        self.keys.contains(&code)
    }

    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons.contains(&button)
    }

    /// Whether either Shift key is held
    pub fn is_sprinting(&self) -> bool {
        self.is_key_pressed(KeyCode::ShiftLeft) || self.is_key_pressed(KeyCode::ShiftRight)
    }

    /// Release every key and button, used when the window loses focus
    pub fn release_all(&mut self) {
        self.keys.clear();
        self.buttons.clear();
        self.pointer_delta = Vec2::ZERO;
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
