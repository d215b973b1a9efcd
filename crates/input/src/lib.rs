//! Keyboard input for flying the drone.

use std::collections::HashSet;

/// Manages keyboard state for the current frame.
#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down.
    keys_held: HashSet<KeyCode>,
    /// Keys pressed this frame.
    keys_pressed: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame state. Call at the start of each frame.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
    }

    /// Process a keyboard event.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) {
        log::trace!("{:?} {:?}", key, state);
        match state {
            ElementState::Pressed => {
                if !self.keys_held.contains(&key) {
                    self.keys_pressed.insert(key);
                }
                self.keys_held.insert(key);
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
            }
        }
    }

    /// Check if a key is currently held.
    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Check if a key was pressed this frame.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Snapshot of the flight keys.
    pub fn drone_controls(&self) -> DroneControls {
        DroneControls {
            forward: self.is_key_held(KeyCode::KeyW),
            back: self.is_key_held(KeyCode::KeyS),
            strafe_left: self.is_key_held(KeyCode::KeyA),
            strafe_right: self.is_key_held(KeyCode::KeyD),
            ascend: self.is_key_held(KeyCode::ShiftLeft),
            descend: self.is_key_held(KeyCode::ControlLeft),
            rotate_left: self.is_key_held(KeyCode::KeyQ),
            rotate_right: self.is_key_held(KeyCode::KeyE),
            boost: self.is_key_held(KeyCode::Space),
        }
    }

    /// One-shot actions triggered this frame, in a fixed order.
    pub fn actions(&self) -> Vec<KeyAction> {
        KeyAction::ALL
            .into_iter()
            .filter(|a| self.is_key_pressed(a.key()))
            .collect()
    }
}

/// Held flight keys for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DroneControls {
    pub forward: bool,
    pub back: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    pub ascend: bool,
    pub descend: bool,
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub boost: bool,
}

/// Discrete key presses outside of flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Regenerate the world and reset the drone.
    Restart,
    ToggleCamera,
    ToggleFog,
    ToggleUi,
}

impl KeyAction {
    pub const ALL: [KeyAction; 4] = [
        KeyAction::Restart,
        KeyAction::ToggleCamera,
        KeyAction::ToggleFog,
        KeyAction::ToggleUi,
    ];

    /// Key bound to this action.
    pub fn key(self) -> KeyCode {
        match self {
            KeyAction::Restart => KeyCode::KeyR,
            KeyAction::ToggleCamera => KeyCode::Tab,
            KeyAction::ToggleFog => KeyCode::KeyF,
            KeyAction::ToggleUi => KeyCode::KeyU,
        }
    }
}

// Re-export for convenience
pub use winit::event::ElementState;
pub use winit::keyboard::KeyCode;
