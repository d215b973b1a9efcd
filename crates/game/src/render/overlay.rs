//! Overlay text: the score readout in the top-right corner.

use crate::state::GameState;

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// A line of screen-space text. Coordinates are pixels from the top-left.
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub scale: f32,
    pub color: [f32; 4],
}

/// Build the overlay for a `sw` by `sh` pixel screen. Empty when the UI is hidden.
pub fn build(state: &GameState, sw: f32, _sh: f32) -> Vec<TextItem> {
    if !state.show_ui {
        return Vec::new();
    }
    // Dark text is unreadable against the fogged night sky.
    let color = if state.fog { WHITE } else { BLACK };
    vec![TextItem {
        x: sw * 0.9,
        y: 1.0,
        text: format!("Score: {}", state.score),
        scale: 1.0,
        color,
    }]
}
