use serde::{Deserialize, Serialize};

use crate::state::ControlState;

/// Outbound control frame.
///
/// The robot-side server reads these fields by name, so the set and spelling
/// here are a wire contract: `throttle`, `steer`, `rx`, `ry` as numbers and
/// `button_x`, `button_y`, `toggle_mode` as booleans.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlFrame {
    pub throttle: f32,
    pub steer: f32,
    pub rx: f32,
    pub ry: f32,
    pub button_x: bool,
    pub button_y: bool,
    pub toggle_mode: bool,
}

impl From<ControlState> for ControlFrame {
    fn from(state: ControlState) -> Self {
        Self {
            throttle: state.throttle,
            steer: state.steer,
            rx: state.rx,
            ry: state.ry,
            button_x: state.button_x,
            button_y: state.button_y,
            toggle_mode: state.toggle_mode,
        }
    }
}

impl ControlFrame {
    /// Encode as the self-describing JSON text payload sent over the link.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
