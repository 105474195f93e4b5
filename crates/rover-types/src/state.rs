/// Clamp an analog value into the `[-1, 1]` control range.
///
/// Non-finite readings are treated as neutral so a misbehaving device can
/// never push an undefined value onto the wire.
pub fn clamp_axis(v: f32) -> f32 {
    if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 }
}

/// Canonical snapshot of the desired robot motion, camera pose, and mode.
///
/// There is exactly one live instance, owned by the input aggregator; the
/// transmitter only reads it. All continuous fields stay within `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlState {
    /// Forward/back intent.
    pub throttle: f32,
    /// Left/right intent.
    pub steer: f32,
    /// Secondary (camera/head) X axis.
    pub rx: f32,
    /// Secondary (camera/head) Y axis.
    pub ry: f32,
    /// Momentary digital button.
    pub button_x: bool,
    /// Momentary digital button.
    pub button_y: bool,
    /// One-shot pulse signaling a mode switch. True in exactly the single
    /// outgoing frame triggered by the toggle action, false otherwise.
    pub toggle_mode: bool,
}

impl ControlState {
    pub fn set_throttle(&mut self, v: f32) {
        self.throttle = clamp_axis(v);
    }

    pub fn set_steer(&mut self, v: f32) {
        self.steer = clamp_axis(v);
    }

    pub fn set_rx(&mut self, v: f32) {
        self.rx = clamp_axis(v);
    }

    pub fn set_ry(&mut self, v: f32) {
        self.ry = clamp_axis(v);
    }
}
