// Gamepad sampling: deadzone, trigger precedence, and the per-tick reading.

/// Magnitude at or below which an analog reading is treated as neutral.
pub const DEADZONE: f32 = 0.1;

/// Zero a reading inside the deadzone; pass anything above it through raw,
/// with no rescale.
pub fn apply_deadzone(v: f32) -> f32 {
    if v.abs() > DEADZONE { v } else { 0.0 }
}

/// Raw snapshot of one pad, captured fresh every poll tick and never kept
/// across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PadReading {
    /// Left stick X (device axis 0).
    pub steer_axis: f32,
    /// Right stick X (device axis 2).
    pub cam_x: f32,
    /// Right stick Y (device axis 3).
    pub cam_y: f32,
    /// Right trigger analog value (device button 7), drives forward.
    pub forward_trigger: f32,
    /// Left trigger analog value (device button 6), drives reverse.
    pub reverse_trigger: f32,
    /// X button (device button 2).
    pub button_x: bool,
    /// Y button (device button 3).
    pub button_y: bool,
}

/// Motion, camera, and button intent derived from one pad reading.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PadSample {
    pub throttle: f32,
    pub steer: f32,
    pub rx: f32,
    pub ry: f32,
    pub button_x: bool,
    pub button_y: bool,
}

/// Derive a sample from a reading. The forward trigger wins throttle when it
/// clears the deadzone, then the reverse trigger (negated), then neutral.
pub fn sample_pad(reading: &PadReading) -> PadSample {
    let throttle = if reading.forward_trigger > DEADZONE {
        reading.forward_trigger
    } else if reading.reverse_trigger > DEADZONE {
        -reading.reverse_trigger
    } else {
        0.0
    };

    PadSample {
        throttle,
        steer: apply_deadzone(reading.steer_axis),
        rx: apply_deadzone(reading.cam_x),
        ry: apply_deadzone(reading.cam_y),
        button_x: reading.button_x,
        button_y: reading.button_y,
    }
}
