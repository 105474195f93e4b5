/// Hardware gamepad polling via gilrs.
use anyhow::{Result, anyhow};
use gilrs::{Axis, Button, EventType, Gilrs};
use log::debug;

use crate::gamepad::PadReading;

/// Source of per-tick pad readings.
///
/// The poll loop is written against this trait so the sampling pipeline can
/// be driven without real hardware.
pub trait PadSource {
    /// Snapshot every connected pad, in enumeration order.
    fn read(&mut self) -> Vec<PadReading>;
}

/// Real gamepad reader backed by gilrs.
pub struct PadBackend {
    gilrs: Gilrs,
}

impl PadBackend {
    pub fn new() -> Result<Self> {
        let gilrs = Gilrs::new().map_err(|e| anyhow!("gamepad subsystem init failed: {e}"))?;
        Ok(Self { gilrs })
    }
}

impl PadSource for PadBackend {
    fn read(&mut self) -> Vec<PadReading> {
        // Drain pending events so gilrs refreshes its cached state and
        // tracks device arrival/departure.
        while let Some(event) = self.gilrs.next_event() {
            match event.event {
                EventType::Connected => debug!("gamepad connected: {:?}", event.id),
                EventType::Disconnected => debug!("gamepad disconnected: {:?}", event.id),
                _ => {}
            }
        }

        self.gilrs
            .gamepads()
            .map(|(_, pad)| PadReading {
                steer_axis: pad.value(Axis::LeftStickX),
                cam_x: pad.value(Axis::RightStickX),
                cam_y: pad.value(Axis::RightStickY),
                forward_trigger: button_value(&pad, Button::RightTrigger2),
                reverse_trigger: button_value(&pad, Button::LeftTrigger2),
                button_x: pad.is_pressed(Button::West),
                button_y: pad.is_pressed(Button::North),
            })
            .collect()
    }
}

fn button_value(pad: &gilrs::Gamepad<'_>, button: Button) -> f32 {
    pad.button_data(button).map(|data| data.value()).unwrap_or(0.0)
}
