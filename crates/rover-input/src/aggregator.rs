/// The input aggregator: a per-tick command queue merging two sources into
/// the canonical control state.
use std::collections::VecDeque;

use rover_types::{ControlState, clamp_axis};

use crate::gamepad::{PadReading, PadSample, sample_pad};
use crate::keyboard::{KeySet, KeyboardSample, resolve_keys};

/// Input commands, consumed in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum InputCommand {
    KeyDown(String),
    KeyUp(String),
    /// Pulse `toggle_mode` for exactly one outgoing snapshot.
    ToggleMode,
    /// One gamepad poll tick carrying the readings of every connected pad.
    PadTick(Vec<PadReading>),
}

/// Apply a keyboard sample over the current state. Keyboard drives throttle
/// and steer only; camera axes and buttons are untouched.
pub fn apply_keyboard(state: ControlState, sample: KeyboardSample) -> ControlState {
    ControlState {
        throttle: clamp_axis(sample.throttle),
        steer: clamp_axis(sample.steer),
        ..state
    }
}

/// Apply a pad sample over the current state. The pad overwrites every
/// motion, camera, and button field — stale zeros included — so while a pad
/// is connected its tick values win over keyboard values (most-recent-write,
/// and the tick is the most frequent writer).
pub fn apply_pad(state: ControlState, sample: PadSample) -> ControlState {
    ControlState {
        throttle: clamp_axis(sample.throttle),
        steer: clamp_axis(sample.steer),
        rx: clamp_axis(sample.rx),
        ry: clamp_axis(sample.ry),
        button_x: sample.button_x,
        button_y: sample.button_y,
        ..state
    }
}

/// Owns the control state and feeds it from the two input sources.
///
/// Commands are queued and drained deterministically; every accepted command
/// yields one snapshot to transmit, whether or not a value changed.
#[derive(Debug, Default)]
pub struct InputAggregator {
    keys: KeySet,
    state: ControlState,
    queue: VecDeque<InputCommand>,
    text_entry_focus: bool,
}

impl InputAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current canonical snapshot.
    pub fn state(&self) -> ControlState {
        self.state
    }

    /// Gate keyboard handling while a text-entry field has focus. Pad ticks
    /// and toggle requests are unaffected.
    pub fn set_text_entry_focus(&mut self, focused: bool) {
        self.text_entry_focus = focused;
    }

    pub fn push(&mut self, command: InputCommand) {
        self.queue.push_back(command);
    }

    /// Drain the queue, returning the snapshots to transmit in order.
    pub fn drain(&mut self) -> Vec<ControlState> {
        let mut out = Vec::new();
        while let Some(command) = self.queue.pop_front() {
            match command {
                InputCommand::KeyDown(key) => {
                    if self.text_entry_focus {
                        continue;
                    }
                    self.keys.press(&key);
                    self.state = apply_keyboard(self.state, resolve_keys(&self.keys));
                    out.push(self.state);
                }
                InputCommand::KeyUp(key) => {
                    if self.text_entry_focus {
                        continue;
                    }
                    self.keys.release(&key);
                    self.state = apply_keyboard(self.state, resolve_keys(&self.keys));
                    out.push(self.state);
                }
                InputCommand::ToggleMode => {
                    self.state.toggle_mode = true;
                    out.push(self.state);
                    // Reset before any later command can observe the pulse.
                    self.state.toggle_mode = false;
                }
                InputCommand::PadTick(readings) => {
                    // No pad connected: no update and no transmission this
                    // tick; keyboard values stay authoritative.
                    if readings.is_empty() {
                        continue;
                    }
                    // All fields of a tick land atomically before the
                    // snapshot is emitted; later pads overwrite earlier ones.
                    for reading in &readings {
                        self.state = apply_pad(self.state, sample_pad(reading));
                    }
                    out.push(self.state);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain_one(aggregator: &mut InputAggregator, command: InputCommand) -> Vec<ControlState> {
        aggregator.push(command);
        aggregator.drain()
    }

    #[test]
    fn key_down_drives_throttle_and_emits() {
        let mut aggregator = InputAggregator::new();
        let emitted = drain_one(&mut aggregator, InputCommand::KeyDown("w".into()));
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].throttle, 1.0);
        assert_eq!(aggregator.state().throttle, 1.0);
    }

    #[test]
    fn key_up_recomputes_the_chord() {
        let mut aggregator = InputAggregator::new();
        drain_one(&mut aggregator, InputCommand::KeyDown("w".into()));
        drain_one(&mut aggregator, InputCommand::KeyDown("s".into()));
        // 'w' still wins while held.
        assert_eq!(aggregator.state().throttle, 1.0);

        let emitted = drain_one(&mut aggregator, InputCommand::KeyUp("w".into()));
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].throttle, -1.0);
    }

    #[test]
    fn repeated_key_down_still_emits() {
        // Key auto-repeat re-sends the same chord; every event transmits.
        let mut aggregator = InputAggregator::new();
        drain_one(&mut aggregator, InputCommand::KeyDown("w".into()));
        let emitted = drain_one(&mut aggregator, InputCommand::KeyDown("w".into()));
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].throttle, 1.0);
    }

    #[test]
    fn toggle_mode_pulses_exactly_one_snapshot() {
        let mut aggregator = InputAggregator::new();
        let emitted = drain_one(&mut aggregator, InputCommand::ToggleMode);
        assert_eq!(emitted.len(), 1);
        assert!(emitted[0].toggle_mode);
        assert!(!aggregator.state().toggle_mode);

        // Every later emission sees the pulse reset.
        let emitted = drain_one(&mut aggregator, InputCommand::KeyDown("w".into()));
        assert!(!emitted[0].toggle_mode);
    }

    #[test]
    fn pad_tick_overwrites_keyboard_values() {
        let mut aggregator = InputAggregator::new();
        drain_one(&mut aggregator, InputCommand::KeyDown("d".into()));
        assert_eq!(aggregator.state().steer, 1.0);

        // Pad inside the deadzone still wins the tick: steer resolves to 0.
        let reading = PadReading {
            steer_axis: 0.05,
            ..PadReading::default()
        };
        let emitted = drain_one(&mut aggregator, InputCommand::PadTick(vec![reading]));
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].steer, 0.0);
    }

    #[test]
    fn pad_tick_with_no_devices_neither_updates_nor_emits() {
        let mut aggregator = InputAggregator::new();
        drain_one(&mut aggregator, InputCommand::KeyDown("w".into()));

        let emitted = drain_one(&mut aggregator, InputCommand::PadTick(Vec::new()));
        assert!(emitted.is_empty());
        assert_eq!(aggregator.state().throttle, 1.0);
    }

    #[test]
    fn idle_pad_tick_emits_even_without_changes() {
        let mut aggregator = InputAggregator::new();
        let idle = PadReading::default();
        let emitted = drain_one(&mut aggregator, InputCommand::PadTick(vec![idle]));
        assert_eq!(emitted.len(), 1);
        let emitted = drain_one(&mut aggregator, InputCommand::PadTick(vec![idle]));
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0], ControlState::default());
    }

    #[test]
    fn last_pad_wins_within_a_tick() {
        let mut aggregator = InputAggregator::new();
        let first = PadReading {
            steer_axis: 0.5,
            ..PadReading::default()
        };
        let second = PadReading {
            steer_axis: -0.5,
            ..PadReading::default()
        };
        let emitted = drain_one(&mut aggregator, InputCommand::PadTick(vec![first, second]));
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].steer, -0.5);
    }

    #[test]
    fn pad_buttons_and_camera_axes_land_in_the_state() {
        let mut aggregator = InputAggregator::new();
        let reading = PadReading {
            cam_x: 0.3,
            cam_y: -0.3,
            forward_trigger: 0.9,
            button_x: true,
            button_y: true,
            ..PadReading::default()
        };
        let emitted = drain_one(&mut aggregator, InputCommand::PadTick(vec![reading]));
        let snapshot = emitted[0];
        assert_eq!(snapshot.throttle, 0.9);
        assert_eq!(snapshot.rx, 0.3);
        assert_eq!(snapshot.ry, -0.3);
        assert!(snapshot.button_x);
        assert!(snapshot.button_y);
    }

    #[test]
    fn text_entry_focus_swallows_key_events() {
        let mut aggregator = InputAggregator::new();
        aggregator.set_text_entry_focus(true);
        let emitted = drain_one(&mut aggregator, InputCommand::KeyDown("w".into()));
        assert!(emitted.is_empty());
        assert_eq!(aggregator.state().throttle, 0.0);

        // Pad ticks are not gated by focus.
        let reading = PadReading {
            forward_trigger: 0.5,
            ..PadReading::default()
        };
        let emitted = drain_one(&mut aggregator, InputCommand::PadTick(vec![reading]));
        assert_eq!(emitted.len(), 1);

        aggregator.set_text_entry_focus(false);
        let emitted = drain_one(&mut aggregator, InputCommand::KeyDown("w".into()));
        assert_eq!(emitted.len(), 1);
    }

    #[test]
    fn commands_drain_in_arrival_order() {
        let mut aggregator = InputAggregator::new();
        aggregator.push(InputCommand::KeyDown("d".into()));
        aggregator.push(InputCommand::PadTick(vec![PadReading::default()]));
        aggregator.push(InputCommand::ToggleMode);

        let emitted = aggregator.drain();
        assert_eq!(emitted.len(), 3);
        assert_eq!(emitted[0].steer, 1.0);
        // The pad tick overwrote the keyboard steer.
        assert_eq!(emitted[1].steer, 0.0);
        assert!(emitted[2].toggle_mode);
    }
}
