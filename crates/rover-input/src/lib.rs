// Input aggregation: keyboard and gamepad merged into one control state.

pub mod aggregator;
pub mod gamepad;
pub mod keyboard;
pub mod pads;

pub use aggregator::{InputAggregator, InputCommand, apply_keyboard, apply_pad};
pub use gamepad::{DEADZONE, PadReading, PadSample, apply_deadzone, sample_pad};
pub use keyboard::{KeySet, KeyboardSample, resolve_keys};
pub use pads::{PadBackend, PadSource};
