// Shared control-state types and the wire frame sent to the robot.

pub mod state;
pub mod wire;

pub use state::{ControlState, clamp_axis};
pub use wire::ControlFrame;
