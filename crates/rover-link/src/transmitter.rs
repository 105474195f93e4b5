/// Stateless transmit policy: a snapshot goes out only while the link is
/// open; anything else is dropped silently with no queueing, no buffering,
/// and no error to the caller.
use log::warn;

use rover_types::{ControlFrame, ControlState};

use crate::machine::LinkState;

/// True when the link can carry a frame.
pub fn should_send(state: LinkState) -> bool {
    state == LinkState::Open
}

/// Serialize a snapshot for the wire. An unencodable snapshot is dropped
/// like any other transport-side failure, leaving only a log line.
pub fn encode(state: &ControlState) -> Option<String> {
    match ControlFrame::from(*state).to_json() {
        Ok(json) => Some(json),
        Err(e) => {
            warn!("link: dropping unencodable frame: {e}");
            None
        }
    }
}
