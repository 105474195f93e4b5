/// The control-panel core: one input aggregator feeding one link.
use rover_input::{InputAggregator, InputCommand, PadReading};
use rover_link::{Endpoint, LinkHandle, LinkState};
use rover_types::ControlState;

/// Entry points for the UI layer. Nothing here blocks; every transmission
/// is handed off to the link task.
///
/// Must be created inside a tokio runtime, which hosts the link task.
pub struct Panel {
    aggregator: InputAggregator,
    endpoint: Endpoint,
    link: LinkHandle,
}

impl Default for Panel {
    fn default() -> Self {
        Self::new()
    }
}

impl Panel {
    pub fn new() -> Self {
        Self {
            aggregator: InputAggregator::new(),
            endpoint: Endpoint::default(),
            link: LinkHandle::spawn(),
        }
    }

    /// Update the target host. Takes effect on the next connect.
    pub fn set_endpoint(&mut self, host: &str) {
        self.endpoint.set_host(host);
        self.link.set_endpoint(host);
    }

    pub fn request_connect(&self) {
        self.link.connect();
    }

    pub fn request_disconnect(&self) {
        self.link.disconnect();
    }

    /// Connect when disconnected, disconnect otherwise (the connect button).
    pub fn toggle_connection(&self) {
        match self.link.state() {
            LinkState::Disconnected => self.link.connect(),
            _ => self.link.disconnect(),
        }
    }

    /// Pulse the driving-mode toggle for exactly one outgoing frame.
    pub fn request_toggle_mode(&mut self) {
        self.push_and_flush(InputCommand::ToggleMode);
    }

    /// Raw key-down handler. `key` is the key identifier as reported by the
    /// front end; casing does not matter.
    pub fn key_down(&mut self, key: &str) {
        self.push_and_flush(InputCommand::KeyDown(key.to_string()));
    }

    /// Raw key-up handler.
    pub fn key_up(&mut self, key: &str) {
        self.push_and_flush(InputCommand::KeyUp(key.to_string()));
    }

    /// Gate keyboard handling while a text-entry field has focus.
    pub fn set_text_entry_focus(&mut self, focused: bool) {
        self.aggregator.set_text_entry_focus(focused);
    }

    /// The recurring gamepad poll entry point: one tick, all pad readings.
    pub fn poll_tick(&mut self, readings: Vec<PadReading>) {
        self.push_and_flush(InputCommand::PadTick(readings));
    }

    /// Video-feed URL for the display widget, when a host is set.
    pub fn video_feed_url(&self) -> Option<String> {
        self.endpoint.video_feed_url()
    }

    /// Current connection state, for passive display.
    pub fn link_state(&self) -> LinkState {
        self.link.state()
    }

    /// Current canonical control snapshot.
    pub fn control_state(&self) -> ControlState {
        self.aggregator.state()
    }

    /// Stop the link task. The panel is inert afterwards.
    pub fn shutdown(&self) {
        self.link.shutdown();
    }

    fn push_and_flush(&mut self, command: InputCommand) {
        self.aggregator.push(command);
        for snapshot in self.aggregator.drain() {
            self.link.transmit(snapshot);
        }
    }
}
