/// The connection state machine, kept pure: transport and user events go in,
/// side effects for the driver come out. Nothing here touches a socket or a
/// timer, which is what makes the reconnect rules testable.
use std::time::Duration;

use log::{debug, info, warn};

use crate::endpoint::Endpoint;

/// Fixed delay before an automatic reconnect attempt. Retries are unlimited
/// and the delay never grows.
pub const RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// Connection lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Disconnected,
    Connecting,
    Open,
    /// A close we initiated is in flight. The close notification that
    /// follows settles in `Disconnected` without arming a reconnect.
    Closing,
}

/// Inputs to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    ConnectRequested,
    DisconnectRequested,
    /// The dial completed and the socket is live.
    TransportOpened,
    /// The dial failed before the socket opened.
    TransportFailed,
    /// The live socket closed or errored, or a requested close completed.
    TransportClosed,
    /// The reconnect timer fired.
    ReconnectDue,
}

/// Ordered side effects for the driver to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open a WebSocket to the given URL.
    Dial(String),
    /// Gracefully close and drop the live socket.
    CloseSocket,
    /// Start the single reconnect timer.
    ArmReconnect(Duration),
    /// Cancel any pending reconnect timer.
    DisarmReconnect,
    /// Transmit the current control state (done on every open).
    SendCurrentState,
}

#[derive(Debug, Default)]
pub struct LinkMachine {
    state: LinkState,
    endpoint: Endpoint,
    reconnect_armed: bool,
}

impl LinkMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn set_host(&mut self, host: &str) {
        self.endpoint.set_host(host);
    }

    pub fn handle(&mut self, event: LinkEvent) -> Vec<Effect> {
        match event {
            LinkEvent::ConnectRequested => self.connect(),
            LinkEvent::DisconnectRequested => self.disconnect(),
            LinkEvent::TransportOpened => self.opened(),
            LinkEvent::TransportFailed => self.dial_failed(),
            LinkEvent::TransportClosed => self.closed(),
            LinkEvent::ReconnectDue => self.reconnect_due(),
        }
    }

    fn connect(&mut self) -> Vec<Effect> {
        let Some(url) = self.endpoint.control_url() else {
            // Connect with no endpoint configured is a silent no-op.
            debug!("link: connect requested without an endpoint");
            return Vec::new();
        };

        let mut effects = self.disarm();
        if matches!(self.state, LinkState::Connecting | LinkState::Open) {
            // A fresh connect supersedes the live socket; the host may have
            // changed. The close notification lands while Connecting and is
            // ignored there.
            effects.push(Effect::CloseSocket);
        }
        self.state = LinkState::Connecting;
        info!("link: dialing {url}");
        effects.push(Effect::Dial(url));
        effects
    }

    fn disconnect(&mut self) -> Vec<Effect> {
        // The user asked to stop: whatever else happens, no timer may fire a
        // spontaneous reconnect afterwards.
        let mut effects = self.disarm();
        if matches!(self.state, LinkState::Connecting | LinkState::Open) {
            effects.push(Effect::CloseSocket);
            self.state = LinkState::Closing;
            info!("link: disconnecting");
        } else {
            self.state = LinkState::Disconnected;
        }
        effects
    }

    fn opened(&mut self) -> Vec<Effect> {
        if self.state != LinkState::Connecting {
            // A dial we no longer care about; shut its socket down.
            warn!("link: unexpected open in {:?}", self.state);
            return vec![Effect::CloseSocket];
        }
        self.state = LinkState::Open;
        info!("link: open");
        vec![Effect::SendCurrentState]
    }

    fn dial_failed(&mut self) -> Vec<Effect> {
        if self.state != LinkState::Connecting {
            return Vec::new();
        }
        warn!("link: connect failed, retrying in {RECONNECT_DELAY:?}");
        self.state = LinkState::Disconnected;
        self.arm()
    }

    fn closed(&mut self) -> Vec<Effect> {
        match self.state {
            LinkState::Open => {
                // Unexpected close of the live socket.
                warn!("link: connection lost, retrying in {RECONNECT_DELAY:?}");
                self.state = LinkState::Disconnected;
                self.arm()
            }
            LinkState::Closing => {
                // The close we asked for; stay quiet.
                self.state = LinkState::Disconnected;
                info!("link: disconnected");
                Vec::new()
            }
            // While Connecting this is the superseded socket going away;
            // while Disconnected it is a duplicate signal. Neither may arm
            // a second timer.
            LinkState::Connecting | LinkState::Disconnected => Vec::new(),
        }
    }

    fn reconnect_due(&mut self) -> Vec<Effect> {
        if !self.reconnect_armed || self.state != LinkState::Disconnected {
            return Vec::new();
        }
        self.reconnect_armed = false;
        let Some(url) = self.endpoint.control_url() else {
            return Vec::new();
        };
        self.state = LinkState::Connecting;
        info!("link: reconnecting to {url}");
        vec![Effect::Dial(url)]
    }

    fn arm(&mut self) -> Vec<Effect> {
        if self.reconnect_armed {
            return Vec::new();
        }
        self.reconnect_armed = true;
        vec![Effect::ArmReconnect(RECONNECT_DELAY)]
    }

    fn disarm(&mut self) -> Vec<Effect> {
        if !self.reconnect_armed {
            return Vec::new();
        }
        self.reconnect_armed = false;
        vec![Effect::DisarmReconnect]
    }
}
