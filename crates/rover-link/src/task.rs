/// Background task owning the control socket, the state machine, and the
/// reconnect timer.
use std::collections::VecDeque;

use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep_until};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use rover_types::ControlState;

use crate::machine::{Effect, LinkEvent, LinkMachine, LinkState};
use crate::transmitter;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Commands accepted by the link task.
#[derive(Debug)]
pub enum LinkCommand {
    SetEndpoint(String),
    Connect,
    Disconnect,
    Transmit(ControlState),
    Shutdown,
}

/// Handle to the background link task.
///
/// Cloneable and cheap; it carries only the command channel and the state
/// watch. The socket itself never leaves the task.
#[derive(Debug, Clone)]
pub struct LinkHandle {
    tx: mpsc::UnboundedSender<LinkCommand>,
    state_rx: watch::Receiver<LinkState>,
}

impl LinkHandle {
    /// Spawn the link task on the current tokio runtime.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(LinkState::Disconnected);
        tokio::spawn(link_task(rx, state_tx));
        Self { tx, state_rx }
    }

    /// Update the target host. Takes effect on the next dial.
    pub fn set_endpoint(&self, host: &str) {
        self.send(LinkCommand::SetEndpoint(host.to_string()));
    }

    pub fn connect(&self) {
        self.send(LinkCommand::Connect);
    }

    pub fn disconnect(&self) {
        self.send(LinkCommand::Disconnect);
    }

    /// Hand a snapshot to the task. It is written if the link is open and
    /// dropped otherwise.
    pub fn transmit(&self, state: ControlState) {
        self.send(LinkCommand::Transmit(state));
    }

    /// Stop the task, closing the socket if one is live.
    pub fn shutdown(&self) {
        self.send(LinkCommand::Shutdown);
    }

    /// Current connection state, for passive display.
    pub fn state(&self) -> LinkState {
        *self.state_rx.borrow()
    }

    /// Watch connection state transitions.
    pub fn state_watch(&self) -> watch::Receiver<LinkState> {
        self.state_rx.clone()
    }

    fn send(&self, command: LinkCommand) {
        // The task only exits on shutdown; past that point there is nothing
        // left to control.
        if self.tx.send(command).is_err() {
            debug!("link: command after shutdown dropped");
        }
    }
}

struct Driver {
    machine: LinkMachine,
    socket: Option<Socket>,
    reconnect_at: Option<Instant>,
    last_state: ControlState,
    state_tx: watch::Sender<LinkState>,
}

async fn link_task(mut rx: mpsc::UnboundedReceiver<LinkCommand>, state_tx: watch::Sender<LinkState>) {
    let mut driver = Driver {
        machine: LinkMachine::new(),
        socket: None,
        reconnect_at: None,
        last_state: ControlState::default(),
        state_tx,
    };

    loop {
        tokio::select! {
            command = rx.recv() => {
                match command {
                    None | Some(LinkCommand::Shutdown) => break,
                    Some(LinkCommand::SetEndpoint(host)) => driver.machine.set_host(&host),
                    Some(LinkCommand::Connect) => {
                        driver.dispatch(LinkEvent::ConnectRequested).await;
                    }
                    Some(LinkCommand::Disconnect) => {
                        driver.dispatch(LinkEvent::DisconnectRequested).await;
                    }
                    Some(LinkCommand::Transmit(state)) => driver.transmit(state).await,
                }
            }
            message = next_message(&mut driver.socket), if driver.socket.is_some() => {
                match message {
                    // The robot does not talk back; anything but a close is
                    // ignored.
                    Some(Ok(m)) if !m.is_close() => {}
                    Some(Ok(_)) => {
                        info!("link: closed by peer");
                        driver.socket = None;
                        driver.dispatch(LinkEvent::TransportClosed).await;
                    }
                    Some(Err(e)) => {
                        warn!("link: socket error: {e}");
                        driver.socket = None;
                        driver.dispatch(LinkEvent::TransportClosed).await;
                    }
                    None => {
                        driver.socket = None;
                        driver.dispatch(LinkEvent::TransportClosed).await;
                    }
                }
            }
            _ = ready_at(driver.reconnect_at), if driver.reconnect_at.is_some() => {
                driver.reconnect_at = None;
                driver.dispatch(LinkEvent::ReconnectDue).await;
            }
        }
    }

    if let Some(mut socket) = driver.socket.take() {
        let _ = socket.close(None).await;
    }
    debug!("link: task stopped");
}

async fn next_message(
    socket: &mut Option<Socket>,
) -> Option<Result<Message, tokio_tungstenite::tungstenite::Error>> {
    match socket {
        Some(socket) => socket.next().await,
        None => std::future::pending().await,
    }
}

async fn ready_at(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

impl Driver {
    /// Feed one event into the machine and execute the effects, following
    /// chained transport events until the machine settles.
    async fn dispatch(&mut self, event: LinkEvent) {
        let mut pending = VecDeque::from([event]);
        while let Some(event) = pending.pop_front() {
            let effects = self.machine.handle(event);
            self.state_tx.send_replace(self.machine.state());
            for effect in effects {
                if let Some(follow_up) = self.run(effect).await {
                    pending.push_back(follow_up);
                }
            }
        }
        self.state_tx.send_replace(self.machine.state());
    }

    async fn run(&mut self, effect: Effect) -> Option<LinkEvent> {
        match effect {
            Effect::Dial(url) => match connect_async(url.as_str()).await {
                Ok((socket, _response)) => {
                    self.socket = Some(socket);
                    Some(LinkEvent::TransportOpened)
                }
                Err(e) => {
                    warn!("link: connect to {url} failed: {e}");
                    Some(LinkEvent::TransportFailed)
                }
            },
            Effect::CloseSocket => {
                if let Some(mut socket) = self.socket.take() {
                    // Best-effort graceful close; the socket is gone either
                    // way.
                    let _ = socket.close(None).await;
                }
                Some(LinkEvent::TransportClosed)
            }
            Effect::ArmReconnect(delay) => {
                self.reconnect_at = Some(Instant::now() + delay);
                None
            }
            Effect::DisarmReconnect => {
                self.reconnect_at = None;
                None
            }
            Effect::SendCurrentState => {
                if self.write_frame(self.last_state).await {
                    None
                } else {
                    self.socket = None;
                    Some(LinkEvent::TransportClosed)
                }
            }
        }
    }

    async fn transmit(&mut self, state: ControlState) {
        // The toggle pulse belongs to exactly one frame; the snapshot kept
        // for the on-open send must never replay it.
        self.last_state = ControlState {
            toggle_mode: false,
            ..state
        };
        if !transmitter::should_send(self.machine.state()) {
            return;
        }
        if !self.write_frame(state).await {
            self.socket = None;
            self.dispatch(LinkEvent::TransportClosed).await;
        }
    }

    /// Write one frame. Returns false only on a transport write failure.
    async fn write_frame(&mut self, state: ControlState) -> bool {
        let Some(json) = transmitter::encode(&state) else {
            return true;
        };
        let Some(socket) = self.socket.as_mut() else {
            return false;
        };
        match socket.send(Message::Text(json)).await {
            Ok(()) => true,
            Err(e) => {
                warn!("link: write failed: {e}");
                false
            }
        }
    }
}
