/// The recurring gamepad poll task: a cancellable handle owning the loop
/// that samples pads once per display-refresh tick.
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use rover_input::PadSource;

use crate::panel::Panel;

pub struct PollTask {
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl PollTask {
    /// Spawn the poll loop at `hz` ticks per second. The loop runs until the
    /// handle is stopped; it never outlives the panel's shutdown path.
    pub fn spawn<P>(panel: Arc<Mutex<Panel>>, mut pads: P, hz: u32) -> Self
    where
        P: PadSource + Send + 'static,
    {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let period = Duration::from_secs_f64(1.0 / f64::from(hz.max(1)));

        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        let readings = pads.read();
                        // One lock per tick: the state update and the
                        // resulting transmission happen as a single step.
                        let Ok(mut panel) = panel.lock() else {
                            warn!("poll: panel mutex poisoned, stopping");
                            break;
                        };
                        panel.poll_tick(readings);
                    }
                }
            }
            debug!("poll: task stopped");
        });

        Self {
            stop: Some(stop_tx),
            task,
        }
    }

    /// Cancel the loop and wait for it to wind down.
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Err(e) = (&mut self.task).await {
            if !e.is_cancelled() {
                warn!("poll: task failed: {e}");
            }
        }
    }
}
