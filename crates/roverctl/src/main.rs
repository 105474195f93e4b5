// roverctl — headless driver for the rover control-panel core.
//
// Streams gamepad input to the robot until Ctrl-C. The graphical front end
// (buttons, host field, video widget) is a separate layer that drives the
// same panel entry points; this binary exercises them from the command line.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::Parser;
use log::{info, warn};

use rover_input::PadBackend;
use rover_panel::{Panel, PanelConfig, PollTask};

#[derive(Parser, Debug)]
#[command(name = "roverctl", about = "Remote-control panel for a mobile robot")]
struct Args {
    /// Robot host (IP or name). Overrides the config file.
    #[arg(long, env = "ROVER_HOST")]
    host: Option<String>,

    /// Path to the panel config JSON file.
    #[arg(long, default_value = "roverctl.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    // Load config from file, falling back to defaults if not found.
    let config = match PanelConfig::read(&args.config) {
        Ok(c) => {
            info!("loaded config from {}", args.config.display());
            c
        }
        Err(_) => {
            info!("config {} not found, using defaults", args.config.display());
            PanelConfig::default()
        }
    };
    let host = args.host.unwrap_or_else(|| config.host.clone());

    let panel = Arc::new(Mutex::new(Panel::new()));
    if let Ok(mut panel) = panel.lock() {
        if host.is_empty() {
            warn!("no robot host configured; pass --host or set it in the config file");
        } else {
            panel.set_endpoint(&host);
            if let Some(url) = panel.video_feed_url() {
                info!("video feed: {url}");
            }
            panel.request_connect();
        }
    }

    let poll = match PadBackend::new() {
        Ok(pads) => Some(PollTask::spawn(Arc::clone(&panel), pads, config.poll_hz)),
        Err(e) => {
            warn!("gamepad support unavailable: {e}");
            None
        }
    };

    tokio::signal::ctrl_c().await?;
    info!("shutting down");

    if let Some(poll) = poll {
        poll.stop().await;
    }
    if let Ok(panel) = panel.lock() {
        panel.request_disconnect();
        panel.shutdown();
    }
    Ok(())
}
