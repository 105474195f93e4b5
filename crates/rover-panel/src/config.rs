use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Panel configuration, persisted as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Robot host (IP or name). Empty means not configured yet.
    pub host: String,
    /// Gamepad poll rate in Hz, nominally the display refresh rate.
    pub poll_hz: u32,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            poll_hz: 60,
        }
    }
}

impl PanelConfig {
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).with_context(|| format!("write config {}", path.display()))?;
        Ok(())
    }
}
