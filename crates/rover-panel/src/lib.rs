// Panel facade: the entry points a UI layer drives, the recurring gamepad
// poll task, and the persisted configuration.

pub mod config;
pub mod panel;
pub mod poll;

pub use config::PanelConfig;
pub use panel::Panel;
pub use poll::PollTask;
