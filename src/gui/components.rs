mod config_panel;
mod live_monitoring;
mod spectrum_view;

pub use config_panel::render_config_panel;
pub use live_monitoring::{MonitoringView, render_live_monitoring};
pub use spectrum_view::render_spectrum_view;
