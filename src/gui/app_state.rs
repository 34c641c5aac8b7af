use crate::visual_engine::VisualEngine;
use eframe::egui;
use log::{debug, info};
use pulsefx::audio::{CaptureProvider, CpalCaptureProvider, audio_stream};
use pulsefx::config::{AnalyserConfig, AudioParameters};
use pulsefx::consts::APP_VERSION;
use pulsefx::controller::SessionController;
use pulsefx::error::SessionError;
use std::time::Instant;

use super::components::{
    MonitoringView, render_config_panel, render_live_monitoring, render_spectrum_view,
};

pub struct AppState {
    session: SessionController,
    provider: CpalCaptureProvider,
    pending_params: AudioParameters, // Local copy for sliders
    devices: DeviceSelection,
    error: Option<String>,
    visuals_window_open: bool,
    visuals_window: VisualEngine,
}

/// Input devices with the one in use and the one picked in the selector.
struct DeviceSelection {
    names: Vec<String>,
    active: usize,
    pending: usize,
}

impl DeviceSelection {
    fn new(names: Vec<String>, default_idx: usize) -> Self {
        Self {
            names,
            active: default_idx,
            pending: default_idx,
        }
    }

    fn pending_name(&self) -> Option<String> {
        self.names.get(self.pending).cloned()
    }

    fn changed(&self) -> bool {
        self.pending != self.active
    }

    fn commit(&mut self) {
        self.active = self.pending;
    }

    /// Starts `session` on the pending device. The pending choice only becomes
    /// the active one once the capture is running.
    fn start(
        &mut self,
        session: &mut SessionController,
        provider: &mut dyn CaptureProvider,
        params: AudioParameters,
    ) -> Result<(), SessionError> {
        session.start(provider, params)?;
        self.commit();
        Ok(())
    }
}

impl eframe::App for AppState {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // One pipeline tick per repaint
        self.session.on_refresh(Instant::now());

        self.render_top_panel(ctx);
        self.render_bottom_panel(ctx);
        self.render_central_panel(ctx);
        self.render_visualizer_window(ctx);

        ctx.request_repaint();
    }
}

impl AppState {
    pub fn new(session: SessionController, analyser_config: AnalyserConfig) -> Self {
        debug!("Initializing GUI state...");

        let (devices, selected_device_idx) = audio_stream::input_devices();
        debug!("Found {} audio input devices", devices.len());

        let selected_device = devices
            .get(selected_device_idx)
            .map(|s| s.as_str())
            .unwrap_or("None");
        info!("Selected initial audio device: {selected_device}");

        let provider =
            CpalCaptureProvider::new(devices.get(selected_device_idx).cloned(), analyser_config);

        let pending_params = session.params();
        debug!("Initial parameters: {pending_params:?}");

        Self {
            session,
            provider,
            pending_params,
            devices: DeviceSelection::new(devices, selected_device_idx),
            error: None,
            visuals_window_open: false,
            visuals_window: VisualEngine::new(),
        }
    }

    fn start_listening(&mut self) {
        let device_name = self.devices.pending_name();
        debug!("Starting session on {device_name:?}");
        self.provider.set_device(device_name);

        match self
            .devices
            .start(&mut self.session, &mut self.provider, self.pending_params)
        {
            Ok(()) => self.error = None,
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    fn toggle_listening(&mut self) {
        if self.session.is_active() {
            self.session.stop();
        } else {
            self.start_listening();
        }
    }

    fn apply_settings(&mut self) {
        debug!("Applying settings - Params: {:?}", self.pending_params);

        if let Err(err) = self.session.update_parameters(self.pending_params) {
            self.error = Some(err.to_string());
            return;
        }

        if !self.session.is_active() {
            // Picked up by the next Start
            self.devices.commit();
        } else if self.devices.changed() {
            debug!("Reloading audio stream with new device...");
            self.session.stop();
            self.start_listening();
            if !self.session.is_active() {
                return;
            }
        }

        info!("Settings applied successfully");
    }

    fn reset_to_default(&mut self) {
        debug!("Resetting parameters to defaults");
        self.pending_params = AudioParameters::default();
    }

    fn disable_apply_button(&self) -> bool {
        let params_unchanged = self.pending_params == self.session.params();
        params_unchanged && !self.devices.changed()
    }

    fn render_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.heading(format!("PULSE {APP_VERSION}"));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if self.session.is_active() {
                        ui.colored_label(egui::Color32::GREEN, "Listening");
                    } else {
                        ui.colored_label(egui::Color32::RED, "No Audio Stream");
                    }
                });
            });
            ui.add_space(4.0);
            ui.separator();
            ui.add_space(4.0);

            // Device Selection
            ui.horizontal(|ui| {
                ui.label("Audio Device:");
                egui::ComboBox::from_id_salt("device_selector")
                    .selected_text(
                        self.devices
                            .names
                            .get(self.devices.pending)
                            .map(|name| name.as_str())
                            .unwrap_or("No devices"),
                    )
                    .show_ui(ui, |ui| {
                        for (idx, name) in self.devices.names.iter().enumerate() {
                            ui.selectable_value(&mut self.devices.pending, idx, name);
                        }
                    });
            });
            ui.add_space(4.0);

            let label = if self.session.is_active() {
                "Stop"
            } else {
                "Start"
            };
            if ui
                .add_sized([ui.available_width(), 28.0], egui::Button::new(label))
                .clicked()
            {
                self.toggle_listening();
            }

            if let Some(error) = &self.error {
                ui.colored_label(egui::Color32::from_rgb(239, 68, 68), error);
            }
            ui.add_space(4.0);
        });
    }

    fn render_bottom_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("bottom_panel").show(ctx, |ui| {
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                ui.add_space(4.0);
                let apply_enabled = !self.disable_apply_button();

                if apply_enabled {
                    if ui.button("Apply Settings").clicked() {
                        self.apply_settings();
                    }
                } else {
                    ui.add_enabled(false, egui::Button::new("Apply Settings"));
                }

                if ui.button("↺ Reset to Default").clicked() {
                    self.reset_to_default();
                }

                ui.separator();

                ui.add_enabled_ui(!self.visuals_window_open, |ui| {
                    if ui.button("Open Visualizer").clicked() {
                        self.visuals_window_open = true;
                        info!("Visualizer window opened");
                    }
                });

                if self.visuals_window_open {
                    ui.colored_label(egui::Color32::GREEN, "● Visuals Active");
                }
            });
            ui.add_space(8.0);
        });
    }

    fn render_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    ui.add_space(8.0);

                    // Live Monitoring Section
                    let amplitude = self.session.amplitude();
                    let beat_flash = self.session.beat_flash();
                    let diagnostics = self.session.diagnostics();
                    render_live_monitoring(
                        ui,
                        &MonitoringView {
                            listening: self.session.is_active(),
                            tempo: self.session.tempo(),
                            loudness: amplitude.loudness,
                            is_clipping: amplitude.is_clipping,
                            beat_flash,
                            diagnostics: &diagnostics,
                        },
                    );

                    render_spectrum_view(ui, self.session.mini_spectrum(), beat_flash);

                    ui.add_space(20.0);

                    // Configuration Section
                    render_config_panel(ui, &mut self.pending_params, amplitude.is_clipping);
                });
        });
    }

    fn render_visualizer_window(&mut self, ctx: &egui::Context) {
        if self.visuals_window_open {
            let visualizer_id = egui::ViewportId::from_hash_of("pulsefx_visualizer");
            let frame = self.session.render_frame();

            ctx.show_viewport_immediate(
                visualizer_id,
                egui::ViewportBuilder::default()
                    .with_title("PULSE Visuals")
                    .with_inner_size([800.0, 600.0])
                    .with_resizable(true),
                |ctx, _class| {
                    if ctx.input(|i| i.viewport().close_requested()) {
                        self.visuals_window_open = false;
                    }
                    self.visuals_window.render(ctx, &frame);
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsefx::audio::{SpectrumCapture, SpectrumFrame};
    use pulsefx::error::AcquisitionError;

    struct SilentCapture;

    impl SpectrumCapture for SilentCapture {
        fn latest_frame(&mut self) -> Option<SpectrumFrame> {
            None
        }

        fn configure(&mut self, _params: &AudioParameters) {}

        fn release(&mut self) {}
    }

    struct Provider {
        available: bool,
    }

    impl CaptureProvider for Provider {
        fn acquire(
            &mut self,
            _params: &AudioParameters,
        ) -> Result<Box<dyn SpectrumCapture>, AcquisitionError> {
            if self.available {
                Ok(Box::new(SilentCapture))
            } else {
                Err(AcquisitionError::NoDevice)
            }
        }
    }

    fn two_devices() -> DeviceSelection {
        DeviceSelection::new(vec!["Built-in".to_string(), "USB Interface".to_string()], 0)
    }

    #[test]
    fn successful_start_commits_pending_device() {
        let mut session = SessionController::new(AnalyserConfig::default());
        let mut devices = two_devices();
        devices.pending = 1;
        assert_eq!(devices.pending_name().as_deref(), Some("USB Interface"));

        let mut provider = Provider { available: true };
        assert!(devices.start(&mut session, &mut provider, AudioParameters::default()).is_ok());
        assert_eq!(devices.active, 1);
        assert!(!devices.changed());
        assert!(session.is_active());
    }

    #[test]
    fn failed_restart_keeps_previous_device() {
        let mut session = SessionController::new(AnalyserConfig::default());
        let mut devices = two_devices();
        let mut working = Provider { available: true };
        devices
            .start(&mut session, &mut working, AudioParameters::default())
            .unwrap();

        devices.pending = 1;
        session.stop();
        let mut missing = Provider { available: false };
        assert!(devices.start(&mut session, &mut missing, AudioParameters::default()).is_err());

        assert_eq!(devices.active, 0);
        assert!(devices.changed());
        assert!(!session.is_active());
    }
}
