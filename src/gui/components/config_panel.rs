use eframe::egui;

use pulsefx::config::{AudioParameters, ParameterKey};

pub fn render_config_panel(ui: &mut egui::Ui, params: &mut AudioParameters, is_clipping: bool) {
    ui.label(egui::RichText::new("Configuration").size(16.0));
    ui.add_space(8.0);

    render_beat_detection(ui, params);

    ui.add_space(8.0);

    render_input_chain(ui, params, is_clipping);

    ui.add_space(20.0);
}

fn slider<'a>(value: &'a mut f32, key: ParameterKey) -> egui::Slider<'a> {
    let (min, max) = key.range();
    egui::Slider::new(value, min..=max)
}

fn render_beat_detection(ui: &mut egui::Ui, params: &mut AudioParameters) {
    egui::CollapsingHeader::new("Beat Detection")
        .default_open(true)
        .show(ui, |ui| {
            ui.add_space(4.0);
            egui::Grid::new("beat_settings_grid")
                .num_columns(2)
                .spacing([20.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Min Peak Distance:")
                        .on_hover_text("Shortest gap between two beats - lower = faster tempos");
                    ui.add(
                        slider(&mut params.min_peak_distance_ms, ParameterKey::MinPeakDistance)
                            .step_by(10.0)
                            .suffix(" ms"),
                    );
                    ui.end_row();

                    ui.label("Peak Threshold:")
                        .on_hover_text("Lower = quieter hits count as beats");
                    ui.add(
                        slider(&mut params.peak_threshold, ParameterKey::PeakThreshold)
                            .step_by(0.05),
                    );
                    ui.end_row();

                    ui.label("Smoothing:")
                        .on_hover_text("Higher = steadier spectrum, slower response");
                    ui.add(
                        slider(&mut params.smoothing_constant, ParameterKey::SmoothingConstant)
                            .step_by(0.01),
                    );
                    ui.end_row();
                });
        });
}

fn render_input_chain(ui: &mut egui::Ui, params: &mut AudioParameters, is_clipping: bool) {
    egui::CollapsingHeader::new("Input Chain")
        .default_open(true)
        .show(ui, |ui| {
            ui.add_space(4.0);
            egui::Grid::new("input_settings_grid")
                .num_columns(2)
                .spacing([20.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Gain:").on_hover_text("Input level multiplier");
                    ui.horizontal(|ui| {
                        ui.add(slider(&mut params.gain_value, ParameterKey::Gain).step_by(0.1));
                        if is_clipping {
                            ui.colored_label(egui::Color32::RED, "CLIPPING!");
                        }
                    });
                    ui.end_row();

                    ui.label("Filter Freq:")
                        .on_hover_text("Centre of the band-pass in front of the analyser");
                    ui.add(
                        slider(&mut params.filter_frequency_hz, ParameterKey::FilterFrequency)
                            .step_by(10.0)
                            .suffix(" Hz"),
                    );
                    ui.end_row();

                    ui.label("Filter Q:")
                        .on_hover_text("Higher = narrower band");
                    ui.add(slider(&mut params.filter_q, ParameterKey::FilterQ).step_by(0.1));
                    ui.end_row();
                });
        });
}
