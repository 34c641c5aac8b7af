use eframe::egui;

use pulsefx::beat::TempoEstimate;
use pulsefx::controller::Diagnostics;

pub struct MonitoringView<'a> {
    pub listening: bool,
    pub tempo: TempoEstimate,
    pub loudness: f32,
    pub is_clipping: bool,
    pub beat_flash: bool,
    pub diagnostics: &'a Diagnostics,
}

pub fn render_live_monitoring(ui: &mut egui::Ui, view: &MonitoringView<'_>) {
    ui.label(egui::RichText::new("Live Monitoring").size(16.0));
    ui.add_space(8.0);

    render_tempo(ui, view);
    ui.add_space(8.0);

    render_level(ui, view);
    ui.add_space(8.0);

    render_debug(ui, view.diagnostics, view.loudness);
    ui.add_space(12.0);
}

fn render_tempo(ui: &mut egui::Ui, view: &MonitoringView<'_>) {
    ui.group(|ui| {
        ui.horizontal(|ui| {
            let text = if view.tempo.is_known() {
                format!("{} BPM", view.tempo.bpm)
            } else {
                "--".to_string()
            };
            ui.label(egui::RichText::new(text).size(28.0).strong());

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let colour = if view.beat_flash {
                    egui::Color32::RED
                } else {
                    egui::Color32::from_gray(60)
                };
                let (rect, _) = ui.allocate_exact_size(egui::vec2(18.0, 18.0), egui::Sense::hover());
                ui.painter().circle_filled(rect.center(), 8.0, colour);
            });
        });
        let status = if view.listening {
            "Listening..."
        } else {
            "Press Start to begin"
        };
        ui.colored_label(egui::Color32::GRAY, status);
    });
}

fn render_level(ui: &mut egui::Ui, view: &MonitoringView<'_>) {
    let fill = if view.is_clipping {
        egui::Color32::from_rgb(239, 68, 68)
    } else {
        egui::Color32::from_rgb(59, 130, 246)
    };
    ui.add(
        egui::ProgressBar::new(view.loudness.clamp(0.0, 1.0))
            .fill(fill)
            .text(format!("Volume {:.1}%", view.loudness * 100.0)),
    );
}

fn render_debug(ui: &mut egui::Ui, diagnostics: &Diagnostics, loudness: f32) {
    egui::CollapsingHeader::new("Debug")
        .default_open(false)
        .show(ui, |ui| {
            egui::Grid::new("debug_grid")
                .num_columns(2)
                .spacing([20.0, 4.0])
                .show(ui, |ui| {
                    ui.label(format!("Raw Volume: {:.1}%", diagnostics.raw_volume * 100.0));
                    ui.label(format!("Amplified: {:.1}%", loudness * 100.0));
                    ui.end_row();

                    ui.label(format!("Raw BPM: {}", diagnostics.raw_bpm));
                    ui.label(format!("Avg Interval: {:.1}ms", diagnostics.avg_interval_ms));
                    ui.end_row();

                    ui.label(format!("Beats Held: {}", diagnostics.history_len));
                    ui.label(format!("Peaks This Frame: {}", diagnostics.peak_count));
                    ui.end_row();
                });

            let recent: Vec<String> = diagnostics
                .recent_beats
                .iter()
                .map(|t| t.to_string())
                .collect();
            ui.small(format!("Recent beats: {}", recent.join(", ")));
        });
}
