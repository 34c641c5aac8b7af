use eframe::egui;

use pulsefx::beat::soft_clip;

/// Bar view of the first magnitude bins. `levels` are normalized to the
/// magnitude ceiling and already include gain.
pub fn render_spectrum_view(ui: &mut egui::Ui, levels: &[f32], beat_flash: bool) {
    ui.group(|ui| {
        ui.label("Spectrum");

        let desired_height = 100.0;
        let (response, painter) = ui.allocate_painter(
            egui::vec2(ui.available_width(), desired_height),
            egui::Sense::hover(),
        );

        let rect = response.rect;

        // Draw background
        painter.rect_filled(rect, 0.0, egui::Color32::from_rgb(15, 23, 42));

        if !levels.is_empty() {
            let bar_width = rect.width() / levels.len() as f32;

            for (i, &level) in levels.iter().enumerate() {
                let height = soft_clip(level) * rect.height();
                let colour = if level > 1.0 {
                    let fade = (68.0 - (level - 1.0) * 50.0).max(0.0) as u8;
                    egui::Color32::from_rgb(239, fade, fade)
                } else {
                    egui::Color32::from_rgb(59, 130, 246)
                };

                let x = rect.left() + i as f32 * bar_width;
                let bar = egui::Rect::from_min_max(
                    egui::pos2(x, rect.bottom() - height),
                    egui::pos2(x + (bar_width - 1.0).max(1.0), rect.bottom()),
                );
                painter.rect_filled(bar, 0.0, colour);
            }
        }

        if beat_flash {
            painter.rect_filled(
                rect,
                0.0,
                egui::Color32::from_rgba_unmultiplied(239, 68, 68, 50),
            );
        }
    });
}
