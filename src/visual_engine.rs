use eframe::egui;
use pulsefx::controller::RenderFrame;

/// Full-window spectrum display that pulses on each beat.
pub struct VisualEngine {
    seen_beats: u64,
}

impl VisualEngine {
    pub fn new() -> Self {
        Self { seen_beats: 0 }
    }

    /// 1.0 right on a beat, fading to 0.0 over the beat duration.
    fn beat_intensity(frame: &RenderFrame) -> f32 {
        let Some(last_beat) = frame.last_beat_secs else {
            return 0.0;
        };
        if frame.beat_duration_secs <= 0.0 {
            return 0.0;
        }
        let since = frame.time_secs - last_beat;
        if (0.0..frame.beat_duration_secs).contains(&since) {
            1.0 - since / frame.beat_duration_secs
        } else {
            0.0
        }
    }

    pub fn render(&mut self, ctx: &egui::Context, frame: &RenderFrame) {
        let pulse = Self::beat_intensity(frame);
        self.seen_beats = self.seen_beats.max(frame.beat_count);

        egui::CentralPanel::default()
            .frame(
                egui::Frame::default()
                    .fill(egui::Color32::BLACK)
                    .inner_margin(0.0),
            )
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                let painter = ui.painter();

                let base = (40.0 * pulse) as u8;
                painter.rect_filled(rect, 0.0, egui::Color32::from_rgb(base, base / 2, base));

                if !frame.spectrum.is_empty() {
                    let bar_width = rect.width() / frame.spectrum.len() as f32;
                    // Alternate hue every beat
                    let warm = self.seen_beats % 2 == 1;

                    for (i, &level) in frame.spectrum.iter().enumerate() {
                        let height = level * rect.height() * (0.8 + 0.2 * pulse);
                        let shade = (80.0 + 175.0 * level) as u8;
                        let colour = if warm {
                            egui::Color32::from_rgb(shade, 90, 160)
                        } else {
                            egui::Color32::from_rgb(90, 140, shade)
                        };
                        let x = rect.left() + i as f32 * bar_width;
                        painter.rect_filled(
                            egui::Rect::from_min_max(
                                egui::pos2(x, rect.bottom() - height),
                                egui::pos2(x + bar_width.max(1.0), rect.bottom()),
                            ),
                            0.0,
                            colour,
                        );
                    }
                }

                painter.text(
                    rect.left_top() + egui::vec2(12.0, 12.0),
                    egui::Align2::LEFT_TOP,
                    format!("beats {}", frame.beat_count),
                    egui::FontId::monospace(14.0),
                    egui::Color32::from_gray(160),
                );
            });

        ctx.request_repaint();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(beat_count: u64, last_beat_secs: Option<f32>, time_secs: f32) -> RenderFrame {
        RenderFrame {
            spectrum: Vec::new(),
            beat_count,
            last_beat_secs,
            beat_duration_secs: 0.1,
            time_secs,
        }
    }

    #[test]
    fn pulse_fades_over_beat_duration() {
        assert_eq!(VisualEngine::beat_intensity(&frame(3, Some(2.0), 2.0)), 1.0);
        let half = VisualEngine::beat_intensity(&frame(3, Some(2.0), 2.05));
        assert!((half - 0.5).abs() < 1e-3);
        assert_eq!(VisualEngine::beat_intensity(&frame(3, Some(2.0), 2.2)), 0.0);
    }

    #[test]
    fn no_pulse_before_first_beat() {
        assert_eq!(VisualEngine::beat_intensity(&frame(0, None, 0.0)), 0.0);
    }

    #[test]
    fn no_pulse_once_stopped() {
        // beats from an earlier session keep the counter but not the pulse
        assert_eq!(VisualEngine::beat_intensity(&frame(2, None, 0.0)), 0.0);
        assert_eq!(VisualEngine::beat_intensity(&frame(2, None, 3.0)), 0.0);
    }
}
