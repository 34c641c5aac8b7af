use std::f32::consts::PI;
use std::sync::Arc;

use biquad::{Biquad, Coefficients, DirectForm2Transposed, ToHertz, Type};
use log::{debug, warn};
use rustfft::{Fft, FftPlanner, num_complex::Complex};

use crate::audio::capture::SpectrumFrame;
use crate::config::{AnalyserConfig, AudioParameters};

/// Turns the raw input stream into magnitude/decibel frames.
///
/// Signal path: gain -> band-pass biquad -> rolling buffer. On request the
/// latest `fft_size` samples are windowed, transformed and smoothed over
/// time with the configured smoothing constant.
pub struct SpectralAnalyser {
    buffer: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    filter: DirectForm2Transposed<f32>,
    gain: f32,
    smoothing: f32,
    sample_rate: u32,
    config: AnalyserConfig,
}

impl SpectralAnalyser {
    pub fn new(sample_rate: u32, config: AnalyserConfig, params: &AudioParameters) -> Self {
        let fft_size = config.fft_size.next_power_of_two().max(2);
        let fft = FftPlanner::<f32>::new().plan_fft_forward(fft_size);

        debug!(
            "SpectralAnalyser created: sample_rate={}, fft_size={}",
            sample_rate, fft_size
        );

        let mut analyser = Self {
            buffer: Vec::with_capacity(fft_size),
            fft,
            window: blackman_window(fft_size),
            scratch: vec![Complex::new(0.0, 0.0); fft_size],
            smoothed: vec![0.0; fft_size / 2],
            filter: DirectForm2Transposed::<f32>::new(passthrough()),
            gain: params.gain_value,
            smoothing: params.smoothing_constant,
            sample_rate,
            config: AnalyserConfig {
                fft_size,
                ..config
            },
        };
        analyser.configure(params);
        analyser
    }

    /// Applies gain, filter and smoothing from a parameter snapshot.
    pub fn configure(&mut self, params: &AudioParameters) {
        self.gain = params.gain_value;
        self.smoothing = params.smoothing_constant.clamp(0.0, 1.0);

        // Centre frequency must stay below Nyquist
        let nyquist = self.sample_rate as f32 / 2.0;
        let centre = params.filter_frequency_hz.clamp(1.0, (nyquist - 1.0).max(1.0));
        let q = params.filter_q.max(0.01);

        match Coefficients::<f32>::from_params(
            Type::BandPass,
            (self.sample_rate.max(1) as f32).hz(),
            centre.hz(),
            q,
        ) {
            Ok(coeffs) => self.filter.update_coefficients(coeffs),
            Err(err) => warn!("Band-pass {centre}Hz Q{q} rejected ({err:?}), filter bypassed"),
        }
    }

    pub fn add_samples(&mut self, samples: &[f32]) {
        let gain = self.gain;
        let filter = &mut self.filter;
        self.buffer
            .extend(samples.iter().map(|&s| filter.run(s * gain)));

        // Keep only the most recent samples
        let fft_size = self.config.fft_size;
        if self.buffer.len() > fft_size {
            self.buffer.drain(0..self.buffer.len() - fft_size);
        }
    }

    /// Snapshot of the current spectrum. Never blocks on new input: whatever
    /// is buffered right now is analysed (zero-padded when short).
    pub fn frequency_data(&mut self) -> SpectrumFrame {
        let fft_size = self.config.fft_size;
        let pad = fft_size - self.buffer.len();

        for (i, slot) in self.scratch.iter_mut().enumerate() {
            let sample = if i < pad { 0.0 } else { self.buffer[i - pad] };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }
        self.fft.process(&mut self.scratch);

        let bins = fft_size / 2;
        let scale = 1.0 / fft_size as f32;
        let tau = self.smoothing;
        let db_range = self.config.max_decibels - self.config.min_decibels;

        let mut magnitudes = Vec::with_capacity(bins);
        let mut decibels = Vec::with_capacity(bins);

        for (k, smoothed) in self.smoothed.iter_mut().enumerate() {
            let magnitude = self.scratch[k].norm() * scale;
            let next = tau * *smoothed + (1.0 - tau) * magnitude;
            *smoothed = if next.is_finite() { next } else { 0.0 };

            let db = 20.0 * smoothed.log10();
            let byte = (255.0 / db_range * (db - self.config.min_decibels))
                .floor()
                .clamp(0.0, 255.0);

            magnitudes.push(byte);
            decibels.push(db);
        }

        SpectrumFrame {
            magnitudes,
            decibels,
            sample_rate: self.sample_rate,
            fft_size,
        }
    }
}

fn blackman_window(n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| {
            let x = i as f32 / n as f32;
            0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
        })
        .collect()
}

fn passthrough() -> Coefficients<f32> {
    Coefficients {
        a1: 0.0,
        a2: 0.0,
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate as f32).sin() * 0.02)
            .collect()
    }

    #[test]
    fn silence_maps_to_zero_bytes() {
        let mut analyser =
            SpectralAnalyser::new(44100, AnalyserConfig::default(), &AudioParameters::default());
        let frame = analyser.frequency_data();
        assert_eq!(frame.magnitudes.len(), 1024);
        assert_eq!(frame.decibels.len(), 1024);
        assert_eq!(frame.fft_size, 2048);
        assert!(frame.magnitudes.iter().all(|&m| m == 0.0));
    }

    #[test]
    fn tone_peaks_near_its_bin() {
        let params = AudioParameters {
            smoothing_constant: 0.1,
            filter_frequency_hz: 1000.0,
            ..AudioParameters::default()
        };
        let mut analyser = SpectralAnalyser::new(44100, AnalyserConfig::default(), &params);
        analyser.add_samples(&sine(1000.0, 44100, 8192));
        let frame = analyser.frequency_data();

        let (loudest, _) = frame
            .magnitudes
            .iter()
            .enumerate()
            .fold((0, f32::MIN), |best, (i, &m)| if m > best.1 { (i, m) } else { best });
        // 1000 Hz lands in bin 46 at 2048 / 44.1kHz
        assert!((45..=47).contains(&loudest), "loudest bin {loudest}");
        assert!(frame.magnitudes[loudest] > 0.0);
        assert!(frame.magnitudes.iter().all(|m| (0.0..=255.0).contains(m)));
    }

    #[test]
    fn buffer_is_capped_at_fft_size() {
        let mut analyser =
            SpectralAnalyser::new(48000, AnalyserConfig::default(), &AudioParameters::default());
        analyser.add_samples(&vec![0.1; 5000]);
        assert_eq!(analyser.buffer.len(), 2048);
        assert_eq!(analyser.frequency_data().sample_rate, 48000);
    }
}
