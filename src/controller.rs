use std::time::Instant;

use log::{debug, info, warn};

use crate::audio::{CaptureGuard, CaptureProvider, SpectrumFrame};
use crate::beat::{
    AmplitudeReading, BeatGate, TempoEstimate, estimate_tempo, find_peaks, frequency_to_bin,
    normalize_spectrum, peak_distance_bins, process_amplitude,
};
use crate::config::{AnalyserConfig, AudioParameters};
use crate::consts;
use crate::error::{ConfigError, SessionError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active,
}

/// Single-slot tick queue. A tick is only scheduled once the previous one has
/// run to completion, and `cancel` drops whatever is pending.
#[derive(Debug, Default)]
pub struct TickScheduler {
    pending: Option<u64>,
    issued: u64,
}

impl TickScheduler {
    /// Queues the next tick and returns its id. Scheduling while a tick is
    /// already pending returns the pending id.
    pub fn schedule(&mut self) -> u64 {
        if let Some(id) = self.pending {
            return id;
        }
        self.issued += 1;
        self.pending = Some(self.issued);
        self.issued
    }

    /// Hands out the pending tick, if any.
    pub fn take_due(&mut self) -> Option<u64> {
        self.pending.take()
    }

    /// Returns whether a tick was dropped.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// What the renderer gets once per tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderFrame {
    /// Log-spaced bands in [0, 1].
    pub spectrum: Vec<f32>,
    /// Beats accepted since the controller was created.
    pub beat_count: u64,
    /// Seconds since session start of the last beat accepted in this
    /// session. `None` before the first one and after stop.
    pub last_beat_secs: Option<f32>,
    pub beat_duration_secs: f32,
    /// Seconds since session start.
    pub time_secs: f32,
}

/// Read-only values for the debug view.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Diagnostics {
    pub raw_volume: f32,
    pub amplified_volume: f32,
    pub raw_bpm: u32,
    pub avg_interval_ms: f64,
    pub peak_count: usize,
    pub history_len: usize,
    /// Last few beat timestamps, mod 10000 ms.
    pub recent_beats: Vec<u32>,
}

/// Owns the capture, the parameter snapshot and every piece of per-session
/// state, and runs the beat pipeline once per tick.
pub struct SessionController {
    state: SessionState,
    params: AudioParameters,
    config: AnalyserConfig,
    capture: Option<CaptureGuard>,
    scheduler: TickScheduler,
    gate: BeatGate,
    tempo: TempoEstimate,
    amplitude: AmplitudeReading,
    peak_count: usize,
    spectrum: Vec<f32>,
    mini_spectrum: Vec<f32>,
    started_at: Option<Instant>,
    last_tick_ms: f64,
}

impl SessionController {
    pub fn new(config: AnalyserConfig) -> Self {
        debug!(
            "SessionController created: bands={}, history={}",
            config.spectrum_bands, config.history_size
        );
        Self {
            state: SessionState::Idle,
            params: AudioParameters::default(),
            gate: BeatGate::new(config.history_size),
            spectrum: vec![0.0; config.spectrum_bands],
            config,
            capture: None,
            scheduler: TickScheduler::default(),
            tempo: TempoEstimate::default(),
            amplitude: AmplitudeReading::default(),
            peak_count: 0,
            mini_spectrum: Vec::new(),
            started_at: None,
            last_tick_ms: 0.0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn params(&self) -> AudioParameters {
        self.params
    }

    /// Acquires a capture through `provider` and begins ticking. On any
    /// failure the controller stays Idle.
    pub fn start(
        &mut self,
        provider: &mut dyn CaptureProvider,
        params: AudioParameters,
    ) -> Result<(), SessionError> {
        if self.is_active() {
            warn!("Start requested while a session is active");
            return Err(SessionError::AlreadyActive);
        }
        params.validate()?;

        let capture = provider.acquire(&params).map_err(|err| {
            warn!("Capture acquisition failed: {err}");
            err
        })?;
        let mut capture = CaptureGuard::new(capture);
        capture.configure(&params);

        self.params = params;
        self.capture = Some(capture);
        self.started_at = Some(Instant::now());
        self.last_tick_ms = 0.0;
        self.state = SessionState::Active;
        self.scheduler.schedule();

        info!("Session started");
        Ok(())
    }

    /// Releases the capture, cancels the pending tick and zeroes the
    /// per-session state. Calling it again is a no-op.
    pub fn stop(&mut self) {
        let was_active = self.is_active();

        self.scheduler.cancel();
        // Dropping the guard releases the capture
        self.capture = None;
        self.state = SessionState::Idle;
        self.started_at = None;

        self.gate.reset();
        self.tempo = TempoEstimate::default();
        self.amplitude = AmplitudeReading::default();
        self.peak_count = 0;
        self.spectrum.iter_mut().for_each(|band| *band = 0.0);
        self.mini_spectrum.clear();
        self.last_tick_ms = 0.0;

        if was_active {
            info!("Session stopped");
        }
    }

    /// Replaces the parameter snapshot as a whole. Rejected snapshots leave
    /// the current one in place.
    pub fn update_parameters(&mut self, params: AudioParameters) -> Result<(), ConfigError> {
        if let Err(err) = params.validate() {
            warn!("Rejected parameter update: {err}");
            return Err(err);
        }
        self.params = params;
        if let Some(capture) = self.capture.as_mut() {
            capture.configure(&params);
        }
        debug!("Parameters updated: {params:?}");
        Ok(())
    }

    /// Display refresh callback. Runs the pending tick, if any, and schedules
    /// the next one. Returns whether the pipeline ran.
    pub fn on_refresh(&mut self, now: Instant) -> bool {
        if self.scheduler.take_due().is_none() {
            return false;
        }
        if !self.is_active() {
            return false;
        }
        let (Some(started_at), Some(capture)) = (self.started_at, self.capture.as_mut()) else {
            return false;
        };

        let now_ms = now.saturating_duration_since(started_at).as_secs_f64() * 1000.0;
        let frame = capture.latest_frame();
        let ran = match frame {
            Some(frame) => {
                self.process_frame(&frame, now_ms);
                true
            }
            None => false,
        };

        self.scheduler.schedule();
        ran
    }

    fn process_frame(&mut self, frame: &SpectrumFrame, now_ms: f64) {
        let params = self.params;
        self.last_tick_ms = now_ms;

        self.amplitude = process_amplitude(&frame.magnitudes, params.gain_value);

        let lo = frequency_to_bin(consts::BEAT_BAND_MIN_HZ, frame.sample_rate, frame.fft_size);
        let hi = frequency_to_bin(consts::BEAT_BAND_MAX_HZ, frame.sample_rate, frame.fft_size)
            .min(frame.magnitudes.len());
        let band = if lo < hi { &frame.magnitudes[lo..hi] } else { &[][..] };

        let peaks = find_peaks(
            band,
            peak_distance_bins(params.min_peak_distance_ms, frame.sample_rate),
            params.peak_threshold * consts::MAGNITUDE_CEILING,
        );
        self.peak_count = peaks.len();

        if self
            .gate
            .on_frame(&peaks, now_ms, f64::from(params.min_peak_distance_ms))
            .is_some()
        {
            self.tempo = estimate_tempo(self.gate.history().iter());
        }

        let spectrum = normalize_spectrum(
            &frame.decibels,
            frame.sample_rate,
            self.config.spectrum_bands,
            Some(self.spectrum.as_slice()),
        );
        self.spectrum = spectrum;

        self.mini_spectrum = frame
            .magnitudes
            .iter()
            .take(consts::MINI_SPECTRUM_BINS)
            .map(|&m| m / consts::MAGNITUDE_CEILING * params.gain_value)
            .collect();
    }

    pub fn tempo(&self) -> TempoEstimate {
        self.tempo
    }

    pub fn amplitude(&self) -> AmplitudeReading {
        self.amplitude
    }

    /// Beat flash as of the last tick.
    pub fn beat_flash(&self) -> bool {
        self.is_active() && self.gate.flash_active(self.last_tick_ms)
    }

    /// First bins of the last frame, normalized and scaled by gain.
    /// Values above 1.0 overran the ceiling.
    pub fn mini_spectrum(&self) -> &[f32] {
        &self.mini_spectrum
    }

    pub fn beat_count(&self) -> u64 {
        self.gate.beat_count()
    }

    pub fn render_frame(&self) -> RenderFrame {
        RenderFrame {
            spectrum: self.spectrum.clone(),
            beat_count: self.gate.beat_count(),
            last_beat_secs: self.gate.last_beat_ms().map(|ms| (ms / 1000.0) as f32),
            beat_duration_secs: (consts::BEAT_FLASH_MS / 1000.0) as f32,
            time_secs: (self.last_tick_ms / 1000.0) as f32,
        }
    }

    pub fn diagnostics(&self) -> Diagnostics {
        let history = self.gate.history();
        let skip = history.len().saturating_sub(consts::DIAGNOSTIC_BEATS);
        Diagnostics {
            raw_volume: self.amplitude.raw_volume,
            amplified_volume: self.amplitude.amplified_volume,
            raw_bpm: self.tempo.raw_bpm,
            avg_interval_ms: self.tempo.avg_interval_ms,
            peak_count: self.peak_count,
            history_len: history.len(),
            recent_beats: history
                .iter()
                .skip(skip)
                .map(|&t| (t as u64 % 10_000) as u32)
                .collect(),
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.stop();
    }
}
