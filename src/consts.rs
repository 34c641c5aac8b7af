/// Sample rate in Hz assumed until a capture device reports its own.
pub const SAMPLE_RATE: u32 = 44100;

/// Number of samples per FFT. Must be a power of 2.
/// 2048 samples at 44.1kHz = ~46ms of audio
pub const BUFFER_SIZE: usize = 2048;

/// Upper bound of the byte magnitude domain. Samples are divided by this to
/// land in [0, 1).
pub const MAGNITUDE_CEILING: f32 = 256.0;

/// Soft clip drive applied before `tanh`.
pub const SOFT_CLIP_AMOUNT: f32 = 0.9;

/// Frequency range (Hz) scanned for beat peaks.
/// Covers kick and snare fundamentals while skipping rumble and hiss.
pub const BEAT_BAND_MIN_HZ: f32 = 60.0;
pub const BEAT_BAND_MAX_HZ: f32 = 2000.0;

/// Number of accepted beat timestamps kept for tempo estimation.
pub const BEAT_HISTORY_SIZE: usize = 20;

/// How long the beat flash stays lit after an accepted beat.
pub const BEAT_FLASH_MS: f64 = 100.0;

/// Canonical tempo window used by octave correction.
pub const MIN_BPM: f64 = 60.0;
pub const MAX_BPM: f64 = 180.0;

/// Decibel range mapped onto the byte magnitude domain by the analyser.
pub const ANALYSER_MIN_DB: f32 = -100.0;
pub const ANALYSER_MAX_DB: f32 = -30.0;

/// Log-spaced frequency span of the renderer spectrum.
pub const SPECTRUM_MIN_HZ: f32 = 20.0;
pub const SPECTRUM_MAX_HZ: f32 = 20000.0;

/// Dynamic range window of the renderer spectrum.
pub const SPECTRUM_MIN_DB: f32 = -90.0;
pub const SPECTRUM_MAX_DB: f32 = -30.0;

/// Power-law exponent pushing quiet bands towards zero.
pub const SPECTRUM_COMPRESSION: f32 = 1.5;

/// Weight of the previous output band in the renderer smoothing.
pub const SPECTRUM_SMOOTHING: f32 = 0.7;

/// Number of bands handed to the renderer.
pub const SPECTRUM_BANDS: usize = 1024;

/// Number of magnitude bins drawn by the mini spectrum view.
pub const MINI_SPECTRUM_BINS: usize = 256;

/// Number of beat timestamps shown in the debug readout.
pub const DIAGNOSTIC_BEATS: usize = 5;

pub const APP_VERSION: &str = "v0.1.0";
