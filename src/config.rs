use crate::consts;
use crate::error::ConfigError;

/// One immutable snapshot of the user-tunable detection parameters.
///
/// The controller never edits a snapshot in place: updates build a new value,
/// validate it and swap it in whole.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct AudioParameters {
    /// Minimum time between two accepted beats, in milliseconds.
    /// Also converted to a minimum bin spacing for peak picking.
    /// Lower = allows faster tempos but more double triggers
    pub min_peak_distance_ms: f32,

    /// Peak threshold as a fraction (0.0 - 1.0) of the magnitude ceiling.
    /// Lower = more sensitive (quiet hits register)
    /// Higher = only strong hits register
    pub peak_threshold: f32,

    /// Smoothing time constant of the spectral analyser (0.0 - 1.0).
    /// Higher = steadier spectrum but slower reaction to attacks
    pub smoothing_constant: f32,

    /// Centre frequency of the band-pass pre-filter, in Hz.
    pub filter_frequency_hz: f32,

    /// Quality factor of the band-pass pre-filter.
    /// Higher = narrower band around the centre frequency
    pub filter_q: f32,

    /// Input gain multiplier.
    /// Above ~1.0 quiet sources become usable but may clip
    pub gain_value: f32,
}

impl Default for AudioParameters {
    fn default() -> Self {
        Self {
            min_peak_distance_ms: 350.0,
            peak_threshold: 0.5,
            smoothing_constant: 0.85,
            filter_frequency_hz: 500.0,
            filter_q: 1.5,
            gain_value: 1.0,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ParameterKey {
    MinPeakDistance,
    PeakThreshold,
    SmoothingConstant,
    FilterFrequency,
    FilterQ,
    Gain,
}

impl ParameterKey {
    pub const ALL: [ParameterKey; 6] = [
        ParameterKey::Gain,
        ParameterKey::MinPeakDistance,
        ParameterKey::PeakThreshold,
        ParameterKey::SmoothingConstant,
        ParameterKey::FilterFrequency,
        ParameterKey::FilterQ,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ParameterKey::MinPeakDistance => "min_peak_distance_ms",
            ParameterKey::PeakThreshold => "peak_threshold",
            ParameterKey::SmoothingConstant => "smoothing_constant",
            ParameterKey::FilterFrequency => "filter_frequency_hz",
            ParameterKey::FilterQ => "filter_q",
            ParameterKey::Gain => "gain_value",
        }
    }

    /// Inclusive range accepted for this key.
    pub fn range(self) -> (f32, f32) {
        match self {
            ParameterKey::MinPeakDistance => (100.0, 1000.0),
            ParameterKey::PeakThreshold => (0.1, 0.9),
            ParameterKey::SmoothingConstant => (0.1, 0.99),
            ParameterKey::FilterFrequency => (60.0, 2000.0),
            ParameterKey::FilterQ => (0.1, 5.0),
            ParameterKey::Gain => (0.1, 5.0),
        }
    }

    pub fn get(self, params: &AudioParameters) -> f32 {
        match self {
            ParameterKey::MinPeakDistance => params.min_peak_distance_ms,
            ParameterKey::PeakThreshold => params.peak_threshold,
            ParameterKey::SmoothingConstant => params.smoothing_constant,
            ParameterKey::FilterFrequency => params.filter_frequency_hz,
            ParameterKey::FilterQ => params.filter_q,
            ParameterKey::Gain => params.gain_value,
        }
    }

    fn slot(self, params: &mut AudioParameters) -> &mut f32 {
        match self {
            ParameterKey::MinPeakDistance => &mut params.min_peak_distance_ms,
            ParameterKey::PeakThreshold => &mut params.peak_threshold,
            ParameterKey::SmoothingConstant => &mut params.smoothing_constant,
            ParameterKey::FilterFrequency => &mut params.filter_frequency_hz,
            ParameterKey::FilterQ => &mut params.filter_q,
            ParameterKey::Gain => &mut params.gain_value,
        }
    }

    fn check(self, value: f32) -> Result<(), ConfigError> {
        if !value.is_finite() {
            return Err(ConfigError::NotFinite { key: self.name() });
        }
        let (min, max) = self.range();
        if value < min || value > max {
            return Err(ConfigError::OutOfRange {
                key: self.name(),
                value,
                min,
                max,
            });
        }
        Ok(())
    }
}

impl AudioParameters {
    /// Checks every key against its range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for key in ParameterKey::ALL {
            key.check(key.get(self))?;
        }
        Ok(())
    }

    /// Returns a new snapshot with one key replaced. `self` is left untouched
    /// when the value is rejected.
    pub fn with(&self, key: ParameterKey, value: f32) -> Result<Self, ConfigError> {
        key.check(value)?;
        let mut next = *self;
        *key.slot(&mut next) = value;
        Ok(next)
    }
}

/// Settings of the capture side. Fixed for the lifetime of a session.
#[derive(Clone, PartialEq, Debug)]
pub struct AnalyserConfig {
    /// Number of samples per FFT. Must be a power of 2.
    /// Larger = better frequency resolution but more latency.
    pub fft_size: usize,

    /// Lower end of the decibel window mapped to magnitude 0.
    pub min_decibels: f32,

    /// Upper end of the decibel window mapped to magnitude 255.
    pub max_decibels: f32,

    /// Number of bands published to the renderer.
    pub spectrum_bands: usize,

    /// Number of beat timestamps used for tempo estimation.
    pub history_size: usize,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: consts::BUFFER_SIZE,
            min_decibels: consts::ANALYSER_MIN_DB,
            max_decibels: consts::ANALYSER_MAX_DB,
            spectrum_bands: consts::SPECTRUM_BANDS,
            history_size: consts::BEAT_HISTORY_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(AudioParameters::default().validate().is_ok());
    }

    #[test]
    fn out_of_range_update_keeps_previous_snapshot() {
        let params = AudioParameters::default();
        let err = params.with(ParameterKey::Gain, 7.5).unwrap_err();
        assert_eq!(
            err,
            ConfigError::OutOfRange {
                key: "gain_value",
                value: 7.5,
                min: 0.1,
                max: 5.0,
            }
        );
        assert_eq!(params.gain_value, 1.0);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let params = AudioParameters::default();
        let next = params.with(ParameterKey::MinPeakDistance, 1000.0).unwrap();
        assert_eq!(next.min_peak_distance_ms, 1000.0);
        let next = next.with(ParameterKey::FilterFrequency, 60.0).unwrap();
        assert_eq!(next.filter_frequency_hz, 60.0);
        assert_eq!(next.min_peak_distance_ms, 1000.0);
    }

    #[test]
    fn nan_is_rejected() {
        let params = AudioParameters::default();
        assert_eq!(
            params.with(ParameterKey::FilterQ, f32::NAN),
            Err(ConfigError::NotFinite { key: "filter_q" })
        );
    }

    #[test]
    fn validate_reports_first_bad_key() {
        let params = AudioParameters {
            peak_threshold: 0.95,
            ..AudioParameters::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::OutOfRange {
                key: "peak_threshold",
                ..
            })
        ));
    }
}
