use crate::consts;

/// Loudness of one magnitude frame.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
pub struct AmplitudeReading {
    /// Mean magnitude normalized by the ceiling, before gain.
    pub raw_volume: f32,
    /// `raw_volume * gain`. Unbounded.
    pub amplified_volume: f32,
    /// Soft-clipped `amplified_volume`, for display.
    pub loudness: f32,
    /// The amplified signal overran unity before soft clipping.
    pub is_clipping: bool,
}

/// Bounded compression: `tanh(value * 0.9)`.
pub fn soft_clip(value: f32) -> f32 {
    (value * consts::SOFT_CLIP_AMOUNT).tanh()
}

pub fn process_amplitude(magnitudes: &[f32], gain: f32) -> AmplitudeReading {
    if magnitudes.is_empty() {
        return AmplitudeReading::default();
    }

    let sum: f32 = magnitudes
        .iter()
        .map(|&m| m / consts::MAGNITUDE_CEILING)
        .sum();
    let raw_volume = sum / magnitudes.len() as f32;
    let amplified_volume = raw_volume * gain;

    AmplitudeReading {
        raw_volume,
        amplified_volume,
        loudness: soft_clip(amplified_volume),
        is_clipping: amplified_volume > 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_ceiling_at_unity_gain() {
        let frame = vec![128.0; 1024];
        let reading = process_amplitude(&frame, 1.0);
        assert!((reading.raw_volume - 0.5).abs() < 1e-6);
        assert!((reading.loudness - (0.5f32 * 0.9).tanh()).abs() < 1e-6);
        assert!((reading.loudness - 0.4219).abs() < 1e-3);
        assert!(!reading.is_clipping);
    }

    #[test]
    fn clipping_uses_amplified_value() {
        let frame = vec![200.0; 64];
        let reading = process_amplitude(&frame, 2.0);
        assert!(reading.amplified_volume > 1.0);
        assert!(reading.is_clipping);
        assert!(reading.loudness < 1.0);
    }

    #[test]
    fn exactly_unity_is_not_clipping() {
        let frame = vec![128.0; 8];
        let reading = process_amplitude(&frame, 2.0);
        assert_eq!(reading.amplified_volume, 1.0);
        assert!(!reading.is_clipping);
    }

    #[test]
    fn empty_frame_is_silent() {
        assert_eq!(process_amplitude(&[], 3.0), AmplitudeReading::default());
    }
}
