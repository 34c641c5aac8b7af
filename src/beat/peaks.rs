/// Frequency (Hz) to FFT bin index: `floor(freq * fft_size / sample_rate)`.
pub fn frequency_to_bin(frequency_hz: f32, sample_rate: u32, fft_size: usize) -> usize {
    if sample_rate == 0 {
        return 0;
    }
    (frequency_hz * fft_size as f32 / sample_rate as f32).floor().max(0.0) as usize
}

/// Converts the configured minimum peak distance to a bin spacing.
///
/// The millisecond value is read as a sample count at the active sample rate,
/// which in practice keeps only the strongest low peak of each frame.
pub fn peak_distance_bins(min_peak_distance_ms: f32, sample_rate: u32) -> usize {
    (f64::from(min_peak_distance_ms) * f64::from(sample_rate) / 1000.0)
        .floor()
        .max(0.0) as usize
}

/// Local maxima of `band` strictly above `threshold`, picked greedily left to
/// right so that consecutive picks are at least `min_distance` bins apart.
pub fn find_peaks(band: &[f32], min_distance: usize, threshold: f32) -> Vec<usize> {
    let mut peaks: Vec<usize> = Vec::new();
    if band.len() < 3 {
        return peaks;
    }

    for (offset, window) in band.windows(3).enumerate() {
        let (left, mid, right) = (window[0], window[1], window[2]);
        if mid > left && mid > right && mid > threshold {
            let idx = offset + 1;
            match peaks.last() {
                Some(&last) if idx - last < min_distance => {}
                _ => peaks.push(idx),
            }
        }
    }

    peaks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unimodal_band_has_one_peak() {
        let band = [1.0, 3.0, 7.0, 12.0, 9.0, 4.0, 2.0];
        assert_eq!(find_peaks(&band, 0, 5.0), vec![3]);
        assert_eq!(find_peaks(&band, 100, 5.0), vec![3]);
    }

    #[test]
    fn oscillating_band_without_spacing() {
        let band = [0.0, 5.0, 0.0, 6.0, 0.0, 2.0, 0.0, 8.0, 1.0];
        assert_eq!(find_peaks(&band, 0, 1.0), vec![1, 3, 5, 7]);
        assert_eq!(find_peaks(&band, 0, 4.0), vec![1, 3, 7]);
    }

    #[test]
    fn spacing_is_measured_from_last_accepted_peak() {
        let band = [0.0, 5.0, 0.0, 6.0, 0.0, 7.0, 0.0, 8.0, 0.0];
        // 3 is too close to 1, 5 is exactly 4 away from 1.
        assert_eq!(find_peaks(&band, 4, 1.0), vec![1, 5]);
    }

    #[test]
    fn threshold_is_strict() {
        let band = [0.0, 5.0, 0.0];
        assert!(find_peaks(&band, 0, 5.0).is_empty());
        assert_eq!(find_peaks(&band, 0, 4.99), vec![1]);
    }

    #[test]
    fn degenerate_bands() {
        assert!(find_peaks(&[], 0, 0.0).is_empty());
        assert!(find_peaks(&[9.0, 1.0], 0, 0.0).is_empty());
        assert!(find_peaks(&[4.0; 16], 0, 0.0).is_empty());
        // plateau is not a strict maximum
        assert!(find_peaks(&[0.0, 3.0, 3.0, 0.0], 0, 0.0).is_empty());
    }

    #[test]
    fn beat_band_bins_at_default_rate() {
        assert_eq!(frequency_to_bin(60.0, 44100, 2048), 2);
        assert_eq!(frequency_to_bin(2000.0, 44100, 2048), 92);
        assert_eq!(frequency_to_bin(100.0, 0, 2048), 0);
    }

    #[test]
    fn distance_in_bins() {
        assert_eq!(peak_distance_bins(350.0, 44100), 15435);
        assert_eq!(peak_distance_bins(100.0, 48000), 4800);
    }
}
