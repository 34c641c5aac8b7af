use crate::beat::peaks::frequency_to_bin;
use crate::consts;

/// Remaps a decibel frame (linear bins) onto `band_count` log-spaced bands in
/// [0, 1] for the renderer.
///
/// Band frequencies are looked up as `floor(freq * bins / sample_rate)`, so the
/// drawn range is stretched over the lower half of the frame.
///
/// `prev` is the previous output of this function; when it has the same
/// length each band is smoothed against its own previous value.
pub fn normalize_spectrum(
    decibels: &[f32],
    sample_rate: u32,
    band_count: usize,
    prev: Option<&[f32]>,
) -> Vec<f32> {
    let prev = prev.filter(|p| p.len() == band_count);
    let bins = decibels.len();
    let span = consts::SPECTRUM_MAX_HZ / consts::SPECTRUM_MIN_HZ;
    let db_range = consts::SPECTRUM_MAX_DB - consts::SPECTRUM_MIN_DB;

    (0..band_count)
        .map(|i| {
            let freq = consts::SPECTRUM_MIN_HZ * span.powf(i as f32 / band_count as f32);
            let bin = frequency_to_bin(freq, sample_rate, bins);

            let db = match decibels.get(bin) {
                Some(db) if !db.is_nan() => *db,
                _ => consts::SPECTRUM_MIN_DB,
            };
            let level = (db.clamp(consts::SPECTRUM_MIN_DB, consts::SPECTRUM_MAX_DB)
                - consts::SPECTRUM_MIN_DB)
                / db_range;
            let mut value = level.powf(consts::SPECTRUM_COMPRESSION);

            if let Some(prev) = prev {
                value = consts::SPECTRUM_SMOOTHING * prev[i]
                    + (1.0 - consts::SPECTRUM_SMOOTHING) * value;
            }

            if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn length_follows_band_count() {
        let frame = vec![-50.0; 1024];
        assert_eq!(normalize_spectrum(&frame, 44100, 64, None).len(), 64);
        assert_eq!(normalize_spectrum(&frame, 44100, 1024, None).len(), 1024);
        assert_eq!(normalize_spectrum(&[], 44100, 16, None), vec![0.0; 16]);
        assert!(normalize_spectrum(&frame, 44100, 0, None).is_empty());
    }

    #[test]
    fn decibel_window_and_compression() {
        let loud = vec![-10.0; 1024];
        assert!(normalize_spectrum(&loud, 44100, 32, None).iter().all(|&v| v == 1.0));

        let silent = vec![f32::NEG_INFINITY; 1024];
        assert!(normalize_spectrum(&silent, 44100, 32, None).iter().all(|&v| v == 0.0));

        // -60 dB sits halfway through the window: 0.5^1.5
        let mid = vec![-60.0; 1024];
        let out = normalize_spectrum(&mid, 44100, 8, None);
        assert!(out.iter().all(|&v| (v - 0.5f32.powf(1.5)).abs() < 1e-5));
    }

    #[test]
    fn smoothing_uses_previous_output_band() {
        let loud = vec![-30.0; 1024];
        let prev = vec![0.0; 4];
        let out = normalize_spectrum(&loud, 44100, 4, Some(&prev));
        assert!(out.iter().all(|&v| (v - 0.3).abs() < 1e-6));

        let again = normalize_spectrum(&loud, 44100, 4, Some(&out));
        assert!(again.iter().all(|&v| (v - 0.51).abs() < 1e-6));
    }

    #[test]
    fn bands_index_by_bin_count() {
        // band 1 of 2 sits at ~632 Hz, read from bin 14 of 1024 at 44.1kHz
        let mut frame = vec![-90.0; 1024];
        frame[14] = -30.0;
        assert_eq!(normalize_spectrum(&frame, 44100, 2, None), vec![0.0, 1.0]);

        frame[14] = -90.0;
        frame[29] = -30.0;
        assert_eq!(normalize_spectrum(&frame, 44100, 2, None), vec![0.0, 0.0]);
    }

    #[test]
    fn mismatched_previous_output_is_ignored() {
        let loud = vec![-30.0; 1024];
        let prev = vec![0.0; 3];
        let out = normalize_spectrum(&loud, 44100, 4, Some(&prev));
        assert_eq!(out, vec![1.0; 4]);
    }

    proptest! {
        #[test]
        fn output_is_bounded(
            frame in prop::collection::vec(-500.0f32..500.0, 0..2048),
            bands in 0usize..256,
            seed in 0.0f32..1.0,
        ) {
            let prev = vec![seed; bands];
            let out = normalize_spectrum(&frame, 48000, bands, Some(&prev));
            prop_assert_eq!(out.len(), bands);
            prop_assert!(out.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }
}
