use crate::consts;

/// Tempo derived from the beat history. The default value (all zeros) means
/// "not enough beats yet".
#[derive(Clone, Copy, Default, Debug, PartialEq)]
pub struct TempoEstimate {
    /// Octave-corrected tempo, in [60, 180] when present.
    pub bpm: u32,
    /// Tempo straight from the mean interval, before octave correction.
    pub raw_bpm: u32,
    pub avg_interval_ms: f64,
}

impl TempoEstimate {
    pub fn is_known(&self) -> bool {
        self.bpm > 0
    }
}

/// Folds a tempo by factors of two into [MIN_BPM, MAX_BPM].
fn octave_correct(mut bpm: f64) -> f64 {
    while bpm > consts::MAX_BPM {
        bpm /= 2.0;
    }
    while bpm < consts::MIN_BPM {
        bpm *= 2.0;
    }
    bpm
}

/// Estimates tempo from increasing beat timestamps in milliseconds.
pub fn estimate_tempo<'a, I>(timestamps: I) -> TempoEstimate
where
    I: IntoIterator<Item = &'a f64>,
{
    let mut iter = timestamps.into_iter();
    let Some(&first) = iter.next() else {
        return TempoEstimate::default();
    };

    let mut prev = first;
    let mut total = 0.0;
    let mut count = 0usize;
    for &t in iter {
        total += t - prev;
        prev = t;
        count += 1;
    }
    if count == 0 {
        return TempoEstimate::default();
    }

    let avg_interval_ms = total / count as f64;
    if !avg_interval_ms.is_finite() || avg_interval_ms <= 0.0 {
        return TempoEstimate::default();
    }

    let rate = 60_000.0 / avg_interval_ms;
    if !rate.is_finite() {
        return TempoEstimate::default();
    }
    let raw_bpm = rate.round();

    // Gaps over two minutes round to zero; fold the exact rate instead.
    let seed = if raw_bpm > 0.0 { raw_bpm } else { rate };
    let bpm = octave_correct(seed).round();

    TempoEstimate {
        bpm: bpm as u32,
        raw_bpm: raw_bpm as u32,
        avg_interval_ms,
    }
}
