pub mod amplitude;
pub mod gate;
pub mod peaks;
pub mod spectrum;
pub mod tempo;

pub use amplitude::{AmplitudeReading, process_amplitude, soft_clip};
pub use gate::{BeatEvent, BeatGate, BeatHistory};
pub use peaks::{find_peaks, frequency_to_bin, peak_distance_bins};
pub use spectrum::normalize_spectrum;
pub use tempo::{TempoEstimate, estimate_tempo};
