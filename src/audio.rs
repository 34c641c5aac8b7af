pub mod analyzer;
pub mod audio_stream;
pub mod capture;

pub use analyzer::SpectralAnalyser;
pub use audio_stream::{AudioStream, CpalCaptureProvider};
pub use capture::{CaptureGuard, CaptureProvider, SpectrumCapture, SpectrumFrame};
