use log::debug;

use crate::config::AudioParameters;
use crate::error::AcquisitionError;

/// One spectral snapshot. `magnitudes` are in the byte domain [0, 255] and
/// `decibels` carries the same bins in dBFS.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpectrumFrame {
    pub magnitudes: Vec<f32>,
    pub decibels: Vec<f32>,
    pub sample_rate: u32,
    pub fft_size: usize,
}

/// A running capture that can be polled for its most recent spectrum.
pub trait SpectrumCapture {
    /// Latest available frame. Must return immediately; `None` once released.
    fn latest_frame(&mut self) -> Option<SpectrumFrame>;

    /// Pushes gain, pre-filter and smoothing settings to the capture chain.
    fn configure(&mut self, params: &AudioParameters);

    /// Stops capturing. Safe to call more than once.
    fn release(&mut self);
}

/// Opens captures. Acquisition may fail (no device, permission denied).
pub trait CaptureProvider {
    fn acquire(
        &mut self,
        params: &AudioParameters,
    ) -> Result<Box<dyn SpectrumCapture>, AcquisitionError>;
}

/// Owns an acquired capture and releases it on every exit path.
pub struct CaptureGuard {
    inner: Box<dyn SpectrumCapture>,
}

impl CaptureGuard {
    pub fn new(inner: Box<dyn SpectrumCapture>) -> Self {
        Self { inner }
    }

    pub fn latest_frame(&mut self) -> Option<SpectrumFrame> {
        self.inner.latest_frame()
    }

    pub fn configure(&mut self, params: &AudioParameters) {
        self.inner.configure(params);
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        debug!("Releasing capture");
        self.inner.release();
    }
}
