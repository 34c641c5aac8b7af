use crate::audio::analyzer::SpectralAnalyser;
use crate::audio::capture::{CaptureProvider, SpectrumCapture, SpectrumFrame};
use crate::config::{AnalyserConfig, AudioParameters};
use crate::consts;
use crate::error::AcquisitionError;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat};
use log::{error, info};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub struct AudioStream {
    stream: Option<cpal::Stream>,
    analyser: Arc<Mutex<SpectralAnalyser>>,
}

impl AudioStream {
    pub fn new(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        sample_format: SampleFormat,
        analyser: Arc<Mutex<SpectralAnalyser>>,
    ) -> Result<Self, AcquisitionError> {
        let channels = usize::from(config.channels.max(1));
        let stream = match sample_format {
            cpal::SampleFormat::F32 => build_stream::<f32>(device, config, channels, analyser.clone())?,
            cpal::SampleFormat::I16 => build_stream::<i16>(device, config, channels, analyser.clone())?,
            cpal::SampleFormat::U16 => build_stream::<u16>(device, config, channels, analyser.clone())?,
            other => return Err(AcquisitionError::UnsupportedFormat(format!("{other:?}"))),
        };

        stream
            .play()
            .map_err(|err| AcquisitionError::Denied(err.to_string()))?;

        Ok(Self {
            stream: Some(stream),
            analyser,
        })
    }
}

impl SpectrumCapture for AudioStream {
    fn latest_frame(&mut self) -> Option<SpectrumFrame> {
        self.stream.as_ref()?;
        Some(lock_analyser(&self.analyser).frequency_data())
    }

    fn configure(&mut self, params: &AudioParameters) {
        lock_analyser(&self.analyser).configure(params);
    }

    fn release(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(err) = stream.pause() {
                error!("Failed to pause audio stream: {err}");
            }
            info!("Audio stream released");
        }
    }
}

impl Drop for AudioStream {
    fn drop(&mut self) {
        self.release();
    }
}

/// A panic on the audio thread must not take the UI down with it.
fn lock_analyser(analyser: &Mutex<SpectralAnalyser>) -> MutexGuard<'_, SpectralAnalyser> {
    analyser.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Names of the available input devices and the index of the host default.
pub fn input_devices() -> (Vec<String>, usize) {
    let host = cpal::default_host();

    let devices: Vec<String> = host
        .input_devices()
        .ok()
        .map(|iter| iter.filter_map(|d| d.name().ok()).collect())
        .unwrap_or_default();

    let default_device_name = host.default_input_device().and_then(|d| d.name().ok());

    let default_idx = if let Some(ref default_name) = default_device_name {
        devices
            .iter()
            .position(|name| name == default_name)
            .unwrap_or(0)
    } else {
        0
    };

    (devices, default_idx)
}

/// Opens cpal input devices by name, falling back to the host default.
pub struct CpalCaptureProvider {
    device_name: Option<String>,
    config: AnalyserConfig,
}

impl CpalCaptureProvider {
    pub fn new(device_name: Option<String>, config: AnalyserConfig) -> Self {
        Self {
            device_name,
            config,
        }
    }

    pub fn set_device(&mut self, device_name: Option<String>) {
        self.device_name = device_name;
    }

    fn find_device(&self, host: &cpal::Host) -> Result<cpal::Device, AcquisitionError> {
        match &self.device_name {
            Some(wanted) => host
                .input_devices()
                .map_err(|err| AcquisitionError::Denied(err.to_string()))?
                .find(|d| d.name().ok().as_ref() == Some(wanted))
                .ok_or(AcquisitionError::NoDevice),
            None => host.default_input_device().ok_or(AcquisitionError::NoDevice),
        }
    }
}

impl CaptureProvider for CpalCaptureProvider {
    fn acquire(
        &mut self,
        params: &AudioParameters,
    ) -> Result<Box<dyn SpectrumCapture>, AcquisitionError> {
        let host = cpal::default_host();
        let device = self.find_device(&host)?;
        let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());

        let supported_config = device
            .default_input_config()
            .map_err(|err| AcquisitionError::Denied(err.to_string()))?;
        let sample_format = supported_config.sample_format();
        let stream_config: cpal::StreamConfig = supported_config.into();
        let sample_rate = match stream_config.sample_rate.0 {
            0 => consts::SAMPLE_RATE,
            rate => rate,
        };

        let analyser = Arc::new(Mutex::new(SpectralAnalyser::new(
            sample_rate,
            self.config.clone(),
            params,
        )));
        let stream = AudioStream::new(&device, &stream_config, sample_format, analyser)?;

        info!(
            "Capturing from '{device_name}' ({} ch @ {sample_rate} Hz, {sample_format:?})",
            stream_config.channels
        );

        Ok(Box::new(stream))
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    analyser: Arc<Mutex<SpectralAnalyser>>,
) -> Result<cpal::Stream, anyhow::Error>
where
    T: Sample + FromSample<f32> + cpal::SizedSample,
    f32: FromSample<T>,
{
    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            // Downmix interleaved frames to mono
            let samples: Vec<f32> = data
                .chunks(channels)
                .map(|frame| {
                    frame.iter().map(|&s| s.to_sample::<f32>()).sum::<f32>() / frame.len() as f32
                })
                .collect();
            lock_analyser(&analyser).add_samples(&samples);
        },
        |err| error!("Stream error: {err}"),
        None,
    )?;

    Ok(stream)
}
