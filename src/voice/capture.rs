//! Audio capture from microphone
//!
//! Capture runs continuously into a shared buffer; utterance endpointing
//! is energy-based. A listen call is bounded twice over: speech must
//! begin within the wait window, and an utterance is cut off at the
//! phrase limit.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, StreamConfig};

use crate::{Error, Result};

/// Sample rate for audio capture (16kHz for speech)
pub const SAMPLE_RATE: u32 = 16000;

/// Minimum audio energy threshold to consider speech
const ENERGY_THRESHOLD: f32 = 0.03;

/// Minimum duration of speech for a valid utterance (samples at 16kHz)
const MIN_SPEECH_SAMPLES: usize = 4800; // 0.3 seconds

/// Silence duration marking end of utterance (in samples)
const SILENCE_SAMPLES: usize = 8000; // 0.5 seconds

/// How often the listen loop drains the capture buffer
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Source of one captured utterance, as WAV bytes
///
/// Seam between the orchestrator and the microphone so the voice path
/// can be exercised without audio hardware.
#[async_trait(?Send)]
pub trait SpeechSource {
    /// Block until one utterance is captured, or the wait window expires
    ///
    /// # Errors
    ///
    /// Returns `CaptureTimeout` if no speech begins in time,
    /// `DeviceUnavailable` if the microphone cannot be opened
    async fn listen(&mut self) -> Result<Vec<u8>>;
}

/// Endpointing state for a single utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtteranceState {
    /// Waiting for speech to begin
    Idle,
    /// Speech in progress, accumulating
    Speaking,
    /// Utterance complete (speech followed by sustained silence)
    Complete,
}

/// Segments one utterance out of a continuous sample stream
#[derive(Debug)]
pub struct UtteranceDetector {
    state: UtteranceState,
    buffer: Vec<f32>,
    silence_counter: usize,
}

impl UtteranceDetector {
    /// Create a detector in the idle state
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: UtteranceState::Idle,
            buffer: Vec::new(),
            silence_counter: 0,
        }
    }

    /// Feed captured samples; returns true once the utterance is complete
    pub fn process(&mut self, samples: &[f32]) -> bool {
        let energy = calculate_energy(samples);
        let is_speech = energy > ENERGY_THRESHOLD;

        match self.state {
            UtteranceState::Idle => {
                if is_speech {
                    self.state = UtteranceState::Speaking;
                    self.buffer.clear();
                    self.buffer.extend_from_slice(samples);
                    self.silence_counter = 0;
                    tracing::trace!(energy, "speech onset");
                }
            }
            UtteranceState::Speaking => {
                self.buffer.extend_from_slice(samples);

                if is_speech {
                    self.silence_counter = 0;
                } else {
                    self.silence_counter += samples.len();
                }

                if self.silence_counter > SILENCE_SAMPLES && self.buffer.len() > MIN_SPEECH_SAMPLES
                {
                    tracing::debug!(samples = self.buffer.len(), "utterance complete");
                    self.state = UtteranceState::Complete;
                    return true;
                }
            }
            UtteranceState::Complete => {}
        }

        self.state == UtteranceState::Complete
    }

    /// Whether any speech has started
    #[must_use]
    pub fn speech_started(&self) -> bool {
        self.state != UtteranceState::Idle
    }

    /// Current endpointing state
    #[must_use]
    pub const fn state(&self) -> UtteranceState {
        self.state
    }

    /// Accumulated utterance samples
    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.buffer
    }

    /// Take the utterance samples, resetting the detector
    pub fn take_samples(&mut self) -> Vec<f32> {
        let samples = std::mem::take(&mut self.buffer);
        self.reset();
        samples
    }

    /// Reset to idle
    pub fn reset(&mut self) {
        self.state = UtteranceState::Idle;
        self.buffer.clear();
        self.silence_counter = 0;
    }
}

impl Default for UtteranceDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Captures audio from the default input device
pub struct AudioCapture {
    #[allow(dead_code)]
    device: Device,
    config: StreamConfig,
    buffer: Arc<Mutex<Vec<f32>>>,
    stream: Option<Stream>,
}

impl AudioCapture {
    /// Create a new audio capture instance
    ///
    /// # Errors
    ///
    /// Returns `DeviceUnavailable` if no microphone can be opened
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| Error::DeviceUnavailable("no input device".to_string()))?;

        let supported_config = device
            .supported_input_configs()
            .map_err(|e| Error::DeviceUnavailable(e.to_string()))?
            .find(|c| {
                c.channels() == 1
                    && c.min_sample_rate() <= SampleRate(SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(SAMPLE_RATE)
            })
            .ok_or_else(|| {
                Error::DeviceUnavailable("no suitable input config found".to_string())
            })?;

        let config = supported_config
            .with_sample_rate(SampleRate(SAMPLE_RATE))
            .config();

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = SAMPLE_RATE,
            channels = config.channels,
            "audio capture initialized"
        );

        Ok(Self {
            device,
            config,
            buffer: Arc::new(Mutex::new(Vec::new())),
            stream: None,
        })
    }

    /// Start capturing audio
    ///
    /// # Errors
    ///
    /// Returns error if the input stream cannot be built
    pub fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let buffer = Arc::clone(&self.buffer);
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| Error::DeviceUnavailable("no input device".to_string()))?;

        let config = self.config.clone();

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend_from_slice(data);
                    }
                },
                |err| {
                    tracing::error!(error = %err, "audio capture error");
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;
        self.stream = Some(stream);

        tracing::debug!("audio capture started");
        Ok(())
    }

    /// Stop capturing audio
    pub fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
            tracing::debug!("audio capture stopped");
        }
    }

    /// Get captured audio buffer and clear it
    #[must_use]
    pub fn take_buffer(&self) -> Vec<f32> {
        self.buffer
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default()
    }

    /// Get captured audio buffer without clearing
    #[must_use]
    pub fn peek_buffer(&self) -> Vec<f32> {
        self.buffer
            .lock()
            .map(|buf| buf.clone())
            .unwrap_or_default()
    }

    /// Clear the audio buffer
    pub fn clear_buffer(&self) {
        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }
    }

    /// Check if currently capturing
    #[must_use]
    pub const fn is_capturing(&self) -> bool {
        self.stream.is_some()
    }

    /// Get the sample rate
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }
}

/// Microphone-backed speech source with bounded listening
///
/// Speech must begin within `wait_timeout`; once it begins, the
/// utterance ends on sustained silence or at `phrase_limit`.
pub struct MicSource {
    capture: AudioCapture,
    wait_timeout: Duration,
    phrase_limit: Duration,
}

impl MicSource {
    /// Open the default microphone
    ///
    /// # Errors
    ///
    /// Returns `DeviceUnavailable` if no microphone can be opened
    pub fn new(wait_timeout: Duration, phrase_limit: Duration) -> Result<Self> {
        Ok(Self {
            capture: AudioCapture::new()?,
            wait_timeout,
            phrase_limit,
        })
    }
}

#[async_trait(?Send)]
impl SpeechSource for MicSource {
    async fn listen(&mut self) -> Result<Vec<u8>> {
        let mut detector = UtteranceDetector::new();
        self.capture.clear_buffer();
        self.capture.start()?;

        let started = std::time::Instant::now();
        let mut speech_onset: Option<std::time::Instant> = None;

        let samples = loop {
            tokio::time::sleep(POLL_INTERVAL).await;

            let chunk = self.capture.take_buffer();
            let complete = detector.process(&chunk);

            if speech_onset.is_none() && detector.speech_started() {
                speech_onset = Some(std::time::Instant::now());
                tracing::debug!("listening: speech started");
            }

            if complete {
                break detector.take_samples();
            }

            match speech_onset {
                None => {
                    if started.elapsed() > self.wait_timeout {
                        self.capture.stop();
                        tracing::warn!(
                            wait_secs = self.wait_timeout.as_secs(),
                            "listen timed out before speech"
                        );
                        return Err(Error::CaptureTimeout);
                    }
                }
                Some(onset) => {
                    // Hard cap: cut the utterance at the phrase limit
                    if onset.elapsed() > self.phrase_limit {
                        tracing::debug!(
                            limit_secs = self.phrase_limit.as_secs(),
                            "phrase limit reached"
                        );
                        break detector.take_samples();
                    }
                }
            }
        };

        self.capture.stop();

        if samples.len() < MIN_SPEECH_SAMPLES {
            return Err(Error::Unintelligible);
        }

        samples_to_wav(&samples, SAMPLE_RATE)
    }
}

/// Convert f32 samples to WAV bytes for STT APIs
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;

        for &sample in samples {
            // Convert f32 [-1.0, 1.0] to i16
            #[allow(clippy::cast_possible_truncation)]
            let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer
                .write_sample(sample_i16)
                .map_err(|e| Error::Audio(e.to_string()))?;
        }

        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}

/// Calculate RMS energy of audio samples
#[allow(clippy::cast_precision_loss)]
fn calculate_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_calculation() {
        let silence = vec![0.0f32; 100];
        assert!(calculate_energy(&silence) < 0.001);

        let loud = vec![0.5f32; 100];
        assert!(calculate_energy(&loud) > 0.4);
    }

    #[test]
    fn test_detector_states() {
        let mut detector = UtteranceDetector::new();
        assert_eq!(detector.state(), UtteranceState::Idle);

        // Silence keeps it idle
        assert!(!detector.process(&vec![0.0f32; 1600]));
        assert_eq!(detector.state(), UtteranceState::Idle);

        // Speech starts accumulation
        detector.process(&vec![0.3f32; 8000]);
        assert_eq!(detector.state(), UtteranceState::Speaking);
        assert!(detector.speech_started());

        // Sustained silence completes the utterance
        assert!(detector.process(&vec![0.0f32; 9000]));
        assert_eq!(detector.state(), UtteranceState::Complete);
    }

    #[test]
    fn test_take_samples_resets() {
        let mut detector = UtteranceDetector::new();
        detector.process(&vec![0.3f32; 8000]);
        detector.process(&vec![0.0f32; 9000]);

        let samples = detector.take_samples();
        assert_eq!(samples.len(), 17000);
        assert_eq!(detector.state(), UtteranceState::Idle);
        assert!(detector.samples().is_empty());
    }
}
