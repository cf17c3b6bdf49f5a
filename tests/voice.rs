//! Voice pipeline integration tests
//!
//! Tests voice components without requiring audio hardware

use sada::lang::LanguageDetector;
use sada::voice::{SAMPLE_RATE, UtteranceDetector, UtteranceState, samples_to_wav};
use std::io::Cursor;

mod common;

/// Generate sine wave audio samples
fn generate_sine_samples(frequency: f32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

/// Generate silence
fn generate_silence(duration_secs: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    vec![0.0; num_samples]
}

#[test]
fn test_utterance_detector_starts_idle() {
    let detector = UtteranceDetector::new();

    assert_eq!(detector.state(), UtteranceState::Idle);
    assert!(!detector.speech_started());
    assert!(detector.samples().is_empty());
}

#[test]
fn test_silence_keeps_detector_idle() {
    let mut detector = UtteranceDetector::new();

    let silence = generate_silence(1.0);
    for chunk in silence.chunks(1600) {
        assert!(!detector.process(chunk));
    }

    assert_eq!(detector.state(), UtteranceState::Idle);
    assert!(detector.samples().is_empty());
}

#[test]
fn test_speech_onset_transitions_to_speaking() {
    let mut detector = UtteranceDetector::new();

    let speech = generate_sine_samples(440.0, 0.5, 0.5);
    detector.process(&speech);

    assert_eq!(detector.state(), UtteranceState::Speaking);
    assert!(detector.speech_started());
    assert_eq!(detector.samples().len(), speech.len());
}

#[test]
fn test_speech_then_silence_completes_utterance() {
    let mut detector = UtteranceDetector::new();

    // Half a second of speech followed by a full second of silence
    let speech = generate_sine_samples(440.0, 0.5, 0.5);
    for chunk in speech.chunks(1600) {
        detector.process(chunk);
    }
    assert_eq!(detector.state(), UtteranceState::Speaking);

    let silence = generate_silence(1.0);
    let mut complete = false;
    for chunk in silence.chunks(1600) {
        if detector.process(chunk) {
            complete = true;
            break;
        }
    }

    assert!(complete);
    assert_eq!(detector.state(), UtteranceState::Complete);
    // Buffer holds the speech plus the trailing silence processed so far
    assert!(detector.samples().len() >= speech.len());
}

#[test]
fn test_brief_pause_does_not_end_utterance() {
    let mut detector = UtteranceDetector::new();

    let speech = generate_sine_samples(440.0, 0.5, 0.5);
    for chunk in speech.chunks(1600) {
        detector.process(chunk);
    }

    // 0.2s pause is below the silence window
    let pause = generate_silence(0.2);
    for chunk in pause.chunks(1600) {
        assert!(!detector.process(chunk));
    }
    assert_eq!(detector.state(), UtteranceState::Speaking);

    // Speech resumes, the counter resets
    detector.process(&generate_sine_samples(440.0, 0.1, 0.5));
    assert_eq!(detector.state(), UtteranceState::Speaking);
}

#[test]
fn test_take_samples_resets_detector() {
    let mut detector = UtteranceDetector::new();

    let speech = generate_sine_samples(440.0, 0.5, 0.5);
    for chunk in speech.chunks(1600) {
        detector.process(chunk);
    }
    for chunk in generate_silence(1.0).chunks(1600) {
        if detector.process(chunk) {
            break;
        }
    }

    let samples = detector.take_samples();
    assert!(!samples.is_empty());

    assert_eq!(detector.state(), UtteranceState::Idle);
    assert!(detector.samples().is_empty());
    assert!(!detector.speech_started());
}

#[test]
fn test_low_amplitude_noise_ignored() {
    let mut detector = UtteranceDetector::new();

    // Well below the energy threshold
    let noise = generate_sine_samples(440.0, 0.5, 0.005);
    for chunk in noise.chunks(1600) {
        assert!(!detector.process(chunk));
    }

    assert_eq!(detector.state(), UtteranceState::Idle);
}

#[test]
fn test_samples_to_wav_header() {
    let samples = generate_sine_samples(440.0, 0.25, 0.5);
    let wav = samples_to_wav(&samples, SAMPLE_RATE).unwrap();

    assert_eq!(&wav[0..4], b"RIFF");
    assert_eq!(&wav[8..12], b"WAVE");
}

#[test]
fn test_samples_to_wav_readable() {
    let samples = generate_sine_samples(440.0, 0.25, 0.5);
    let wav = samples_to_wav(&samples, SAMPLE_RATE).unwrap();

    let reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(reader.len() as usize, samples.len());
}

#[test]
fn test_samples_to_wav_empty() {
    let wav = samples_to_wav(&[], SAMPLE_RATE).unwrap();

    let reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
    assert_eq!(reader.len(), 0);
}

#[test]
fn test_reply_language_routing() {
    let detector = LanguageDetector::new("ur");

    // Latin-script replies get English voice, Arabic-script get Urdu
    assert_eq!(detector.detect("The weather is pleasant today."), "en");
    assert_eq!(detector.detect("آج موسم خوشگوار ہے"), "ur");
    // Unscripted text falls back to the configured default
    assert_eq!(detector.detect("1234 !!!"), "ur");
}
