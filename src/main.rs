use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use dialoguer::Input;
use tracing_subscriber::EnvFilter;

use sada::voice::{
    AudioCapture, AudioPlayback, GoogleSpeech, GoogleTranslateTts, MicSource, Synthesizer,
};
use sada::{Config, ConversationOrchestrator, Error, Gemini, LanguageDetector, Role};

/// Sada - voice and chat assistant for Urdu and English
#[derive(Parser)]
#[command(name = "sada", version, about)]
struct Cli {
    /// Generation API key (or set in ~/.config/sada/config.toml)
    #[arg(long, env = "SADA_API_KEY")]
    api_key: Option<String>,

    /// Start in voice mode instead of text mode
    #[arg(long)]
    voice: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable voice features (for headless machines without audio hardware)
    #[arg(long, env = "SADA_DISABLE_VOICE")]
    disable_voice: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
    /// Test TTS output
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
        /// Two-letter language code
        #[arg(short, long, default_value = "en")]
        language: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn,sada=info",
        1 => "info,sada=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestMic { duration } => test_mic(duration).await,
            Command::TestSpeaker => test_speaker().await,
            Command::TestTts { text, language } => test_tts(&text, &language).await,
        };
    }

    let config = Config::load_with_options(cli.disable_voice)?;
    tracing::debug!(?config, "loaded configuration");

    let mut orchestrator = ConversationOrchestrator::new(
        Box::new(Gemini::new(config.model.clone())),
        Box::new(GoogleSpeech::new()),
        Box::new(GoogleTranslateTts::new()),
        LanguageDetector::new(config.voice.default_tts_language.clone()),
        config.voice.stt_language.clone(),
    );

    // Credential: CLI flag wins, then env/file
    if let Some(key) = cli.api_key.or(config.api_key.clone()) {
        orchestrator.set_credential(key);
    }

    if !orchestrator.is_ready() {
        let key: String = Input::new()
            .with_prompt("Enter your generation API key")
            .interact_text()?;
        orchestrator.set_credential(key);
    }

    if !orchestrator.is_ready() {
        anyhow::bail!("an API key is required to start a session");
    }

    let voice_available = config.voice.enabled;
    let mut voice_mode = cli.voice && voice_available;

    println!("Sada ready. Commands: /voice, /text, /clear, /quit");
    repl(&mut orchestrator, &config, &mut voice_mode, voice_available).await
}

/// Interactive conversation loop
///
/// Reads explicit return values from the orchestrator and renders them;
/// mode toggle and clear-history live here, not in the core.
#[allow(clippy::future_not_send)]
async fn repl(
    orchestrator: &mut ConversationOrchestrator,
    config: &Config,
    voice_mode: &mut bool,
    voice_available: bool,
) -> anyhow::Result<()> {
    let mut mic: Option<MicSource> = None;
    let mut playback: Option<AudioPlayback> = None;

    loop {
        if *voice_mode {
            println!("\n🎙️  Listening... (speak now, /text to switch back)");

            if mic.is_none() {
                match MicSource::new(config.voice.wait_timeout, config.voice.phrase_limit) {
                    Ok(source) => mic = Some(source),
                    Err(e) => {
                        println!("Microphone not found: {e}. Switching to text mode.");
                        *voice_mode = false;
                        continue;
                    }
                }
            }

            let Some(source) = mic.as_mut() else {
                continue;
            };
            match orchestrator.submit_voice_turn(source).await {
                Ok(_) => {
                    if let Some(text) = orchestrator.last_user_text() {
                        println!("You said: {text}");
                    }
                    render_last_reply(orchestrator);
                    play_pending(orchestrator, &mut playback).await;
                }
                Err(Error::CaptureTimeout) => {
                    println!("Listening timed out. Please try again.");
                }
                Err(Error::Unintelligible) => {
                    println!("Sorry, I could not understand the audio.");
                }
                Err(e) => println!("Voice turn failed: {e}"),
            }

            // Give the user a chance to switch modes between utterances
            let next: String = Input::new()
                .with_prompt("Press Enter to speak again, or type a command")
                .allow_empty(true)
                .interact_text()?;
            if handle_command(&next, orchestrator, voice_mode, voice_available)? {
                break;
            }
        } else {
            let line: String = Input::new().with_prompt("You").interact_text()?;
            if handle_command(&line, orchestrator, voice_mode, voice_available)? {
                break;
            }
            if line.starts_with('/') || line.trim().is_empty() {
                continue;
            }

            println!("Assistant is thinking...");
            match orchestrator.submit_text_turn(&line).await {
                Ok(_) => render_last_reply(orchestrator),
                Err(e) => println!("Turn failed: {e}"),
            }
        }
    }

    Ok(())
}

/// Handle a slash command; returns true when the session should end
fn handle_command(
    line: &str,
    orchestrator: &mut ConversationOrchestrator,
    voice_mode: &mut bool,
    voice_available: bool,
) -> anyhow::Result<bool> {
    match line.trim() {
        "/quit" | "/exit" => return Ok(true),
        "/clear" => {
            orchestrator.clear_history();
            println!("History cleared.");
        }
        "/voice" => {
            if voice_available {
                *voice_mode = true;
            } else {
                println!("Voice is disabled in this session.");
            }
        }
        "/text" => *voice_mode = false,
        _ => {}
    }
    Ok(false)
}

/// Print the newest assistant turn
fn render_last_reply(orchestrator: &ConversationOrchestrator) {
    if let Some(turn) = orchestrator
        .history()
        .iter()
        .rev()
        .find(|t| t.role == Role::Assistant)
    {
        println!("Assistant: {}", turn.text);
    }
}

/// Play and consume the pending artifact, if any
///
/// The artifact is deleted on consumption regardless of whether playback
/// itself succeeds.
async fn play_pending(
    orchestrator: &mut ConversationOrchestrator,
    playback: &mut Option<AudioPlayback>,
) {
    let Some(artifact) = orchestrator.take_pending_audio() else {
        return;
    };

    let bytes = match artifact.into_bytes() {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "could not read synthesized audio");
            return;
        }
    };

    if playback.is_none() {
        match AudioPlayback::new() {
            Ok(p) => *playback = Some(p),
            Err(e) => {
                tracing::warn!(error = %e, "no speaker available, skipping playback");
                return;
            }
        }
    }

    if let Some(p) = playback.as_mut() {
        if let Err(e) = p.play_mp3(&bytes).await {
            tracing::warn!(error = %e, "playback failed");
        }
    }
}

/// Test microphone input
#[allow(clippy::future_not_send)]
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut capture = AudioCapture::new()?;
    capture.start()?;

    let sample_rate = capture.sample_rate();
    println!("Sample rate: {sample_rate} Hz");
    println!("---");

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = capture.peek_buffer();
        let energy = calculate_rms(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        // Visual meter
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "█".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!(
            "[{:2}s] RMS: {:.4} | Peak: {:.4} | [{}]",
            i + 1,
            energy,
            peak,
            meter
        );

        // Clear buffer each second
        capture.clear_buffer();
    }

    capture.stop();

    println!("\n---");
    println!("If you saw movement in the meter, your mic is working!");
    println!("If RMS stayed near 0, check:");
    println!("  1. Is your mic plugged in?");
    println!("  2. Run: pactl info | grep 'Default Source'");
    println!("  3. Run: arecord -l (to list devices)");

    Ok(())
}

/// Calculate RMS energy
#[allow(clippy::cast_precision_loss)]
fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Test speaker output with a sine wave
async fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let mut playback = AudioPlayback::new()?;

    // Generate 2 seconds of 440Hz sine wave at 24kHz sample rate
    let sample_rate = 24000_i32;
    let frequency = 440.0_f32;
    let duration_secs = 2.0_f32;
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let num_samples = (sample_rate as f32 * duration_secs) as usize;

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3 // 30% volume
        })
        .collect();

    println!("Playing {} samples at {} Hz...", samples.len(), sample_rate);

    playback.play(samples).await?;

    println!("\n---");
    println!("If you heard the tone, your speakers are working!");

    Ok(())
}

/// Test TTS output
async fn test_tts(text: &str, language: &str) -> anyhow::Result<()> {
    println!("Testing TTS with text: \"{text}\" ({language})\n");

    let tts = GoogleTranslateTts::new();

    println!("Synthesizing speech...");
    let mp3_data = tts.synthesize(text, language).await?;
    println!("Got {} bytes of audio data", mp3_data.len());

    println!("Playing audio...");
    let mut playback = AudioPlayback::new()?;
    playback.play_mp3(&mp3_data).await?;

    println!("\n---");
    println!("If you heard the speech, TTS is working!");

    Ok(())
}
