//! JARVIS - Text and Voice Assistant
//!
//! Reads commands from stdin (and optionally the microphone) and answers in
//! the terminal and through the speech engine.

use anyhow::{Context, Result};
use clap::Parser;
use jarvis::asr;
use jarvis::config::Config;
use jarvis::coordinator::Coordinator;
use jarvis::core::{create_adapter, AiFallback};
use jarvis::launcher::{Launcher, SystemLauncher};
use jarvis::lookup::{InfoLookup, WebLookup};
use jarvis::memory::MemoryStore;
use jarvis::monitor::{run_monitor, SystemMonitor};
use jarvis::router::Router;
use jarvis::transcript::{ConsoleTranscript, Transcript};
use jarvis::tts;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Memory file, overriding the config
    #[arg(short, long)]
    memory: Option<PathBuf>,

    /// Disable speech output
    #[arg(long)]
    text_only: bool,

    /// Start with voice control on
    #[arg(long)]
    voice: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Logs go to stderr so the transcript owns stdout
    let level = if args.verbose {
        "debug".to_string()
    } else {
        config.log_level.to_lowercase()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("🤖 JARVIS v{} starting...", env!("CARGO_PKG_VERSION"));

    if args.text_only {
        config.tts_engine = "none".to_string();
    }
    let memory_path = args.memory.clone().unwrap_or_else(|| config.memory_path());
    let memory = MemoryStore::load(memory_path);

    let adapter = create_adapter(&config).context("Failed to create AI adapter")?;
    let mut ai = AiFallback::new(adapter, config.ai_failure_threshold);
    if ai.probe().await {
        info!("🧠 AI provider online: {}", ai.provider().unwrap_or("unknown"));
    } else {
        warn!("🧠 AI offline, running in limited capacity");
    }

    let launcher: Arc<dyn Launcher> = Arc::new(SystemLauncher::new(config.applications.clone()));
    let lookup: Arc<dyn InfoLookup> = Arc::new(WebLookup::new(config.weather_api_key.clone())?);
    let monitor = Arc::new(SystemMonitor::new());

    let router = Router::new(
        &config,
        memory,
        launcher.clone(),
        ai,
        lookup,
        monitor.clone(),
    )?;

    let tts = tts::create_engine(&config).await;
    let listener = asr::create_listener(&config).await;
    let transcript: Arc<dyn Transcript> = Arc::new(ConsoleTranscript::new(
        config.assistant_name.clone(),
        config.theme,
        std::io::stdout().is_terminal(),
    ));

    let coordinator = Coordinator::new(&config, router, tts, listener, transcript, launcher);
    let handle = coordinator.handle();

    // Resource monitor
    let monitor_handle = handle.clone();
    tokio::spawn(run_monitor(
        monitor,
        Duration::from_secs(config.monitor_interval_secs),
        config.load_warning_percent,
        move |warning| monitor_handle.post_warning(warning),
    ));

    // Typed input
    let input_handle = handle.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if !input_handle.submit_text(line) {
                        break;
                    }
                }
                Ok(None) => {
                    info!("Input closed");
                    input_handle.shutdown();
                    break;
                }
                Err(e) => {
                    warn!("Failed to read input: {}", e);
                    input_handle.shutdown();
                    break;
                }
            }
        }
    });

    if args.voice {
        let text = match handle.enable_voice() {
            jarvis::session::VoiceToggle::Activated => "Voice control activated. Listening...",
            _ => "Microphone not available",
        };
        handle.notify(text);
    }

    coordinator.run().await
}
