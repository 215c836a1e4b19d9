//! Command-line arguments

use clap::Parser;
use std::path::PathBuf;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "fountain")]
#[command(about = "Headless audio-reactive particle fountain", long_about = None)]
pub struct Args {
    /// TOML configuration file (built-in defaults if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the effective configuration to FILE and exit
    #[arg(long, value_name = "FILE")]
    pub write_config: Option<PathBuf>,

    /// Simulated duration
    #[arg(long, value_name = "SECONDS", default_value = "10")]
    pub seconds: f32,

    /// Frame rate of the simulated display
    #[arg(long, value_name = "FPS", default_value = "60")]
    pub fps: f32,

    /// Sample rate of the synthesized audio
    #[arg(long, value_name = "HZ", default_value = "44100")]
    pub sample_rate: u32,

    /// Samples per spectrum (power of two)
    #[arg(long, value_name = "SAMPLES", default_value = "1024")]
    pub fft_size: usize,

    /// Tempo of the synthesized beat
    #[arg(long, value_name = "BPM", default_value = "120")]
    pub bpm: f32,

    /// Seconds per preset before starting the next one (0 keeps one preset)
    #[arg(long, value_name = "SECONDS", default_value = "0")]
    pub track_length: f32,

    /// Seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Args {
    /// FFT size rounded up to a usable power of two
    pub fn fft_size(&self) -> usize {
        self.fft_size.max(64).next_power_of_two()
    }

    /// Frame delta in seconds
    pub fn frame_dt(&self) -> f32 {
        1.0 / self.fps.max(1.0)
    }
}
