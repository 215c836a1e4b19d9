//! Fountain - headless host
//!
//! Synthesizes a track, feeds its spectrum to the visualiser at the audio
//! block rate and ticks the simulation at the display rate, logging what the
//! fountain does.

mod audio;
mod cli;
mod logging_setup;

use anyhow::{Context, Result};
use audio::{SignalGenerator, SpectrumAnalyzer};
use clap::Parser;
use cli::Args;
use fountain_core::{FountainConfig, Visualizer};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct RunStats {
    frames: u64,
    audio_updates: u64,
    emitted: usize,
    expired: usize,
    collisions: usize,
    peak_active: usize,
    failed_emissions: u64,
}

fn load_config(args: &Args) -> Result<FountainConfig> {
    let mut config = match &args.config {
        Some(path) => FountainConfig::load(path)
            .with_context(|| format!("Failed to load config {:?}", path))?,
        None => FountainConfig::default(),
    };
    if let Some(level) = &args.log_level {
        config.log.level = level.clone();
    }
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    if let Some(path) = &args.write_config {
        config
            .save(path)
            .with_context(|| format!("Failed to write config {:?}", path))?;
        println!("Wrote configuration to {}", path.display());
        return Ok(());
    }

    let _log_guard = logging_setup::init(&config.log)?;
    info!("Fountain {} starting", env!("CARGO_PKG_VERSION"));

    let stats = run(&args, &config);

    info!(
        "Done: {} frames, {} audio updates, {} emitted, {} expired, {} collisions, peak {} active",
        stats.frames,
        stats.audio_updates,
        stats.emitted,
        stats.expired,
        stats.collisions,
        stats.peak_active
    );
    if stats.failed_emissions > 0 {
        warn!("{} emissions failed to allocate", stats.failed_emissions);
    }
    Ok(())
}

fn run(args: &Args, config: &FountainConfig) -> RunStats {
    let (mut visualizer, mut rng) = match args.seed {
        Some(seed) => (
            Visualizer::with_seed(config, seed),
            StdRng::seed_from_u64(seed.wrapping_add(1)),
        ),
        None => (Visualizer::new(config), StdRng::from_os_rng()),
    };

    let sample_rate = args.sample_rate.max(1);
    let fft_size = args.fft_size();
    let block_dt = fft_size as f64 / f64::from(sample_rate);
    let frame_dt = args.frame_dt();

    let mut generator = SignalGenerator::new(sample_rate, args.bpm);
    let mut analyzer = SpectrumAnalyzer::new(fft_size);
    let mut block = vec![0.0; fft_size];

    debug!(
        "Audio block {} samples ({:.1} ms), frame {:.1} ms",
        fft_size,
        block_dt * 1000.0,
        frame_dt * 1000.0
    );

    visualizer.start(sample_rate as f32);

    let duration = f64::from(args.seconds.max(0.0));
    let track_length = f64::from(args.track_length.max(0.0));
    let mut stats = RunStats::default();
    let mut next_audio = 0.0f64;
    let mut next_frame = 0.0f64;
    let mut next_track = track_length;
    let mut next_report = 1.0f64;

    // The two cadences interleave by timestamp, like independent callbacks
    while next_audio < duration || next_frame < duration {
        if next_audio <= next_frame {
            generator.fill(&mut block, &mut rng);
            let magnitudes = analyzer.analyze(&block);
            visualizer.audio_update(magnitudes, sample_rate as f32, block_dt as f32);
            stats.audio_updates += 1;
            next_audio += block_dt;
            continue;
        }

        let report = visualizer.frame(frame_dt);
        stats.frames += 1;
        stats.emitted += report.emitted;
        stats.expired += report.expired;
        stats.collisions += report.collisions;
        stats.peak_active = stats.peak_active.max(report.active);
        if report.emission_failed {
            stats.failed_emissions += 1;
        }
        next_frame += f64::from(frame_dt);

        if next_frame >= next_report {
            let [r, g, b] = visualizer.base_color().to_rgb();
            info!(
                "t={:.0}s active={} rgb=({:.2}, {:.2}, {:.2}) rotation={:.2}",
                next_report,
                report.active,
                r,
                g,
                b,
                visualizer.rotation().angle
            );
            next_report += 1.0;
        }

        if track_length > 0.0 && next_frame >= next_track {
            visualizer.start(sample_rate as f32);
            next_track += track_length;
        }
    }

    stats
}
