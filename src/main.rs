//! Program entry point: loads settings and the target, runs the search for a
//! fixed time, and writes the best rendering as a PNG.

use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;

use polycasso::engine::{FrameDimensions, ImageKind};
use polycasso::error::TargetError;
use polycasso::{engine_to_rgba, Error, SearchEngine, Settings, Snapshot, TargetImage};

#[derive(Parser, Debug)]
#[command(name = "polycasso")]
#[command(author, version, about = "Approximate an image with semi-transparent polygons")]
struct Args {
    /// Target image path
    input: PathBuf,

    /// Settings file (TOML); defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// How long to search, in seconds
    #[arg(short, long, default_value_t = 60)]
    duration: u64,

    /// Output PNG path
    #[arg(short, long, default_value = "polycasso.png")]
    output: PathBuf,

    /// Blend the result into the real image before exiting
    #[arg(long)]
    complete: bool,

    /// Start from the best polygons of an earlier run's snapshot
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Write a JSON snapshot of the best polygons and progress after the run
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Seconds between progress lines
    #[arg(long, default_value_t = 5)]
    report_interval: u64,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(e) = run(&args) {
        log::error!("{e}");
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Error> {
    let settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    settings.validate()?;

    let max = FrameDimensions { width: settings.max_image_width, height: settings.max_image_height };
    let target = TargetImage::open(&args.input, max)?;
    log::info!(
        "target {} scaled to {}x{}",
        args.input.display(),
        target.dims.width,
        target.dims.height
    );

    let completion_delay_ms = settings.completion_delay_ms;
    let engine = SearchEngine::new(target.pixels, target.dims, settings)?;
    if let Some(path) = &args.resume {
        let snapshot = Snapshot::load(path)?;
        if snapshot.dims != engine.dimensions() {
            log::warn!(
                "snapshot was taken at {}x{}, target is {}x{}",
                snapshot.dims.width,
                snapshot.dims.height,
                engine.dimensions().width,
                engine.dimensions().height
            );
        }
        engine.seed_candidate(&snapshot.best)?;
    }
    engine.start()?;

    let deadline = Instant::now() + Duration::from_secs(args.duration);
    let report = Duration::from_secs(args.report_interval.max(1));
    while Instant::now() < deadline {
        thread::sleep(report.min(deadline.saturating_duration_since(Instant::now())));
        let stats = engine.stats();
        log::info!(
            "gen {} | best {} | polygons {} | proposals {} | accepted {:.2}% | temp {:.1}",
            stats.generation_number,
            stats.best_error.unwrap_or(u64::MAX),
            stats.best_polygon_count,
            stats.total_proposals,
            stats.acceptance_percent(),
            stats.anneal_temp,
        );
    }

    // no best events can queue ahead of the crossfade once the workers are gone
    engine.stop();
    if let Some(path) = &args.snapshot {
        Snapshot::capture(&engine).save(path)?;
    }

    let (pixels, dims) = if args.complete {
        let events = engine.subscribe();
        engine.complete()?;
        let patience = Duration::from_millis(completion_delay_ms + 1_000);
        let mut last = None;
        // keep only the newest frame; stop at the final one or when frames dry up
        while let Ok(ev) = events.recv_timeout(patience) {
            if let ImageKind::Crossfade { step, steps } = ev.kind {
                let done = step == steps;
                last = Some(ev);
                if done {
                    break;
                }
            }
        }
        engine.wait_for_completion();
        match last {
            Some(ev) => (ev.pixels.to_vec(), ev.dims),
            None => (engine.best_image(), engine.dimensions()),
        }
    } else {
        (engine.best_image(), engine.dimensions())
    };

    image::save_buffer_with_format(
        &args.output,
        &engine_to_rgba(&pixels),
        dims.width as u32,
        dims.height as u32,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(TargetError::from)?;
    log::info!("wrote {}", args.output.display());
    Ok(())
}
