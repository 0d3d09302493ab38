//! Command implementations

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::adapters::TomlConfigAdapter;
use crate::app::AppContainer;
use crate::cli::args::{AddArgs, DeleteArgs, ListArgs, PlayArgs};
use crate::domain::errors::DomainError;
use crate::domain::model::{Clip, Millis};
use crate::domain::rules::{CapturePolicy, RatePolicy};
use crate::utils::time::parse_time;

/// Execute the scan command
pub fn scan(container: &AppContainer) -> Result<()> {
    let store = container.clip_store();
    if store.video_index().is_empty() {
        warn!(dirs = ?container.video_dirs(), "No videos found");
    }
    for (name, path) in store.video_index() {
        println!("{} -> {}", name, path.display());
    }
    Ok(())
}

/// Execute the list command
pub fn list(container: &AppContainer, args: ListArgs) -> Result<()> {
    let mut store = container.clip_store();
    let report = store.load_all().context("Failed to read clip storage")?;
    for (name, error) in &report.failed {
        eprintln!("{}: {}", name, error);
    }

    if let Some(video) = &args.video {
        store
            .ensure_loaded(video)
            .with_context(|| format!("Cannot list clips for {}", video))?;
    }

    for entry in store.entries() {
        if args.video.as_deref().is_some_and(|video| video != entry.name) {
            continue;
        }
        println!("{}", entry.name);
        for (index, clip) in entry.clips.iter().enumerate() {
            if clip.comment().is_empty() {
                println!("  {}", clip.label(index));
            } else {
                println!("  {}  # {}", clip.label(index), clip.comment());
            }
        }
    }
    Ok(())
}

/// Execute the add command
pub fn add(container: &AppContainer, args: AddArgs) -> Result<()> {
    let start = parse_time(&args.start)
        .map_err(|e| anyhow::anyhow!("Invalid start time '{}': {}", args.start, e))?;
    let end = parse_time(&args.end)
        .map_err(|e| anyhow::anyhow!("Invalid end time '{}': {}", args.end, e))?;

    let mut store = container.clip_store();
    let path = store
        .video_path(&args.video)
        .ok_or_else(|| DomainError::NotFound(args.video.clone()))?;
    let length_ms = container.media_length(path);
    let range = CapturePolicy::range(start, end, length_ms)?;
    let clip = match args.comment {
        Some(comment) => Clip::with_comment(range, comment),
        None => Clip::new(range),
    };

    let index = store.add(&args.video, clip)?;
    store
        .persist(&args.video)
        .with_context(|| format!("Clip added but not saved for {}", args.video))?;

    let label = store.clip(&args.video, index)?.label(index);
    info!(video = %args.video, index, "Clip added");
    println!("Added {}", label);
    Ok(())
}

/// Execute the delete command
pub fn delete(container: &AppContainer, args: DeleteArgs) -> Result<()> {
    if args.index == 0 {
        bail!("Clip numbers start at 1");
    }

    let mut store = container.clip_store();
    store.delete(&args.video, args.index - 1)?;
    store
        .persist(&args.video)
        .with_context(|| format!("Clip deleted but not saved for {}", args.video))?;

    println!("Deleted clip {}", args.index);
    Ok(())
}

/// Execute the play command
pub async fn play(container: &AppContainer, args: PlayArgs) -> Result<()> {
    if args.clip == 0 {
        bail!("Clip numbers start at 1");
    }
    if !args.seconds.is_finite() || args.seconds <= 0.0 {
        bail!("Run time must be positive, got {}", args.seconds);
    }
    let rate = RatePolicy::parse(&args.rate)?;

    let mut session = container.session();
    println!("{}", session.load_video(&args.video)?);
    session.set_loop(args.looping);
    session.set_speed(rate)?;
    println!("{}", session.play_clip(&args.video, args.clip - 1)?);

    let session = Arc::new(Mutex::new(session));
    let summary = container
        .ticker()
        .with_stop_on_finish(!args.looping)
        .run_for(
            Arc::clone(&session),
            Duration::from_secs_f64(args.seconds),
            |s, elapsed| {
                let wall_ms = Millis::try_from(elapsed.as_millis()).unwrap_or(Millis::MAX);
                s.engine_mut().advance(wall_ms);
            },
        )
        .await;

    let session = session
        .lock()
        .map_err(|_| anyhow::anyhow!("Session lock poisoned"))?;
    println!(
        "{} ({}, {} loops, {} ticks)",
        session.position_readout(),
        session.controller().state(),
        summary.loops,
        summary.ticks
    );
    if summary.errors > 0 {
        warn!(errors = summary.errors, "Some ticks failed");
    }
    Ok(())
}

/// Execute the config command
pub fn config(container: &AppContainer) -> Result<()> {
    print!("{}", TomlConfigAdapter::render(container.config())?);
    Ok(())
}
