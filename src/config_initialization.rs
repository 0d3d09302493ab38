//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::adapters::{AppConfig, TomlConfigAdapter};
use crate::cli::Cli;
use crate::error::{ClipReviewError, ClipReviewResult};

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "clipreview.toml";

/// Prefix of environment overrides, e.g. `CLIPREVIEW_CLIP_DIR`
pub const ENV_PREFIX: &str = "CLIPREVIEW_";

/// Build the effective configuration following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration(cli: &Cli) -> ClipReviewResult<AppConfig> {
    let mut config = load_config_file(cli.config.as_deref())?;
    let env_overrides = apply_environment(&mut config, |key| std::env::var(key).ok())?;
    let cli_overrides = apply_cli_overrides(&mut config, cli);
    config.validate()?;

    debug!(env_overrides, cli_overrides, "Configuration hierarchy resolved");
    Ok(config)
}

/// Load the explicit config file, else the first existing default location,
/// else defaults
pub fn load_config_file(explicit: Option<&Path>) -> ClipReviewResult<AppConfig> {
    if let Some(path) = explicit {
        return TomlConfigAdapter::load(path);
    }

    let candidates = [
        PathBuf::from(LOCAL_CONFIG_FILE),
        TomlConfigAdapter::default_config_path(),
    ];
    for path in &candidates {
        if path.is_file() {
            return TomlConfigAdapter::load(path);
        }
    }

    debug!("No configuration file found, using defaults");
    Ok(AppConfig::default())
}

/// Apply `CLIPREVIEW_*` variables read through `lookup`; returns how many applied
pub fn apply_environment<F>(config: &mut AppConfig, lookup: F) -> ClipReviewResult<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = 0;
    let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

    if let Some(value) = var("VIDEO_DIRS") {
        config.video_dirs = std::env::split_paths(&value).collect();
        applied += 1;
    }
    if let Some(value) = var("CLIP_DIR") {
        config.clip_dir = PathBuf::from(value);
        applied += 1;
    }
    if let Some(value) = var("EXTENSIONS") {
        config.extensions = value
            .split(',')
            .map(str::trim)
            .filter(|ext| !ext.is_empty())
            .map(str::to_string)
            .collect();
        applied += 1;
    }
    if let Some(value) = var("START_PREROLL_MS") {
        config.start_preroll_ms = parse_env("START_PREROLL_MS", &value)?;
        applied += 1;
    }
    if let Some(value) = var("LOOP_PREROLL_MS") {
        config.loop_preroll_ms = parse_env("LOOP_PREROLL_MS", &value)?;
        applied += 1;
    }
    if let Some(value) = var("SKIP_SECONDS") {
        config.skip_seconds = parse_env("SKIP_SECONDS", &value)?;
        applied += 1;
    }
    if let Some(value) = var("TICK_INTERVAL_MS") {
        config.tick_interval_ms = parse_env("TICK_INTERVAL_MS", &value)?;
        applied += 1;
    }
    if let Some(value) = var("SAVE_COMMENTS") {
        config.save_comments = parse_env("SAVE_COMMENTS", &value)?;
        applied += 1;
    }
    if let Some(value) = var("LOG_LEVEL") {
        config.log_level = value;
        applied += 1;
    }

    if applied > 0 {
        info!(applied, "Applied environment overrides");
    }
    Ok(applied)
}

/// Apply command-line flags; returns how many applied
pub fn apply_cli_overrides(config: &mut AppConfig, cli: &Cli) -> usize {
    let mut applied = 0;

    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
        applied += 1;
    }
    if let Some(dir) = &cli.clip_dir {
        config.clip_dir = dir.clone();
        applied += 1;
    }
    if !cli.video_dirs.is_empty() {
        config.video_dirs = cli.video_dirs.clone();
        applied += 1;
    }

    applied
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> ClipReviewResult<T> {
    value.trim().parse().map_err(|_| ClipReviewError::Config {
        message: format!("Invalid value for {}{}: {}", ENV_PREFIX, name, value),
    })
}
