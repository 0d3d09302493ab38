//! CLI module for ClipReview
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// ClipReview - mark, store and replay clips of study videos
#[derive(Parser, Debug)]
#[command(name = "clipreview")]
#[command(about = "ClipReview - Clip store and bounded playback for video review")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./clipreview.toml, then the user config dir)
    #[arg(long, global = true, env = "CLIPREVIEW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format (pretty or json)
    #[arg(long, default_value = "pretty", global = true)]
    pub log_format: String,

    /// Clip storage directory
    #[arg(long, global = true)]
    pub clip_dir: Option<PathBuf>,

    /// Video directory to scan; repeat for several
    #[arg(long = "video-dir", global = true)]
    pub video_dirs: Vec<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List discovered videos
    Scan,
    /// List stored clips
    List(args::ListArgs),
    /// Add a clip to a video
    Add(args::AddArgs),
    /// Delete a clip from a video
    Delete(args::DeleteArgs),
    /// Play a clip headlessly, enforcing its end
    Play(args::PlayArgs),
    /// Print the effective configuration
    Config,
}
