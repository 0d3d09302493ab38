//! Command-line argument definitions

use clap::Args;

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only this video
    #[arg(long)]
    pub video: Option<String>,
}

/// Arguments for the add command
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Video file name, as shown by `scan`
    #[arg(long)]
    pub video: String,

    /// Clip start (seconds, MM:SS.ms or HH:MM:SS.ms)
    #[arg(short, long)]
    pub start: String,

    /// Clip end (seconds, MM:SS.ms or HH:MM:SS.ms)
    #[arg(short, long)]
    pub end: String,

    /// Free-text note
    #[arg(long)]
    pub comment: Option<String>,
}

/// Arguments for the delete command
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Video file name
    #[arg(long)]
    pub video: String,

    /// Clip number as listed (starting at 1)
    #[arg(long)]
    pub index: usize,
}

/// Arguments for the play command
#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Video file name
    #[arg(long)]
    pub video: String,

    /// Clip number as listed (starting at 1)
    #[arg(long)]
    pub clip: usize,

    /// Restart the clip each time it ends
    #[arg(long = "loop")]
    pub looping: bool,

    /// Playback speed, e.g. 0.75 or 0.5x
    #[arg(long, default_value = "1")]
    pub rate: String,

    /// Wall-clock seconds to run
    #[arg(long, default_value = "10")]
    pub seconds: f64,
}
