//! FFprobe adapter for media length probing
//!
//! Runs the `ffprobe` executable when it is on `PATH`. Missing binaries and
//! unreadable files both yield `None`.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::domain::model::*;
use crate::ports::*;

/// FFprobe-based length probe
pub struct FFprobeAdapter {
    program: PathBuf,
}

impl FFprobeAdapter {
    /// Create a probe that runs `ffprobe` from `PATH`
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("ffprobe"),
        }
    }

    /// Create a probe that runs a specific executable
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Parse ffprobe's bare duration output (seconds) into milliseconds
    pub fn parse_duration(output: &str) -> Option<Millis> {
        let seconds = output.trim().parse::<f64>().ok()?;
        if seconds.is_finite() && seconds > 0.0 {
            Some(seconds_to_ms(seconds))
        } else {
            None
        }
    }
}

impl Default for FFprobeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl LengthProbePort for FFprobeAdapter {
    fn probe_length(&self, path: &Path) -> Option<Millis> {
        let output = Command::new(&self.program)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .output();

        match output {
            Ok(output) if output.status.success() => {
                Self::parse_duration(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(output) => {
                debug!(
                    path = %path.display(),
                    stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                    "ffprobe could not read media"
                );
                None
            }
            Err(e) => {
                debug!(error = %e, "ffprobe not available");
                None
            }
        }
    }
}
