// Headless engine adapter - Media engine without decoding or rendering

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// A media engine that only keeps a clock.
///
/// Playback advances when the owner calls [`HeadlessEngine::advance`] with
/// elapsed wall time, scaled by the current rate. Loading new media resets
/// the rate to 1.0, the same way desktop players drop a rate on media change.
pub struct HeadlessEngine {
    media: Option<PathBuf>,
    position_ms: Millis,
    length_ms: Millis,
    playing: bool,
    rate: f32,
    default_length_ms: Millis,
    probe: Option<Arc<dyn LengthProbePort>>,
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self {
            media: None,
            position_ms: 0,
            length_ms: 0,
            playing: false,
            rate: 1.0,
            default_length_ms: 0,
            probe: None,
        }
    }

    /// Length reported for media the probe cannot measure
    pub fn with_default_length(mut self, length_ms: Millis) -> Self {
        self.default_length_ms = length_ms;
        self
    }

    /// Probe used to find the length of loaded media
    pub fn with_probe(mut self, probe: Arc<dyn LengthProbePort>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Advance the clock by elapsed wall time.
    ///
    /// Playback stops on its own when the end of the media is reached.
    pub fn advance(&mut self, wall_ms: Millis) {
        if !self.playing || self.media.is_none() {
            return;
        }
        let scaled = (wall_ms as f64 * self.rate as f64).round() as Millis;
        self.position_ms += scaled;
        if self.length_ms > 0 && self.position_ms >= self.length_ms {
            self.position_ms = self.length_ms;
            self.playing = false;
            debug!("Headless engine reached end of media");
        }
    }

    /// Drop the media handle, as an engine does when its media is torn down
    pub fn eject(&mut self) {
        self.media = None;
        self.playing = false;
    }

    /// Override the reported length of the current media
    pub fn set_length(&mut self, length_ms: Millis) {
        self.length_ms = length_ms;
    }

    /// Current rate multiplier
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Path of the attached media
    pub fn media(&self) -> Option<&Path> {
        self.media.as_deref()
    }
}

impl Default for HeadlessEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaEngine for HeadlessEngine {
    fn load(&mut self, path: &Path) -> Result<(), DomainError> {
        if !path.is_file() {
            return Err(DomainError::EngineUnavailable(format!(
                "Cannot open media: {}",
                path.display()
            )));
        }

        self.length_ms = self
            .probe
            .as_ref()
            .and_then(|probe| probe.probe_length(path))
            .unwrap_or(self.default_length_ms);
        self.media = Some(path.to_path_buf());
        self.position_ms = 0;
        self.playing = false;
        self.rate = 1.0;

        debug!(path = %path.display(), length_ms = self.length_ms, "Headless engine loaded media");
        Ok(())
    }

    fn has_media(&self) -> bool {
        self.media.is_some()
    }

    fn play(&mut self) -> Result<(), DomainError> {
        if self.media.is_none() {
            return Err(DomainError::EngineUnavailable("No media attached".to_string()));
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn get_time(&self) -> Millis {
        self.position_ms
    }

    fn set_time(&mut self, ms: Millis) {
        if self.media.is_none() {
            return;
        }
        self.position_ms = if self.length_ms > 0 {
            ms.clamp(0, self.length_ms)
        } else {
            ms.max(0)
        };
    }

    fn get_length(&self) -> Millis {
        self.length_ms
    }

    fn set_rate(&mut self, rate: f32) {
        self.rate = rate;
    }
}
