use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::adapters::toml_config::home_dir;
use crate::adapters::{AppConfig, FFprobeAdapter, HeadlessEngine, JsonClipStorage, WalkdirScanner};
use crate::app::clip_store::ClipStore;
use crate::app::playback_controller::PlaybackController;
use crate::app::review_session::ReviewSession;
use crate::app::ticker::Ticker;
use crate::domain::model::Millis;
use crate::error::ClipReviewResult;
use crate::ports::{ClipStoragePort, LengthProbePort, VideoScanPort};

/// Wires adapters into stores and sessions for one effective configuration
pub struct AppContainer {
    config: AppConfig,
    home: PathBuf,
    storage: Arc<dyn ClipStoragePort>,
    scanner: Arc<dyn VideoScanPort>,
    probe: Option<Arc<dyn LengthProbePort>>,
}

impl AppContainer {
    /// Build from a validated config, resolving relative paths against `$HOME`
    pub fn new(config: AppConfig) -> ClipReviewResult<Self> {
        Self::with_home(config, &home_dir())
    }

    /// Build with an explicit home directory
    pub fn with_home(config: AppConfig, home: &Path) -> ClipReviewResult<Self> {
        config.validate()?;

        let clip_dir = config.resolved_clip_dir(home);
        let storage = if config.save_comments {
            JsonClipStorage::new(&clip_dir)
        } else {
            JsonClipStorage::new(&clip_dir).without_comments()
        };
        let scanner = WalkdirScanner::new(config.extensions.iter());
        debug!(clip_dir = %clip_dir.display(), "Container configured");

        Ok(Self {
            config,
            home: home.to_path_buf(),
            storage: Arc::new(storage),
            scanner: Arc::new(scanner),
            probe: Some(Arc::new(FFprobeAdapter::new())),
        })
    }

    /// Drop the media length probe; engines then report the default length
    pub fn without_probe(mut self) -> Self {
        self.probe = None;
        self
    }

    /// Replace the media length probe
    pub fn with_probe(mut self, probe: Arc<dyn LengthProbePort>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Length of a media file, 0 when no probe is configured or probing fails
    pub fn media_length(&self, path: &Path) -> Millis {
        let length = self
            .probe
            .as_ref()
            .and_then(|probe| probe.probe_length(path))
            .unwrap_or(0);
        debug!(path = %path.display(), length_ms = length, "Media length");
        length
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn video_dirs(&self) -> Vec<PathBuf> {
        self.config.resolved_video_dirs(&self.home)
    }

    pub fn clip_dir(&self) -> PathBuf {
        self.config.resolved_clip_dir(&self.home)
    }

    /// A store with a fresh scan of the configured video directories
    pub fn clip_store(&self) -> ClipStore {
        let mut store = ClipStore::new(Arc::clone(&self.storage), Arc::clone(&self.scanner));
        store.scan(&self.video_dirs());
        store
    }

    /// A headless engine, probing media length when a probe is configured
    pub fn engine(&self) -> HeadlessEngine {
        match &self.probe {
            Some(probe) => HeadlessEngine::new().with_probe(Arc::clone(probe)),
            None => HeadlessEngine::new(),
        }
    }

    /// A review session over a scanned store and a headless engine
    pub fn session(&self) -> ReviewSession<HeadlessEngine> {
        let controller = PlaybackController::new(self.engine(), self.config.timing());
        info!(
            tick_ms = self.config.tick_interval_ms(),
            skip_seconds = self.config.skip_seconds,
            "Review session created"
        );
        ReviewSession::new(self.clip_store(), controller, self.config.skip_seconds)
    }

    /// A ticker on the configured interval
    pub fn ticker(&self) -> Ticker {
        Ticker::new(self.config.tick_interval_ms())
    }
}
