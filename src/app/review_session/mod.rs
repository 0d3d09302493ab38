// Review session - Command-driven facade over the clip store and playback controller

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::app::clip_store::ClipStore;
use crate::app::playback_controller::{PlaybackController, TickOutcome};
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;
use crate::utils::time::format_position;

/// Severity of a status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// Feedback shown to the user after a command
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Error,
            text: text.into(),
        }
    }

    /// User-facing wording for a failed command
    pub fn from_error(error: &DomainError) -> Self {
        match error {
            DomainError::NotFound(_) => Self::warning("Video file not found."),
            DomainError::InvalidClipRange { .. } => Self::warning("Invalid clip duration."),
            DomainError::BadArgs(msg) => Self::warning(msg.clone()),
            DomainError::IndexOutOfRange { .. } => Self::warning("No clip selected."),
            other => Self::error(other.to_string()),
        }
    }

    /// Message for a tick that changed playback, if any
    pub fn for_tick(outcome: TickOutcome) -> Option<Self> {
        match outcome {
            TickOutcome::Stopped { .. } => Some(Self::info("Clip playback finished.")),
            _ => None,
        }
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// User-level actions accepted by a [`ReviewSession`]
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    LoadVideo(String),
    Play,
    Pause,
    TogglePlayPause,
    MarkStart,
    SaveClip,
    PlayClip { video: String, index: usize },
    SelectClip(usize),
    PlaySelected,
    NextClip,
    PreviousClip,
    DeleteSelected,
    ToggleLoop,
    SetLoop(bool),
    ToggleHalfSpeed,
    SetSpeed(f32),
    SkipForward,
    SkipBackward,
    SeekTo(f64),
    ReturnToMain,
    SetComment { index: usize, text: String },
}

/// One reviewer's working state: the clip store, the playback controller,
/// the selected clip and a pending start mark.
///
/// Every change goes through a command. Only the engine itself is handed out
/// mutably, so that its owner can drive its clock.
pub struct ReviewSession<E: MediaEngine> {
    store: ClipStore,
    controller: PlaybackController<E>,
    current_video: Option<String>,
    selected: Option<ClipId>,
    marked_start: Option<f64>,
    skip_seconds: f64,
}

impl<E: MediaEngine> ReviewSession<E> {
    pub fn new(store: ClipStore, controller: PlaybackController<E>, skip_seconds: f64) -> Self {
        Self {
            store,
            controller,
            current_video: None,
            selected: None,
            marked_start: None,
            skip_seconds,
        }
    }

    /// Run a command and turn its outcome into feedback
    pub fn handle(&mut self, command: SessionCommand) -> StatusMessage {
        debug!(?command, "Handling command");
        let result = match command {
            SessionCommand::LoadVideo(name) => self.load_video(&name),
            SessionCommand::Play => self.play(),
            SessionCommand::Pause => self.pause(),
            SessionCommand::TogglePlayPause => self.toggle_play_pause(),
            SessionCommand::MarkStart => self.mark_start(),
            SessionCommand::SaveClip => self.save_clip(),
            SessionCommand::PlayClip { video, index } => self.play_clip(&video, index),
            SessionCommand::SelectClip(index) => self.select_clip(index),
            SessionCommand::PlaySelected => self.play_selected(),
            SessionCommand::NextClip => self.next_clip(),
            SessionCommand::PreviousClip => self.previous_clip(),
            SessionCommand::DeleteSelected => self.delete_selected(),
            SessionCommand::ToggleLoop => Ok(self.toggle_loop()),
            SessionCommand::SetLoop(enabled) => Ok(self.set_loop(enabled)),
            SessionCommand::ToggleHalfSpeed => Ok(self.toggle_half_speed()),
            SessionCommand::SetSpeed(rate) => self.set_speed(rate),
            SessionCommand::SkipForward => self.skip(self.skip_seconds),
            SessionCommand::SkipBackward => self.skip(-self.skip_seconds),
            SessionCommand::SeekTo(seconds) => self.seek_to(seconds),
            SessionCommand::ReturnToMain => self.return_to_main(),
            SessionCommand::SetComment { index, text } => self.set_comment(index, &text),
        };

        result.unwrap_or_else(|e| {
            warn!(error = %e, "Command failed");
            StatusMessage::from_error(&e)
        })
    }

    /// Load a discovered video by name and read its clips
    pub fn load_video(&mut self, name: &str) -> Result<StatusMessage, DomainError> {
        let path = self.video_path(name)?;
        self.controller.load(&path)?;
        self.current_video = Some(name.to_string());
        self.selected = None;
        self.marked_start = None;

        match self.store.ensure_loaded(name) {
            Ok(entry) => {
                info!(video = %name, clips = entry.clips.len(), "Video ready");
                Ok(StatusMessage::info(format!("Loaded {}", name)))
            }
            Err(e) => {
                warn!(video = %name, error = %e, "Clips unavailable");
                Ok(StatusMessage::warning(format!(
                    "Loaded {}, but its clips could not be read: {}",
                    name, e
                )))
            }
        }
    }

    pub fn play(&mut self) -> Result<StatusMessage, DomainError> {
        self.controller.play()?;
        Ok(StatusMessage::info("Playing"))
    }

    pub fn pause(&mut self) -> Result<StatusMessage, DomainError> {
        self.controller.pause();
        Ok(StatusMessage::info("Paused"))
    }

    pub fn toggle_play_pause(&mut self) -> Result<StatusMessage, DomainError> {
        self.controller.toggle_play_pause()?;
        Ok(StatusMessage::info(if self.controller.is_playing() {
            "Playing"
        } else {
            "Paused"
        }))
    }

    /// Remember the live position, less the pre-roll, as the next clip start
    pub fn mark_start(&mut self) -> Result<StatusMessage, DomainError> {
        self.require_video()?;
        let start = self.controller.capture_start()?;
        self.marked_start = Some(start);
        debug!(start, "Marked clip start");
        Ok(StatusMessage::info(format!("Clip start set at {:.2}s", start)))
    }

    /// Close the marked clip at the live position, store and persist it
    pub fn save_clip(&mut self) -> Result<StatusMessage, DomainError> {
        let video = self.require_video()?;
        let start = self
            .marked_start
            .ok_or_else(|| DomainError::BadArgs("Set the clip start point first.".to_string()))?;
        let end = self.controller.capture_end()?;
        let range = CapturePolicy::range(start, end, self.controller.engine().get_length())?;

        let clip = Clip::new(range);
        let id = clip.id();
        let index = self.store.add(&video, clip)?;
        self.marked_start = None;
        self.selected = Some(id);
        info!(video = %video, index, start = range.start, end = range.end, "Saved clip");

        Ok(self.persisted(&video, "Clip positions saved!"))
    }

    /// Play a clip, switching videos first when it belongs to another one
    pub fn play_clip(&mut self, video: &str, index: usize) -> Result<StatusMessage, DomainError> {
        if self.current_video.as_deref() != Some(video) {
            self.load_video(video)?;
        }
        let clip = self.store.clip(video, index)?;
        let (id, range, label) = (clip.id(), clip.range(), clip.label(index));

        self.controller.play_range(range)?;
        self.selected = Some(id);
        Ok(StatusMessage::info(format!("Playing {}", label)))
    }

    /// Select a clip of the current video without playing it
    pub fn select_clip(&mut self, index: usize) -> Result<StatusMessage, DomainError> {
        let video = self.require_video()?;
        let clip = self.store.clip(&video, index)?;
        self.selected = Some(clip.id());
        Ok(StatusMessage::info(clip.label(index)))
    }

    pub fn play_selected(&mut self) -> Result<StatusMessage, DomainError> {
        let video = self.require_video()?;
        match self.selected_index() {
            Some(index) => self.play_clip(&video, index),
            None => Ok(StatusMessage::warning("No clip selected.")),
        }
    }

    /// Select and play the next clip, wrapping to the first
    pub fn next_clip(&mut self) -> Result<StatusMessage, DomainError> {
        let video = self.require_video()?;
        let len = self.store.get_clips(&video).len();
        match SelectionPolicy::next(self.selected_index(), len) {
            Some(index) => self.play_clip(&video, index),
            None => Ok(StatusMessage::warning("No clips for this video.")),
        }
    }

    /// Select and play the previous clip, wrapping to the last
    pub fn previous_clip(&mut self) -> Result<StatusMessage, DomainError> {
        let video = self.require_video()?;
        let len = self.store.get_clips(&video).len();
        match SelectionPolicy::previous(self.selected_index(), len) {
            Some(index) => self.play_clip(&video, index),
            None => Ok(StatusMessage::warning("No clips for this video.")),
        }
    }

    /// Delete the selected clip and move the selection to its predecessor
    pub fn delete_selected(&mut self) -> Result<StatusMessage, DomainError> {
        let video = self.require_video()?;
        let Some(index) = self.selected_index() else {
            return Ok(StatusMessage::warning("No clip selected."));
        };

        self.store.delete(&video, index)?;
        let clips = self.store.get_clips(&video);
        self.selected = SelectionPolicy::after_delete(index, clips.len()).map(|i| clips[i].id());
        info!(video = %video, index, "Deleted clip");

        Ok(self.persisted(&video, &format!("Deleted clip {}", index + 1)))
    }

    pub fn toggle_loop(&mut self) -> StatusMessage {
        let enabled = self.controller.toggle_loop();
        Self::loop_status(enabled)
    }

    pub fn set_loop(&mut self, enabled: bool) -> StatusMessage {
        self.controller.set_loop(enabled);
        Self::loop_status(enabled)
    }

    fn loop_status(enabled: bool) -> StatusMessage {
        if enabled {
            StatusMessage::info("Looping enabled")
        } else {
            StatusMessage::info("Looping disabled")
        }
    }

    pub fn toggle_half_speed(&mut self) -> StatusMessage {
        let rate = self.controller.toggle_half_speed();
        StatusMessage::info(format!("Playback speed set to {}x", rate))
    }

    pub fn set_speed(&mut self, rate: f32) -> Result<StatusMessage, DomainError> {
        self.controller.set_rate(rate)?;
        Ok(StatusMessage::info(format!("Playback speed set to {}x", rate)))
    }

    pub fn skip(&mut self, delta_seconds: f64) -> Result<StatusMessage, DomainError> {
        match self.controller.skip(delta_seconds)? {
            Some(_) => Ok(StatusMessage::info(self.position_readout())),
            None => Ok(StatusMessage::warning("Media is not ready yet")),
        }
    }

    /// Jump to an absolute position, dropping any clip bound
    pub fn seek_to(&mut self, seconds: f64) -> Result<StatusMessage, DomainError> {
        self.controller.seek_to(seconds)?;
        Ok(StatusMessage::info(self.position_readout()))
    }

    pub fn return_to_main(&mut self) -> Result<StatusMessage, DomainError> {
        self.controller.return_to_main()?;
        Ok(StatusMessage::info("Returned to main video"))
    }

    /// Replace the comment of a clip of the current video and persist it
    pub fn set_comment(&mut self, index: usize, text: &str) -> Result<StatusMessage, DomainError> {
        let video = self.require_video()?;
        self.store.set_comment(&video, index, text)?;
        Ok(self.persisted(&video, "Comment saved"))
    }

    /// Enforce the active clip bound; called on the session's schedule
    pub fn tick(&mut self) -> Result<TickOutcome, DomainError> {
        self.controller.tick()
    }

    /// `elapsed / total` readout for the current position
    pub fn position_readout(&self) -> String {
        let (elapsed, total) = self.controller.position();
        format_position(elapsed, total)
    }

    pub fn current_video(&self) -> Option<&str> {
        self.current_video.as_deref()
    }

    /// Index of the selected clip in the current video's list
    pub fn selected_index(&self) -> Option<usize> {
        let video = self.current_video.as_deref()?;
        self.store.index_of(video, self.selected?)
    }

    pub fn marked_start(&self) -> Option<f64> {
        self.marked_start
    }

    /// Labels of the current video's clips, in list order
    pub fn clip_labels(&self) -> Vec<String> {
        self.current_video
            .as_deref()
            .map(|video| {
                self.store
                    .get_clips(video)
                    .iter()
                    .enumerate()
                    .map(|(i, clip)| clip.label(i))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn store(&self) -> &ClipStore {
        &self.store
    }

    pub fn controller(&self) -> &PlaybackController<E> {
        &self.controller
    }

    /// The media engine itself, for engines whose clock the owner drives
    pub fn engine_mut(&mut self) -> &mut E {
        self.controller.engine_mut()
    }

    #[cfg(test)]
    pub(crate) fn controller_mut(&mut self) -> &mut PlaybackController<E> {
        &mut self.controller
    }

    fn video_path(&self, name: &str) -> Result<PathBuf, DomainError> {
        self.store
            .video_path(name)
            .map(Path::to_path_buf)
            .ok_or_else(|| DomainError::NotFound(format!("Video {}", name)))
    }

    fn require_video(&self) -> Result<String, DomainError> {
        self.current_video
            .clone()
            .ok_or_else(|| DomainError::BadArgs("Load a video first.".to_string()))
    }

    /// Persist after a mutation; memory stays authoritative when the write fails
    fn persisted(&self, video: &str, success: &str) -> StatusMessage {
        match self.store.persist(video) {
            Ok(()) => StatusMessage::info(success),
            Err(e) => {
                warn!(video = %video, error = %e, "Clip change kept in memory only");
                StatusMessage::error(format!("Could not save clips: {}", e))
            }
        }
    }
}
