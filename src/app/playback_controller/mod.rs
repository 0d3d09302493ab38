// Playback controller - Bounded clip playback over a polled media engine

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// No bound active, nothing checked
    Free,
    /// Bound active and not yet reached
    WithinBound,
    /// Bound reached with looping on; playback restarted here
    Looped { restart_ms: Millis },
    /// Bound reached with looping off; playback paused and the bound cleared
    Stopped { position_ms: Millis },
}

/// Drives a media engine so that it plays only a clip's range.
///
/// The engine has no "stop at" primitive, so the bound is enforced by
/// [`PlaybackController::tick`], which the owner calls on a fixed schedule.
pub struct PlaybackController<E: MediaEngine> {
    engine: E,
    timing: TimingSettings,
    state: PlaybackState,
    current_video: Option<PathBuf>,
    active_clip: Option<ClipRange>,
    loop_enabled: bool,
    /// `Some` once captured for the current divergence into clip playback
    saved_return_position: Option<Millis>,
    playback_rate: f32,
}

impl<E: MediaEngine> PlaybackController<E> {
    pub fn new(engine: E, timing: TimingSettings) -> Self {
        Self {
            engine,
            timing,
            state: PlaybackState::Idle,
            current_video: None,
            active_clip: None,
            loop_enabled: false,
            saved_return_position: None,
            playback_rate: RatePolicy::NORMAL,
        }
    }

    /// Attach a video. Clears the bound and the saved return position.
    pub fn load(&mut self, video_path: &Path) -> Result<(), DomainError> {
        self.engine.load(video_path)?;
        self.current_video = Some(video_path.to_path_buf());
        self.active_clip = None;
        self.saved_return_position = None;
        self.state = PlaybackState::Loaded;
        info!(path = %video_path.display(), "Loaded video");
        Ok(())
    }

    /// Start or resume playback, honouring a bound kept across a pause
    pub fn play(&mut self) -> Result<(), DomainError> {
        self.ensure_media()?;
        self.start_engine()?;
        self.state = if self.active_clip.is_some() {
            PlaybackState::PlayingBounded
        } else {
            PlaybackState::PlayingFree
        };
        debug!(state = %self.state, "Play");
        Ok(())
    }

    /// Play a clip range and enforce its end
    pub fn play_clip(&mut self, start: f64, end: f64) -> Result<(), DomainError> {
        self.play_range(ClipRange::new(start, end)?)
    }

    /// Play a validated clip range and enforce its end
    pub fn play_range(&mut self, range: ClipRange) -> Result<(), DomainError> {
        self.ensure_media()?;

        if self.saved_return_position.is_none() {
            let position = self.engine.get_time();
            self.saved_return_position = Some(position);
            debug!(position_ms = position, "Saved return position");
        }

        self.active_clip = Some(range);
        self.engine.set_time(range.start_ms());
        self.start_engine()?;
        self.state = PlaybackState::PlayingBounded;
        info!(start = range.start, end = range.end, "Playing clip");
        Ok(())
    }

    /// Pause; an active bound stays in force for the next `play`
    pub fn pause(&mut self) {
        if self.state.is_playing() {
            self.engine.pause();
            self.state = PlaybackState::Paused;
            debug!("Paused");
        }
    }

    /// Toggle between playing and paused
    pub fn toggle_play_pause(&mut self) -> Result<(), DomainError> {
        if self.state.is_playing() {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Enforce the active bound against the engine position.
    ///
    /// Does nothing unless a bounded playback is running.
    pub fn tick(&mut self) -> Result<TickOutcome, DomainError> {
        let Some(range) = self.active_clip else {
            return Ok(TickOutcome::Free);
        };
        if self.state != PlaybackState::PlayingBounded {
            return Ok(TickOutcome::Free);
        }

        let position_ms = self.engine.get_time();
        let bound_ms = BoundaryPolicy::effective_bound_ms(range.end_ms(), self.engine.get_length());
        if !BoundaryPolicy::crossed(position_ms, bound_ms) {
            return Ok(TickOutcome::WithinBound);
        }

        if self.loop_enabled {
            let restart_ms = BoundaryPolicy::loop_restart_ms(range.start, self.timing.loop_preroll_ms);
            self.ensure_media()?;
            self.engine.set_time(restart_ms);
            self.start_engine()?;
            debug!(position_ms, restart_ms, "Clip looped");
            Ok(TickOutcome::Looped { restart_ms })
        } else {
            self.engine.pause();
            self.active_clip = None;
            self.state = PlaybackState::Paused;
            info!(position_ms, "Clip playback finished");
            Ok(TickOutcome::Stopped { position_ms })
        }
    }

    /// Resume free playback where it was before the first clip was played
    pub fn return_to_main(&mut self) -> Result<Millis, DomainError> {
        self.ensure_media()?;
        let position = self
            .saved_return_position
            .take()
            .unwrap_or_else(|| self.engine.get_time());

        self.active_clip = None;
        self.engine.set_time(position);
        self.start_engine()?;
        self.state = PlaybackState::PlayingFree;
        info!(position_ms = position, "Returned to main video");
        Ok(position)
    }

    /// Seek relative to the current position, clamped to the media.
    ///
    /// An active bound stays in force. Returns the new position, or `None`
    /// while the engine has no length.
    pub fn skip(&mut self, delta_seconds: f64) -> Result<Option<Millis>, DomainError> {
        self.ensure_media()?;
        let target = SkipPolicy::target_ms(
            self.engine.get_time(),
            delta_seconds,
            self.engine.get_length(),
        );
        if let Some(target) = target {
            self.engine.set_time(target);
            debug!(delta_seconds, target_ms = target, "Skipped");
        }
        Ok(target)
    }

    /// Jump to an absolute position and play freely from there
    pub fn seek_to(&mut self, seconds: f64) -> Result<Millis, DomainError> {
        self.ensure_media()?;
        let length = self.engine.get_length();
        let mut target = seconds_to_ms(seconds).max(0);
        if length > 0 {
            target = target.min(length);
        }

        self.active_clip = None;
        self.engine.set_time(target);
        if self.state.is_playing() {
            self.state = PlaybackState::PlayingFree;
        } else {
            self.play()?;
        }
        Ok(target)
    }

    /// Set the playback rate, applied now and on every later play
    pub fn set_rate(&mut self, rate: f32) -> Result<(), DomainError> {
        self.playback_rate = RatePolicy::validate(rate)?;
        self.engine.set_rate(self.playback_rate);
        debug!(rate = self.playback_rate, "Playback rate set");
        Ok(())
    }

    /// Switch between half and normal speed
    pub fn toggle_half_speed(&mut self) -> f32 {
        self.playback_rate = RatePolicy::toggle_half(self.playback_rate);
        self.engine.set_rate(self.playback_rate);
        self.playback_rate
    }

    pub fn set_loop(&mut self, enabled: bool) {
        self.loop_enabled = enabled;
    }

    /// Flip looping and return the new setting
    pub fn toggle_loop(&mut self) -> bool {
        self.loop_enabled = !self.loop_enabled;
        self.loop_enabled
    }

    /// Clip start from the live position, minus the start pre-roll
    pub fn capture_start(&self) -> Result<f64, DomainError> {
        self.require_length()?;
        Ok(CapturePolicy::start_from_position(
            self.engine.get_time(),
            self.timing.start_preroll_ms,
        ))
    }

    /// Clip end from the live position
    pub fn capture_end(&self) -> Result<f64, DomainError> {
        self.require_length()?;
        Ok(CapturePolicy::end_from_position(self.engine.get_time()))
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    pub fn loop_enabled(&self) -> bool {
        self.loop_enabled
    }

    pub fn rate(&self) -> f32 {
        self.playback_rate
    }

    pub fn timing(&self) -> TimingSettings {
        self.timing
    }

    /// End of the active clip in seconds, `None` during free playback
    pub fn active_bound(&self) -> Option<f64> {
        self.active_clip.map(|range| range.end)
    }

    pub fn active_clip(&self) -> Option<ClipRange> {
        self.active_clip
    }

    pub fn current_video(&self) -> Option<&Path> {
        self.current_video.as_deref()
    }

    pub fn saved_return_position(&self) -> Option<Millis> {
        self.saved_return_position
    }

    /// `(elapsed, total)` in engine milliseconds
    pub fn position(&self) -> (Millis, Millis) {
        (self.engine.get_time(), self.engine.get_length())
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Reattach the last video if the engine lost its media handle
    fn ensure_media(&mut self) -> Result<(), DomainError> {
        if self.engine.has_media() {
            return Ok(());
        }
        let path = self
            .current_video
            .clone()
            .ok_or_else(|| DomainError::EngineUnavailable("No video loaded".to_string()))?;
        self.engine.load(&path)?;
        info!(path = %path.display(), "Reattached media");
        Ok(())
    }

    /// Play with the session rate asserted before and after, since engines
    /// may reset the rate on seek or play
    fn start_engine(&mut self) -> Result<(), DomainError> {
        self.engine.set_rate(self.playback_rate);
        self.engine.play()?;
        self.engine.set_rate(self.playback_rate);
        Ok(())
    }

    fn require_length(&self) -> Result<(), DomainError> {
        if self.engine.get_length() > 0 {
            Ok(())
        } else {
            Err(DomainError::EngineUnavailable(
                "Media is not ready yet".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::HeadlessEngine;
    use tempfile::NamedTempFile;

    fn controller(length_ms: Millis) -> (PlaybackController<HeadlessEngine>, NamedTempFile) {
        let file = NamedTempFile::new().unwrap();
        let engine = HeadlessEngine::new().with_default_length(length_ms);
        let mut controller = PlaybackController::new(engine, TimingSettings::default());
        controller.load(file.path()).unwrap();
        (controller, file)
    }

    #[test]
    fn test_initial_state() {
        let controller = PlaybackController::new(HeadlessEngine::new(), TimingSettings::default());
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert!(controller.current_video().is_none());
        assert_eq!(controller.rate(), 1.0);
        assert!(!controller.loop_enabled());
    }

    #[test]
    fn test_play_without_video_fails() {
        let mut controller = PlaybackController::new(HeadlessEngine::new(), TimingSettings::default());
        assert!(matches!(
            controller.play(),
            Err(DomainError::EngineUnavailable(_))
        ));
        assert_eq!(controller.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_load_failure_keeps_state() {
        let mut controller = PlaybackController::new(HeadlessEngine::new(), TimingSettings::default());
        assert!(controller.load(Path::new("/missing/video.mp4")).is_err());
        assert_eq!(controller.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_boundary_stop() {
        let (mut controller, _file) = controller(60_000);
        controller.play_clip(10.0, 20.0).unwrap();
        assert_eq!(controller.state(), PlaybackState::PlayingBounded);

        controller.engine_mut().advance(5_000);
        assert_eq!(controller.tick().unwrap(), TickOutcome::WithinBound);

        controller.engine_mut().advance(5_200);
        assert_eq!(
            controller.tick().unwrap(),
            TickOutcome::Stopped { position_ms: 20_200 }
        );
        assert_eq!(controller.state(), PlaybackState::Paused);
        assert_eq!(controller.active_bound(), None);
        assert!(!controller.engine().is_playing());
    }

    #[test]
    fn test_boundary_loop() {
        let (mut controller, _file) = controller(60_000);
        controller.set_loop(true);
        controller.play_clip(10.0, 20.0).unwrap();

        controller.engine_mut().advance(10_100);
        assert_eq!(
            controller.tick().unwrap(),
            TickOutcome::Looped { restart_ms: 9_900 }
        );
        assert_eq!(controller.engine().get_time(), 9_900);
        assert!(controller.engine().is_playing());
        assert_eq!(controller.active_bound(), Some(20.0));
        assert_eq!(controller.state(), PlaybackState::PlayingBounded);
    }

    #[test]
    fn test_bound_past_media_end_loops() {
        let (mut controller, _file) = controller(60_000);
        controller.set_loop(true);
        controller.play_clip(50.0, 70.0).unwrap();

        // The engine stops itself at 60s, short of the clip end
        controller.engine_mut().advance(15_000);
        assert!(!controller.engine().is_playing());
        assert_eq!(
            controller.tick().unwrap(),
            TickOutcome::Looped { restart_ms: 49_900 }
        );
        assert!(controller.engine().is_playing());
    }

    #[test]
    fn test_bound_past_media_end_stops() {
        let (mut controller, _file) = controller(60_000);
        controller.play_clip(50.0, 70.0).unwrap();
        controller.engine_mut().advance(15_000);
        assert_eq!(
            controller.tick().unwrap(),
            TickOutcome::Stopped { position_ms: 60_000 }
        );
        assert_eq!(controller.state(), PlaybackState::Paused);
        assert_eq!(controller.active_bound(), None);
    }

    #[test]
    fn test_loop_restart_clamped_at_zero() {
        let (mut controller, _file) = controller(60_000);
        controller.set_loop(true);
        controller.play_clip(0.05, 1.0).unwrap();
        controller.engine_mut().advance(1_000);
        assert_eq!(
            controller.tick().unwrap(),
            TickOutcome::Looped { restart_ms: 0 }
        );
    }

    #[test]
    fn test_tick_without_bound_is_noop() {
        let (mut controller, _file) = controller(60_000);
        controller.play().unwrap();
        controller.engine_mut().advance(30_000);
        assert_eq!(controller.tick().unwrap(), TickOutcome::Free);
        assert_eq!(controller.tick().unwrap(), TickOutcome::Free);
        assert_eq!(controller.engine().get_time(), 30_000);
        assert_eq!(controller.state(), PlaybackState::PlayingFree);
    }

    #[test]
    fn test_pause_retains_bound() {
        let (mut controller, _file) = controller(60_000);
        controller.play_clip(10.0, 20.0).unwrap();
        controller.pause();
        assert_eq!(controller.state(), PlaybackState::Paused);
        assert_eq!(controller.active_bound(), Some(20.0));

        // A paused controller does not enforce the bound
        controller.engine_mut().set_time(25_000);
        assert_eq!(controller.tick().unwrap(), TickOutcome::Free);

        controller.play().unwrap();
        assert_eq!(controller.state(), PlaybackState::PlayingBounded);
        assert!(matches!(controller.tick().unwrap(), TickOutcome::Stopped { .. }));
    }

    #[test]
    fn test_return_position_captured_once() {
        let (mut controller, _file) = controller(60_000);
        controller.play().unwrap();
        controller.engine_mut().advance(42_000);

        controller.play_clip(10.0, 20.0).unwrap();
        controller.play_clip(30.0, 35.0).unwrap();
        assert_eq!(controller.saved_return_position(), Some(42_000));

        assert_eq!(controller.return_to_main().unwrap(), 42_000);
        assert_eq!(controller.engine().get_time(), 42_000);
        assert_eq!(controller.state(), PlaybackState::PlayingFree);
        assert_eq!(controller.active_bound(), None);
        assert_eq!(controller.saved_return_position(), None);

        // The next divergence captures afresh
        controller.engine_mut().advance(1_000);
        controller.play_clip(10.0, 20.0).unwrap();
        assert_eq!(controller.saved_return_position(), Some(43_000));
    }

    #[test]
    fn test_load_resets_clip_state() {
        let (mut controller, file) = controller(60_000);
        controller.play_clip(10.0, 20.0).unwrap();
        controller.load(file.path()).unwrap();
        assert_eq!(controller.state(), PlaybackState::Loaded);
        assert_eq!(controller.active_bound(), None);
        assert_eq!(controller.saved_return_position(), None);
    }

    #[test]
    fn test_skip_clamps() {
        let (mut controller, _file) = controller(60_000);
        controller.engine_mut().set_time(2_000);
        assert_eq!(controller.skip(-5.0).unwrap(), Some(0));
        assert_eq!(controller.engine().get_time(), 0);

        controller.engine_mut().set_time(59_000);
        assert_eq!(controller.skip(3.0).unwrap(), Some(60_000));
    }

    #[test]
    fn test_skip_keeps_bound() {
        let (mut controller, _file) = controller(60_000);
        controller.play_clip(10.0, 20.0).unwrap();
        controller.skip(15.0).unwrap();
        assert_eq!(controller.active_bound(), Some(20.0));
        assert!(matches!(controller.tick().unwrap(), TickOutcome::Stopped { .. }));
    }

    #[test]
    fn test_seek_to_clears_bound_and_plays() {
        let (mut controller, _file) = controller(60_000);
        controller.play_clip(10.0, 20.0).unwrap();
        controller.pause();
        assert_eq!(controller.seek_to(45.0).unwrap(), 45_000);
        assert_eq!(controller.active_bound(), None);
        assert_eq!(controller.state(), PlaybackState::PlayingFree);
    }

    #[test]
    fn test_rate_reasserted_after_reload() {
        let (mut controller, file) = controller(60_000);
        controller.set_rate(0.5).unwrap();
        assert_eq!(controller.engine().rate(), 0.5);

        // The engine drops the rate on media change
        controller.load(file.path()).unwrap();
        assert_eq!(controller.engine().rate(), 1.0);

        controller.play_clip(1.0, 2.0).unwrap();
        assert_eq!(controller.engine().rate(), 0.5);
        assert_eq!(controller.rate(), 0.5);
    }

    #[test]
    fn test_set_rate_rejects_invalid() {
        let (mut controller, _file) = controller(60_000);
        assert!(controller.set_rate(0.0).is_err());
        assert_eq!(controller.rate(), 1.0);
    }

    #[test]
    fn test_toggle_half_speed() {
        let (mut controller, _file) = controller(60_000);
        assert_eq!(controller.toggle_half_speed(), 0.5);
        assert_eq!(controller.toggle_half_speed(), 1.0);
    }

    #[test]
    fn test_lazy_reattach_on_play_clip() {
        let (mut controller, _file) = controller(60_000);
        controller.engine_mut().eject();
        controller.play_clip(10.0, 20.0).unwrap();
        assert!(controller.engine().has_media());
        assert!(controller.engine().is_playing());
        assert_eq!(controller.engine().get_time(), 10_000);
    }

    #[test]
    fn test_capture_start_applies_preroll() {
        let (mut controller, _file) = controller(60_000);
        controller.engine_mut().set_time(5_200);
        assert!((controller.capture_start().unwrap() - 4.7).abs() < 1e-9);

        controller.engine_mut().set_time(300);
        assert_eq!(controller.capture_start().unwrap(), 0.0);
    }

    #[test]
    fn test_capture_requires_length() {
        let (controller, _file) = controller(0);
        assert!(controller.capture_start().is_err());
        assert!(controller.capture_end().is_err());
    }

    #[test]
    fn test_play_clip_rejects_invalid_range() {
        let (mut controller, _file) = controller(60_000);
        assert!(matches!(
            controller.play_clip(20.0, 10.0),
            Err(DomainError::InvalidClipRange { .. })
        ));
        assert_eq!(controller.state(), PlaybackState::Loaded);
    }
}
