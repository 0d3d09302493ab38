//! Periodic tick driver for a shared review session

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::app::playback_controller::TickOutcome;
use crate::app::review_session::{ReviewSession, StatusMessage};
use crate::ports::MediaEngine;

/// Counts of what happened while ticking
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickSummary {
    pub ticks: u64,
    pub loops: u64,
    pub stops: u64,
    pub errors: u64,
}

impl TickSummary {
    fn record(&mut self, outcome: TickOutcome) {
        match outcome {
            TickOutcome::Looped { .. } => self.loops += 1,
            TickOutcome::Stopped { .. } => self.stops += 1,
            TickOutcome::Free | TickOutcome::WithinBound => {}
        }
    }
}

/// Calls [`ReviewSession::tick`] on a fixed interval.
///
/// The session lock is held for the whole hook-and-tick sequence so a command
/// can never seek between the position read and the boundary action. A tick
/// error is logged and ticking continues.
pub struct Ticker {
    period: Duration,
    stop_on_finish: bool,
}

impl Ticker {
    pub fn new(period_ms: u64) -> Self {
        Self {
            period: Duration::from_millis(period_ms.max(1)),
            stop_on_finish: false,
        }
    }

    /// Stop ticking once a clip finishes without looping
    pub fn with_stop_on_finish(mut self, stop: bool) -> Self {
        self.stop_on_finish = stop;
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Tick for `duration` of wall time.
    ///
    /// `before_tick` runs under the lock with the wall time since the
    /// previous tick, letting clock-driven engines catch up first.
    pub async fn run_for<E, F>(
        &self,
        session: Arc<Mutex<ReviewSession<E>>>,
        duration: Duration,
        mut before_tick: F,
    ) -> TickSummary
    where
        E: MediaEngine,
        F: FnMut(&mut ReviewSession<E>, Duration),
    {
        let mut summary = TickSummary::default();
        let mut timer = interval(self.period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let started = Instant::now();
        let mut last = started;

        loop {
            timer.tick().await;
            let now = Instant::now();
            if now.duration_since(started) > duration {
                break;
            }
            let elapsed = now.duration_since(last);
            last = now;

            let mut guard = match session.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            before_tick(&mut *guard, elapsed);

            summary.ticks += 1;
            match guard.tick() {
                Ok(outcome) => {
                    summary.record(outcome);
                    if let Some(status) = StatusMessage::for_tick(outcome) {
                        info!(position = %guard.position_readout(), "{}", status);
                    }
                    if let TickOutcome::Looped { restart_ms } = outcome {
                        debug!(restart_ms, "Loop restarted");
                    }
                    if self.stop_on_finish && matches!(outcome, TickOutcome::Stopped { .. }) {
                        break;
                    }
                }
                Err(e) => {
                    summary.errors += 1;
                    error!(error = %e, "Tick failed");
                }
            }
        }

        debug!(?summary, "Ticker finished");
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{HeadlessEngine, JsonClipStorage, WalkdirScanner};
    use crate::app::clip_store::ClipStore;
    use crate::app::playback_controller::PlaybackController;
    use crate::domain::model::TimingSettings;
    use std::fs;
    use tempfile::TempDir;

    fn shared_session(videos: &TempDir, clips: &TempDir) -> Arc<Mutex<ReviewSession<HeadlessEngine>>> {
        fs::write(videos.path().join("talk.mp4"), b"").unwrap();
        let mut store = ClipStore::new(
            Arc::new(JsonClipStorage::new(clips.path())),
            Arc::new(WalkdirScanner::default()),
        );
        store.scan(&[videos.path().to_path_buf()]);
        let controller = PlaybackController::new(
            HeadlessEngine::new().with_default_length(60_000),
            TimingSettings::default(),
        );
        let mut session = ReviewSession::new(store, controller, 3.0);
        session.load_video("talk.mp4").unwrap();
        Arc::new(Mutex::new(session))
    }

    #[tokio::test]
    async fn test_ticker_loops_clip() {
        let (videos, clips) = (TempDir::new().unwrap(), TempDir::new().unwrap());
        let session = shared_session(&videos, &clips);
        {
            let mut guard = session.lock().unwrap();
            guard.set_loop(true);
            guard.controller_mut().play_clip(1.0, 1.2).unwrap();
        }

        let summary = Ticker::new(10)
            .run_for(Arc::clone(&session), Duration::from_millis(200), |s, _| {
                s.engine_mut().advance(100);
            })
            .await;

        assert!(summary.ticks >= 3);
        assert!(summary.loops >= 1);
        assert_eq!(summary.stops, 0);
        assert!(session.lock().unwrap().controller().engine().is_playing());
    }

    #[tokio::test]
    async fn test_ticker_stops_on_finish() {
        let (videos, clips) = (TempDir::new().unwrap(), TempDir::new().unwrap());
        let session = shared_session(&videos, &clips);
        session.lock().unwrap().controller_mut().play_clip(1.0, 1.2).unwrap();

        let summary = Ticker::new(10)
            .with_stop_on_finish(true)
            .run_for(Arc::clone(&session), Duration::from_secs(5), |s, _| {
                s.engine_mut().advance(100);
            })
            .await;

        assert_eq!(summary.stops, 1);
        assert_eq!(session.lock().unwrap().controller().active_bound(), None);
    }

    #[tokio::test]
    async fn test_ticker_survives_tick_errors() {
        let (videos, clips) = (TempDir::new().unwrap(), TempDir::new().unwrap());
        let session = shared_session(&videos, &clips);
        {
            let mut guard = session.lock().unwrap();
            guard.set_loop(true);
            guard.controller_mut().play_clip(1.0, 1.2).unwrap();
            guard.engine_mut().set_time(2_000);
            guard.engine_mut().eject();
        }
        // Reattaching fails once the file is gone
        fs::remove_file(videos.path().join("talk.mp4")).unwrap();

        let summary = Ticker::new(10)
            .run_for(Arc::clone(&session), Duration::from_millis(100), |_, _| {})
            .await;

        assert!(summary.ticks >= 2);
        assert_eq!(summary.errors, summary.ticks);
    }
}
