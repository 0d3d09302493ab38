// Domain rules - Timing and selection policies

use crate::domain::errors::*;
use crate::domain::model::*;

/// Rules for turning live engine positions into clip boundaries
pub struct CapturePolicy;

impl CapturePolicy {
    /// Clip start from a live position: `max(0, position - preroll)` in seconds.
    ///
    /// The pre-roll compensates for the delay between hearing the start of a
    /// phrase and pressing the mark key.
    pub fn start_from_position(position_ms: Millis, preroll_ms: Millis) -> f64 {
        (ms_to_seconds(position_ms) - ms_to_seconds(preroll_ms)).max(0.0)
    }

    /// Clip end from a live position, no adjustment
    pub fn end_from_position(position_ms: Millis) -> f64 {
        ms_to_seconds(position_ms)
    }

    /// Build the range for a marked start and a captured end
    pub fn range(start: f64, end: f64, length_ms: Millis) -> Result<ClipRange, DomainError> {
        let range = ClipRange::new(start, end)?;
        range.validate_against_length(length_ms)?;
        Ok(range)
    }
}

/// Rules applied when a bounded playback reaches its end
pub struct BoundaryPolicy;

impl BoundaryPolicy {
    /// Whether the engine position has reached the bound
    pub fn crossed(position_ms: Millis, bound_ms: Millis) -> bool {
        position_ms >= bound_ms
    }

    /// Bound actually reachable by the engine: the clip end, capped at the
    /// media length once the length is known
    pub fn effective_bound_ms(end_ms: Millis, length_ms: Millis) -> Millis {
        if length_ms > 0 {
            end_ms.min(length_ms)
        } else {
            end_ms
        }
    }

    /// Where a loop restarts: the clip start minus the loop pre-roll, never negative
    pub fn loop_restart_ms(start: f64, preroll_ms: Millis) -> Millis {
        (seconds_to_ms(start) - preroll_ms).max(0)
    }
}

/// Rules for relative seeking
pub struct SkipPolicy;

impl SkipPolicy {
    /// Target of a skip by `delta_seconds`, clamped to `[0, length]`.
    ///
    /// Returns `None` while the engine reports no length, since there is
    /// nothing meaningful to clamp against yet.
    pub fn target_ms(current_ms: Millis, delta_seconds: f64, length_ms: Millis) -> Option<Millis> {
        if length_ms <= 0 {
            return None;
        }
        let target = current_ms + seconds_to_ms(delta_seconds);
        Some(target.clamp(0, length_ms))
    }
}

/// Rules for moving the clip selection around a video's clip list
pub struct SelectionPolicy;

impl SelectionPolicy {
    /// Next clip, wrapping to the first after the last
    pub fn next(current: Option<usize>, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        match current {
            Some(i) if i + 1 < len => Some(i + 1),
            _ => Some(0),
        }
    }

    /// Previous clip, wrapping to the last from the first or from no selection
    pub fn previous(current: Option<usize>, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        match current {
            Some(i) if i > 0 && i <= len => Some(i - 1),
            _ => Some(len - 1),
        }
    }

    /// Selection after deleting `deleted` when `remaining` clips are left
    pub fn after_delete(deleted: usize, remaining: usize) -> Option<usize> {
        if remaining == 0 {
            None
        } else {
            Some(deleted.saturating_sub(1).min(remaining - 1))
        }
    }
}

/// Playback speed rules
pub struct RatePolicy;

impl RatePolicy {
    /// Speeds offered by the speed selector
    pub const PRESETS: [f32; 7] = [0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 2.0];

    pub const NORMAL: f32 = 1.0;
    pub const HALF: f32 = 0.5;

    /// Reject non-finite or non-positive multipliers
    pub fn validate(rate: f32) -> Result<f32, DomainError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(DomainError::BadArgs(format!(
                "Playback rate must be positive, got {}",
                rate
            )));
        }
        Ok(rate)
    }

    /// Half speed toggles back to normal; anything else goes to half speed
    pub fn toggle_half(rate: f32) -> f32 {
        if rate == Self::HALF {
            Self::NORMAL
        } else {
            Self::HALF
        }
    }

    /// Parse selector text such as `"0.75x"` or `"1.5"`
    pub fn parse(text: &str) -> Result<f32, DomainError> {
        let trimmed = text.trim().trim_end_matches(|c: char| c == 'x' || c == 'X');
        let rate = trimmed
            .parse::<f32>()
            .map_err(|_| DomainError::BadArgs(format!("Invalid playback rate: {}", text)))?;
        Self::validate(rate)
    }
}
