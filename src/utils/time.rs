//! Time parsing and formatting utilities

use crate::domain::errors::DomainError;
use crate::domain::model::Millis;

/// Format engine milliseconds as `m:ss` for position readouts
pub fn format_time(ms: Millis) -> String {
    let total_seconds = ms.max(0) / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{}:{:02}", minutes, seconds)
}

/// Format a position readout, `0:00 / 0:00` while the length is unknown
pub fn format_position(elapsed_ms: Millis, total_ms: Millis) -> String {
    if total_ms > 0 {
        format!("{} / {}", format_time(elapsed_ms), format_time(total_ms))
    } else {
        "0:00 / 0:00".to_string()
    }
}

/// Parse a time argument to seconds.
///
/// Accepts plain seconds (`90.5`), `MM:SS(.ms)` and `HH:MM:SS(.ms)`.
pub fn parse_time(time_str: &str) -> Result<f64, DomainError> {
    let trimmed = time_str.trim();
    let invalid = || DomainError::BadArgs(format!(
        "Invalid time '{}'. Supported formats: seconds (e.g., 90.5), MM:SS.ms (e.g., 1:30.5), HH:MM:SS.ms",
        time_str
    ));

    let parts: Vec<&str> = trimmed.split(':').collect();
    let seconds = match parts.as_slice() {
        [secs] => secs.parse::<f64>().map_err(|_| invalid())?,
        [mins, secs] => {
            let minutes = mins.parse::<u32>().map_err(|_| invalid())?;
            let seconds = secs.parse::<f64>().map_err(|_| invalid())?;
            if seconds >= 60.0 {
                return Err(invalid());
            }
            minutes as f64 * 60.0 + seconds
        }
        [hours, mins, secs] => {
            let hours = hours.parse::<u32>().map_err(|_| invalid())?;
            let minutes = mins.parse::<u32>().map_err(|_| invalid())?;
            let seconds = secs.parse::<f64>().map_err(|_| invalid())?;
            if minutes >= 60 || seconds >= 60.0 {
                return Err(invalid());
            }
            hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds
        }
        _ => return Err(invalid()),
    };

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(DomainError::BadArgs(format!(
            "Time cannot be negative: {}",
            time_str
        )));
    }
    Ok(seconds)
}
