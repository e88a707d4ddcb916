//! Playback state snapshot types.

use std::time::Duration;

/// Current playback status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    /// Source assigned, waiting for the resource to report ready
    Loading,
    Playing,
    Paused,
    /// The resource failed; stays here until the user acts
    Faulted,
}

/// Snapshot of what the synchronizer believes the resource is doing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerState {
    pub status: PlaybackStatus,
    /// Id of the loaded track (if any)
    pub track_id: Option<String>,
    /// Last reported position in seconds
    pub position: f64,
    /// Duration in seconds, once known
    pub duration: Option<f64>,
}

impl PlayerState {
    /// Seconds left until the end of the track, if the duration is known.
    pub fn remaining(&self) -> Option<f64> {
        self.duration.map(|d| (d - self.position).max(0.0))
    }
}

/// Format fractional seconds as MM:SS or HH:MM:SS.
pub fn format_secs(secs: f64) -> String {
    if secs.is_finite() && secs > 0.0 {
        format_duration(Duration::from_secs_f64(secs))
    } else {
        format_duration(Duration::ZERO)
    }
}

/// Format a duration as MM:SS or HH:MM:SS.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let secs = secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}", mins, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(0)), "0:00");
        assert_eq!(format_duration(Duration::from_secs(65)), "1:05");
        assert_eq!(format_duration(Duration::from_secs(3661)), "1:01:01");
    }

    #[test]
    fn test_format_secs_handles_bad_input() {
        assert_eq!(format_secs(41.9), "0:41");
        assert_eq!(format_secs(-3.0), "0:00");
        assert_eq!(format_secs(f64::NAN), "0:00");
    }

    #[test]
    fn test_remaining() {
        let mut state = PlayerState::default();
        assert_eq!(state.remaining(), None);

        state.duration = Some(40.0);
        state.position = 31.0;
        assert_eq!(state.remaining(), Some(9.0));

        state.position = 45.0;
        assert_eq!(state.remaining(), Some(0.0));
    }
}
