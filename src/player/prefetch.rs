//! Decides when to fetch the upcoming track in the background.
//!
//! One attempt per current track: once triggered, the scheduler stays quiet
//! for that track whatever the outcome, until the current track changes.
//! Tracks are told apart by queue entry serial, not provider id.

use super::queue::PlaybackQueue;

/// Default seconds before the end of a track at which prefetch fires.
pub const DEFAULT_PREFETCH_THRESHOLD_SECS: f64 = 10.0;

/// Prefetch progress for the current track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrefetchState {
    #[default]
    Idle,
    Triggered,
    Ready,
    Failed,
}

#[derive(Debug, Clone)]
pub struct PrefetchScheduler {
    threshold: f64,
    /// Serial of the queue entry the state belongs to
    serial: Option<u64>,
    state: PrefetchState,
    genre_switching: bool,
}

impl Default for PrefetchScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_PREFETCH_THRESHOLD_SECS)
    }
}

impl PrefetchScheduler {
    pub fn new(threshold_secs: f64) -> Self {
        Self {
            threshold: threshold_secs.max(0.0),
            serial: None,
            state: PrefetchState::Idle,
            genre_switching: false,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn state(&self) -> PrefetchState {
        self.state
    }

    pub fn watched(&self) -> Option<u64> {
        self.serial
    }

    /// Reset to idle if `serial` is not the entry being watched.
    pub fn track_changed(&mut self, serial: Option<u64>) {
        if self.serial != serial {
            self.serial = serial;
            self.state = PrefetchState::Idle;
        }
    }

    /// Evaluate the trigger at `position` and mark it fired if it holds.
    ///
    /// Returns the serial of the entry the prefetch is for.
    pub fn observe(
        &mut self,
        position: f64,
        duration: Option<f64>,
        queue: &PlaybackQueue,
    ) -> Option<u64> {
        self.track_changed(queue.current().map(|t| t.serial));

        if !self.should_trigger(position, duration, queue) {
            return None;
        }

        self.state = PrefetchState::Triggered;
        let serial = self.serial?;
        tracing::debug!(
            "Prefetch triggered for entry #{} at {:.1}s",
            serial,
            position
        );
        Some(serial)
    }

    /// Pure trigger predicate.
    pub fn should_trigger(
        &self,
        position: f64,
        duration: Option<f64>,
        queue: &PlaybackQueue,
    ) -> bool {
        let Some(duration) = duration.filter(|d| d.is_finite()) else {
            return false;
        };
        if !position.is_finite() || duration <= self.threshold {
            return false;
        }

        let remaining = duration - position;
        remaining <= self.threshold
            && self.state == PrefetchState::Idle
            && !self.genre_switching
            && queue.current().is_some()
            && !queue.has_next()
            && !queue.has_successor()
    }

    /// Record the outcome of the prefetch fired for entry `serial`.
    ///
    /// Ignored if the current track has changed meanwhile.
    pub fn complete(&mut self, serial: u64, ready: bool) {
        if self.serial != Some(serial) || self.state != PrefetchState::Triggered {
            return;
        }
        self.state = if ready {
            PrefetchState::Ready
        } else {
            PrefetchState::Failed
        };
    }

    pub fn begin_genre_switch(&mut self) {
        self.genre_switching = true;
    }

    pub fn end_genre_switch(&mut self) {
        self.genre_switching = false;
    }

    pub fn is_switching_genre(&self) -> bool {
        self.genre_switching
    }

    pub fn reset(&mut self) {
        self.serial = None;
        self.state = PrefetchState::Idle;
        self.genre_switching = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::mock_track;

    fn playing(id: &str) -> PlaybackQueue {
        let mut queue = PlaybackQueue::new();
        queue.set_current(mock_track(id));
        queue
    }

    #[test]
    fn test_fires_once_over_a_whole_track() {
        let queue = playing("a");
        let mut scheduler = PrefetchScheduler::default();
        let mut fired_at = Vec::new();

        let mut t = 0.0;
        while t <= 40.0 {
            if scheduler.observe(t, Some(40.0), &queue).is_some() {
                fired_at.push(t);
            }
            t += 0.5;
        }

        assert_eq!(fired_at, vec![30.0]);
        assert_eq!(scheduler.state(), PrefetchState::Triggered);
    }

    #[test]
    fn test_rewind_inside_window_does_not_refire() {
        let queue = playing("a");
        let mut scheduler = PrefetchScheduler::default();

        assert!(scheduler.observe(31.0, Some(40.0), &queue).is_some());
        assert!(scheduler.observe(5.0, Some(40.0), &queue).is_none());
        assert!(scheduler.observe(35.0, Some(40.0), &queue).is_none());
    }

    #[test]
    fn test_failure_still_blocks_same_track() {
        let queue = playing("a");
        let mut scheduler = PrefetchScheduler::default();

        let serial = scheduler.observe(31.0, Some(40.0), &queue).unwrap();
        scheduler.complete(serial, false);

        assert_eq!(scheduler.state(), PrefetchState::Failed);
        assert!(scheduler.observe(32.0, Some(40.0), &queue).is_none());
    }

    #[test]
    fn test_track_change_resets() {
        let mut queue = playing("a");
        let mut scheduler = PrefetchScheduler::default();
        scheduler.observe(31.0, Some(40.0), &queue);

        let b = mock_track("b");
        queue.set_current(b.clone());
        assert_eq!(scheduler.observe(31.0, Some(40.0), &queue), Some(b.serial));
    }

    #[test]
    fn test_repeated_sound_counts_as_new_track() {
        let mut queue = playing("a");
        let mut scheduler = PrefetchScheduler::default();
        let first = scheduler.observe(31.0, Some(40.0), &queue).unwrap();
        scheduler.complete(first, true);

        queue.set_current(mock_track("a"));
        let second = scheduler.observe(31.0, Some(40.0), &queue);

        assert!(second.is_some());
        assert_ne!(second, Some(first));
    }

    #[test]
    fn test_stale_completion_ignored() {
        let mut queue = playing("a");
        let mut scheduler = PrefetchScheduler::default();
        let fired = scheduler.observe(31.0, Some(40.0), &queue).unwrap();

        let b = mock_track("b");
        queue.set_current(b.clone());
        scheduler.track_changed(Some(b.serial));
        scheduler.complete(fired, true);

        assert_eq!(scheduler.state(), PrefetchState::Idle);
    }

    #[test]
    fn test_needs_known_duration_above_threshold() {
        let queue = playing("a");
        let scheduler = PrefetchScheduler::default();

        assert!(!scheduler.should_trigger(0.0, None, &queue));
        assert!(!scheduler.should_trigger(5.0, Some(10.0), &queue));
        assert!(!scheduler.should_trigger(1.0, Some(8.0), &queue));
        assert!(scheduler.should_trigger(1.0, Some(10.5), &queue));
    }

    #[test]
    fn test_skips_when_next_or_successor_exists() {
        let mut queue = playing("a");
        let scheduler = PrefetchScheduler::default();

        queue.set_next(Some(mock_track("b")));
        assert!(!scheduler.should_trigger(35.0, Some(40.0), &queue));

        queue.set_next(None);
        queue.set_current(mock_track("b"));
        queue.retreat();
        assert!(!scheduler.should_trigger(35.0, Some(40.0), &queue));
    }

    #[test]
    fn test_genre_switch_suppresses() {
        let queue = playing("a");
        let mut scheduler = PrefetchScheduler::default();

        scheduler.begin_genre_switch();
        assert!(scheduler.observe(35.0, Some(40.0), &queue).is_none());

        scheduler.end_genre_switch();
        assert!(scheduler.observe(35.0, Some(40.0), &queue).is_some());
    }

    #[test]
    fn test_empty_queue_never_fires() {
        let mut scheduler = PrefetchScheduler::default();
        assert!(scheduler.observe(35.0, Some(40.0), &PlaybackQueue::new()).is_none());
    }
}
