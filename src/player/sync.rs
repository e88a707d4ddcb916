//! Binds the queue's current track to the audio resource.
//!
//! Loading is "assign source, rewind, play once ready". Any change of queue
//! entry autoplays, even when the provider sound is the same. Re-syncing the
//! same entry only reconciles play/pause.

use super::resource::{AudioResource, PlaybackFault, ResourceEvent};
use super::state::{PlaybackStatus, PlayerState};
use crate::provider::TrackMetadata;

/// Default drift allowed between a requested and the actual position.
pub const DEFAULT_SEEK_TOLERANCE_SECS: f64 = 0.25;

/// What the caller has to react to after a resource event.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncSignal {
    None,
    /// The current track played to its end
    TrackEnded,
    /// The resource failed; playback stopped and will not be retried
    Faulted(PlaybackFault),
}

/// Drives the single audio resource.
#[derive(Debug)]
pub struct PlaybackSynchronizer<R> {
    resource: R,
    state: PlayerState,
    /// Serial of the loaded queue entry
    loaded_serial: Option<u64>,
    /// Play/pause state the user asked for
    want_playing: bool,
    seek_tolerance: f64,
    last_fault: Option<PlaybackFault>,
}

impl<R: AudioResource> PlaybackSynchronizer<R> {
    pub fn new(resource: R) -> Self {
        Self {
            resource,
            state: PlayerState::default(),
            loaded_serial: None,
            want_playing: false,
            seek_tolerance: DEFAULT_SEEK_TOLERANCE_SECS,
            last_fault: None,
        }
    }

    pub fn with_seek_tolerance(mut self, secs: f64) -> Self {
        self.seek_tolerance = secs.max(0.0);
        self
    }

    pub fn resource(&self) -> &R {
        &self.resource
    }

    /// Direct access for resource drivers (and tests) that need to poke the
    /// resource outside the event flow.
    pub fn resource_mut(&mut self) -> &mut R {
        &mut self.resource
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn status(&self) -> PlaybackStatus {
        self.state.status
    }

    pub fn loaded_id(&self) -> Option<&str> {
        self.state.track_id.as_deref()
    }

    pub fn loaded_serial(&self) -> Option<u64> {
        self.loaded_serial
    }

    pub fn last_fault(&self) -> Option<&PlaybackFault> {
        self.last_fault.as_ref()
    }

    /// Best known duration: the resource's, else the track's.
    pub fn duration(&self) -> Option<f64> {
        self.resource.duration().or(self.state.duration)
    }

    /// Point the resource at `track`.
    ///
    /// A different entry is loaded from the start and autoplays. The same
    /// entry only has its play/pause state reconciled.
    pub fn sync_current(&mut self, track: Option<&TrackMetadata>) {
        let Some(track) = track else {
            self.unload();
            return;
        };

        if self.loaded_serial == Some(track.serial) {
            self.reconcile();
            return;
        }

        tracing::debug!("Loading \"{}\" ({})", track.title, track.id);
        self.resource.set_source(&track.url);
        self.resource.set_position(0.0);
        self.state = PlayerState {
            status: PlaybackStatus::Loading,
            track_id: Some(track.id.clone()),
            position: 0.0,
            duration: track.duration_secs,
        };
        self.loaded_serial = Some(track.serial);
        self.want_playing = true;
        self.last_fault = None;
        self.reconcile();
    }

    /// Ask for play or pause. Applied immediately if loaded, otherwise once
    /// the resource reports ready.
    pub fn set_playing(&mut self, playing: bool) {
        self.want_playing = playing;
        if self.state.status == PlaybackStatus::Faulted && playing {
            // Explicit user action is the only way out of a fault
            self.last_fault = None;
            self.state.status = PlaybackStatus::Loading;
        }
        self.reconcile();
    }

    /// Move to `desired` seconds if the resource has drifted past tolerance.
    ///
    /// Returns whether a correction was issued.
    pub fn seek(&mut self, desired: f64) -> bool {
        if self.state.track_id.is_none() || !desired.is_finite() {
            return false;
        }
        let desired = match self.duration() {
            Some(d) => desired.clamp(0.0, d),
            None => desired.max(0.0),
        };

        let drift = (self.resource.position() - desired).abs();
        if drift <= self.seek_tolerance {
            return false;
        }

        tracing::debug!("Seeking to {:.2}s (drift {:.2}s)", desired, drift);
        self.resource.set_position(desired);
        self.state.position = desired;
        true
    }

    /// Fold a resource event into the synchronizer's state.
    pub fn handle_event(&mut self, event: ResourceEvent) -> SyncSignal {
        if self.state.track_id.is_none() {
            return SyncSignal::None;
        }

        match event {
            ResourceEvent::Ready => {
                self.reconcile();
                self.fault_signal()
            }
            ResourceEvent::PositionChanged(secs) => {
                if secs.is_finite() {
                    self.state.position = secs.max(0.0);
                }
                SyncSignal::None
            }
            ResourceEvent::DurationKnown(secs) => {
                if secs.is_finite() && secs > 0.0 {
                    self.state.duration = Some(secs);
                }
                SyncSignal::None
            }
            ResourceEvent::Ended => {
                if let Some(d) = self.duration() {
                    self.state.position = d;
                }
                self.state.status = PlaybackStatus::Stopped;
                SyncSignal::TrackEnded
            }
            ResourceEvent::Error(message) => {
                let fault = PlaybackFault::Resource(message);
                self.fault(fault.clone());
                SyncSignal::Faulted(fault)
            }
        }
    }

    /// Drop the current source.
    pub fn unload(&mut self) {
        if self.state.track_id.is_some() {
            tracing::debug!("Unloading audio resource");
            self.resource.clear_source();
        }
        self.state = PlayerState::default();
        self.loaded_serial = None;
        self.want_playing = false;
        self.last_fault = None;
    }

    fn reconcile(&mut self) {
        if self.state.track_id.is_none()
            || self.state.status == PlaybackStatus::Faulted
            || !self.resource.is_ready()
        {
            return;
        }

        if let Some(d) = self.resource.duration() {
            self.state.duration = Some(d);
        }

        match (self.want_playing, self.resource.is_playing()) {
            (true, false) => match self.resource.play() {
                Ok(()) => self.state.status = PlaybackStatus::Playing,
                Err(fault) => self.fault(fault),
            },
            (false, true) => {
                self.resource.pause();
                self.state.status = PlaybackStatus::Paused;
            }
            (true, true) => self.state.status = PlaybackStatus::Playing,
            (false, false) => self.state.status = PlaybackStatus::Paused,
        }
    }

    fn fault(&mut self, fault: PlaybackFault) {
        tracing::warn!("Playback fault: {}", fault);
        if self.resource.is_playing() {
            self.resource.pause();
        }
        self.want_playing = false;
        self.state.status = PlaybackStatus::Faulted;
        self.last_fault = Some(fault);
    }

    fn fault_signal(&self) -> SyncSignal {
        match (&self.last_fault, self.state.status) {
            (Some(fault), PlaybackStatus::Faulted) => SyncSignal::Faulted(fault.clone()),
            _ => SyncSignal::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::resource::mocks::FakeResource;
    use crate::test_utils::mock_track;

    fn loaded(track: &TrackMetadata) -> PlaybackSynchronizer<FakeResource> {
        let mut sync = PlaybackSynchronizer::new(FakeResource::new());
        sync.sync_current(Some(track));
        sync.resource_mut().finish_loading(40.0);
        sync.handle_event(ResourceEvent::Ready);
        sync
    }

    #[test]
    fn test_new_track_loads_and_waits_for_ready() {
        let mut sync = PlaybackSynchronizer::new(FakeResource::new());
        let track = mock_track("a");

        sync.sync_current(Some(&track));

        assert_eq!(sync.resource().source(), Some(track.url.as_str()));
        assert_eq!(sync.resource().position(), 0.0);
        assert_eq!(sync.status(), PlaybackStatus::Loading);
        assert_eq!(sync.resource().play_calls, 0);

        sync.resource_mut().finish_loading(40.0);
        assert_eq!(sync.handle_event(ResourceEvent::Ready), SyncSignal::None);
        assert!(sync.resource().is_playing());
        assert_eq!(sync.status(), PlaybackStatus::Playing);
        assert_eq!(sync.duration(), Some(40.0));
    }

    #[test]
    fn test_track_change_always_autoplays() {
        let mut sync = loaded(&mock_track("a"));
        sync.set_playing(false);
        assert!(!sync.resource().is_playing());

        sync.sync_current(Some(&mock_track("b")));
        sync.resource_mut().finish_loading(30.0);
        sync.handle_event(ResourceEvent::Ready);

        assert!(sync.resource().is_playing());
        assert_eq!(sync.resource().sources.len(), 2);
    }

    #[test]
    fn test_same_entry_only_reconciles() {
        let a = mock_track("a");
        let mut sync = loaded(&a);
        sync.resource_mut().pause();
        sync.resource_mut().tick_to(12.0);

        sync.sync_current(Some(&a));

        assert_eq!(sync.resource().sources.len(), 1);
        assert_eq!(sync.resource().position(), 12.0);
        assert!(sync.resource().is_playing());
    }

    #[test]
    fn test_repeated_sound_reloads_from_start() {
        let mut sync = loaded(&mock_track("a"));
        sync.resource_mut().tick_to(40.0);
        sync.handle_event(ResourceEvent::Ended);

        let again = mock_track("a");
        sync.sync_current(Some(&again));

        assert_eq!(sync.resource().sources.len(), 2);
        assert_eq!(sync.resource().position(), 0.0);
        assert_eq!(sync.status(), PlaybackStatus::Loading);
        assert_eq!(sync.loaded_serial(), Some(again.serial));

        sync.resource_mut().finish_loading(40.0);
        sync.handle_event(ResourceEvent::Ready);
        assert!(sync.resource().is_playing());
    }

    #[test]
    fn test_pause_before_ready_is_honored() {
        let mut sync = PlaybackSynchronizer::new(FakeResource::new());
        sync.sync_current(Some(&mock_track("a")));
        sync.set_playing(false);

        sync.resource_mut().finish_loading(40.0);
        sync.handle_event(ResourceEvent::Ready);

        assert!(!sync.resource().is_playing());
        assert_eq!(sync.status(), PlaybackStatus::Paused);
    }

    #[test]
    fn test_seek_ignores_small_drift() {
        let mut sync = loaded(&mock_track("a"));
        sync.resource_mut().tick_to(10.1);

        assert!(!sync.seek(10.0));
        assert!(!sync.seek(10.3));
        assert!(sync.seek(20.0));
        assert_eq!(sync.resource().position(), 20.0);
    }

    #[test]
    fn test_seek_clamps_to_duration() {
        let mut sync = loaded(&mock_track("a"));
        assert!(sync.seek(100.0));
        assert_eq!(sync.resource().position(), 40.0);
    }

    #[test]
    fn test_seek_without_track_is_noop() {
        let mut sync = PlaybackSynchronizer::new(FakeResource::new());
        assert!(!sync.seek(5.0));
    }

    #[test]
    fn test_ended_signals_caller() {
        let mut sync = loaded(&mock_track("a"));
        assert_eq!(sync.handle_event(ResourceEvent::Ended), SyncSignal::TrackEnded);
        assert_eq!(sync.status(), PlaybackStatus::Stopped);
    }

    #[test]
    fn test_error_stops_playing_without_retry() {
        let mut sync = loaded(&mock_track("a"));

        let signal = sync.handle_event(ResourceEvent::Error("decode failed".into()));

        assert!(matches!(signal, SyncSignal::Faulted(PlaybackFault::Resource(_))));
        assert!(!sync.resource().is_playing());
        assert_eq!(sync.status(), PlaybackStatus::Faulted);

        // A later ready event does not restart playback on its own
        sync.handle_event(ResourceEvent::Ready);
        assert!(!sync.resource().is_playing());
        assert_eq!(sync.resource().play_calls, 1);
    }

    #[test]
    fn test_user_play_clears_fault() {
        let mut sync = loaded(&mock_track("a"));
        sync.handle_event(ResourceEvent::Error("glitch".into()));

        sync.set_playing(true);

        assert!(sync.resource().is_playing());
        assert!(sync.last_fault().is_none());
    }

    #[test]
    fn test_refused_play_faults() {
        let mut sync = PlaybackSynchronizer::new(FakeResource::new());
        sync.resource_mut().refuse_play("autoplay blocked");
        sync.sync_current(Some(&mock_track("a")));
        sync.resource_mut().finish_loading(40.0);

        let signal = sync.handle_event(ResourceEvent::Ready);

        assert!(matches!(signal, SyncSignal::Faulted(PlaybackFault::Play(_))));
        assert_eq!(sync.status(), PlaybackStatus::Faulted);
    }

    #[test]
    fn test_unload() {
        let mut sync = loaded(&mock_track("a"));
        sync.sync_current(None);
        assert!(sync.resource().source().is_none());
        assert!(sync.loaded_id().is_none());
        assert_eq!(sync.handle_event(ResourceEvent::Ended), SyncSignal::None);
    }
}
