//! A listening session: the facade the UI layer drives.
//!
//! The session owns the queue, the prefetch scheduler and the synchronizer
//! (and through it the audio resource). Acquisitions run on spawned tasks
//! and come back as [`Completion`]s; nothing touches the queue until the
//! caller hands a completion to [`Session::apply_completion`]. That is where
//! aborted and stale-genre results are dropped.
//!
//! ```ignore
//! let mut session = Session::new(coordinator, resource, &config.playback);
//! session.select_genre(GenreSelector::new("Lo-Fi Beats"))?;
//! while let Some(completion) = session.next_completion().await {
//!     session.apply_completion(completion);
//! }
//! ```

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use crate::acquisition::{Acquisition, Purpose, StatusEvent, TrackCoordinator};
use crate::config::PlaybackConfig;
use crate::error::{Error, Result};
use crate::genre::GenreSelector;
use crate::player::{
    AudioResource, PlaybackQueue, PlaybackSynchronizer, PrefetchScheduler, ResourceEvent,
    SyncSignal,
};
use crate::provider::TrackMetadata;

/// Where an acquired track goes once it arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Becomes the current track and autoplays
    Play,
    /// Staged into the next slot; playback is untouched
    Stage,
    /// Background prefetch issued while queue entry `for_entry` was current
    Background { for_entry: u64 },
}

/// A finished acquisition waiting to be applied.
#[derive(Debug, Clone)]
pub struct Completion {
    pub purpose: Purpose,
    pub genre: GenreSelector,
    pub target: Target,
    pub outcome: Acquisition,
}

/// Result of asking for the next track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// Moved onto a staged or previously played track
    Advanced,
    /// Nothing local to move to; an acquisition was started
    Acquiring,
    /// No genre selected yet
    NoGenre,
}

pub struct Session<R> {
    coordinator: Arc<TrackCoordinator>,
    queue: PlaybackQueue,
    sync: PlaybackSynchronizer<R>,
    scheduler: PrefetchScheduler,
    genre: Option<GenreSelector>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl<R: AudioResource> Session<R> {
    pub fn new(coordinator: Arc<TrackCoordinator>, resource: R, playback: &PlaybackConfig) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            coordinator,
            queue: PlaybackQueue::new(),
            sync: PlaybackSynchronizer::new(resource)
                .with_seek_tolerance(playback.seek_tolerance_secs),
            scheduler: PrefetchScheduler::new(playback.prefetch_threshold_secs),
            genre: None,
            completions_tx,
            completions_rx,
        }
    }

    pub fn genre(&self) -> Option<&GenreSelector> {
        self.genre.as_ref()
    }

    pub fn queue(&self) -> &PlaybackQueue {
        &self.queue
    }

    pub fn current(&self) -> Option<&TrackMetadata> {
        self.queue.current()
    }

    pub fn synchronizer(&self) -> &PlaybackSynchronizer<R> {
        &self.sync
    }

    pub fn resource(&self) -> &R {
        self.sync.resource()
    }

    pub fn resource_mut(&mut self) -> &mut R {
        self.sync.resource_mut()
    }

    pub fn scheduler(&self) -> &PrefetchScheduler {
        &self.scheduler
    }

    pub fn coordinator(&self) -> &TrackCoordinator {
        &self.coordinator
    }

    /// Status notifications for transient UI feedback.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.coordinator.subscribe()
    }

    /// Switch to `genre` and start acquiring its first track.
    ///
    /// The staged next track and any pending prefetch or explicit request for
    /// the old genre are dropped right away. History is kept.
    pub fn select_genre(&mut self, genre: GenreSelector) -> Result<()> {
        if genre.label().is_empty() {
            return Err(Error::invalid_genre(genre.label()));
        }

        tracing::info!("Switching genre to {}", genre);
        self.coordinator.params().set_active_genre(genre.clone());
        self.coordinator.cancel(Purpose::Prefetch);
        self.coordinator.cancel(Purpose::ExplicitNext);
        self.queue.set_next(None);
        self.scheduler.begin_genre_switch();
        self.genre = Some(genre.clone());

        self.spawn_acquisition(genre, Purpose::GenreSwitch, Target::Play);
        Ok(())
    }

    /// Go to the next track, acquiring one only if nothing is queued.
    pub fn request_next(&mut self) -> NextStep {
        if self.advance_local() {
            return NextStep::Advanced;
        }
        let Some(genre) = self.genre.clone() else {
            return NextStep::NoGenre;
        };
        self.spawn_acquisition(genre, Purpose::ExplicitNext, Target::Play);
        NextStep::Acquiring
    }

    /// Fetch a track into the next slot without playing it.
    ///
    /// Returns `false` when no genre is selected or a genre switch is still
    /// pending; the staged track has to match the current track's genre.
    pub fn request_explicit_prefetch(&mut self) -> bool {
        if self.scheduler.is_switching_genre() {
            tracing::debug!("Not staging a track while the genre switch is pending");
            return false;
        }
        let Some(genre) = self.genre.clone() else {
            return false;
        };
        self.spawn_acquisition(genre, Purpose::Prefetch, Target::Stage);
        true
    }

    /// Step back in history. Returns `false` at the first track.
    pub fn go_back(&mut self) -> bool {
        let Some(track) = self.queue.retreat().cloned() else {
            tracing::debug!("Already at the first track");
            return false;
        };
        self.load_current(&track);
        true
    }

    /// Reconcile a user seek. Returns whether the resource was moved.
    pub fn seek(&mut self, secs: f64) -> bool {
        self.sync.seek(secs)
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.sync.set_playing(playing);
    }

    /// Feed an audio resource event through the synchronizer and react to it.
    pub fn on_resource_event(&mut self, event: ResourceEvent) -> SyncSignal {
        let position = match event {
            ResourceEvent::PositionChanged(secs) => Some(secs),
            _ => None,
        };

        let signal = self.sync.handle_event(event);

        if let Some(position) = position {
            self.maybe_prefetch(position);
        }

        match &signal {
            SyncSignal::TrackEnded => {
                if self.scheduler.is_switching_genre() {
                    // The pending switch supplies the next track
                    tracing::debug!("Track ended during genre switch");
                } else if !self.advance_local()
                    && let Some(genre) = self.genre.clone()
                {
                    tracing::debug!("Track ended with nothing queued");
                    self.spawn_acquisition(genre, Purpose::ExplicitNext, Target::Play);
                }
            }
            SyncSignal::Faulted(fault) => {
                tracing::warn!("Playback stopped: {}", fault);
            }
            SyncSignal::None => {}
        }

        signal
    }

    /// Wait for the next finished acquisition.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.completions_rx.recv().await
    }

    /// A finished acquisition, if one is already waiting.
    pub fn try_completion(&mut self) -> Option<Completion> {
        self.completions_rx.try_recv().ok()
    }

    /// Apply a finished acquisition to the queue.
    ///
    /// Returns whether the queue changed.
    pub fn apply_completion(&mut self, completion: Completion) -> bool {
        let Completion {
            purpose,
            genre,
            target,
            outcome,
        } = completion;
        let is_current_genre = self.genre.as_ref() == Some(&genre);

        let track = match outcome {
            Acquisition::Ready(track) => track,
            Acquisition::Aborted => {
                self.settle_background(&target, false);
                return false;
            }
            Acquisition::Failed(e) => {
                tracing::debug!("Not applying failed {} acquisition: {}", purpose, e);
                self.settle_background(&target, false);
                if purpose == Purpose::GenreSwitch && is_current_genre {
                    self.scheduler.end_genre_switch();
                }
                return false;
            }
        };

        if !is_current_genre {
            tracing::debug!(
                "Discarding \"{}\" acquired for abandoned genre {}",
                track.title,
                genre
            );
            self.settle_background(&target, false);
            return false;
        }

        match target {
            Target::Play => {
                if purpose == Purpose::GenreSwitch {
                    self.scheduler.end_genre_switch();
                }
                self.queue.set_current(track.clone());
                self.load_current(&track);
                true
            }
            Target::Stage => {
                tracing::info!("Staged \"{}\" as next", track.title);
                self.queue.set_next(Some(track));
                true
            }
            Target::Background { for_entry } => {
                let still_current = self.queue.current().is_some_and(|t| t.serial == for_entry);
                if still_current && !self.queue.has_next() && !self.queue.has_successor() {
                    tracing::debug!("Prefetched \"{}\"", track.title);
                    self.queue.set_next(Some(track));
                    self.scheduler.complete(for_entry, true);
                    true
                } else {
                    tracing::debug!("Dropping prefetch for entry #{}, queue moved on", for_entry);
                    self.scheduler.complete(for_entry, false);
                    false
                }
            }
        }
    }

    /// Cancel everything and forget the session's tracks.
    pub fn end(&mut self) {
        tracing::info!("Ending session");
        self.coordinator.cancel_all();
        self.queue.reset();
        self.sync.unload();
        self.scheduler.reset();
        self.genre = None;
    }

    fn advance_local(&mut self) -> bool {
        let Some(track) = self.queue.advance().cloned() else {
            return false;
        };
        self.load_current(&track);
        true
    }

    fn load_current(&mut self, track: &TrackMetadata) {
        self.sync.sync_current(Some(track));
        self.scheduler.track_changed(Some(track.serial));
    }

    fn maybe_prefetch(&mut self, position: f64) {
        let Some(genre) = self.genre.clone() else {
            return;
        };
        if let Some(for_entry) = self
            .scheduler
            .observe(position, self.sync.duration(), &self.queue)
        {
            self.spawn_acquisition(genre, Purpose::Prefetch, Target::Background { for_entry });
        }
    }

    fn settle_background(&mut self, target: &Target, ready: bool) {
        if let Target::Background { for_entry } = target {
            self.scheduler.complete(*for_entry, ready);
        }
    }

    fn spawn_acquisition(&self, genre: GenreSelector, purpose: Purpose, target: Target) {
        let task = self.coordinator.begin(&genre, purpose);
        let coordinator = Arc::clone(&self.coordinator);
        let tx = self.completions_tx.clone();

        tokio::spawn(async move {
            let outcome = coordinator.run(task).await;
            let _ = tx.send(Completion {
                purpose,
                genre,
                target,
                outcome,
            });
        });
    }
}

impl<R> Drop for Session<R> {
    fn drop(&mut self) {
        self.coordinator.cancel_all();
    }
}
