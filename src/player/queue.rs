//! Playback queue: played history, a current pointer, and one staged next track.

use crate::provider::TrackMetadata;

/// The playback queue.
///
/// History only ever grows while the session lives, so going back and then
/// forward again replays tracks without re-fetching them. At most one
/// pre-fetched track waits in the `next` slot.
///
/// The queue does not know about genres: keeping `next` in the same genre as
/// the current track is up to whoever calls [`set_next`](Self::set_next).
#[derive(Debug, Clone)]
pub struct PlaybackQueue {
    /// Tracks played so far, in order
    history: Vec<TrackMetadata>,
    /// Current position in history (-1 = empty)
    position: i32,
    /// Pre-fetched upcoming track
    next: Option<TrackMetadata>,
}

impl Default for PlaybackQueue {
    fn default() -> Self {
        Self {
            history: Vec::new(),
            position: -1,
            next: None,
        }
    }
}

impl PlaybackQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if history is empty.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Get history length.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// All tracks played so far.
    pub fn history(&self) -> &[TrackMetadata] {
        &self.history
    }

    /// Get current position (index into history).
    pub fn current_index(&self) -> Option<usize> {
        if self.position >= 0 && (self.position as usize) < self.history.len() {
            Some(self.position as usize)
        } else {
            None
        }
    }

    /// Raw position pointer (-1 when empty).
    pub fn position(&self) -> i32 {
        self.position
    }

    /// Get current track.
    pub fn current(&self) -> Option<&TrackMetadata> {
        self.current_index().and_then(|i| self.history.get(i))
    }

    /// The staged next track.
    pub fn next(&self) -> Option<&TrackMetadata> {
        self.next.as_ref()
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Whether history already holds a track after the current one.
    pub fn has_successor(&self) -> bool {
        self.successor_index().is_some()
    }

    fn successor_index(&self) -> Option<usize> {
        let candidate = (self.position + 1) as usize;
        (candidate < self.history.len()).then_some(candidate)
    }

    /// Make `track` the current track.
    ///
    /// - empty queue: it becomes the only entry
    /// - already current: nothing changes
    /// - it is the next entry in history: just advance onto it
    /// - otherwise: append it and point at it
    ///
    /// Entries are matched by [`serial`](TrackMetadata::serial), so a fresh
    /// acquisition of the same provider sound is a new entry. If `track` is
    /// the staged next track, the slot is cleared.
    pub fn set_current(&mut self, track: TrackMetadata) {
        if self.next.as_ref().is_some_and(|n| n.serial == track.serial) {
            self.next = None;
        }

        if self.current().is_some_and(|c| c.serial == track.serial) {
            return;
        }

        if let Some(successor) = self.successor_index()
            && self.history[successor].serial == track.serial
        {
            self.position = successor as i32;
            return;
        }

        self.history.push(track);
        self.position = self.history.len() as i32 - 1;
    }

    /// Store or clear the staged next track. Does not move the current pointer.
    pub fn set_next(&mut self, track: Option<TrackMetadata>) {
        self.next = track;
    }

    /// Move to the next track and return it.
    ///
    /// Consumes the staged track if there is one, otherwise replays the
    /// following history entry. Returns `None` (and changes nothing) when
    /// neither exists; the caller has to acquire a fresh track.
    pub fn advance(&mut self) -> Option<&TrackMetadata> {
        if let Some(track) = self.next.take() {
            self.history.push(track);
            self.position = self.history.len() as i32 - 1;
            return self.current();
        }

        let successor = self.successor_index()?;
        self.position = successor as i32;
        self.current()
    }

    /// Go to the previous track and return it.
    ///
    /// Returns `None` when already at the first track (or empty); nothing changes.
    pub fn retreat(&mut self) -> Option<&TrackMetadata> {
        if self.position <= 0 {
            return None;
        }
        self.position -= 1;
        self.current()
    }

    /// Drop history, position and the staged track.
    pub fn reset(&mut self) {
        self.history.clear();
        self.position = -1;
        self.next = None;
    }
}
