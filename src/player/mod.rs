//! Playback side of the session: queue model, prefetch timing, and the
//! binding to the audio output.
//!
//! # Architecture
//!
//! ```text
//!        ┌──────────────────┐   observe(position)   ┌───────────────────┐
//!        │  PlaybackQueue   │◀──────────────────────│ PrefetchScheduler │
//!        │ history/current/ │                       └───────────────────┘
//!        │      next        │
//!        └────────┬─────────┘
//!                 │ current track
//!                 ▼
//!        ┌──────────────────────┐   set_source / play / pause
//!        │ PlaybackSynchronizer │──────────────────────────────▶ AudioResource
//!        └──────────────────────┘◀────────────── ResourceEvent
//! ```

mod prefetch;
mod queue;
mod resource;
mod state;
mod sync;

pub use prefetch::{DEFAULT_PREFETCH_THRESHOLD_SECS, PrefetchScheduler, PrefetchState};
pub use queue::PlaybackQueue;
pub use resource::{AudioResource, PlaybackFault, ResourceEvent};
pub use state::{PlaybackStatus, PlayerState, format_duration, format_secs};
pub use sync::{DEFAULT_SEEK_TOLERANCE_SECS, PlaybackSynchronizer, SyncSignal};

#[cfg(test)]
pub use resource::mocks;
