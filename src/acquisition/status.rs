//! Transient status notifications for the UI layer.
//!
//! Nothing in the core waits for these to be observed; sending with no
//! subscribers is fine.

use tokio::sync::broadcast;

use super::Purpose;
use crate::genre::GenreSelector;

/// What happened to an acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionStatus {
    Loading,
    Ready,
    Failed(String),
    Aborted,
}

/// A status notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub purpose: Purpose,
    pub genre: GenreSelector,
    pub status: AcquisitionStatus,
}

/// Fan-out hub for [`StatusEvent`]s.
#[derive(Debug, Clone)]
pub struct StatusHub {
    tx: broadcast::Sender<StatusEvent>,
}

impl Default for StatusHub {
    fn default() -> Self {
        let (tx, _rx) = broadcast::channel(64);
        Self { tx }
    }
}

impl StatusHub {
    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, purpose: Purpose, genre: &GenreSelector, status: AcquisitionStatus) {
        let _ = self.tx.send(StatusEvent {
            purpose,
            genre: genre.clone(),
            status,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_without_subscribers_is_fine() {
        let hub = StatusHub::default();
        hub.emit(Purpose::Prefetch, &GenreSelector::new("Jazz"), AcquisitionStatus::Loading);
    }

    #[tokio::test]
    async fn test_subscriber_receives_events() {
        let hub = StatusHub::default();
        let mut rx = hub.subscribe();
        let genre = GenreSelector::new("Jazz");

        hub.emit(Purpose::ExplicitNext, &genre, AcquisitionStatus::Ready);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.purpose, Purpose::ExplicitNext);
        assert_eq!(event.genre, genre);
        assert_eq!(event.status, AcquisitionStatus::Ready);
    }
}
