//! Track acquisition coordinator.
//!
//! Turns "give me a track for this genre, for this purpose" into a provider
//! call, with one live task per purpose tag: starting a new acquisition
//! cancels whatever was outstanding under the same tag. Different tags never
//! cancel each other.
//!
//! Parameters are resolved when the job reaches the front of the request
//! serializer, not when it is queued, so a knob moved while a request waits
//! is honored.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use super::serializer::RequestSerializer;
use super::status::{AcquisitionStatus, StatusEvent, StatusHub};
use crate::genre::{GenreSelector, LiveParameters};
use crate::provider::{ProviderError, TrackFetcher, TrackMetadata, TrackRequest};

/// Default number of base parameters sent for cross-genre requests.
pub const DEFAULT_BASE_PARAM_COUNT: usize = 3;

/// Why a track is being acquired; scopes cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    /// The user asked for the next track
    ExplicitNext,
    /// Background or user-staged fetch of the upcoming track
    Prefetch,
    /// The user picked a new genre
    GenreSwitch,
}

impl Purpose {
    pub const ALL: [Purpose; 3] = [Purpose::ExplicitNext, Purpose::Prefetch, Purpose::GenreSwitch];

    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::ExplicitNext => "explicit-next",
            Purpose::Prefetch => "prefetch",
            Purpose::GenreSwitch => "genre-switch",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of an acquisition.
///
/// `Aborted` is not an error: the request was superseded and the caller
/// must drop it silently.
#[derive(Debug, Clone)]
pub enum Acquisition {
    Ready(TrackMetadata),
    Aborted,
    Failed(ProviderError),
}

impl Acquisition {
    pub fn is_ready(&self) -> bool {
        matches!(self, Acquisition::Ready(_))
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Acquisition::Aborted)
    }

    pub fn track(&self) -> Option<&TrackMetadata> {
        match self {
            Acquisition::Ready(track) => Some(track),
            _ => None,
        }
    }
}

/// A live acquisition.
#[derive(Debug, Clone)]
pub struct AcquisitionTask {
    pub id: u64,
    pub purpose: Purpose,
    pub genre: GenreSelector,
    pub token: CancellationToken,
}

#[derive(Debug, Default)]
struct ActiveTasks {
    next_id: u64,
    by_purpose: HashMap<Purpose, AcquisitionTask>,
}

/// Coordinates track acquisitions across purposes.
pub struct TrackCoordinator {
    fetcher: Arc<TrackFetcher>,
    serializer: RequestSerializer,
    params: LiveParameters,
    base_param_count: usize,
    active: Mutex<ActiveTasks>,
    status: StatusHub,
}

impl TrackCoordinator {
    pub fn new(fetcher: TrackFetcher, params: LiveParameters) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            serializer: RequestSerializer::new(),
            params,
            base_param_count: DEFAULT_BASE_PARAM_COUNT,
            active: Mutex::new(ActiveTasks::default()),
            status: StatusHub::default(),
        }
    }

    /// How many base parameters to send for genres other than the active one.
    pub fn with_base_param_count(mut self, count: usize) -> Self {
        self.base_param_count = count;
        self
    }

    pub fn params(&self) -> &LiveParameters {
        &self.params
    }

    pub fn serializer(&self) -> &RequestSerializer {
        &self.serializer
    }

    /// Subscribe to status notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.status.subscribe()
    }

    /// Acquire one track for `genre`.
    ///
    /// Cancels any outstanding acquisition with the same purpose first. A
    /// cancelled acquisition resolves as [`Acquisition::Aborted`] even if
    /// the provider call behind it eventually succeeds.
    pub async fn acquire(&self, genre: &GenreSelector, purpose: Purpose) -> Acquisition {
        let task = self.begin(genre, purpose);
        self.run(task).await
    }

    /// Register a new task for `purpose`, cancelling the one it supersedes.
    ///
    /// Split from [`run`](Self::run) so callers that hand the work to a
    /// spawned task still supersede synchronously.
    pub fn begin(&self, genre: &GenreSelector, purpose: Purpose) -> AcquisitionTask {
        let task = {
            let mut active = self.active.lock();
            if let Some(old) = active.by_purpose.remove(&purpose) {
                tracing::debug!(
                    "Acquisition #{} for {} superseded [{}]",
                    old.id,
                    old.genre,
                    purpose
                );
                old.token.cancel();
            }

            active.next_id = active.next_id.wrapping_add(1);
            let task = AcquisitionTask {
                id: active.next_id,
                purpose,
                genre: genre.clone(),
                token: CancellationToken::new(),
            };
            active.by_purpose.insert(purpose, task.clone());
            task
        };
        self.status.emit(purpose, genre, AcquisitionStatus::Loading);
        task
    }

    /// Drive a task from [`begin`](Self::begin) to its outcome.
    pub async fn run(&self, task: AcquisitionTask) -> Acquisition {
        let purpose = task.purpose;
        let genre = &task.genre;

        let fetcher = Arc::clone(&self.fetcher);
        let params = self.params.clone();
        let base_count = self.base_param_count;
        let job_genre = task.genre.clone();
        let job_token = task.token.clone();

        let result = self
            .serializer
            .enqueue(&task.token, move || {
                async move {
                    let request = TrackRequest {
                        phrase: params.catalog().search_phrase(&job_genre).to_string(),
                        params: params.effective_for(&job_genre, base_count),
                        genre: job_genre,
                    };
                    fetcher.fetch_track(&request, &job_token).await
                }
                .boxed()
            })
            .await;

        self.finish(&task);
        let outcome = classify(&task.token, result);

        match &outcome {
            Acquisition::Ready(track) => {
                tracing::info!(
                    "Acquired \"{}\" ({}) for {} [{}]",
                    track.title,
                    track.id,
                    genre,
                    purpose
                );
                self.status.emit(purpose, genre, AcquisitionStatus::Ready);
            }
            Acquisition::Aborted => {
                tracing::debug!("Acquisition #{} for {} [{}] aborted", task.id, genre, purpose);
                self.status.emit(purpose, genre, AcquisitionStatus::Aborted);
            }
            Acquisition::Failed(e) => {
                tracing::warn!("Acquisition for {} [{}] failed: {}", genre, purpose, e);
                self.status
                    .emit(purpose, genre, AcquisitionStatus::Failed(e.to_string()));
            }
        }

        outcome
    }

    /// Cancel the outstanding acquisition for `purpose`, if any.
    pub fn cancel(&self, purpose: Purpose) -> bool {
        let task = self.active.lock().by_purpose.remove(&purpose);
        match task {
            Some(task) => {
                tracing::debug!("Cancelling acquisition #{} [{}]", task.id, purpose);
                task.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every outstanding acquisition.
    pub fn cancel_all(&self) {
        for purpose in Purpose::ALL {
            self.cancel(purpose);
        }
    }

    /// Whether an acquisition for `purpose` is outstanding.
    pub fn is_in_flight(&self, purpose: Purpose) -> bool {
        self.active.lock().by_purpose.contains_key(&purpose)
    }

    fn finish(&self, task: &AcquisitionTask) {
        let mut active = self.active.lock();
        if active.by_purpose.get(&task.purpose).map(|t| t.id) == Some(task.id) {
            active.by_purpose.remove(&task.purpose);
        }
    }
}

/// Cancellation takes precedence over whatever the provider returned.
fn classify(
    token: &CancellationToken,
    result: Result<TrackMetadata, ProviderError>,
) -> Acquisition {
    if token.is_cancelled() {
        return Acquisition::Aborted;
    }
    match result {
        Ok(track) => Acquisition::Ready(track),
        Err(e) if e.is_cancelled() => Acquisition::Aborted,
        Err(e) => Acquisition::Failed(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::traits::mocks::MockSearch;
    use crate::test_utils::{lofi, mock_candidate, test_coordinator};
    use tokio::sync::Semaphore;

    #[tokio::test]
    async fn test_acquire_ready() {
        let mock = Arc::new(MockSearch::returning(vec![mock_candidate("a")]));
        let coordinator = test_coordinator(mock.clone());

        let outcome = coordinator.acquire(&lofi(), Purpose::GenreSwitch).await;

        assert_eq!(outcome.track().unwrap().id, "a");
        assert!(!coordinator.is_in_flight(Purpose::GenreSwitch));
        assert_eq!(mock.queries(), vec!["lofi hip hop beat".to_string()]);
    }

    #[tokio::test]
    async fn test_same_purpose_supersedes_previous() {
        let gate = Arc::new(Semaphore::new(0));
        let mock = Arc::new(
            MockSearch::returning(vec![mock_candidate("a"), mock_candidate("b")])
                .gated(gate.clone()),
        );
        let coordinator = Arc::new(test_coordinator(mock.clone()));

        let first = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.acquire(&lofi(), Purpose::ExplicitNext).await })
        };
        tokio::task::yield_now().await;

        let second = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.acquire(&lofi(), Purpose::ExplicitNext).await })
        };
        tokio::task::yield_now().await;

        let first = first.await.unwrap();
        assert!(first.is_aborted());

        gate.add_permits(2);
        let second = second.await.unwrap();
        assert_eq!(second.track().unwrap().id, "b");
    }

    #[tokio::test]
    async fn test_different_purposes_do_not_cancel_each_other() {
        let mock = Arc::new(MockSearch::returning(vec![mock_candidate("a"), mock_candidate("b")]));
        let coordinator = test_coordinator(mock);
        let genre = lofi();

        let (prefetch, explicit) = tokio::join!(
            coordinator.acquire(&genre, Purpose::Prefetch),
            coordinator.acquire(&genre, Purpose::ExplicitNext),
        );

        assert!(prefetch.is_ready());
        assert!(explicit.is_ready());
    }

    #[tokio::test]
    async fn test_cancelled_task_discards_late_success() {
        let gate = Arc::new(Semaphore::new(0));
        let mock = Arc::new(MockSearch::returning(vec![mock_candidate("a")]).gated(gate.clone()));
        let coordinator = Arc::new(test_coordinator(mock.clone()));

        let pending = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.acquire(&lofi(), Purpose::Prefetch).await })
        };
        tokio::task::yield_now().await;

        assert!(coordinator.cancel(Purpose::Prefetch));
        gate.add_permits(1);

        assert!(pending.await.unwrap().is_aborted());
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_parameters_read_at_dispatch_time() {
        let gate = Arc::new(Semaphore::new(0));
        let mock = Arc::new(
            MockSearch::returning(vec![mock_candidate("a"), mock_candidate("b")])
                .gated(gate.clone()),
        );
        let coordinator = Arc::new(test_coordinator(mock));
        coordinator.params().set_active_genre(lofi());

        // Occupy the serializer so the prefetch has to wait its turn
        let blocker = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.acquire(&lofi(), Purpose::GenreSwitch).await })
        };
        tokio::task::yield_now().await;

        let queued = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.acquire(&lofi(), Purpose::Prefetch).await })
        };
        tokio::task::yield_now().await;

        coordinator.params().set_param("warmth", 5.0);
        gate.add_permits(2);

        assert_eq!(blocker.await.unwrap().track().unwrap().params.get("warmth"), Some(70.0));
        let queued = queued.await.unwrap();
        assert_eq!(queued.track().unwrap().params.get("warmth"), Some(5.0));
    }

    #[tokio::test]
    async fn test_cross_genre_request_uses_base_parameters() {
        let mock = Arc::new(MockSearch::returning(vec![mock_candidate("a")]));
        let coordinator = test_coordinator(mock);
        coordinator.params().set_active_genre(lofi());

        let outcome = coordinator
            .acquire(&GenreSelector::new("Synthwave"), Purpose::Prefetch)
            .await;

        let params = &outcome.track().unwrap().params;
        assert_eq!(params.len(), DEFAULT_BASE_PARAM_COUNT);
        assert_eq!(params.get("drive"), Some(60.0));
        assert_eq!(params.get("gated_reverb"), None);
    }

    #[tokio::test]
    async fn test_no_results_fails_and_notifies() {
        let mock = Arc::new(MockSearch::always(Ok(vec![])));
        let coordinator = test_coordinator(mock);
        let mut events = coordinator.subscribe();

        let outcome = coordinator.acquire(&lofi(), Purpose::ExplicitNext).await;

        assert!(matches!(outcome, Acquisition::Failed(ProviderError::NoResults(_))));
        assert_eq!(events.recv().await.unwrap().status, AcquisitionStatus::Loading);
        assert!(matches!(
            events.recv().await.unwrap().status,
            AcquisitionStatus::Failed(_)
        ));
    }

    #[tokio::test]
    async fn test_cancel_without_outstanding_task() {
        let coordinator = test_coordinator(Arc::new(MockSearch::always(Ok(vec![]))));
        assert!(!coordinator.cancel(Purpose::GenreSwitch));
    }

    #[test]
    fn test_purpose_tags() {
        assert_eq!(Purpose::ExplicitNext.to_string(), "explicit-next");
        assert_eq!(Purpose::Prefetch.as_str(), "prefetch");
        assert_eq!(Purpose::GenreSwitch.as_str(), "genre-switch");
    }
}
