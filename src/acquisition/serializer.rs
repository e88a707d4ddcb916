//! Single-flight execution of provider jobs.
//!
//! At most one job runs at any time, system-wide. Waiting jobs are admitted
//! in submission order (tokio's mutex is FIFO-fair). A job whose token is
//! cancelled while it waits is skipped without ever running.
//!
//! A job that is already running when its token is cancelled keeps the slot
//! until it settles; only the caller stops waiting for it.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::BoxFuture;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::provider::ProviderError;

/// Serializes provider jobs behind a single slot.
#[derive(Debug, Clone, Default)]
pub struct RequestSerializer {
    slot: Arc<Mutex<()>>,
    waiting: Arc<AtomicUsize>,
}

impl RequestSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of jobs waiting for the slot.
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    /// Run `job` once the slot is free.
    ///
    /// Resolves to [`ProviderError::Cancelled`] as soon as `token` fires,
    /// whether the job is still queued or already running.
    pub async fn enqueue<T, F>(&self, token: &CancellationToken, job: F) -> Result<T, ProviderError>
    where
        T: Send + 'static,
        F: FnOnce() -> BoxFuture<'static, Result<T, ProviderError>> + Send + 'static,
    {
        self.waiting.fetch_add(1, Ordering::SeqCst);
        let permit = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            permit = self.slot.clone().lock_owned() => Some(permit),
        };
        self.waiting.fetch_sub(1, Ordering::SeqCst);

        let Some(permit) = permit else {
            tracing::debug!("Skipping cancelled job before it started");
            return Err(ProviderError::Cancelled);
        };

        let running = tokio::spawn(async move {
            let _permit = permit;
            job().await
        });

        tokio::select! {
            biased;
            _ = token.cancelled() => Err(ProviderError::Cancelled),
            joined = running => match joined {
                Ok(result) => result,
                Err(e) => Err(ProviderError::Internal(e.to_string())),
            },
        }
    }
}
