//! Track acquisition - single-flight provider access with per-purpose cancellation.
//!
//! ```text
//! Session ──acquire(genre, purpose)──▶ TrackCoordinator
//!                                        │ cancel same-purpose task
//!                                        │ resolve parameters at dispatch
//!                                        ▼
//!                                  RequestSerializer (one job at a time, FIFO)
//!                                        │
//!                                        ▼
//!                                  TrackFetcher (retry, random pick)
//! ```

pub mod coordinator;
pub mod serializer;
pub mod status;

pub use coordinator::{
    Acquisition, AcquisitionTask, DEFAULT_BASE_PARAM_COUNT, Purpose, TrackCoordinator,
};
pub use serializer::RequestSerializer;
pub use status::{AcquisitionStatus, StatusEvent, StatusHub};
