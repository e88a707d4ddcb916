//! Genre Radio - genre-driven track acquisition and playback queueing.
//!
//! Picks a genre, fetches a random matching track from a search provider,
//! plays it, and prefetches the next one in the background so playback
//! doesn't stall. Provider calls are single-flight, retried with linear
//! backoff, and cancelled per purpose.
//!
//! - [`genre`]: genre catalog and live tone parameters
//! - [`provider`]: search client, retry, random track pick
//! - [`acquisition`]: request serializer and per-purpose coordinator
//! - [`player`]: queue model, prefetch scheduler, audio synchronizer
//! - [`session`]: the facade a UI drives

pub mod acquisition;
pub mod cli;
pub mod config;
pub mod error;
pub mod genre;
pub mod player;
pub mod provider;
pub mod session;
#[cfg(test)]
pub mod test_utils;

pub use error::{Error, Result};
