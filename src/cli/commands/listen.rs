//! Session simulation on a fake audio clock.
//!
//! Nothing is decoded: the simulated resource becomes ready as soon as a
//! source is assigned and its clock advances `speed` seconds per real
//! second. Everything else (acquisition, prefetch, queue, synchronizer) is
//! the real thing.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Runtime;

use super::build_coordinator;
use crate::acquisition::{AcquisitionStatus, Purpose};
use crate::config::Config;
use crate::genre::GenreSelector;
use crate::player::{AudioResource, PlaybackFault, ResourceEvent, SyncSignal, format_secs};
use crate::session::Session;

/// Duration assumed when the provider didn't report one
const FALLBACK_DURATION_SECS: f64 = 30.0;

/// Real time between clock ticks
const TICK: Duration = Duration::from_millis(100);

/// Audio resource that only keeps time.
#[derive(Debug, Default)]
struct SimulatedResource {
    source: Option<String>,
    position: f64,
    duration: Option<f64>,
    ready: bool,
    playing: bool,
}

impl AudioResource for SimulatedResource {
    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn set_source(&mut self, url: &str) {
        self.source = Some(url.to_string());
        self.position = 0.0;
        self.duration = None;
        self.ready = false;
        self.playing = false;
    }

    fn clear_source(&mut self) {
        *self = Self::default();
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn set_position(&mut self, secs: f64) {
        self.position = secs;
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn play(&mut self) -> Result<(), PlaybackFault> {
        if self.source.is_none() {
            return Err(PlaybackFault::Play("no source".to_string()));
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }
}

/// Play `tracks` tracks of `genre` on a simulated clock
pub fn cmd_listen(
    rt: &Runtime,
    config: &Config,
    genre: &str,
    api_key: Option<&str>,
    tracks: u32,
    speed: u32,
) -> anyhow::Result<()> {
    let coordinator = Arc::new(build_coordinator(config, api_key)?);
    let step = TICK.as_secs_f64() * f64::from(speed.max(1));

    rt.block_on(async {
        let mut session = Session::new(coordinator, SimulatedResource::default(), &config.playback);
        let mut status = session.subscribe();
        session.select_genre(GenreSelector::new(genre))?;

        let mut finished = 0;
        let mut ticker = tokio::time::interval(TICK);

        while finished < tracks {
            ticker.tick().await;

            while let Ok(event) = status.try_recv() {
                if let AcquisitionStatus::Failed(message) = &event.status {
                    eprintln!("✗ {} [{}]: {}", event.genre, event.purpose, message);
                }
            }

            while let Some(completion) = session.try_completion() {
                let purpose = completion.purpose;
                if session.apply_completion(completion)
                    && purpose == Purpose::Prefetch
                    && let Some(next) = session.queue().next()
                {
                    let left = session.synchronizer().state().remaining().unwrap_or(0.0);
                    println!("  queued next: {} ({} left)", next.title, format_secs(left));
                }
            }

            if session.current().is_none() {
                if !is_busy(&session) {
                    // The last completion may still be on its way
                    match tokio::time::timeout(TICK, session.next_completion()).await {
                        Ok(Some(completion)) => {
                            session.apply_completion(completion);
                        }
                        _ => anyhow::bail!("Could not acquire a track for \"{}\"", genre),
                    }
                }
                continue;
            }

            // Finish loading as soon as a source is assigned
            if session.resource().source().is_some() && !session.resource().is_ready() {
                let duration = session
                    .current()
                    .and_then(|t| t.duration_secs)
                    .unwrap_or(FALLBACK_DURATION_SECS);
                {
                    let resource = session.resource_mut();
                    resource.ready = true;
                    resource.duration = Some(duration);
                }
                if let Some(track) = session.current() {
                    println!("▶ {} ({})", track.title, format_secs(duration));
                }
                if let SyncSignal::Faulted(fault) = session.on_resource_event(ResourceEvent::Ready) {
                    anyhow::bail!("Playback failed: {}", fault);
                }
                continue;
            }

            if !session.resource().is_playing() {
                if !is_busy(&session) {
                    match tokio::time::timeout(TICK, session.next_completion()).await {
                        Ok(Some(completion)) => {
                            session.apply_completion(completion);
                        }
                        _ => anyhow::bail!("Playback stalled with nothing left to play"),
                    }
                }
                continue;
            }

            let duration = session.resource().duration().unwrap_or(FALLBACK_DURATION_SECS);
            let position = (session.resource().position() + step).min(duration);
            session.resource_mut().position = position;
            session.on_resource_event(ResourceEvent::PositionChanged(position));

            if position >= duration {
                finished += 1;
                println!("  finished after {}", format_secs(duration));
                if finished < tracks {
                    session.on_resource_event(ResourceEvent::Ended);
                }
            }
        }

        println!("\nPlayed {} tracks:", session.queue().len());
        for track in session.queue().history() {
            println!("  {} - {}", track.id, track.title);
        }
        session.end();
        Ok(())
    })
}

fn is_busy(session: &Session<SimulatedResource>) -> bool {
    Purpose::ALL
        .iter()
        .any(|p| session.coordinator().is_in_flight(*p))
}
