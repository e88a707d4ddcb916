//! One-shot track acquisition.

use tokio::runtime::Runtime;

use super::build_coordinator;
use crate::acquisition::{Acquisition, Purpose};
use crate::config::Config;
use crate::genre::GenreSelector;
use crate::player::format_secs;

/// Acquire `count` tracks for `genre` and print them
pub fn cmd_fetch(
    rt: &Runtime,
    config: &Config,
    genre: &str,
    api_key: Option<&str>,
    count: u32,
) -> anyhow::Result<()> {
    let genre = GenreSelector::new(genre);
    if genre.label().is_empty() {
        anyhow::bail!("Genre must not be empty");
    }

    let coordinator = build_coordinator(config, api_key)?;
    coordinator.params().set_active_genre(genre.clone());
    if coordinator.params().catalog().find(&genre).is_none() {
        println!("Note: \"{}\" is not in the catalog; searching by label", genre);
    }

    rt.block_on(async {
        let mut failures = 0;
        for i in 1..=count {
            println!("Fetching {} ({}/{})...", genre, i, count);
            match coordinator.acquire(&genre, Purpose::ExplicitNext).await {
                Acquisition::Ready(track) => {
                    println!("✓ {}", track.title);
                    println!("  id:       {}", track.id);
                    println!("  url:      {}", track.url);
                    println!(
                        "  duration: {}",
                        track
                            .duration_secs
                            .map(format_secs)
                            .unwrap_or_else(|| "unknown".to_string())
                    );
                    if let Some(bpm) = track.tempo_bpm {
                        println!("  tempo:    {:.0} bpm", bpm);
                    }
                    let params: Vec<String> = track
                        .params
                        .iter()
                        .map(|(id, value)| format!("{}={:.0}", id, value))
                        .collect();
                    if !params.is_empty() {
                        println!("  params:   {}", params.join(", "));
                    }
                    println!();
                }
                Acquisition::Aborted => println!("Aborted"),
                Acquisition::Failed(e) => {
                    eprintln!("✗ {}", e);
                    failures += 1;
                }
            }
        }

        if failures == count && count > 0 {
            anyhow::bail!("All {} acquisitions failed", count);
        }
        Ok(())
    })
}
