//! Genre catalog listing.

use crate::config::Config;
use crate::genre::GenreCatalog;

/// List known genres and their base parameters
pub fn cmd_genres(config: &Config) -> anyhow::Result<()> {
    let catalog = GenreCatalog::builtin();
    let base_count = config.playback.base_param_count;

    println!("{} genres:\n", catalog.len());
    for genre in catalog.iter() {
        println!("{}", genre.label);
        println!("  search: \"{}\"", genre.search_phrase);
        for (i, param) in genre.params.iter().enumerate() {
            let marker = if i < base_count { "*" } else { " " };
            println!(
                "  {} {:<14} {:>5.0}  ({:.0}-{:.0})",
                marker, param.label, param.default, param.min, param.max
            );
        }
        println!();
    }
    println!("* base parameters used for cross-genre requests");
    Ok(())
}
