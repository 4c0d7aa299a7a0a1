//! The `--dump-heads` diagnostic.
//!
//! Prints the head set the cache was built from next to the freshly
//! resolved one, and whether the next sorting run would rebuild history.

use upsort_core::{Config, HeadSet, HistoryCache, SortError, resolve_heads};
use upsort_git::GitBackend;

pub fn run(config: &Config, git: &dyn GitBackend, cache: &HistoryCache) -> Result<(), SortError> {
    let cached: Option<HeadSet> = cache.load().map(|(heads, _)| heads);

    println!("Cached heads:");
    match &cached {
        Some(heads) => {
            for head in heads {
                println!("  {head}");
            }
        }
        None => println!("  (none)"),
    }

    let current = resolve_heads(config, git)?;
    println!("Current heads:");
    for head in &current {
        println!("  {head}");
    }

    let action = if cached.as_ref() == Some(&current) {
        "Will not"
    } else {
        "Will"
    };
    println!("{action} rebuild history");
    Ok(())
}
