//! File watcher for `NavRoute.json`.
//!
//! The journal tail itself stays on a poll interval; only the route file
//! gets a watcher, because the game rewrites it at arbitrary moments and a
//! stale route is immediately visible to the player.

use anyhow::{Context, Result};
use edscout_journal::navroute::NAV_ROUTE_FILE;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use tracing::{debug, error};

use crate::modules::route::RouteDirty;

/// Start watching the journal directory for route rewrites. Returns the
/// watcher handle (must be kept alive).
pub fn start_route_watcher(journal_dir: &Path, dirty: RouteDirty) -> Result<RecommendedWatcher> {
    let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
        match res {
            Ok(event) => {
                let relevant = matches!(
                    event.kind,
                    notify::EventKind::Create(_) | notify::EventKind::Modify(_)
                ) && event
                    .paths
                    .iter()
                    .any(|p| p.file_name().is_some_and(|n| n == NAV_ROUTE_FILE));
                if relevant {
                    debug!("route file changed");
                    dirty.mark();
                }
            }
            Err(e) => error!("route watcher error: {e}"),
        }
    })
    .context("Failed to create route watcher")?;

    watcher
        .watch(journal_dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch {}", journal_dir.display()))?;

    Ok(watcher)
}
