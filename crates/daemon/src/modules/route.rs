//! Route progress module.
//!
//! Tracks the plotted NavRoute and where along it the player is. The route
//! file is rewritten wholesale by the game, so the module reloads it when
//! the file watcher flags a change (or when the journal itself reports a
//! `NavRoute`/`NavRouteClear` event) and otherwise just matches arrivals
//! against the remaining entries.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use edscout_core::JournalEvent;
use edscout_journal::navroute::{self, RouteEntry};
use tracing::info;

use crate::bus::{DispatchMode, JournalModule};
use crate::modules::NoticeSender;

/// Shared flag the NavRoute file watcher sets; the module reloads on the
/// next event it sees.
#[derive(Clone, Default)]
pub struct RouteDirty(Arc<AtomicBool>);

impl RouteDirty {
    pub fn mark(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

pub struct RouteModule {
    journal_dir: PathBuf,
    dirty: RouteDirty,
    notices: Option<NoticeSender>,
    route: Vec<RouteEntry>,
    /// Index of the next unvisited entry.
    position: usize,
}

impl RouteModule {
    pub fn new(
        journal_dir: PathBuf,
        notices: Option<NoticeSender>,
    ) -> (RouteModule, RouteDirty) {
        let dirty = RouteDirty::default();
        let module = RouteModule {
            journal_dir,
            dirty: dirty.clone(),
            notices,
            route: Vec::new(),
            position: 0,
        };
        (module, dirty)
    }

    pub fn next_jump(&self) -> Option<&RouteEntry> {
        self.route.get(self.position)
    }

    pub fn remaining(&self) -> usize {
        self.route.len().saturating_sub(self.position)
    }

    fn reload(&mut self) {
        self.route = navroute::read_route(&self.journal_dir);
        self.position = 0;
        info!("route reloaded: {} jump(s) plotted", self.route.len());
    }

    fn mark_arrival(&mut self, system: &str, mode: DispatchMode) {
        let Some(idx) = self.route[self.position..]
            .iter()
            .position(|e| e.star_system.eq_ignore_ascii_case(system))
        else {
            return;
        };
        self.position += idx + 1;

        if mode == DispatchMode::Historical {
            return;
        }
        match self.next_jump() {
            Some(next) => {
                let fuel = if next.scoopable() {
                    "scoopable"
                } else {
                    "not scoopable"
                };
                let text = format!(
                    "{} jump(s) remaining, next: {} ({fuel})",
                    self.remaining(),
                    next.star_system
                );
                info!("{text}");
                if let Some(tx) = &self.notices {
                    let _ = tx.send(text);
                }
            }
            None => {
                info!("route complete");
                if let Some(tx) = &self.notices {
                    let _ = tx.send("Route complete".to_string());
                }
            }
        }
    }
}

impl JournalModule for RouteModule {
    fn name(&self) -> &'static str {
        "route"
    }

    fn on_load(&mut self) -> anyhow::Result<()> {
        self.reload();
        Ok(())
    }

    fn handle_event(&mut self, event: &JournalEvent, mode: DispatchMode) -> anyhow::Result<()> {
        if self.dirty.take() || matches!(event.kind.as_str(), "NavRoute" | "NavRouteClear") {
            self.reload();
        }
        if let Some(system) = event.arrival_system() {
            self.mark_arrival(system, mode);
        }
        Ok(())
    }
}
