//! The reconciliation engine.
//!
//! All snapshot mutation happens here, on the single run-loop task. Remote
//! fetches and scan submissions are spawned; their results come back over a
//! channel tagged with the system they were requested for, and anything that
//! lands after the player has moved on is discarded.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use edscout_core::{
    BodyIdentity, BodyRecord, EngineError, JournalEvent, Payload, RemoteSystem, SystemSnapshot,
};
use edscout_edsm::EdsmClient;
use edscout_journal::{JournalTailer, SyncReport, full_sync};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::bus::{DispatchMode, ModuleBus};

/// Outcome of a spawned bodies fetch, tagged with the system it was for.
#[derive(Debug)]
pub struct FetchResult {
    pub system: String,
    pub result: Result<RemoteSystem, EngineError>,
}

/// Side effects the engine wants performed. Kept as data so the state
/// transitions stay synchronous and testable; the run loop spawns them.
#[derive(Debug, PartialEq, Eq)]
pub enum EngineAction {
    FetchBodies(String),
    /// Raw journal line of a scan EDSM does not know yet.
    SubmitScan(String),
}

pub struct Engine {
    snapshot: SystemSnapshot,
    bus: ModuleBus,
    /// Identities the remote database already lists for the current system;
    /// scans of these are not submitted again.
    known_remote: HashSet<BodyIdentity>,
    submit_enabled: bool,
}

impl Engine {
    pub fn new(bus: ModuleBus, submit_enabled: bool) -> Engine {
        Engine {
            snapshot: SystemSnapshot::new(""),
            bus,
            known_remote: HashSet::new(),
            submit_enabled,
        }
    }

    pub fn snapshot(&self) -> &SystemSnapshot {
        &self.snapshot
    }

    pub fn load_modules(&mut self) {
        self.bus.load_all();
    }

    pub fn shutdown_modules(&mut self) {
        self.bus.shutdown_all();
    }

    /// Adopt the full-sync result: replay every journal file to the modules
    /// in historical mode, oldest first, take over the reconstructed
    /// snapshot, and request the remote listing for the current system.
    pub fn bootstrap(&mut self, report: &SyncReport) -> Vec<EngineAction> {
        for event in &report.replay {
            self.bus.dispatch(event, DispatchMode::Historical);
        }
        self.snapshot = report.snapshot.clone();
        info!(
            "synced: {} with {} known bod{}",
            report.current_system,
            self.snapshot.len(),
            if self.snapshot.len() == 1 { "y" } else { "ies" }
        );
        vec![EngineAction::FetchBodies(report.current_system.clone())]
    }

    /// Apply one decoded event. Returns the side effects to perform.
    pub fn apply_event(&mut self, event: &JournalEvent, mode: DispatchMode) -> Vec<EngineAction> {
        let mut actions = Vec::new();

        match &event.payload {
            Payload::Arrival(arrival) => {
                // Unconditional, even for the system already tracked: a relog
                // lands here too, and the grid rebuilds from the refetch.
                info!("arrived at {}", arrival.star_system);
                self.snapshot = SystemSnapshot::new(&arrival.star_system);
                self.known_remote.clear();
                actions.push(EngineAction::FetchBodies(arrival.star_system.clone()));
            }
            Payload::Scan(scan) => {
                if scan.belongs_to(self.snapshot.system()) {
                    if let Some(record) = BodyRecord::from_scan(self.snapshot.system(), scan) {
                        let identity = record.identity.clone();
                        self.snapshot.ingest_observed(record);
                        self.snapshot.sort_by_distance();
                        if mode == DispatchMode::Live
                            && self.submit_enabled
                            && !self.known_remote.contains(&identity)
                        {
                            actions.push(EngineAction::SubmitScan(event.raw().to_string()));
                        }
                    }
                }
            }
            Payload::SignalsFound(found) => {
                let geo = found
                    .signals
                    .iter()
                    .any(|s| s.signal_type.contains("Geological"));
                let bio = found
                    .signals
                    .iter()
                    .any(|s| s.signal_type.contains("Biological"));
                self.snapshot.apply_signals(&found.body_name, geo, bio);
            }
            Payload::AllBodiesFound(found) => {
                if found.system_name.eq_ignore_ascii_case(self.snapshot.system()) {
                    self.snapshot.all_bodies_found = true;
                }
            }
            Payload::DiscoveryScan(disco) => {
                let matches = disco
                    .system_name
                    .as_deref()
                    .is_none_or(|s| s.eq_ignore_ascii_case(self.snapshot.system()));
                if matches {
                    self.snapshot.body_count = Some(disco.body_count);
                }
            }
            _ => {}
        }

        self.bus.dispatch(event, mode);
        actions
    }

    /// Fold a completed bodies fetch into the snapshot, unless the player
    /// has already moved on.
    pub fn apply_fetch(&mut self, fetch: FetchResult) {
        if !fetch.system.eq_ignore_ascii_case(self.snapshot.system()) {
            let stale = EngineError::StaleRemote {
                requested: fetch.system,
                current: self.snapshot.system().to_string(),
            };
            debug!("{stale}");
            return;
        }

        match fetch.result {
            Ok(listing) => {
                if !listing.is_known() {
                    info!("{} is not in the remote database", fetch.system);
                }
                self.known_remote = listing
                    .bodies
                    .iter()
                    .filter_map(|b| b.to_record(self.snapshot.system()))
                    .map(|r| r.identity)
                    .collect();
                let inserted = self.snapshot.ingest_remote(&listing);
                self.snapshot.sort_by_distance();
                if inserted > 0 {
                    info!(
                        "remote listing added {inserted} bod{} for {}",
                        if inserted == 1 { "y" } else { "ies" },
                        fetch.system
                    );
                }
            }
            Err(e) => warn!("remote lookup failed for {}: {e}", fetch.system),
        }
    }
}

/// The daemon's single run loop: full sync, then poll ticks, fetch results,
/// and shutdown, multiplexed on one task.
pub async fn run_engine(
    journal_dir: PathBuf,
    poll_interval: Duration,
    mut engine: Engine,
    client: Option<Arc<EdsmClient>>,
    credentials: Option<(String, String)>,
    mut shutdown: watch::Receiver<bool>,
) {
    let (fetch_tx, mut fetch_rx) = mpsc::unbounded_channel::<FetchResult>();

    engine.load_modules();

    // Establish ground truth before the tail starts consuming, so the tick
    // loop can never race the orchestrator.
    let mut tailer = match full_sync(&journal_dir) {
        Ok(report) => {
            let actions = engine.bootstrap(&report);
            perform_actions(actions, &client, &credentials, &fetch_tx);
            JournalTailer::resume(report.cursor)
        }
        Err(e) => {
            error!("startup sync failed: {e}; waiting for journal files");
            JournalTailer::new()
        }
    };

    let mut tick = tokio::time::interval(poll_interval);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let poll = tailer.poll(&journal_dir);
                for line in &poll.lines {
                    if let Some(event) = JournalEvent::decode(line) {
                        let actions = engine.apply_event(&event, DispatchMode::Live);
                        perform_actions(actions, &client, &credentials, &fetch_tx);
                    }
                }
            }

            Some(fetch) = fetch_rx.recv() => {
                engine.apply_fetch(fetch);
            }

            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    info!("engine shutting down");
                    break;
                }
            }
        }
    }

    engine.shutdown_modules();
}

fn perform_actions(
    actions: Vec<EngineAction>,
    client: &Option<Arc<EdsmClient>>,
    credentials: &Option<(String, String)>,
    fetch_tx: &mpsc::UnboundedSender<FetchResult>,
) {
    let Some(client) = client else { return };

    for action in actions {
        match action {
            EngineAction::FetchBodies(system) => {
                let client = Arc::clone(client);
                let tx = fetch_tx.clone();
                tokio::spawn(async move {
                    let result = client.bodies(&system).await;
                    let _ = tx.send(FetchResult { system, result });
                });
            }
            EngineAction::SubmitScan(raw) => {
                let Some((commander, api_key)) = credentials.clone() else {
                    continue;
                };
                let client = Arc::clone(client);
                tokio::spawn(async move {
                    if let Err(e) = client.submit_events(&commander, &api_key, &[raw]).await {
                        warn!("scan submission failed: {e}");
                    }
                });
            }
        }
    }
}
