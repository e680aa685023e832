//! Exploration history module.
//!
//! Accumulates a cross-system record of everywhere the player has been and
//! everything they scanned, persisted as JSON in the config directory.
//! Unlike the system snapshot this survives system changes and daemon
//! restarts; it can also be rebuilt from scratch by importing every journal
//! file on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use edscout_core::{BodyRecord, JournalEvent, galaxy::JumponiumTier};
use edscout_journal::{discover, reader};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bus::{DispatchMode, JournalModule};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExplorationHistory {
    pub systems: BTreeMap<String, SystemVisit>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SystemVisit {
    pub first_visited: Option<DateTime<Utc>>,
    pub last_visited: Option<DateTime<Utc>>,
    /// Keyed by full body name.
    #[serde(default)]
    pub bodies: BTreeMap<String, VisitedBody>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitedBody {
    pub type_description: Option<String>,
    pub terraformable: bool,
    pub jumponium: JumponiumTier,
    pub first_discovery: bool,
    pub distance_ls: Option<f64>,
}

impl From<&BodyRecord> for VisitedBody {
    fn from(record: &BodyRecord) -> VisitedBody {
        VisitedBody {
            type_description: record.type_description.clone(),
            terraformable: record.terraformable,
            jumponium: record.jumponium,
            first_discovery: record.first_discovery,
            distance_ls: record.distance_ls,
        }
    }
}

pub struct HistoryModule {
    path: PathBuf,
    history: ExplorationHistory,
    /// System the most recent arrival put us in, for old scans lacking a
    /// StarSystem field.
    current: Option<String>,
    dirty: bool,
}

impl HistoryModule {
    pub fn new(path: PathBuf) -> HistoryModule {
        HistoryModule {
            path,
            history: ExplorationHistory::default(),
            current: None,
            dirty: false,
        }
    }

    pub fn history(&self) -> &ExplorationHistory {
        &self.history
    }

    fn load(&mut self) {
        match std::fs::read_to_string(&self.path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(history) => {
                    self.history = history;
                    info!(
                        "history loaded: {} system(s)",
                        self.history.systems.len()
                    );
                }
                Err(e) => debug!("unparseable history at {}: {e}", self.path.display()),
            },
            Err(e) => debug!("no history at {}: {e}", self.path.display()),
        }
    }

    pub fn save(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let data = serde_json::to_string_pretty(&self.history)?;
        std::fs::write(&self.path, data)
            .with_context(|| format!("writing {}", self.path.display()))?;
        self.dirty = false;
        Ok(())
    }

    fn record_arrival(&mut self, system: &str, timestamp: Option<DateTime<Utc>>) {
        let visit = self.history.systems.entry(system.to_string()).or_default();
        if visit.first_visited.is_none() {
            visit.first_visited = timestamp;
        }
        visit.last_visited = timestamp;
        self.current = Some(system.to_string());
        self.dirty = true;
    }

    fn record_scan(&mut self, event: &JournalEvent) {
        let Some(scan) = event.scan() else { return };
        let Some(system) = scan
            .star_system
            .clone()
            .or_else(|| self.current.clone())
        else {
            return;
        };
        let Some(record) = BodyRecord::from_scan(&system, scan) else {
            return;
        };
        self.history
            .systems
            .entry(system)
            .or_default()
            .bodies
            .insert(record.full_name.clone(), VisitedBody::from(&record));
        self.dirty = true;
    }

    /// Rebuild the history from every journal file on disk, oldest first.
    /// Returns the number of events replayed.
    pub fn import_all(&mut self, journal_dir: &Path) -> Result<usize> {
        let mut files = discover::journal_files(journal_dir);
        files.reverse();

        let mut replayed = 0;
        for file in files {
            for line in reader::read_all_lines(&file) {
                if let Some(event) = JournalEvent::decode(&line) {
                    self.handle_event(&event, DispatchMode::Historical)?;
                    replayed += 1;
                }
            }
        }
        info!(
            "import complete: {replayed} event(s), {} system(s)",
            self.history.systems.len()
        );
        self.save()?;
        Ok(replayed)
    }

    /// Export the history as CSV, one row per body.
    pub fn export_csv(&self, path: &Path) -> Result<()> {
        let mut out = String::from(
            "system,body,type,terraformable,jumponium,first_discovery,distance_ls\n",
        );
        for (system, visit) in &self.history.systems {
            for (body, info) in &visit.bodies {
                let jumponium = match info.jumponium {
                    JumponiumTier::None => "",
                    JumponiumTier::Basic => "basic",
                    JumponiumTier::Standard => "standard",
                    JumponiumTier::Premium => "premium",
                };
                out.push_str(&format!(
                    "{},{},{},{},{},{},{}\n",
                    csv_field(system),
                    csv_field(body),
                    csv_field(info.type_description.as_deref().unwrap_or("")),
                    info.terraformable,
                    jumponium,
                    info.first_discovery,
                    info.distance_ls.map(|d| d.to_string()).unwrap_or_default(),
                ));
            }
        }
        std::fs::write(path, out).with_context(|| format!("writing {}", path.display()))
    }
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

impl JournalModule for HistoryModule {
    fn name(&self) -> &'static str {
        "history"
    }

    fn on_load(&mut self) -> anyhow::Result<()> {
        self.load();
        Ok(())
    }

    fn handle_event(&mut self, event: &JournalEvent, _mode: DispatchMode) -> anyhow::Result<()> {
        if let Some(system) = event.arrival_system() {
            let system = system.to_string();
            self.record_arrival(&system, event.timestamp);
        } else {
            self.record_scan(event);
        }
        Ok(())
    }

    fn on_shutdown(&mut self) -> anyhow::Result<()> {
        self.save()
    }
}
