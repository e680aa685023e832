//! Full-history sync: establish ground truth at startup.
//!
//! The journal rotates per game session, so neither the current system nor
//! the bodies scanned in it are guaranteed to live in the newest file. The
//! sync walks files newest-first and lines newest-first (reverse
//! chronological) so it can stop as soon as it has walked back past the
//! arrival into the current system.

use std::path::Path;

use edscout_core::{BodyRecord, EngineError, JournalEvent, Payload, SystemSnapshot};

use crate::discover;
use crate::reader;
use crate::tail::TailCursor;

/// Everything the startup scan established.
#[derive(Debug)]
pub struct SyncReport {
    pub current_system: String,
    /// Bodies of the current system, sorted by distance from arrival.
    pub snapshot: SystemSnapshot,
    /// End-of-file position of the newest journal; the live tail resumes
    /// here so no already-seen line is replayed.
    pub cursor: TailCursor,
    /// Every event on disk in chronological order (oldest file first), for
    /// historical-mode dispatch so modules can build cross-system state.
    pub replay: Vec<JournalEvent>,
}

/// Scan the journal directory and reconstruct the current state.
///
/// Malformed lines are skipped throughout; only a missing directory or a
/// directory with no journal files is an error.
pub fn full_sync(dir: &Path) -> Result<SyncReport, EngineError> {
    let files = discover::journal_files(dir);
    let newest = files
        .first()
        .cloned()
        .ok_or_else(|| EngineError::JournalDirMissing(dir.to_path_buf()))?;

    let current_system = locate_current_system(&files)
        .ok_or_else(|| EngineError::JournalDirMissing(dir.to_path_buf()))?;

    let mut snapshot = collect_system_bodies(&files, &current_system);
    snapshot.sort_by_distance();

    let end = std::fs::metadata(&newest).map(|m| m.len()).unwrap_or(0);
    let cursor = TailCursor {
        path: newest.clone(),
        offset: end,
    };

    let mut replay = Vec::new();
    for file in files.iter().rev() {
        replay.extend(
            reader::read_all_lines(file)
                .iter()
                .filter_map(|line| JournalEvent::decode(line)),
        );
    }

    Ok(SyncReport {
        current_system,
        snapshot,
        cursor,
        replay,
    })
}

/// Newest-first, reverse-chronological search for the most recent arrival
/// event with a resolvable system name.
fn locate_current_system(files: &[std::path::PathBuf]) -> Option<String> {
    for file in files {
        let lines = reader::read_all_lines(file);
        for line in lines.iter().rev() {
            if let Some(event) = JournalEvent::decode(line) {
                if let Some(system) = event.arrival_system() {
                    return Some(system.to_string());
                }
            }
        }
    }
    None
}

/// Walk backward collecting scans that belong to `system`, stopping at the
/// arrival event into it.
///
/// Walking in reverse means the first record seen for an identity is the
/// most recent one, so dedup is first-wins. Bodies scanned on an earlier
/// visit inside the same walk-back window are attributed to this visit;
/// that matches the long-standing behavior of the scan.
fn collect_system_bodies(files: &[std::path::PathBuf], system: &str) -> SystemSnapshot {
    let mut snapshot = SystemSnapshot::new(system);

    'files: for file in files {
        let lines = reader::read_all_lines(file);
        for line in lines.iter().rev() {
            let Some(event) = JournalEvent::decode(line) else {
                continue;
            };

            match &event.payload {
                Payload::Arrival(arrival) => {
                    if arrival.star_system.eq_ignore_ascii_case(system) {
                        // Walked back past the arrival into the current
                        // system; everything earlier is a previous visit.
                        break 'files;
                    }
                }
                Payload::Scan(scan) => {
                    if scan.belongs_to(system) {
                        if let Some(record) = BodyRecord::from_scan(system, scan) {
                            // First-wins: a newer record for this identity
                            // was already collected.
                            if !snapshot
                                .bodies()
                                .iter()
                                .any(|b| b.identity == record.identity)
                            {
                                snapshot.ingest_observed(record);
                            }
                        }
                    }
                }
                Payload::AllBodiesFound(found) => {
                    if found.system_name.eq_ignore_ascii_case(system) {
                        snapshot.all_bodies_found = true;
                    }
                }
                Payload::DiscoveryScan(disco) => {
                    let matches = disco
                        .system_name
                        .as_deref()
                        .is_none_or(|s| s.eq_ignore_ascii_case(system));
                    if matches && snapshot.body_count.is_none() {
                        snapshot.body_count = Some(disco.body_count);
                    }
                }
                _ => {}
            }
        }
    }

    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{Duration, SystemTime};

    fn write_journal(dir: &Path, name: &str, lines: &[&str], age_secs: u64) {
        let path = dir.join(name);
        fs::write(&path, lines.join("\n") + "\n").unwrap();
        fs::File::open(&path)
            .unwrap()
            .set_modified(SystemTime::now() - Duration::from_secs(age_secs))
            .unwrap();
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            full_sync(&missing),
            Err(EngineError::JournalDirMissing(_))
        ));
        // Present but empty is the same failure.
        assert!(full_sync(dir.path()).is_err());
    }

    #[test]
    fn current_system_comes_from_the_newest_arrival() {
        let dir = tempfile::tempdir().unwrap();
        write_journal(
            dir.path(),
            "Journal.01.log",
            &[
                r#"{"timestamp":"2024-05-01T10:00:00Z","event":"FSDJump","StarSystem":"Sol"}"#,
                r#"{"timestamp":"2024-05-01T10:01:00Z","event":"Scan","BodyName":"Sol","StarSystem":"Sol","StarType":"G"}"#,
                r#"{"timestamp":"2024-05-01T10:02:00Z","event":"Scan","BodyName":"Sol 1","StarSystem":"Sol","PlanetClass":"Rocky body"}"#,
                r#"{"timestamp":"2024-05-01T10:03:00Z","event":"Scan","BodyName":"Sol 2","StarSystem":"Sol","PlanetClass":"Icy body"}"#,
            ],
            120,
        );
        write_journal(
            dir.path(),
            "Journal.02.log",
            &[
                r#"{"timestamp":"2024-05-01T11:00:00Z","event":"FSDJump","StarSystem":"Alpha Centauri"}"#,
                r#"{"timestamp":"2024-05-01T11:01:00Z","event":"Scan","BodyName":"Alpha Centauri B 1","StarSystem":"Alpha Centauri","PlanetClass":"Icy body","DistanceFromArrivalLS":10}"#,
            ],
            0,
        );

        let report = full_sync(dir.path()).unwrap();
        assert_eq!(report.current_system, "Alpha Centauri");
        assert_eq!(report.snapshot.len(), 1);
        assert_eq!(report.snapshot.bodies()[0].full_name, "Alpha Centauri B 1");
        assert!(report.cursor.path.ends_with("Journal.02.log"));
        assert_eq!(
            report.cursor.offset,
            fs::metadata(&report.cursor.path).unwrap().len()
        );
    }

    #[test]
    fn scans_before_the_arrival_are_a_previous_visit() {
        let dir = tempfile::tempdir().unwrap();
        write_journal(
            dir.path(),
            "Journal.01.log",
            &[
                // Earlier visit to Sol with a scan that must NOT count.
                r#"{"timestamp":"2024-05-01T09:00:00Z","event":"FSDJump","StarSystem":"Sol"}"#,
                r#"{"timestamp":"2024-05-01T09:01:00Z","event":"Scan","BodyName":"Sol 9","StarSystem":"Sol","PlanetClass":"Icy body"}"#,
                r#"{"timestamp":"2024-05-01T09:30:00Z","event":"FSDJump","StarSystem":"Wolf 359"}"#,
                // Current visit.
                r#"{"timestamp":"2024-05-01T10:00:00Z","event":"FSDJump","StarSystem":"Sol"}"#,
                r#"{"timestamp":"2024-05-01T10:01:00Z","event":"Scan","BodyName":"Sol 1","StarSystem":"Sol","PlanetClass":"Rocky body"}"#,
            ],
            0,
        );

        let report = full_sync(dir.path()).unwrap();
        assert_eq!(report.current_system, "Sol");
        let names: Vec<_> = report
            .snapshot
            .bodies()
            .iter()
            .map(|b| b.full_name.as_str())
            .collect();
        assert_eq!(names, vec!["Sol 1"]);
    }

    #[test]
    fn bodies_span_rotated_files_until_the_arrival() {
        // Arrival in the older file, scans continuing in the newer one:
        // the walk-back must cross the rotation boundary.
        let dir = tempfile::tempdir().unwrap();
        write_journal(
            dir.path(),
            "Journal.01.log",
            &[
                r#"{"timestamp":"2024-05-01T10:00:00Z","event":"FSDJump","StarSystem":"Sol"}"#,
                r#"{"timestamp":"2024-05-01T10:01:00Z","event":"Scan","BodyName":"Sol 1","StarSystem":"Sol","PlanetClass":"Rocky body","DistanceFromArrivalLS":5}"#,
            ],
            60,
        );
        write_journal(
            dir.path(),
            "Journal.02.log",
            &[
                r#"{"timestamp":"2024-05-01T11:00:00Z","event":"Scan","BodyName":"Sol 2","StarSystem":"Sol","PlanetClass":"Icy body","DistanceFromArrivalLS":100}"#,
                r#"{"timestamp":"2024-05-01T11:05:00Z","event":"FSSAllBodiesFound","SystemName":"Sol","Count":2}"#,
            ],
            0,
        );

        let report = full_sync(dir.path()).unwrap();
        assert_eq!(report.snapshot.len(), 2);
        assert!(report.snapshot.all_bodies_found);
        // Sorted by distance ascending.
        let names: Vec<_> = report
            .snapshot
            .bodies()
            .iter()
            .map(|b| b.full_name.as_str())
            .collect();
        assert_eq!(names, vec!["Sol 1", "Sol 2"]);
    }

    #[test]
    fn rescans_deduplicate_keeping_the_newest() {
        let dir = tempfile::tempdir().unwrap();
        write_journal(
            dir.path(),
            "Journal.01.log",
            &[
                r#"{"timestamp":"2024-05-01T10:00:00Z","event":"FSDJump","StarSystem":"Sol"}"#,
                r#"{"timestamp":"2024-05-01T10:01:00Z","event":"Scan","BodyName":"Sol 1","StarSystem":"Sol","PlanetClass":"Rocky body"}"#,
                r#"{"timestamp":"2024-05-01T10:02:00Z","event":"Scan","BodyName":"Sol 1","StarSystem":"Sol","PlanetClass":"Rocky body","Landable":true}"#,
                r#"{"timestamp":"2024-05-01T10:03:00Z","event":"Scan","BodyName":"Sol A Belt Cluster 1","StarSystem":"Sol"}"#,
                "this line is corrupt {{{",
            ],
            0,
        );

        let report = full_sync(dir.path()).unwrap();
        assert_eq!(report.snapshot.len(), 1);
        // Reverse walk sees the 10:02 record first; it wins.
        assert!(report.snapshot.bodies()[0].landable);
    }

    #[test]
    fn replay_spans_all_files_oldest_first() {
        let dir = tempfile::tempdir().unwrap();
        write_journal(
            dir.path(),
            "Journal.01.log",
            &[
                r#"{"timestamp":"2024-05-01T10:00:00Z","event":"FSDJump","StarSystem":"Sol"}"#,
                r#"{"timestamp":"2024-05-01T10:01:00Z","event":"Scan","BodyName":"Sol 1","StarSystem":"Sol","PlanetClass":"Rocky body"}"#,
            ],
            60,
        );
        write_journal(
            dir.path(),
            "Journal.02.log",
            &[r#"{"timestamp":"2024-05-01T11:00:00Z","event":"FSDJump","StarSystem":"Wolf 359"}"#],
            0,
        );
        let report = full_sync(dir.path()).unwrap();
        let systems: Vec<_> = report
            .replay
            .iter()
            .map(|e| (e.kind.as_str(), e.arrival_system()))
            .collect();
        assert_eq!(
            systems,
            vec![
                ("FSDJump", Some("Sol")),
                ("Scan", None),
                ("FSDJump", Some("Wolf 359")),
            ]
        );
    }
}
