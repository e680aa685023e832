//! The system snapshot and the local/remote reconciliation rules.
//!
//! Precedence: journal observation is authoritative; remote listings only
//! fill gaps. Once a record is `Observed` (or `ObservedOverRemote`) a remote
//! ingestion may fill still-empty fields but never overwrites a populated
//! one and never downgrades the source.

use serde::{Deserialize, Serialize};

use crate::body::{BodyRecord, BodySource};
use crate::identity;
use crate::remote::RemoteSystem;

/// All known bodies for the currently-tracked system.
///
/// Replaced wholesale on system change; at most one record per canonical
/// identity at all times.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSnapshot {
    system: String,
    bodies: Vec<BodyRecord>,
    pub all_bodies_found: bool,
    /// Total body count reported by a discovery scan, when known.
    pub body_count: Option<u32>,
}

/// What an ingest call did to the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Inserted,
    Merged,
}

impl SystemSnapshot {
    pub fn new(system: impl Into<String>) -> SystemSnapshot {
        SystemSnapshot {
            system: system.into(),
            bodies: Vec::new(),
            all_bodies_found: false,
            body_count: None,
        }
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn bodies(&self) -> &[BodyRecord] {
        &self.bodies
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    fn position_of(&self, record: &BodyRecord) -> Option<usize> {
        self.bodies.iter().position(|b| b.identity == record.identity)
    }

    /// Ingest a directly-observed record (from a `Scan` event).
    ///
    /// Returns the outcome plus the index of the resulting record.
    pub fn ingest_observed(&mut self, record: BodyRecord) -> (IngestOutcome, usize) {
        match self.position_of(&record) {
            None => {
                self.bodies.push(record);
                (IngestOutcome::Inserted, self.bodies.len() - 1)
            }
            Some(idx) => {
                let existing = &mut self.bodies[idx];
                if existing.source == BodySource::Remote {
                    // Local observation supersedes the remote listing
                    // entirely; only the remote-sourced discoverer survives,
                    // since scans never carry one.
                    let discovered_by = existing.discovered_by.take();
                    let mut record = record;
                    record.discovered_by = discovered_by;
                    record.source = BodySource::ObservedOverRemote;
                    *existing = record;
                } else {
                    merge_observed(existing, record);
                }
                (IngestOutcome::Merged, idx)
            }
        }
    }

    /// Ingest a remote bodies listing for this system.
    ///
    /// Returns how many records were inserted (bodies unknown locally).
    pub fn ingest_remote(&mut self, listing: &RemoteSystem) -> usize {
        let mut inserted = 0;
        for remote in &listing.bodies {
            let Some(record) = remote.to_record(&self.system) else {
                continue;
            };
            match self.position_of(&record) {
                None => {
                    self.bodies.push(record);
                    inserted += 1;
                }
                Some(idx) => {
                    let existing = &mut self.bodies[idx];
                    if existing.discovered_by.is_none() {
                        existing.discovered_by = record.discovered_by;
                    }
                    if existing.estimated_value.is_none() {
                        existing.estimated_value = record.estimated_value;
                    }
                }
            }
        }
        inserted
    }

    /// Apply surface signals found after the initial scan
    /// (`SAASignalsFound`). No-op when the body is not known yet.
    pub fn apply_signals(&mut self, body_name: &str, geo: bool, bio: bool) {
        if let Some(body) = self
            .bodies
            .iter_mut()
            .find(|b| identity::names_match(&b.identity.system, &b.full_name, body_name))
        {
            body.has_geo_signals |= geo;
            body.has_bio_signals |= bio;
        }
    }

    /// Sort bodies by distance from the arrival point, unknown distances
    /// last.
    pub fn sort_by_distance(&mut self) {
        self.bodies.sort_by(|a, b| {
            let da = a.distance_ls.unwrap_or(f64::MAX);
            let db = b.distance_ls.unwrap_or(f64::MAX);
            da.total_cmp(&db)
        });
    }
}

/// Merge a later observation into an already-observed record: only fields
/// the new scan actually knows are taken, populated fields never regress.
fn merge_observed(existing: &mut BodyRecord, new: BodyRecord) {
    if new.type_code.is_some() {
        existing.type_code = new.type_code;
    }
    if new.type_description.is_some() {
        existing.type_description = new.type_description;
        existing.category = new.category;
    }
    if new.atmosphere.is_some() {
        existing.atmosphere = new.atmosphere;
    }
    if new.surface_temperature_k.is_some() {
        existing.surface_temperature_k = new.surface_temperature_k;
    }
    if new.surface_gravity_g.is_some() {
        existing.surface_gravity_g = new.surface_gravity_g;
    }
    if new.distance_ls.is_some() {
        existing.distance_ls = new.distance_ls;
    }
    if new.estimated_value.is_some() {
        existing.estimated_value = new.estimated_value;
    }
    if !new.materials.is_empty() {
        existing.materials = new.materials;
        existing.jumponium = new.jumponium;
    }
    existing.landable |= new.landable;
    existing.terraformable |= new.terraformable;
    existing.has_geo_signals |= new.has_geo_signals;
    existing.has_bio_signals |= new.has_bio_signals;
    existing.scoopable |= new.scoopable;
    existing.first_discovery |= new.first_discovery;
    if existing.source == BodySource::Remote {
        existing.source = BodySource::ObservedOverRemote;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::JournalEvent;

    fn observed(system: &str, line: &str) -> BodyRecord {
        let event = JournalEvent::decode(line).unwrap();
        BodyRecord::from_scan(system, event.scan().unwrap()).unwrap()
    }

    fn remote(json: &str) -> RemoteSystem {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn remote_after_observed_never_regresses_fields() {
        let mut snap = SystemSnapshot::new("Sol");
        let record = observed(
            "Sol",
            r#"{"event":"Scan","BodyName":"Sol 4","StarSystem":"Sol","PlanetClass":"High metal content body","Atmosphere":"Thin CO2","SurfaceTemperature":210.0,"DistanceFromArrivalLS":780}"#,
        );
        snap.ingest_observed(record);

        let before = snap.bodies()[0].clone();
        snap.ingest_remote(&remote(
            r#"{"name":"Sol","bodies":[{"name":"Sol 4","type":"Planet","subType":"Rocky body","estimatedValue":999,"distanceToArrival":1,"discovery":{"commander":"CMDR X"}}]}"#,
        ));

        let after = &snap.bodies()[0];
        assert_eq!(snap.len(), 1);
        // Populated local fields untouched.
        assert_eq!(after.type_description, before.type_description);
        assert_eq!(after.estimated_value, before.estimated_value);
        assert_eq!(after.distance_ls, before.distance_ls);
        assert_eq!(after.source, BodySource::Observed);
        // Gap filled.
        assert_eq!(after.discovered_by.as_deref(), Some("CMDR X"));
    }

    #[test]
    fn at_most_one_record_per_identity_under_interleaving() {
        let listing = remote(
            r#"{"name":"Sol","bodies":[{"name":"Sol A","type":"Star","subType":"G (White-Yellow) Star","estimatedValue":1200}]}"#,
        );
        let scan_line = r#"{"event":"Scan","BodyName":"Sol","StarSystem":"Sol","StarType":"G"}"#;

        // Observed first, remote second.
        let mut a = SystemSnapshot::new("Sol");
        a.ingest_observed(observed("Sol", scan_line));
        a.ingest_remote(&listing);
        assert_eq!(a.len(), 1);

        // Remote first, observed second.
        let mut b = SystemSnapshot::new("Sol");
        b.ingest_remote(&listing);
        b.ingest_observed(observed("Sol", scan_line));
        assert_eq!(b.len(), 1);
        assert_eq!(b.bodies()[0].source, BodySource::ObservedOverRemote);
    }

    #[test]
    fn remote_then_observed_upgrades_and_keeps_discoverer() {
        let mut snap = SystemSnapshot::new("Sol");
        snap.ingest_remote(&remote(
            r#"{"name":"Sol","bodies":[{"name":"Sol A","type":"Star","subType":"G (White-Yellow) Star","estimatedValue":1200,"discovery":{"commander":"CMDR Y"}}]}"#,
        ));
        assert_eq!(snap.bodies()[0].source, BodySource::Remote);

        snap.ingest_observed(observed(
            "Sol",
            r#"{"event":"Scan","BodyName":"Sol","StarSystem":"Sol","StarType":"G","SurfaceTemperature":5778}"#,
        ));
        let body = &snap.bodies()[0];
        assert_eq!(body.source, BodySource::ObservedOverRemote);
        assert_eq!(body.type_code.as_deref(), Some("G"));
        assert_eq!(body.surface_temperature_k, Some(5778.0));
        assert_eq!(body.discovered_by.as_deref(), Some("CMDR Y"));
    }

    #[test]
    fn remote_primary_star_does_not_duplicate_local_row() {
        // End-to-end scenario: local scan of "Sol" produced identity Primary
        // with a computed value; the remote fetch reports "Sol A" at the same
        // value. One row, value untouched.
        let mut snap = SystemSnapshot::new("Sol");
        snap.ingest_observed(observed(
            "Sol",
            r#"{"event":"Scan","BodyName":"Sol","StarSystem":"Sol","StarType":"G"}"#,
        ));
        assert_eq!(snap.bodies()[0].estimated_value, Some(1200));

        let inserted = snap.ingest_remote(&remote(
            r#"{"name":"Sol","bodies":[{"name":"Sol A","type":"Star","subType":"G (White-Yellow) Star","estimatedValue":1200}]}"#,
        ));
        assert_eq!(inserted, 0);
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.bodies()[0].estimated_value, Some(1200));
    }

    #[test]
    fn later_detail_scan_fills_without_erasing() {
        let mut snap = SystemSnapshot::new("Sol");
        snap.ingest_observed(observed(
            "Sol",
            r#"{"event":"Scan","BodyName":"Sol 4","StarSystem":"Sol","PlanetClass":"High metal content body","DistanceFromArrivalLS":780}"#,
        ));
        // Second scan knows materials but not distance.
        snap.ingest_observed(observed(
            "Sol",
            r#"{"event":"Scan","BodyName":"Sol 4","StarSystem":"Sol","PlanetClass":"High metal content body","Materials":[{"Name":"carbon"},{"Name":"vanadium"},{"Name":"germanium"}]}"#,
        ));
        let body = &snap.bodies()[0];
        assert_eq!(snap.len(), 1);
        assert_eq!(body.distance_ls, Some(780.0));
        assert_eq!(body.materials.len(), 3);
    }

    #[test]
    fn signals_attach_to_known_bodies() {
        let mut snap = SystemSnapshot::new("Sol");
        snap.ingest_observed(observed(
            "Sol",
            r#"{"event":"Scan","BodyName":"Sol 4","StarSystem":"Sol","PlanetClass":"Rocky body"}"#,
        ));
        snap.apply_signals("Sol 4", true, false);
        assert!(snap.bodies()[0].has_geo_signals);
        // Unknown body: no-op, no insert.
        snap.apply_signals("Sol 9", true, true);
        assert_eq!(snap.len(), 1);
    }

    #[test]
    fn sorts_by_distance_unknown_last() {
        let mut snap = SystemSnapshot::new("Sol");
        snap.ingest_remote(&remote(
            r#"{"name":"Sol","bodies":[{"name":"Sol 9","type":"Planet"},{"name":"Sol 4","type":"Planet","distanceToArrival":780},{"name":"Sol 1","type":"Planet","distanceToArrival":5}]}"#,
        ));
        snap.sort_by_distance();
        let names: Vec<_> = snap.bodies().iter().map(|b| b.full_name.as_str()).collect();
        assert_eq!(names, vec!["Sol 1", "Sol 4", "Sol 9"]);
    }
}
