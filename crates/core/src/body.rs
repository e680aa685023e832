//! Body records: one logical row per celestial body in the tracked system.

use serde::{Deserialize, Serialize};

use crate::event::ScanInfo;
use crate::galaxy::{self, JumponiumTier};
use crate::identity::BodyIdentity;

/// Which data source produced (or last upgraded) a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodySource {
    /// Direct journal observation. Authoritative.
    Observed,
    /// Remote database listing only. Fills gaps until a scan arrives.
    Remote,
    /// Was remote, then confirmed by a local scan.
    ObservedOverRemote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyCategory {
    Star,
    Planet,
}

/// One celestial body in the currently-tracked system.
///
/// `None` / `false` / empty-vec fields mean "not yet known"; the merge rules
/// in [`crate::snapshot`] only ever move fields from unknown to known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyRecord {
    pub identity: BodyIdentity,
    /// Full name as the source reported it, e.g. "Sol A 2".
    pub full_name: String,
    pub category: BodyCategory,
    /// Star class code for stars ("G", "DA", ...).
    pub type_code: Option<String>,
    /// Display description: star class description or planet class.
    pub type_description: Option<String>,
    pub atmosphere: Option<String>,
    pub surface_temperature_k: Option<f64>,
    /// Surface gravity in G (journal reports m/s^2; converted at decode).
    pub surface_gravity_g: Option<f64>,
    pub landable: bool,
    pub terraformable: bool,
    pub has_geo_signals: bool,
    pub has_bio_signals: bool,
    pub materials: Vec<String>,
    pub jumponium: JumponiumTier,
    pub estimated_value: Option<i64>,
    pub first_discovery: bool,
    /// Commander name the remote database credits with discovery.
    pub discovered_by: Option<String>,
    pub distance_ls: Option<f64>,
    pub scoopable: bool,
    pub source: BodySource,
}

const STANDARD_GRAVITY: f64 = 9.81;

impl BodyRecord {
    /// Build an observed record from a `Scan` event.
    ///
    /// Returns `None` for "Belt Cluster" pseudo-bodies, which are never
    /// tracked.
    pub fn from_scan(system: &str, scan: &ScanInfo) -> Option<BodyRecord> {
        if scan.body_name.contains("Belt Cluster") {
            return None;
        }

        let is_star = scan.is_star();
        let identity = BodyIdentity::canonicalize(system, &scan.body_name, is_star);

        let (category, type_code, type_description) = if let Some(code) = &scan.star_type {
            (
                BodyCategory::Star,
                Some(code.clone()),
                Some(galaxy::star_description(code)),
            )
        } else {
            (BodyCategory::Planet, None, scan.planet_class.clone())
        };

        let terraformable = scan.is_terraformable();
        let materials = scan.material_names();
        let jumponium = galaxy::jumponium_tier(&materials);
        let value_basis = if is_star {
            type_code.as_deref().unwrap_or("")
        } else {
            scan.planet_class.as_deref().unwrap_or("")
        };
        let estimated_value = Some(galaxy::estimate_value(value_basis, terraformable, is_star));
        let scoopable = is_star
            && type_code
                .as_deref()
                .is_some_and(galaxy::is_scoopable);

        Some(BodyRecord {
            identity,
            full_name: scan.body_name.clone(),
            category,
            type_code,
            type_description,
            atmosphere: scan.atmosphere.clone().filter(|a| !a.is_empty()),
            surface_temperature_k: scan.surface_temperature.filter(|t| *t > 0.0),
            surface_gravity_g: scan.surface_gravity.map(|g| g / STANDARD_GRAVITY),
            landable: scan.landable.unwrap_or(false),
            terraformable,
            has_geo_signals: scan.has_geological_signals(),
            has_bio_signals: scan.has_biological_signals(),
            materials,
            jumponium,
            estimated_value,
            // Absent WasDiscovered means the record predates the flag; the
            // original treats that as a first discovery.
            first_discovery: !scan.was_discovered.unwrap_or(false),
            discovered_by: None,
            distance_ls: scan.distance_from_arrival_ls,
            scoopable,
            source: BodySource::Observed,
        })
    }

    /// Short display name: the canonical designator.
    pub fn display_name(&self) -> &str {
        &self.identity.designator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::JournalEvent;
    use crate::identity::PRIMARY;

    fn scan(line: &str) -> ScanInfo {
        JournalEvent::decode(line).unwrap().scan().unwrap().clone()
    }

    #[test]
    fn star_scan_produces_primary_record() {
        let s = scan(
            r#"{"event":"Scan","BodyName":"Sol","StarSystem":"Sol","StarType":"G","SurfaceTemperature":5778,"DistanceFromArrivalLS":0,"WasDiscovered":true}"#,
        );
        let body = BodyRecord::from_scan("Sol", &s).unwrap();
        assert_eq!(body.identity.designator, PRIMARY);
        assert_eq!(body.category, BodyCategory::Star);
        assert_eq!(body.type_description.as_deref(), Some("G (White-Yellow)"));
        assert!(body.scoopable);
        assert!(!body.first_discovery);
        assert_eq!(body.estimated_value, Some(1_200));
    }

    #[test]
    fn planet_scan_converts_gravity_and_classifies_materials() {
        let s = scan(
            r#"{"event":"Scan","BodyName":"Sol 4","StarSystem":"Sol","PlanetClass":"High metal content body","SurfaceGravity":19.62,"Landable":true,"Materials":[{"Name":"carbon"},{"Name":"vanadium"},{"Name":"germanium"}]}"#,
        );
        let body = BodyRecord::from_scan("Sol", &s).unwrap();
        assert_eq!(body.category, BodyCategory::Planet);
        assert!((body.surface_gravity_g.unwrap() - 2.0).abs() < 1e-9);
        assert_eq!(body.jumponium, JumponiumTier::Basic);
        assert!(body.landable);
        assert!(body.first_discovery);
        assert_eq!(body.estimated_value, Some(35_000));
    }

    #[test]
    fn belt_clusters_are_ignored() {
        let s = scan(
            r#"{"event":"Scan","BodyName":"Sol A Belt Cluster 1","StarSystem":"Sol"}"#,
        );
        assert!(BodyRecord::from_scan("Sol", &s).is_none());
    }
}
