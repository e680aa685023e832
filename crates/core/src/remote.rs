//! Wire types for the remote astronomical database (EDSM-shaped).
//!
//! The bodies endpoint returns `{"name": "...", "bodies": [...]}`; an empty
//! object means the system is unknown. Only the fields the engine consumes
//! are modeled; everything else is ignored.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::body::{BodyCategory, BodyRecord, BodySource};
use crate::galaxy;
use crate::identity::BodyIdentity;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RemoteSystem {
    pub name: Option<String>,
    #[serde(default)]
    pub bodies: Vec<RemoteBody>,
}

impl RemoteSystem {
    /// The lightweight "is this system known" check: presence of a name.
    pub fn is_known(&self) -> bool {
        self.name.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteBody {
    pub name: String,
    #[serde(rename = "type")]
    pub body_type: Option<String>,
    #[serde(rename = "subType")]
    pub sub_type: Option<String>,
    #[serde(rename = "estimatedValue")]
    pub estimated_value: Option<i64>,
    #[serde(rename = "distanceToArrival")]
    pub distance_to_arrival: Option<f64>,
    #[serde(rename = "terraformingState")]
    pub terraforming_state: Option<String>,
    #[serde(default)]
    pub discovery: Option<RemoteDiscovery>,
    /// Material name -> surface percentage.
    #[serde(default)]
    pub materials: Option<BTreeMap<String, f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteDiscovery {
    pub commander: Option<String>,
}

impl RemoteBody {
    pub fn is_star(&self) -> bool {
        self.body_type
            .as_deref()
            .is_some_and(|t| t.contains("Star"))
    }

    pub fn discoverer(&self) -> Option<&str> {
        self.discovery
            .as_ref()
            .and_then(|d| d.commander.as_deref())
            .filter(|c| !c.is_empty())
    }

    /// Best available type description: subType first, then type.
    pub fn type_description(&self) -> Option<&str> {
        self.sub_type.as_deref().or(self.body_type.as_deref())
    }

    /// Convert into a gap-filling record for `system`.
    ///
    /// Returns `None` for belt clusters. Materials become the same list shape
    /// local scans produce so jumponium classification works identically.
    pub fn to_record(&self, system: &str) -> Option<BodyRecord> {
        if self.name.contains("Belt Cluster") {
            return None;
        }

        let is_star = self.is_star();
        let identity = BodyIdentity::canonicalize(system, &self.name, is_star);
        let terraformable = self.terraforming_state.as_deref() == Some("Terraformable");
        let materials: Vec<String> = self
            .materials
            .as_ref()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        let jumponium = galaxy::jumponium_tier(&materials);

        // Remote listings describe stars by subtype text ("G (White-Yellow)
        // Star"), not class code.
        let scoopable = is_star
            && self
                .type_description()
                .is_some_and(galaxy::is_scoopable_description);

        Some(BodyRecord {
            identity,
            full_name: self.name.clone(),
            category: if is_star {
                BodyCategory::Star
            } else {
                BodyCategory::Planet
            },
            type_code: None,
            type_description: self.type_description().map(str::to_string),
            atmosphere: None,
            surface_temperature_k: None,
            surface_gravity_g: None,
            landable: false,
            terraformable,
            has_geo_signals: false,
            has_bio_signals: false,
            materials,
            jumponium,
            estimated_value: self.estimated_value.filter(|v| *v > 0),
            first_discovery: false,
            discovered_by: self.discoverer().map(str::to_string),
            distance_ls: self.distance_to_arrival,
            scoopable,
            source: BodySource::Remote,
        })
    }
}
