//! Journal event decoding.
//!
//! The game journal is newline-delimited JSON, one self-describing record per
//! line with a mandatory `event` discriminator:
//!
//! ```jsonl
//! {"timestamp":"2024-05-01T12:00:00Z","event":"FSDJump","StarSystem":"Sol",...}
//! {"timestamp":"2024-05-01T12:03:41Z","event":"Scan","BodyName":"Sol A 2",...}
//! ```
//!
//! Kinds the engine reacts to are decoded into typed payloads at this
//! boundary; everything else passes through as [`Payload::Other`] so observer
//! modules still see the full stream. Malformed lines decode to `None` and
//! are skipped, matching the at-least-once tolerance of log corruption.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One decoded journal record. Immutable once decoded.
#[derive(Debug, Clone)]
pub struct JournalEvent {
    pub timestamp: Option<DateTime<Utc>>,
    pub kind: String,
    pub payload: Payload,
    raw: String,
}

/// Typed payloads for the event kinds the engine cares about.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum Payload {
    /// `FSDJump` or `Location`: the player is now in this system.
    Arrival(Arrival),
    /// `StartJump`: drive charging, no position change yet.
    JumpCharge(JumpCharge),
    /// `Scan`: a celestial body was scanned.
    Scan(Box<ScanInfo>),
    /// `FSSAllBodiesFound`: every body in the system has been found.
    AllBodiesFound(AllBodiesFound),
    /// `FSSDiscoveryScan`: honk; reports how many bodies the system has.
    DiscoveryScan(DiscoveryScan),
    /// `SAASignalsFound`: surface signals located on an already-known body.
    SignalsFound(SignalsFound),
    /// Any other event kind; carried for module fan-out only.
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Arrival {
    #[serde(rename = "StarSystem")]
    pub star_system: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JumpCharge {
    #[serde(rename = "JumpType")]
    pub jump_type: String,
    #[serde(rename = "StarSystem")]
    pub star_system: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AllBodiesFound {
    #[serde(rename = "SystemName")]
    pub system_name: String,
    #[serde(rename = "Count")]
    pub count: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryScan {
    #[serde(rename = "SystemName")]
    pub system_name: Option<String>,
    #[serde(rename = "BodyCount")]
    pub body_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignalsFound {
    #[serde(rename = "BodyName")]
    pub body_name: String,
    #[serde(rename = "Signals", default)]
    pub signals: Vec<Signal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Signal {
    #[serde(rename = "Type")]
    pub signal_type: String,
    #[serde(rename = "Count")]
    pub count: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MaterialEntry {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Percent")]
    pub percent: Option<f64>,
}

/// Body attributes carried by a `Scan` event.
///
/// Older journals omit `StarSystem`; callers fall back to prefix-matching the
/// body name against the tracked system.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanInfo {
    #[serde(rename = "BodyName")]
    pub body_name: String,
    #[serde(rename = "StarSystem")]
    pub star_system: Option<String>,
    #[serde(rename = "StarType")]
    pub star_type: Option<String>,
    #[serde(rename = "PlanetClass")]
    pub planet_class: Option<String>,
    #[serde(rename = "Atmosphere")]
    pub atmosphere: Option<String>,
    #[serde(rename = "SurfaceTemperature")]
    pub surface_temperature: Option<f64>,
    /// Surface gravity in m/s^2, as the game reports it.
    #[serde(rename = "SurfaceGravity")]
    pub surface_gravity: Option<f64>,
    #[serde(rename = "Landable")]
    pub landable: Option<bool>,
    #[serde(rename = "TerraformState")]
    pub terraform_state: Option<String>,
    #[serde(rename = "DistanceFromArrivalLS")]
    pub distance_from_arrival_ls: Option<f64>,
    #[serde(rename = "WasDiscovered")]
    pub was_discovered: Option<bool>,
    #[serde(rename = "Materials", default)]
    pub materials: Vec<MaterialEntry>,
    #[serde(rename = "Signals", default)]
    pub signals: Vec<Signal>,
    #[serde(rename = "Genuses", default)]
    pub genuses: Vec<serde_json::Value>,
}

impl ScanInfo {
    pub fn is_star(&self) -> bool {
        self.star_type.is_some()
    }

    pub fn is_terraformable(&self) -> bool {
        self.terraform_state.as_deref() == Some("Terraformable")
    }

    pub fn has_geological_signals(&self) -> bool {
        self.signals.iter().any(|s| s.signal_type.contains("Geological"))
    }

    pub fn has_biological_signals(&self) -> bool {
        self.signals.iter().any(|s| s.signal_type.contains("Biological"))
            || !self.genuses.is_empty()
    }

    pub fn material_names(&self) -> Vec<String> {
        self.materials.iter().map(|m| m.name.clone()).collect()
    }

    /// Does this scan describe a body in `system`? Old journals omit
    /// `StarSystem`, in which case the body-name prefix decides.
    pub fn belongs_to(&self, system: &str) -> bool {
        match self.star_system.as_deref() {
            Some(s) => s.eq_ignore_ascii_case(system),
            None => self
                .body_name
                .get(..system.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(system)),
        }
    }
}

impl JournalEvent {
    /// Decode one journal line. Returns `None` for blank lines, invalid JSON,
    /// a missing `event` discriminator, or a known kind whose payload does not
    /// validate — all of which the pipeline skips without aborting.
    pub fn decode(line: &str) -> Option<JournalEvent> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let value: serde_json::Value = serde_json::from_str(line).ok()?;
        let kind = value.get("event")?.as_str()?.to_string();

        let timestamp = value
            .get("timestamp")
            .and_then(|t| t.as_str())
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.with_timezone(&Utc));

        let payload = match kind.as_str() {
            "FSDJump" | "Location" => Payload::Arrival(from_value(value.clone())?),
            "StartJump" => Payload::JumpCharge(from_value(value.clone())?),
            "Scan" => Payload::Scan(Box::new(from_value(value.clone())?)),
            "FSSAllBodiesFound" => Payload::AllBodiesFound(from_value(value.clone())?),
            "FSSDiscoveryScan" => Payload::DiscoveryScan(from_value(value.clone())?),
            "SAASignalsFound" => Payload::SignalsFound(from_value(value.clone())?),
            _ => Payload::Other,
        };

        Some(JournalEvent {
            timestamp,
            kind,
            payload,
            raw: line.to_string(),
        })
    }

    /// The original line, verbatim. Used for fire-and-forget submission of
    /// scan events to the remote service.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// `FSDJump` or `Location`.
    pub fn is_arrival(&self) -> bool {
        matches!(self.payload, Payload::Arrival(_))
    }

    /// System name for arrival events.
    pub fn arrival_system(&self) -> Option<&str> {
        match &self.payload {
            Payload::Arrival(a) => Some(&a.star_system),
            _ => None,
        }
    }

    /// Destination system for a hyperspace jump charge; `None` for
    /// supercruise charges and all other events.
    pub fn hyperspace_target(&self) -> Option<&str> {
        match &self.payload {
            Payload::JumpCharge(j) if j.jump_type == "Hyperspace" => {
                j.star_system.as_deref()
            }
            _ => None,
        }
    }

    pub fn scan(&self) -> Option<&ScanInfo> {
        match &self.payload {
            Payload::Scan(s) => Some(s),
            _ => None,
        }
    }
}

fn from_value<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Option<T> {
    serde_json::from_value(value).ok()
}
