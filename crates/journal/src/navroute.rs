//! `NavRoute.json` parsing.
//!
//! Unlike the journal, the route file is rewritten wholesale every time the
//! player plots a course, so there is no offset to track: each read parses
//! the entire file. The game occasionally writes an empty or truncated file
//! mid-replace; both parse to an empty route.

use std::path::Path;

use edscout_core::galaxy;
use serde::Deserialize;

pub const NAV_ROUTE_FILE: &str = "NavRoute.json";

/// One plotted jump.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteEntry {
    #[serde(rename = "StarSystem")]
    pub star_system: String,
    #[serde(rename = "StarClass")]
    pub star_class: Option<String>,
}

impl RouteEntry {
    /// Can the main star be fuel-scooped on arrival?
    pub fn scoopable(&self) -> bool {
        self.star_class
            .as_deref()
            .is_some_and(galaxy::is_scoopable)
    }
}

#[derive(Debug, Deserialize)]
struct NavRouteFile {
    #[serde(rename = "Route", default)]
    route: Vec<RouteEntry>,
}

/// Read the current route from the journal directory. Missing, empty, or
/// half-written files yield an empty route.
pub fn read_route(journal_dir: &Path) -> Vec<RouteEntry> {
    let path = journal_dir.join(NAV_ROUTE_FILE);
    let data = match std::fs::read_to_string(&path) {
        Ok(d) => d,
        Err(e) => {
            tracing::debug!("cannot read {}: {e}", path.display());
            return Vec::new();
        }
    };

    match serde_json::from_str::<NavRouteFile>(&data) {
        Ok(file) => file.route,
        Err(e) => {
            tracing::debug!("unparseable route file {}: {e}", path.display());
            Vec::new()
        }
    }
}
