//! Canonical body identity.
//!
//! Journal scans and the remote database refer to the same body with name
//! variants: the primary star of "Sol" appears as "Sol" in one source and
//! "Sol A" in the other. Everything that deduplicates bodies keys on the
//! canonical `(system, designator)` pair produced here.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Sentinel designator for the primary star.
pub const PRIMARY: &str = "Primary";

/// Canonical per-system body key. Equality and hashing are case-insensitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyIdentity {
    pub system: String,
    pub designator: String,
}

impl BodyIdentity {
    /// Canonicalize a full body name within a system.
    ///
    /// Strips the system-name prefix (case-insensitive) and trims; an empty
    /// remainder — or a bare "A" when the body is a star — resolves to
    /// [`PRIMARY`].
    pub fn canonicalize(system: &str, full_body_name: &str, is_star: bool) -> BodyIdentity {
        let full = full_body_name.trim();
        // `get` rather than indexing: the system-name byte length can fall
        // inside a multi-byte character of the body name.
        let mut designator = match full.get(..system.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(system) => {
                full[system.len()..].trim().to_string()
            }
            _ => full.to_string(),
        };
        if designator.is_empty() || (is_star && designator.eq_ignore_ascii_case("A")) {
            designator = PRIMARY.to_string();
        }
        BodyIdentity {
            system: system.to_string(),
            designator,
        }
    }
}

impl PartialEq for BodyIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.system.eq_ignore_ascii_case(&other.system)
            && self.designator.eq_ignore_ascii_case(&other.designator)
    }
}

impl Eq for BodyIdentity {}

impl Hash for BodyIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.system.bytes() {
            state.write_u8(b.to_ascii_uppercase());
        }
        state.write_u8(0);
        for b in self.designator.bytes() {
            state.write_u8(b.to_ascii_uppercase());
        }
    }
}

/// Do two full body names refer to the same body within `system`?
///
/// Case-insensitive equality, plus the historically-observed edge case where
/// the bare system name and "<system> A" both mean the primary star.
pub fn names_match(system: &str, a: &str, b: &str) -> bool {
    let a = a.trim();
    let b = b.trim();
    if a.eq_ignore_ascii_case(b) {
        return true;
    }
    if system.is_empty() {
        return false;
    }
    let with_a = format!("{system} A");
    (a.eq_ignore_ascii_case(system) && b.eq_ignore_ascii_case(&with_a))
        || (b.eq_ignore_ascii_case(system) && a.eq_ignore_ascii_case(&with_a))
}
