//! Galaxy reference data: star classes, body valuation, jumponium recipes.

use serde::{Deserialize, Serialize};

/// FSD injection recipe tiers, best-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JumponiumTier {
    #[default]
    None,
    Basic,
    Standard,
    Premium,
}

const BASIC_INGREDIENTS: [&str; 3] = ["Carbon", "Vanadium", "Germanium"];
const STANDARD_INGREDIENTS: [&str; 5] = ["Carbon", "Vanadium", "Germanium", "Cadmium", "Niobium"];
const PREMIUM_INGREDIENTS: [&str; 6] = [
    "Carbon",
    "Germanium",
    "Arsenic",
    "Niobium",
    "Yttrium",
    "Polonium",
];

fn has_all(materials: &[String], recipe: &[&str]) -> bool {
    recipe
        .iter()
        .all(|ing| materials.iter().any(|m| m.eq_ignore_ascii_case(ing)))
}

/// Highest jumponium tier a body's material set can synthesize.
pub fn jumponium_tier(materials: &[String]) -> JumponiumTier {
    if materials.is_empty() {
        return JumponiumTier::None;
    }
    if has_all(materials, &PREMIUM_INGREDIENTS) {
        return JumponiumTier::Premium;
    }
    if has_all(materials, &STANDARD_INGREDIENTS) {
        return JumponiumTier::Standard;
    }
    if has_all(materials, &BASIC_INGREDIENTS) {
        return JumponiumTier::Basic;
    }
    JumponiumTier::None
}

/// Human-readable description for a journal star class code.
pub fn star_description(code: &str) -> String {
    match code {
        "O" | "B" | "A" => format!("{code} (Blue-White)"),
        "F" => "F (White)".to_string(),
        "G" => "G (White-Yellow)".to_string(),
        "K" => "K (Yellow-Orange)".to_string(),
        "M" => "M (Red Dwarf)".to_string(),
        "L" | "T" | "Y" => format!("{code} (Brown Dwarf)"),
        "TTS" => "T Tauri".to_string(),
        "AeBe" => "Herbig Ae/Be".to_string(),
        "N" | "Neutron" => "Neutron Star".to_string(),
        "H" | "BlackHole" => "Black Hole".to_string(),
        c if c.starts_with('D') => format!("{c} (White Dwarf)"),
        "" => "Unknown".to_string(),
        other => other.to_string(),
    }
}

/// Whether a star class supports fuel scooping (main sequence O B A F G K M).
pub fn is_scoopable(star_class: &str) -> bool {
    matches!(
        star_class.chars().next().map(|c| c.to_ascii_uppercase()),
        Some('O' | 'B' | 'A' | 'F' | 'G' | 'K' | 'M')
    ) && !matches!(star_class, "TTS" | "AeBe")
}

/// Scoopability from a remote subtype description ("G (White-Yellow) Star",
/// "Black Hole"). Named non-scoopable types are ruled out before the
/// first-letter check, which would misread "Black Hole" or a brown dwarf.
pub fn is_scoopable_description(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    const NON_SCOOPABLE: [&str; 7] = [
        "black hole",
        "neutron",
        "white dwarf",
        "brown dwarf",
        "t tauri",
        "herbig",
        "wolf-rayet",
    ];
    if NON_SCOOPABLE.iter().any(|t| lower.contains(t)) {
        return false;
    }
    is_scoopable(text)
}

/// Rough scan value estimate in credits.
///
/// For stars `body_type` is the class code; for planets it is the
/// `PlanetClass` description.
pub fn estimate_value(body_type: &str, terraformable: bool, is_star: bool) -> i64 {
    if is_star {
        return match body_type {
            "N" | "Neutron" => 50_000,
            "H" | "BlackHole" => 60_000,
            c if c.starts_with('D') => 14_000,
            _ => 1_200,
        };
    }

    match body_type {
        "Earthlike body" => 3_200_000,
        "Ammonia world" => 1_700_000,
        "Water world" => {
            if terraformable {
                2_700_000
            } else {
                1_000_000
            }
        }
        "High metal content body" => {
            if terraformable {
                1_800_000
            } else {
                35_000
            }
        }
        _ if terraformable => 1_000_000,
        t if t.to_ascii_lowercase().contains("gas giant")
            && t.to_ascii_lowercase().contains("class ii") =>
        {
            45_000
        }
        _ => 1_000,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mats(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn jumponium_tiers() {
        assert_eq!(jumponium_tier(&[]), JumponiumTier::None);
        assert_eq!(
            jumponium_tier(&mats(&["carbon", "vanadium", "germanium"])),
            JumponiumTier::Basic
        );
        assert_eq!(
            jumponium_tier(&mats(&[
                "carbon", "vanadium", "germanium", "cadmium", "niobium"
            ])),
            JumponiumTier::Standard
        );
        assert_eq!(
            jumponium_tier(&mats(&[
                "carbon", "germanium", "arsenic", "niobium", "yttrium", "polonium", "iron"
            ])),
            JumponiumTier::Premium
        );
        // Missing one basic ingredient.
        assert_eq!(
            jumponium_tier(&mats(&["carbon", "vanadium"])),
            JumponiumTier::None
        );
    }

    #[test]
    fn star_descriptions() {
        assert_eq!(star_description("G"), "G (White-Yellow)");
        assert_eq!(star_description("N"), "Neutron Star");
        assert_eq!(star_description("DA"), "DA (White Dwarf)");
        assert_eq!(star_description("TTS"), "T Tauri");
        assert_eq!(star_description(""), "Unknown");
    }

    #[test]
    fn scoopable_classes() {
        assert!(is_scoopable("G"));
        assert!(is_scoopable("K"));
        assert!(!is_scoopable("L"));
        assert!(!is_scoopable("N"));
        assert!(!is_scoopable("DA"));
        assert!(!is_scoopable("TTS"));
        assert!(!is_scoopable(""));
    }

    #[test]
    fn scoopable_descriptions() {
        assert!(is_scoopable_description("G (White-Yellow) Star"));
        assert!(is_scoopable_description("K (Yellow-Orange) Star"));
        // 'B' and 'T' would pass the first-letter check.
        assert!(!is_scoopable_description("Black Hole"));
        assert!(!is_scoopable_description("T Tauri Star"));
        assert!(!is_scoopable_description("Neutron Star"));
        assert!(!is_scoopable_description("L (Brown dwarf) Star"));
        // Red dwarfs are main sequence, unlike the brown and white kinds.
        assert!(is_scoopable_description("M (Red dwarf) Star"));
    }

    #[test]
    fn value_estimates() {
        assert_eq!(estimate_value("Earthlike body", false, false), 3_200_000);
        assert_eq!(estimate_value("Water world", true, false), 2_700_000);
        assert_eq!(estimate_value("Water world", false, false), 1_000_000);
        assert_eq!(
            estimate_value("High metal content body", true, false),
            1_800_000
        );
        assert_eq!(estimate_value("Icy body", true, false), 1_000_000);
        assert_eq!(estimate_value("Icy body", false, false), 1_000);
        assert_eq!(
            estimate_value("Sudarsky class II gas giant", false, false),
            45_000
        );
        assert_eq!(estimate_value("N", false, true), 50_000);
        assert_eq!(estimate_value("DA", false, true), 14_000);
        assert_eq!(estimate_value("G", false, true), 1_200);
    }
}
