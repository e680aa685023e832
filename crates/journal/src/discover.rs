//! Journal directory discovery and file listing.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use edscout_core::EngineError;

/// Does this file name look like a rotated journal (`Journal.*.log`)?
pub fn is_journal_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.starts_with("Journal.") && name.ends_with(".log")
}

/// List journal files in a directory, newest first by modification time.
pub fn journal_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut files: Vec<(SystemTime, PathBuf)> = entries
        .flatten()
        .filter_map(|entry| {
            let path = entry.path();
            if !is_journal_file(&path) {
                return None;
            }
            let modified = entry.metadata().and_then(|m| m.modified()).ok()?;
            Some((modified, path))
        })
        .collect();

    files.sort_by(|a, b| b.0.cmp(&a.0));
    files.into_iter().map(|(_, p)| p).collect()
}

/// The newest journal file, if any.
pub fn newest_journal(dir: &Path) -> Option<PathBuf> {
    journal_files(dir).into_iter().next()
}

/// Resolve the journal directory: an explicit override wins, otherwise the
/// known install locations are probed in order.
pub fn find_journal_dir(explicit: Option<&Path>) -> Result<PathBuf, EngineError> {
    if let Some(dir) = explicit {
        if dir.is_dir() {
            return Ok(dir.to_path_buf());
        }
        return Err(EngineError::JournalDirMissing(dir.to_path_buf()));
    }

    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."));

    let candidates = [
        home.join("Saved Games")
            .join("Frontier Developments")
            .join("Elite Dangerous"),
        home.join("OneDrive")
            .join("Saved Games")
            .join("Frontier Developments")
            .join("Elite Dangerous"),
        // Steam Proton prefix on Linux.
        home.join(".steam/steam/steamapps/compatdata/359320/pfx/drive_c/users/steamuser")
            .join("Saved Games")
            .join("Frontier Developments")
            .join("Elite Dangerous"),
    ];

    for candidate in candidates {
        if candidate.is_dir() {
            return Ok(candidate);
        }
    }

    Err(EngineError::JournalDirMissing(
        home.join("Saved Games")
            .join("Frontier Developments")
            .join("Elite Dangerous"),
    ))
}
