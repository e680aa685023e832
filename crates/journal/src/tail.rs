//! Live tail of the active journal file.
//!
//! A [`JournalTailer`] is polled on a fixed interval. Each poll re-resolves
//! the newest journal in the directory so session rotation is picked up, and
//! otherwise reads only the freshly appended byte range. A rotation (or an
//! unexpected shrink, treated the same) resets the cursor and deliberately
//! reads nothing that tick — a file that appeared this instant may still be
//! mid-flush.

use std::path::{Path, PathBuf};

use crate::discover;
use crate::reader;

/// How much of the active journal has been consumed.
///
/// The offset never decreases except when the active file is replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailCursor {
    pub path: PathBuf,
    pub offset: u64,
}

/// Result of one poll tick.
#[derive(Debug, Default)]
pub struct TailPoll {
    /// The tracked file changed (or shrank) and the cursor was reset.
    pub rotated: bool,
    /// Newly appended, fully terminated lines, in file order.
    pub lines: Vec<String>,
}

/// State machine `Idle -> Tracking(file, offset)`.
#[derive(Debug, Default)]
pub struct JournalTailer {
    cursor: Option<TailCursor>,
}

impl JournalTailer {
    pub fn new() -> JournalTailer {
        JournalTailer { cursor: None }
    }

    /// Start tracking from a known position, e.g. the end-of-file cursor the
    /// full sync produced. Avoids replaying already-seen lines on the first
    /// poll.
    pub fn resume(cursor: TailCursor) -> JournalTailer {
        JournalTailer {
            cursor: Some(cursor),
        }
    }

    pub fn cursor(&self) -> Option<&TailCursor> {
        self.cursor.as_ref()
    }

    /// One poll tick against the journal directory.
    pub fn poll(&mut self, dir: &Path) -> TailPoll {
        let Some(newest) = discover::newest_journal(dir) else {
            // Nothing to track; keep whatever cursor we had and try again
            // next tick.
            return TailPoll::default();
        };

        let cursor = match &mut self.cursor {
            Some(cursor) if cursor.path == newest => cursor,
            other => {
                tracing::info!("tracking journal {}", newest.display());
                *other = Some(TailCursor {
                    path: newest,
                    offset: 0,
                });
                return TailPoll {
                    rotated: true,
                    lines: Vec::new(),
                };
            }
        };
        let len = match std::fs::metadata(&cursor.path) {
            Ok(m) => m.len(),
            Err(e) => {
                tracing::debug!("cannot stat {}: {e}", cursor.path.display());
                return TailPoll::default();
            }
        };

        if len < cursor.offset {
            // Shrunk in place: the file was replaced under the same name.
            tracing::info!(
                "journal {} shrank ({len} < {}), resetting cursor",
                cursor.path.display(),
                cursor.offset
            );
            cursor.offset = 0;
            return TailPoll {
                rotated: true,
                lines: Vec::new(),
            };
        }

        if len == cursor.offset {
            return TailPoll::default();
        }

        let (lines, new_offset) = reader::read_lines_from_offset(&cursor.path, cursor.offset);
        cursor.offset = new_offset;
        TailPoll {
            rotated: false,
            lines,
        }
    }
}
